/// Progress reported by ffmpeg's `-progress` key/value output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamProgress {
    pub frame: u64,
    pub fps: f64,
    /// Output time in milliseconds
    pub out_time_ms: i64,
    /// Output time as reported (HH:MM:SS.micro)
    pub out_time: String,
    /// Encoding speed relative to realtime
    pub speed: f64,
    pub is_complete: bool,
}

impl StreamProgress {
    /// Short human-readable line for status updates.
    pub fn summary(&self) -> String {
        let total_secs = (self.out_time_ms / 1000).max(0);
        format!(
            "{:02}:{:02}:{:02} streamed, {} frames, {:.2}x",
            total_secs / 3600,
            (total_secs / 60) % 60,
            total_secs % 60,
            self.frame,
            self.speed
        )
    }
}

/// Whether `line` belongs to the `-progress` block rather than ffmpeg's log output.
pub(crate) fn is_progress_line(line: &str) -> bool {
    match line.trim().split_once('=') {
        Some((key, _)) => matches!(
            key,
            "frame"
                | "fps"
                | "bitrate"
                | "total_size"
                | "out_time_ms"
                | "out_time_us"
                | "out_time"
                | "dup_frames"
                | "drop_frames"
                | "speed"
                | "progress"
        ) || key.starts_with("stream_"),
        None => false,
    }
}

/// Fold one progress line into `current`; returns a snapshot at the end of each progress block.
pub(crate) fn parse_progress_line(
    line: &str,
    current: &mut StreamProgress,
) -> Option<StreamProgress> {
    let (key, value) = line.trim().split_once('=')?;
    match key {
        // ffmpeg reports microseconds under both names
        "out_time_ms" | "out_time_us" => {
            if let Ok(us) = value.parse::<i64>() {
                current.out_time_ms = us / 1000;
            }
        }
        "out_time" => current.out_time = value.to_string(),
        "frame" => {
            if let Ok(frame) = value.parse() {
                current.frame = frame;
            }
        }
        "fps" => {
            if let Ok(fps) = value.parse() {
                current.fps = fps;
            }
        }
        "speed" => {
            if let Some(speed) = value.trim().strip_suffix('x').and_then(|s| s.parse().ok()) {
                current.speed = speed;
            }
        }
        "progress" => {
            current.is_complete = value == "end";
            return Some(current.clone());
        }
        _ => {}
    }
    None
}
