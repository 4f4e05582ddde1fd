use std::time::Duration;

/// Encoder knobs applied to every outbound stream.
///
/// The defaults keep a live ingest (Telegram RTMPS in particular) continuously playable:
/// H.264/AAC in FLV, capped bitrate, a keyframe every two seconds and zero-latency tuning.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamSettings {
    pub format: String,
    pub video_codec: String,
    pub audio_codec: String,
    pub preset: String,
    pub crf: u8,
    pub maxrate: String,
    pub bufsize: String,
    pub audio_bitrate: String,
    pub audio_rate: u32,
    pub pix_fmt: String,
    pub tune: String,
    /// Seconds between keyframes, scaled by the source frame rate.
    pub keyframe_seconds: f64,
    /// Loop the input forever instead of ending the stream with the file.
    pub loop_input: bool,
    pub log_level: String,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            format: "flv".to_string(),
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            preset: "ultrafast".to_string(),
            crf: 20,
            maxrate: "1200k".to_string(),
            bufsize: "2400k".to_string(),
            audio_bitrate: "96k".to_string(),
            audio_rate: 48_000,
            pix_fmt: "yuv420p".to_string(),
            tune: "zerolatency".to_string(),
            keyframe_seconds: 2.0,
            loop_input: true,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// How long the status relay waits on its queue before re-checking the stop signal.
    pub poll_interval: Duration,
    /// How long `cancel` waits for a worker to exit.
    pub cancel_wait: Duration,
    /// Minimum spacing of progress updates. Zero disables them.
    pub progress_interval: Duration,
    /// Cap on concurrently active jobs. `None` means unlimited.
    pub max_jobs: Option<usize>,
    /// Capacity of the supervisor's inbound message queue.
    pub mailbox_capacity: usize,
    pub settings: StreamSettings,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            cancel_wait: Duration::from_secs(1),
            progress_interval: Duration::from_secs(30),
            max_jobs: None,
            mailbox_capacity: 32,
            settings: StreamSettings::default(),
        }
    }
}

impl SupervisorConfig {
    /// Defaults overridden by `STREAM_POLL_MS`, `STREAM_CANCEL_WAIT_MS`,
    /// `STREAM_PROGRESS_SECS` and `STREAM_MAX_JOBS` when they are set and parse.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            poll_interval: env_parse("STREAM_POLL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
            cancel_wait: env_parse("STREAM_CANCEL_WAIT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.cancel_wait),
            progress_interval: env_parse("STREAM_PROGRESS_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.progress_interval),
            max_jobs: env_parse::<usize>("STREAM_MAX_JOBS")
                .filter(|max| *max > 0)
                .or(defaults.max_jobs),
            ..defaults
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_live_ingest_profile() {
        let config = SupervisorConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.cancel_wait, Duration::from_secs(1));
        assert_eq!(config.max_jobs, None);
        assert_eq!(config.settings.maxrate, "1200k");
        assert_eq!(config.settings.bufsize, "2400k");
        assert!(config.settings.loop_input);
    }
}
