use super::probe::MediaInfo;
use crate::config::StreamSettings;
use std::path::{Path, PathBuf};

/// A fully built ffmpeg invocation that pushes one local file to a live destination.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamPlan {
    input: PathBuf,
    destination: String,
    args: Vec<String>,
}

impl StreamPlan {
    pub fn new(
        input: impl AsRef<Path>,
        destination: impl Into<String>,
        info: &MediaInfo,
        settings: &StreamSettings,
    ) -> Self {
        let input = input.as_ref().to_path_buf();
        let destination = destination.into();
        let fps = output_fps(info.fps);
        let keyframe_interval = ((fps * settings.keyframe_seconds).round() as u32).max(1);

        let mut args: Vec<String> = vec![
            "-y".into(),
            "-hide_banner".into(),
            "-loglevel".into(),
            settings.log_level.clone(),
            "-nostats".into(),
            // progress key/value pairs share stderr with the log
            "-progress".into(),
            "pipe:2".into(),
        ];
        if settings.loop_input {
            args.extend(["-stream_loop".to_string(), "-1".to_string()]);
        }
        // feed the input at its native rate so the ingest sees a live stream
        args.push("-re".into());
        args.extend(["-i".into(), input.to_string_lossy().into_owned()]);

        args.extend([
            "-c:v".into(),
            settings.video_codec.clone(),
            "-preset".into(),
            settings.preset.clone(),
            "-tune".into(),
            settings.tune.clone(),
            "-crf".into(),
            settings.crf.to_string(),
            "-maxrate".into(),
            settings.maxrate.clone(),
            "-bufsize".into(),
            settings.bufsize.clone(),
            "-pix_fmt".into(),
            settings.pix_fmt.clone(),
            "-r".into(),
            format_fps(fps),
            "-g".into(),
            keyframe_interval.to_string(),
            "-c:a".into(),
            settings.audio_codec.clone(),
            "-b:a".into(),
            settings.audio_bitrate.clone(),
            "-ar".into(),
            settings.audio_rate.to_string(),
            "-f".into(),
            settings.format.clone(),
            destination.clone(),
        ]);

        Self {
            input,
            destination,
            args,
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The argument list with the destination's secret key masked, for logging.
    pub fn redacted_args(&self) -> String {
        self.args
            .iter()
            .map(|arg| {
                if *arg == self.destination {
                    redact(arg)
                } else {
                    arg.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn output_fps(probed: f64) -> f64 {
    if probed.is_finite() && probed > 0.0 {
        probed
    } else {
        30.0
    }
}

fn format_fps(fps: f64) -> String {
    if fps.fract() == 0.0 {
        format!("{}", fps as u64)
    } else {
        format!("{:.3}", fps)
    }
}

/// Keep the scheme and host part of a stream URL, hide the rest.
pub(crate) fn redact(destination: &str) -> String {
    let host_start = destination.find("://").map(|i| i + 3).unwrap_or(0);
    match destination[host_start..].find('/') {
        Some(slash) => format!("{}/***", &destination[..host_start + slash]),
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(fps: f64) -> MediaInfo {
        MediaInfo {
            duration: 12.0,
            width: 1280,
            height: 720,
            video_codec: "hevc".into(),
            audio_codec: Some("opus".into()),
            pix_fmt: "yuv444p".into(),
            fps,
        }
    }

    fn value_after<'a>(args: &'a [String], flag: &str) -> &'a str {
        let pos = args.iter().position(|a| a == flag).unwrap();
        &args[pos + 1]
    }

    #[test]
    fn builds_live_stream_args() {
        let plan = StreamPlan::new(
            "clip.mp4",
            "rtmp://host/s/key",
            &info(25.0),
            &StreamSettings::default(),
        );
        let args = plan.args();
        assert_eq!(value_after(args, "-i"), "clip.mp4");
        assert_eq!(value_after(args, "-stream_loop"), "-1");
        assert_eq!(value_after(args, "-c:v"), "libx264");
        assert_eq!(value_after(args, "-pix_fmt"), "yuv420p");
        assert_eq!(value_after(args, "-tune"), "zerolatency");
        assert_eq!(value_after(args, "-maxrate"), "1200k");
        assert_eq!(value_after(args, "-bufsize"), "2400k");
        assert_eq!(value_after(args, "-r"), "25");
        assert_eq!(value_after(args, "-g"), "50");
        assert_eq!(value_after(args, "-f"), "flv");
        assert_eq!(args.last().unwrap(), "rtmp://host/s/key");
        // input options must precede -i
        let input_pos = args.iter().position(|a| a == "-i").unwrap();
        assert!(args.iter().position(|a| a == "-stream_loop").unwrap() < input_pos);
    }

    #[test]
    fn fractional_and_unknown_frame_rates() {
        let settings = StreamSettings::default();
        let plan = StreamPlan::new("a.mp4", "rtmp://h/k", &info(29.97), &settings);
        assert_eq!(value_after(plan.args(), "-r"), "29.970");
        assert_eq!(value_after(plan.args(), "-g"), "60");

        let plan = StreamPlan::new("a.mp4", "rtmp://h/k", &info(0.0), &settings);
        assert_eq!(value_after(plan.args(), "-r"), "30");
    }

    #[test]
    fn no_loop_when_disabled() {
        let settings = StreamSettings {
            loop_input: false,
            ..Default::default()
        };
        let plan = StreamPlan::new("a.mp4", "rtmp://h/k", &info(30.0), &settings);
        assert!(!plan.args().iter().any(|a| a == "-stream_loop"));
    }

    #[test]
    fn stream_key_is_redacted() {
        assert_eq!(
            redact("rtmps://dc1-1.rtmp.t.me/s/123:secret"),
            "rtmps://dc1-1.rtmp.t.me/***"
        );
        assert_eq!(redact("opaque"), "***");
        let plan = StreamPlan::new(
            "a.mp4",
            "rtmp://h/s/secret",
            &info(30.0),
            &StreamSettings::default(),
        );
        assert!(!plan.redacted_args().contains("secret"));
    }
}
