use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Re-stream local video files to a live ingest (RTMP/RTMPS) through ffmpeg
#[derive(Debug, Parser)]
pub struct ArgParser {
    /// Path of the ffmpeg binary, looked up in PATH when omitted
    #[clap(long, env = "FFMPEG_BIN")]
    pub ffmpeg: Option<PathBuf>,
    /// Path of the ffprobe binary, looked up in PATH when omitted
    #[clap(long, env = "FFPROBE_BIN")]
    pub ffprobe: Option<PathBuf>,
    /// The sub-command to use
    #[clap(subcommand)]
    pub sub_command: SubCommand,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Subcommand)]
pub enum SubCommand {
    /// stream a video until it ends, fails, or Ctrl-C
    Stream {
        #[clap(long, env = "STREAM_URL")]
        /// ingest base URL, e.g. rtmps://dc1-1.rtmp.t.me/s/
        url: String,

        #[clap(long, env = "STREAM_KEY", hide_env_values = true)]
        /// secret stream key appended to the URL
        key: String,

        #[clap(long)]
        /// stream (and delete) the file itself instead of a temporary copy
        consume: bool,

        #[clap(long)]
        /// play the file once instead of looping it
        once: bool,

        /// video file to stream
        video: PathBuf,
    },
    /// print the media properties of a video
    Probe {
        /// video file to probe
        video: PathBuf,
    },
}
