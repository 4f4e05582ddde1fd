mod arg_parser;
mod console;
mod stream_cli;

use arg_parser::{ArgParser, SubCommand};
use stream_cli::StreamCli;

use clap::Parser;
use std::error;
use streamjob::{FfmpegTranscoder, SupervisorConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn error::Error>> {
    init_tracing();
    let args = ArgParser::parse();
    let transcoder = FfmpegTranscoder::with_binaries(args.ffmpeg, args.ffprobe);

    match args.sub_command {
        SubCommand::Stream {
            url,
            key,
            consume,
            once,
            video,
        } => {
            let mut config = SupervisorConfig::from_env();
            config.settings.loop_input = !once;
            let cli = StreamCli::new(transcoder, config);
            if !cli.stream(&video, &url, &key, consume).await? {
                std::process::exit(1);
            }
        }
        SubCommand::Probe { video } => {
            let cli = StreamCli::new(transcoder, SupervisorConfig::default());
            cli.probe(&video).await?;
        }
    }

    Ok(())
}

/// Logs go to stderr, status lines to stdout. `LOG_FORMAT=json` switches to JSON logs.
fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("streamjob=info,streamctl=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .with(env_filter)
            .init();
    }
}
