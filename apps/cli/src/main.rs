use std::{path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use indicatif::MultiProgress;
use tracing::Level;

use bilitv_core::{FfmpegMerger, Pipeline, QualityTier, Session, format_duration};

use crate::reporter::{ConsoleReporter, LogWriter};

mod reporter;

#[derive(Parser)]
#[command(name = "bilitv")]
#[command(about = "Download bilibili.tv videos and merge their audio and video streams")]
struct Cli {
    /// Video or episode link, e.g. https://www.bilibili.tv/en/video/4780916840315904
    link: String,

    /// Directory for the merged file and temporary downloads
    #[arg(short, long, default_value = "Downloads")]
    output_dir: PathBuf,

    /// Cookies file with one name=value pair per line
    #[arg(short, long, default_value = "cookies.txt")]
    cookies: PathBuf,

    /// Accepted video quality codes (e.g. "112,80"). Defaults to 112,80,64,32.
    #[arg(short, long, value_delimiter = ',')]
    quality: Vec<u32>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn log_level(verbose: bool) -> Level {
    if verbose { Level::DEBUG } else { Level::WARN }
}

fn init_tracing(verbose: bool, progress: &MultiProgress) {
    let writer = LogWriter::new(progress.clone());
    tracing_subscriber::fmt()
        .with_max_level(log_level(verbose))
        .with_writer(move || writer.clone())
        .with_target(false)
        .init();
}

async fn run(cli: Cli, progress: MultiProgress) -> Result<()> {
    println!(
        "\n{}  {}\n",
        style("bilitv").cyan().bold(),
        style("bilibili.tv downloader").dim()
    );

    let session = Session::from_cookie_file(&cli.cookies)
        .await
        .with_context(|| format!("failed to read cookies from {}", cli.cookies.display()))?;

    let qualities = if cli.quality.is_empty() {
        QualityTier::default()
    } else {
        QualityTier::new(cli.quality)
    };

    let pipeline =
        Pipeline::from_session(session, FfmpegMerger::default())?.with_qualities(qualities);

    let reporter = ConsoleReporter::new(progress);
    let total_start = Instant::now();

    match pipeline.run(&cli.link, &cli.output_dir, &reporter).await {
        Ok(output) => {
            reporter.finish();
            println!(
                "\n{} {} {}\n",
                style("Download complete:").dim(),
                style(output.display()).cyan(),
                style(format!("[{}]", format_duration(total_start.elapsed()))).dim()
            );
            Ok(())
        }
        Err(e) => {
            reporter.fail();
            Err(e.into())
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let progress = MultiProgress::new();
    init_tracing(cli.verbose, &progress);

    if let Err(e) = run(cli, progress).await {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["bilitv", "https://www.bilibili.tv/en/play/12345/67890"]);
        assert_eq!(cli.output_dir, PathBuf::from("Downloads"));
        assert_eq!(cli.cookies, PathBuf::from("cookies.txt"));
        assert!(cli.quality.is_empty());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_log_level() {
        assert_eq!(log_level(false), Level::WARN);
        assert_eq!(log_level(true), Level::DEBUG);
    }

    #[test]
    fn test_quality_list() {
        let cli = Cli::parse_from([
            "bilitv",
            "https://www.bilibili.tv/en/video/4780916840315904",
            "-q",
            "112,80",
            "-o",
            "out",
        ]);
        assert_eq!(cli.quality, [112, 80]);
        assert_eq!(cli.output_dir, PathBuf::from("out"));
    }
}
