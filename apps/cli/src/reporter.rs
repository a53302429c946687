use std::{
    io::{self, Write},
    sync::Mutex,
    time::{Duration, Instant},
};

use bilitv_core::{Reporter, Stage, format_duration};
use console::style;
use indicatif::{HumanBytes, MultiProgress, ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str =
    "{spinner:.green} {msg} [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";
const UNKNOWN_LENGTH_TEMPLATE: &str = "{spinner:.green} {msg} {bytes} ({bytes_per_sec})";

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .expect("spinner template is valid"),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn plain_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{msg}")
        .expect("plain template is valid")
}

fn done_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Resolving => "Stream URLs fetched",
        Stage::DownloadingVideo => "Video downloaded",
        Stage::DownloadingAudio => "Audio downloaded",
        Stage::Merging => "Video and audio merged",
    }
}

struct Step {
    stage: Stage,
    bar: ProgressBar,
    started: Instant,
    bytes: u64,
}

/// Writes log lines to stderr with any live progress bar cleared first.
#[derive(Clone)]
pub struct LogWriter {
    progress: MultiProgress,
}

impl LogWriter {
    pub fn new(progress: MultiProgress) -> Self {
        Self { progress }
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.progress.suspend(|| io::stderr().write_all(buf))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

/// Spinner per stage, byte progress bar while a transfer runs.
pub struct ConsoleReporter {
    progress: MultiProgress,
    current: Mutex<Option<Step>>,
}

impl ConsoleReporter {
    pub fn new(progress: MultiProgress) -> Self {
        Self {
            progress,
            current: Mutex::new(None),
        }
    }

    /// Close out the step in progress with a check mark.
    pub fn finish(&self) {
        let Some(step) = self.take_step() else {
            return;
        };
        let detail = if step.bytes > 0 {
            format!(
                "{}, {}",
                HumanBytes(step.bytes),
                format_duration(step.started.elapsed())
            )
        } else {
            format_duration(step.started.elapsed())
        };
        step.bar.set_style(plain_style());
        step.bar.finish_with_message(format!(
            "{} {} {}",
            style("✓").green().bold(),
            done_label(step.stage),
            style(format!("[{detail}]")).dim()
        ));
    }

    /// Close out the step in progress with a cross, leaving its last message visible.
    pub fn fail(&self) {
        let Some(step) = self.take_step() else {
            return;
        };
        step.bar.set_style(plain_style());
        step.bar.abandon_with_message(format!(
            "{} {}",
            style("✗").red().bold(),
            step.stage.describe()
        ));
    }

    fn take_step(&self) -> Option<Step> {
        self.current.lock().ok()?.take()
    }

    fn with_step(&self, f: impl FnOnce(&mut Step)) {
        if let Ok(mut current) = self.current.lock() {
            if let Some(step) = current.as_mut() {
                f(step);
            }
        }
    }
}

impl Reporter for ConsoleReporter {
    fn stage(&self, stage: Stage) {
        self.finish();
        let step = Step {
            stage,
            bar: self.progress.add(create_spinner(stage.describe())),
            started: Instant::now(),
            bytes: 0,
        };
        if let Ok(mut current) = self.current.lock() {
            *current = Some(step);
        }
    }

    fn transfer_started(&self, total: u64) {
        self.with_step(|step| {
            let template = if total > 0 {
                BAR_TEMPLATE
            } else {
                UNKNOWN_LENGTH_TEMPLATE
            };
            if let Ok(bar_style) = ProgressStyle::with_template(template) {
                step.bar.set_style(bar_style.progress_chars("#>-"));
            }
            step.bar.set_length(total);
            step.bar.set_position(0);
        });
    }

    fn transfer_progress(&self, downloaded: u64) {
        self.with_step(|step| {
            step.bytes = downloaded;
            step.bar.set_position(downloaded);
        });
    }
}
