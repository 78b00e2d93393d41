//! Tracing subscriber setup: console formatter and persistent log file.
use std::fs;
use std::io::Write as _;
use std::sync::Mutex;

use tracing::field::{Field, Visit};

use super::types::Channel;
use super::utils::{log_file_path, strip_ansi, utc_now};

/// Pulls the `message` field out of an event.
#[derive(Default)]
struct Message(String);

impl Visit for Message {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.0 = value.to_string();
        }
    }
}

/// Channel and message text of `event`.
fn decode(event: &tracing::Event<'_>) -> (Channel, String) {
    let metadata = event.metadata();
    let mut message = Message::default();
    event.record(&mut message);
    (
        Channel::classify(*metadata.level(), metadata.target()),
        message.0,
    )
}

/// Appends every event to `<cache>/dotfiles/<command>.log`, timestamped and
/// without colour codes.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Truncate the log file for `command` and write a run header.
    ///
    /// Returns `None` if the file cannot be created.
    pub(super) fn new(command: &str) -> Option<Self> {
        let path = log_file_path(command)?;
        let version = crate::commands::version();
        let header = format!(
            "# dotfiles-windows {version} {command} on {} at {} UTC\n",
            std::env::consts::OS,
            utc_now("%Y-%m-%d %H:%M:%S"),
        );
        fs::write(&path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(&path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let (channel, msg) = decode(event);
        let line = format!(
            "[{}] {}{}",
            utc_now("%H:%M:%S"),
            channel.file_tag(),
            strip_ansi(&msg)
        );
        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "{line}").ok();
        }
    }
}

/// Console rendering of the plugin's channels.
struct ConsoleFormat;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormat
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let (channel, msg) = decode(event);
        match channel {
            Channel::Stage => writeln!(writer, "\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
            Channel::Info => writeln!(writer, "  {msg}"),
            Channel::AlreadyOk | Channel::Debug => writeln!(writer, "  \x1b[2m{msg}\x1b[0m"),
            Channel::Warn => writeln!(writer, "\x1b[33mWARN\x1b[0m  {msg}"),
            Channel::Error => writeln!(writer, "\x1b[31mERROR\x1b[0m {msg}"),
            Channel::DryRun => writeln!(writer, "  \x1b[33m[DRY RUN]\x1b[0m {msg}"),
        }
    }
}

/// Install the global subscriber.
///
/// Warnings and errors go to stderr, everything else to stdout; debug lines
/// reach the console only with `verbose`. The log file always receives
/// every event. Call once, before anything logs.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let writer = std::io::stderr
        .with_max_level(tracing::Level::WARN)
        .and(std::io::stdout.with_min_level(tracing::Level::INFO));

    let console = fmt::layer()
        .event_format(ConsoleFormat)
        .with_writer(writer)
        .with_filter(console_level);
    let file = FileLayer::new(command).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry().with(console).with(file).init();
}
