//! The log sink handed to the decision cycle.
//!
//! A [`LogSink`] owns a `tracing` [`Dispatch`] built once at start-up. The
//! decision cycle runs inside [`LogSink::in_scope`], so nothing is installed
//! as the process-global subscriber.
//!
//! File output goes through [`RotatingFileWriter`], an append-only writer that
//! rolls the active file over once it reaches a size threshold. Rotated files
//! older than the retention window are removed when the sink is opened.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

use chrono::Local;
use tracing::{Dispatch, Event, Subscriber};
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::fmt::{FmtContext, FormattedFields, MakeWriter};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{Layer, Registry};

use crate::HookError;

/// Default rotation threshold: 10 MiB.
pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Default retention window for rotated files, in days.
pub const DEFAULT_RETENTION_DAYS: u32 = 30;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// `chrono` format of the stamp embedded in rotated file names.
const ROTATION_STAMP: &str = "%Y%m%d-%H%M%S";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Line encoding of the log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// `YYYY-MM-DD HH:MM:SS | LEVEL    | message`
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Where and how the file sink writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub dir: PathBuf,
    pub file_name: String,
    pub max_bytes: u64,
    pub retention_days: u32,
    /// `EnvFilter` directive for the file layer, e.g. `info` or `triage=debug`.
    pub level: String,
    pub format: LogFormat,
}

impl LogSettings {
    /// Settings with default rotation, retention, level and format.
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file_name: file_name.into(),
            max_bytes: DEFAULT_MAX_BYTES,
            retention_days: DEFAULT_RETENTION_DAYS,
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }

    /// Full path of the active log file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    fn retention(&self) -> Duration {
        Duration::from_secs(u64::from(self.retention_days) * SECONDS_PER_DAY)
    }
}

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

/// Log capability passed into the decision cycle.
pub struct LogSink {
    dispatch: Dispatch,
    file: Option<RotatingFileWriter>,
}

impl LogSink {
    /// Opens the file sink described by `settings`, plus an ERROR-level
    /// stderr layer.
    ///
    /// Creates the directory if needed and prunes expired rotated files.
    pub fn open(settings: &LogSettings) -> Result<Self, HookError> {
        fs::create_dir_all(&settings.dir).map_err(|source| HookError::LogSink {
            path: settings.dir.clone(),
            source,
        })?;

        let path = settings.path();
        let writer = RotatingFileWriter::open(&path, settings.max_bytes)
            .map_err(|source| HookError::LogSink {
                path: path.clone(),
                source,
            })?;
        let pruned = prune_rotated(&path, settings.retention(), SystemTime::now());

        let filter = EnvFilter::try_new(&settings.level).unwrap_or_else(|_| EnvFilter::new("info"));
        let file_layer = match settings.format {
            LogFormat::Text => tracing_subscriber::fmt::layer()
                .event_format(LineFormat)
                .with_writer(writer.clone())
                .with_ansi(false)
                .with_filter(filter)
                .boxed(),
            LogFormat::Json => tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer.clone())
                .with_filter(filter)
                .boxed(),
        };

        let sink = Self {
            dispatch: Dispatch::new(Registry::default().with(vec![file_layer, stderr_layer()])),
            file: Some(writer),
        };
        sink.in_scope(|| match pruned {
            Ok(report) => {
                if report.removed > 0 {
                    tracing::debug!(pruned = report.removed, "Removed expired rotated log files");
                }
                for (path, error) in &report.failures {
                    tracing::warn!(
                        path = %path.display(),
                        %error,
                        "Could not prune rotated log file"
                    );
                }
            }
            Err(error) => tracing::warn!(
                dir = %settings.dir.display(),
                %error,
                "Could not scan log directory for expired files"
            ),
        });
        Ok(sink)
    }

    /// A sink that only reports errors on stderr.
    ///
    /// Used when the file sink cannot be opened; the hook still runs.
    pub fn stderr_only() -> Self {
        Self {
            dispatch: Dispatch::new(Registry::default().with(stderr_layer())),
            file: None,
        }
    }

    /// A sink that records text-format lines in memory at `debug` level.
    pub fn capturing() -> (Self, CaptureBuffer) {
        let buffer = CaptureBuffer::default();
        let layer = tracing_subscriber::fmt::layer()
            .event_format(LineFormat)
            .with_writer(buffer.clone())
            .with_ansi(false)
            .with_filter(LevelFilter::DEBUG);
        let sink = Self {
            dispatch: Dispatch::new(Registry::default().with(layer)),
            file: None,
        };
        (sink, buffer)
    }

    /// Runs `f` with this sink as the current `tracing` dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Flushes the log file to disk, if there is one.
    pub fn flush(&self) -> io::Result<()> {
        match &self.file {
            Some(writer) => writer.sync(),
            None => Ok(()),
        }
    }
}

impl Drop for LogSink {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

fn stderr_layer() -> Box<dyn Layer<Registry> + Send + Sync> {
    tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_filter(LevelFilter::ERROR)
        .boxed()
}

// ---------------------------------------------------------------------------
// Line format
// ---------------------------------------------------------------------------

/// Formats events as `YYYY-MM-DD HH:MM:SS | LEVEL    | message fields {span}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let level = event.metadata().level().to_string();
        write!(
            writer,
            "{} | {:<8} | ",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            level
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                let extensions = span.extensions();
                if let Some(fields) = extensions.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, " {{{fields}}}")?;
                    }
                }
            }
        }
        writeln!(writer)
    }
}

// ---------------------------------------------------------------------------
// Rotating file writer
// ---------------------------------------------------------------------------

struct RotatingState {
    path: PathBuf,
    file: File,
    written: u64,
    max_bytes: u64,
}

impl RotatingState {
    fn rotate(&mut self) -> io::Result<()> {
        let stamp = Local::now().format(ROTATION_STAMP).to_string();
        let target = unused_rotated_path(&self.path, &stamp);
        fs::rename(&self.path, &target)?;
        self.file = open_append(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

/// Append-only file writer that rotates once the file reaches `max_bytes`.
///
/// The rotated file is renamed to `<stem>.<YYYYmmdd-HHMMSS>.<ext>` next to the
/// active file, with a `-N` counter on the stamp when that name is taken.
/// Clones share the same file handle.
#[derive(Clone)]
pub struct RotatingFileWriter {
    state: Arc<Mutex<RotatingState>>,
}

impl RotatingFileWriter {
    /// Opens (or creates) `path` for appending.
    ///
    /// An existing file already at or over the threshold is rotated first.
    pub fn open(path: impl AsRef<Path>, max_bytes: u64) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = open_append(&path)?;
        let written = file.metadata()?.len();
        let mut state = RotatingState {
            path,
            file,
            written,
            max_bytes,
        };
        if state.written >= state.max_bytes {
            state.rotate()?;
        }
        Ok(Self {
            state: Arc::new(Mutex::new(state)),
        })
    }

    fn lock(&self) -> MutexGuard<'_, RotatingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Syncs the active file to disk.
    pub fn sync(&self) -> io::Result<()> {
        self.lock().file.sync_data()
    }
}

impl<'a> MakeWriter<'a> for RotatingFileWriter {
    type Writer = RotatingGuard<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        RotatingGuard { state: self.lock() }
    }
}

/// Exclusive handle to the rotating file for the duration of one event.
pub struct RotatingGuard<'a> {
    state: MutexGuard<'a, RotatingState>,
}

impl Write for RotatingGuard<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let state = &mut *self.state;
        if state.written > 0 && state.written + buf.len() as u64 > state.max_bytes {
            state.rotate()?;
        }
        let n = state.file.write(buf)?;
        state.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.state.file.flush()
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn split_name(path: &Path) -> (String, String) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "log".to_string());
    (stem, ext)
}

/// `<dir>/<stem>.<stamp>.<ext>` for an active file at `<dir>/<stem>.<ext>`.
pub fn rotated_path(active: &Path, stamp: &str) -> PathBuf {
    let (stem, ext) = split_name(active);
    active.with_file_name(format!("{stem}.{stamp}.{ext}"))
}

/// Like [`rotated_path`], but appends `-1`, `-2`, ... to the stamp until no
/// file of that name exists.
pub fn unused_rotated_path(active: &Path, stamp: &str) -> PathBuf {
    let mut candidate = rotated_path(active, stamp);
    let mut counter = 1u32;
    while candidate.exists() {
        candidate = rotated_path(active, &format!("{stamp}-{counter}"));
        counter += 1;
    }
    candidate
}

/// Result of one retention pass over the log directory.
#[derive(Debug, Default)]
pub struct PruneReport {
    /// Rotated files deleted.
    pub removed: usize,
    /// Entries that could not be inspected or deleted. They are skipped.
    pub failures: Vec<(PathBuf, io::Error)>,
}

/// Removes rotated siblings of `active` last modified more than `retention`
/// before `now`.
///
/// Only a failure to list the directory is returned as an error. A failing
/// entry is recorded in the report and the pass moves on.
pub fn prune_rotated(
    active: &Path,
    retention: Duration,
    now: SystemTime,
) -> io::Result<PruneReport> {
    let mut report = PruneReport::default();
    let Some(dir) = active.parent() else {
        return Ok(report);
    };
    let (stem, ext) = split_name(active);
    let prefix = format!("{stem}.");
    let suffix = format!(".{ext}");

    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                report.failures.push((dir.to_path_buf(), error));
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_rotated = name.len() > prefix.len() + suffix.len()
            && name.starts_with(&prefix)
            && name.ends_with(&suffix);
        if !is_rotated {
            continue;
        }
        let path = entry.path();
        match prune_entry(&path, retention, now) {
            Ok(true) => report.removed += 1,
            Ok(false) => {}
            Err(error) => report.failures.push((path, error)),
        }
    }
    Ok(report)
}

/// Deletes `path` if it is a regular file older than `retention`.
fn prune_entry(path: &Path, retention: Duration, now: SystemTime) -> io::Result<bool> {
    let metadata = fs::metadata(path)?;
    if !metadata.is_file() {
        return Ok(false);
    }
    let expired = now
        .duration_since(metadata.modified()?)
        .map(|age| age > retention)
        .unwrap_or(false);
    if expired {
        fs::remove_file(path)?;
    }
    Ok(expired)
}

// ---------------------------------------------------------------------------
// In-memory capture
// ---------------------------------------------------------------------------

/// Shared in-memory buffer filled by [`LogSink::capturing`].
#[derive(Clone, Default)]
pub struct CaptureBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer {
    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        let bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CaptureBuffer {
    type Writer = CaptureBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
