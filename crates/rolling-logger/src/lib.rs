//! Rolling Logger
//!
//! A size-rotated log file plus an in-memory ring of the most recent lines.
//! `init_logger` installs it as the global `tracing` subscriber; records from
//! the `log` facade are bridged in as well.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Rotate once the active file grows past this many bytes
pub const DEFAULT_MAX_BYTES: u64 = 2 * 1024 * 1024;
/// Number of recent lines kept in memory
pub const DEFAULT_CAPACITY: usize = 500;

static LOGGER: OnceLock<Arc<RollingFile>> = OnceLock::new();

/// Log file with single-generation rotation and a ring buffer of lines
pub struct RollingFile {
    path: PathBuf,
    max_bytes: u64,
    capacity: usize,
    state: Mutex<FileState>,
}

struct FileState {
    file: File,
    written: u64,
    ring: VecDeque<String>,
    partial: String,
}

impl RollingFile {
    pub fn open(path: PathBuf, max_bytes: u64, capacity: usize) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata().map(|m| m.len()).unwrap_or(0);
        Ok(Self {
            path,
            max_bytes,
            capacity,
            state: Mutex::new(FileState {
                file,
                written,
                ring: VecDeque::with_capacity(capacity),
                partial: String::new(),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the previous generation
    pub fn rotated_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".1");
        PathBuf::from(name)
    }

    pub fn append(&self, buf: &[u8]) -> io::Result<()> {
        let mut state = self.lock();

        if state.written > 0 && state.written + buf.len() as u64 > self.max_bytes {
            self.rotate(&mut state)?;
        }
        state.file.write_all(buf)?;
        state.written += buf.len() as u64;

        let text = String::from_utf8_lossy(buf);
        state.partial.push_str(&text);
        while let Some(pos) = state.partial.find('\n') {
            let line: String = state.partial.drain(..=pos).collect();
            let line = line.trim_end_matches(&['\r', '\n'][..]).to_string();
            if state.ring.len() == self.capacity {
                state.ring.pop_front();
            }
            if self.capacity > 0 {
                state.ring.push_back(line);
            }
        }
        Ok(())
    }

    pub fn flush(&self) -> io::Result<()> {
        self.lock().file.flush()
    }

    /// Most recent complete lines, oldest first
    pub fn recent_lines(&self) -> Vec<String> {
        self.lock().ring.iter().cloned().collect()
    }

    fn rotate(&self, state: &mut FileState) -> io::Result<()> {
        state.file.flush()?;
        let rotated = self.rotated_path();
        if rotated.exists() {
            fs::remove_file(&rotated)?;
        }
        fs::rename(&self.path, &rotated)?;
        state.file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        state.written = 0;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, FileState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// `MakeWriter` adapter handing out handles to a shared `RollingFile`
#[derive(Clone)]
pub struct RollingWriter(Arc<RollingFile>);

impl RollingWriter {
    pub fn new(file: Arc<RollingFile>) -> Self {
        Self(file)
    }
}

impl<'a> MakeWriter<'a> for RollingWriter {
    type Writer = RollingHandle;

    fn make_writer(&'a self) -> Self::Writer {
        RollingHandle(self.0.clone())
    }
}

pub struct RollingHandle(Arc<RollingFile>);

impl Write for RollingHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.append(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

/// Local wall-clock timestamps
struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Initialize the global logger writing to `{log_dir}/{app_name}.log`
///
/// Level filtering honours `RUST_LOG`, defaulting to `info`.
pub fn init_logger(log_dir: PathBuf, app_name: &str) -> Result<(), String> {
    fs::create_dir_all(&log_dir)
        .map_err(|e| format!("Failed to create log dir {}: {}", log_dir.display(), e))?;

    let path = log_dir.join(format!("{}.log", app_name));
    let file = Arc::new(
        RollingFile::open(path, DEFAULT_MAX_BYTES, DEFAULT_CAPACITY)
            .map_err(|e| format!("Failed to open log file: {}", e))?,
    );

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_timer(LocalTime)
        .with_writer(RollingWriter::new(file.clone()))
        .try_init()
        .map_err(|e| format!("Failed to install subscriber: {}", e))?;

    LOGGER
        .set(file)
        .map_err(|_| "Logger already initialized".to_string())?;

    log::info!("{} logging to {}", app_name, log_dir.display());
    Ok(())
}

fn ensure_initialized() -> Result<(), String> {
    if LOGGER.get().is_none() {
        return Err("Logger not initialized".to_string());
    }
    Ok(())
}

pub fn info(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    log::info!("{}", msg);
    Ok(())
}

pub fn warn(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    log::warn!("{}", msg);
    Ok(())
}

pub fn error(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    log::error!("{}", msg);
    Ok(())
}

/// Recent lines from the global logger (empty before `init_logger`)
pub fn recent_lines() -> Vec<String> {
    LOGGER.get().map(|f| f.recent_lines()).unwrap_or_default()
}
