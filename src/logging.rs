use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use env_logger::{Builder, Env, Target};

use crate::app_dirs::AppDirs;

/// Environment variable holding the log filter, e.g. `KEYSTRIDE_LOG=debug`
pub const LOG_ENV: &str = "KEYSTRIDE_LOG";
const DEFAULT_FILTER: &str = "info";

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Route log records to a file so they never land on the alternate screen.
///
/// Returns the log path, or `None` when no file could be opened, in which
/// case logging stays disabled.
pub fn init() -> Option<PathBuf> {
    let path = AppDirs::log_path()?;
    init_with_path(&path).ok()?;
    Some(path)
}

pub fn init_with_path(path: &Path) -> io::Result<()> {
    let file = open_log_file(path)?;
    Builder::from_env(Env::default().filter_or(LOG_ENV, DEFAULT_FILTER))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .map_err(io::Error::other)
}
