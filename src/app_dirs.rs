use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "keystride";
const REPORT_FILE: &str = "error_analysis.json";
const LOG_FILE: &str = "keystride.log";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }

    /// `~/.local/state/keystride` when `HOME` is set, the platform data dir otherwise
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join(APP_NAME),
            )
        } else {
            Self::project().map(|pd| pd.data_local_dir().to_path_buf())
        }
    }

    pub fn config_path() -> PathBuf {
        Self::project()
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("keystride_config.json"))
    }

    /// Default location of the end-of-test error report
    pub fn report_path() -> PathBuf {
        Self::state_dir()
            .map(|dir| dir.join(REPORT_FILE))
            .unwrap_or_else(|| PathBuf::from(REPORT_FILE))
    }

    pub fn log_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join(LOG_FILE))
    }
}
