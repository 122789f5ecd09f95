use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::error::{KeystrideError, Result};
use crate::metrics::SpeedSampling;
use crate::passage::{
    segmenter::{DEFAULT_MAX_LENGTH, DEFAULT_MIN_LENGTH},
    Difficulty, SegmentOptions, DEFAULT_PASSAGES_PER_TEST,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub difficulty: Difficulty,
    pub passages_per_test: usize,
    pub max_length: usize,
    pub min_length: usize,
    pub sampling: SpeedSampling,
    /// Corpus file used instead of the embedded passages
    pub corpus_path: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            passages_per_test: DEFAULT_PASSAGES_PER_TEST,
            max_length: DEFAULT_MAX_LENGTH,
            min_length: DEFAULT_MIN_LENGTH,
            sampling: SpeedSampling::default(),
            corpus_path: None,
            report_path: None,
        }
    }
}

/// Values given on the command line; `None` keeps the stored setting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub difficulty: Option<Difficulty>,
    pub passages_per_test: Option<usize>,
    pub max_length: Option<usize>,
    pub min_length: Option<usize>,
    pub sampling: Option<SpeedSampling>,
    pub corpus_path: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
}

impl Config {
    pub fn merged(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(difficulty) = overrides.difficulty {
            self.difficulty = difficulty;
        }
        if let Some(n) = overrides.passages_per_test {
            self.passages_per_test = n;
        }
        if let Some(n) = overrides.max_length {
            self.max_length = n;
        }
        if let Some(n) = overrides.min_length {
            self.min_length = n;
        }
        if let Some(sampling) = overrides.sampling {
            self.sampling = sampling;
        }
        if let Some(path) = &overrides.corpus_path {
            self.corpus_path = Some(path.clone());
        }
        if let Some(path) = &overrides.report_path {
            self.report_path = Some(path.clone());
        }
        self
    }

    pub fn segment_options(&self) -> SegmentOptions {
        SegmentOptions::new(self.max_length, self.min_length)
    }

    /// At least one passage per test
    pub fn passages_per_test(&self) -> usize {
        self.passages_per_test.max(1)
    }

    pub fn report_path(&self) -> PathBuf {
        self.report_path
            .clone()
            .unwrap_or_else(AppDirs::report_path)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// A missing or unreadable file yields the defaults
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        serde_json::from_slice::<Config>(&bytes).unwrap_or_else(|e| {
            warn!("ignoring malformed config {}: {e}", self.path.display());
            Config::default()
        })
    }

    fn save(&self, cfg: &Config) -> Result<()> {
        let write_err = |source| KeystrideError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data).map_err(write_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nested").join("config.json"));
        let cfg = Config {
            difficulty: Difficulty::Hard,
            passages_per_test: 5,
            max_length: 400,
            min_length: 100,
            sampling: SpeedSampling::PerPassage,
            corpus_path: Some(PathBuf::from("/tmp/corpus.json")),
            report_path: Some(PathBuf::from("/tmp/report.json")),
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn missing_or_malformed_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());

        fs::write(&path, "not json").unwrap();
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"difficulty": "easy", "sampling": "per-passage"}"#).unwrap();

        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.difficulty, Difficulty::Easy);
        assert_eq!(cfg.sampling, SpeedSampling::PerPassage);
        assert_eq!(cfg.passages_per_test, DEFAULT_PASSAGES_PER_TEST);
        assert_eq!(cfg.max_length, DEFAULT_MAX_LENGTH);
    }

    #[test]
    fn overrides_replace_only_given_values() {
        let overrides = ConfigOverrides {
            difficulty: Some(Difficulty::Hard),
            passages_per_test: Some(0),
            ..ConfigOverrides::default()
        };
        let cfg = Config::default().merged(&overrides);

        assert_eq!(cfg.difficulty, Difficulty::Hard);
        assert_eq!(cfg.passages_per_test(), 1);
        assert_eq!(cfg.sampling, SpeedSampling::PerSecond);
        assert_eq!(cfg.corpus_path, None);
    }

    #[test]
    fn length_overrides_reach_segment_options() {
        let overrides = ConfigOverrides {
            max_length: Some(400),
            ..ConfigOverrides::default()
        };
        let options = Config::default().merged(&overrides).segment_options();

        assert_eq!(options.max_length, 400);
        assert_eq!(options.min_length, DEFAULT_MIN_LENGTH);
    }

    #[test]
    fn explicit_report_path_wins() {
        let cfg = Config {
            report_path: Some(PathBuf::from("out.json")),
            ..Config::default()
        };
        assert_eq!(cfg.report_path(), PathBuf::from("out.json"));
        assert!(Config::default().report_path().ends_with("error_analysis.json"));
    }
}
