//! Stage configuration.
//!
//! Defaults work for a scene view served from the current directory. Every field can
//! be overridden from the environment with [`StageConfig::from_env`]:
//!
//! | variable                    | field               |
//! |-----------------------------|---------------------|
//! | `STAGECRAFT_ASSET_ROOT`     | `asset_root`        |
//! | `STAGECRAFT_BOX_SENTINEL`   | `box_sentinel`      |
//! | `STAGECRAFT_PROGRESS`       | `progress_formula` (`floor` or `legacy`) |
//! | `STAGECRAFT_READ_CHUNK`     | `read_chunk_size`   |
//! | `STAGECRAFT_LOADER_THREADS` | `loader_threads`    |

use std::{
    env,
    path::{Path, PathBuf},
};

use crate::{
    assets::progress::ProgressFormula,
    error::{Result, StageError},
};

#[derive(Debug, Clone, PartialEq)]
pub struct StageConfig {
    /// Directory that resource keys (`/data/...`) are looked up under
    pub asset_root: PathBuf,
    /// Model reference meaning "draw a primitive box"; never loaded
    pub box_sentinel: String,
    pub progress_formula: ProgressFormula,
    /// Bytes read between progress reports
    pub read_chunk_size: usize,
    /// Worker threads of the file loader
    pub loader_threads: usize,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("."),
            box_sentinel: "box".to_owned(),
            progress_formula: ProgressFormula::Floor,
            read_chunk_size: 64 * 1024,
            loader_threads: 2,
        }
    }
}

impl StageConfig {
    /// Defaults overridden by any `STAGECRAFT_*` variables that are set
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(root) = lookup("STAGECRAFT_ASSET_ROOT") {
            config.asset_root = PathBuf::from(root);
        }
        if let Some(sentinel) = lookup("STAGECRAFT_BOX_SENTINEL") {
            config.box_sentinel = sentinel;
        }
        if let Some(formula) = lookup("STAGECRAFT_PROGRESS") {
            config.progress_formula = match formula.trim().to_ascii_lowercase().as_str() {
                "floor" => ProgressFormula::Floor,
                "legacy" => ProgressFormula::Legacy,
                other => {
                    return Err(StageError::config(
                        "STAGECRAFT_PROGRESS",
                        format!("expected `floor` or `legacy`, got `{other}`"),
                    ))
                }
            };
        }
        if let Some(chunk) = lookup("STAGECRAFT_READ_CHUNK") {
            config.read_chunk_size = parse_positive("STAGECRAFT_READ_CHUNK", &chunk)?;
        }
        if let Some(threads) = lookup("STAGECRAFT_LOADER_THREADS") {
            config.loader_threads = parse_positive("STAGECRAFT_LOADER_THREADS", &threads)?;
        }

        Ok(config)
    }

    pub fn with_asset_root(mut self, root: impl AsRef<Path>) -> Self {
        self.asset_root = root.as_ref().to_path_buf();
        self
    }

    pub fn with_box_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.box_sentinel = sentinel.into();
        self
    }

    pub fn with_progress_formula(mut self, formula: ProgressFormula) -> Self {
        self.progress_formula = formula;
        self
    }

    pub fn with_read_chunk_size(mut self, bytes: usize) -> Self {
        self.read_chunk_size = bytes;
        self
    }

    pub fn with_loader_threads(mut self, threads: usize) -> Self {
        self.loader_threads = threads;
        self
    }
}

fn parse_positive(var: &'static str, value: &str) -> Result<usize> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err(StageError::config(var, "must be greater than zero")),
        Ok(n) => Ok(n),
        Err(e) => Err(StageError::config(var, e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = StageConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StageConfig::default());
        assert_eq!(config.box_sentinel, "box");
        assert_eq!(config.progress_formula, ProgressFormula::Floor);
    }

    #[test]
    fn test_environment_overrides() {
        let config = StageConfig::from_lookup(lookup(&[
            ("STAGECRAFT_ASSET_ROOT", "/srv/stage"),
            ("STAGECRAFT_BOX_SENTINEL", "cube"),
            ("STAGECRAFT_PROGRESS", "Legacy"),
            ("STAGECRAFT_READ_CHUNK", "4096"),
            ("STAGECRAFT_LOADER_THREADS", "8"),
        ]))
        .unwrap();

        assert_eq!(config.asset_root, PathBuf::from("/srv/stage"));
        assert_eq!(config.box_sentinel, "cube");
        assert_eq!(config.progress_formula, ProgressFormula::Legacy);
        assert_eq!(config.read_chunk_size, 4096);
        assert_eq!(config.loader_threads, 8);
    }

    #[test]
    fn test_bad_values_are_rejected() {
        let err = StageConfig::from_lookup(lookup(&[("STAGECRAFT_PROGRESS", "round")])).unwrap_err();
        assert!(matches!(err, StageError::Config { var: "STAGECRAFT_PROGRESS", .. }));

        let err = StageConfig::from_lookup(lookup(&[("STAGECRAFT_LOADER_THREADS", "0")])).unwrap_err();
        assert!(matches!(err, StageError::Config { var: "STAGECRAFT_LOADER_THREADS", .. }));

        let err = StageConfig::from_lookup(lookup(&[("STAGECRAFT_READ_CHUNK", "lots")])).unwrap_err();
        assert!(matches!(err, StageError::Config { var: "STAGECRAFT_READ_CHUNK", .. }));
    }
}
