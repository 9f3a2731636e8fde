//! JSON configuration for the whole pipeline.

use gridsight_board::game::GameRules;
use gridsight_board::BoardParams;
use gridsight_core::WorkspaceMapError;
use gridsight_pieces::LoosePieceParams;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum GridsightIoError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration in {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: WorkspaceMapError,
    },
}

/// Every tunable of the board reader, the piece locator and the game rules.
/// Missing keys take their defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridsightConfig {
    pub board: BoardParams,
    pub pieces: LoosePieceParams,
    pub rules: GameRules,
}

impl GridsightConfig {
    /// Load and validate a configuration file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, GridsightIoError> {
        let path = path.as_ref();
        let cfg: Self = read_json(path)?;
        cfg.board
            .workspace
            .validate()
            .map_err(|source| GridsightIoError::Invalid {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(cfg)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), GridsightIoError> {
        write_json(path.as_ref(), self)
    }
}

pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, GridsightIoError> {
    let data = fs::read_to_string(path).map_err(|source| GridsightIoError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| GridsightIoError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), GridsightIoError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| GridsightIoError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| GridsightIoError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridsight_board::DeadZonePolicy;
    use gridsight_core::Cell;

    #[test]
    fn round_trips_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gridsight.json");
        let mut cfg = GridsightConfig::default();
        cfg.board.classify.dead_zone = DeadZonePolicy::Reject;
        cfg.pieces.min_perimeter = 120.0;
        cfg.rules.human = Cell::White;
        cfg.write_json(&path).unwrap();
        assert_eq!(GridsightConfig::load_json(&path).unwrap(), cfg);
    }

    #[test]
    fn empty_object_is_all_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, "{}").unwrap();
        assert_eq!(
            GridsightConfig::load_json(&path).unwrap(),
            GridsightConfig::default()
        );
    }

    #[test]
    fn zero_workspace_scale_is_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flat.json");
        std::fs::write(&path, r#"{ "board": { "workspace": { "scale_x": 0.0 } } }"#).unwrap();
        assert!(matches!(
            GridsightConfig::load_json(&path),
            Err(GridsightIoError::Invalid {
                source: WorkspaceMapError::InvalidScale { .. },
                ..
            })
        ));
    }

    #[test]
    fn reports_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            GridsightConfig::load_json(&missing),
            Err(GridsightIoError::Io { .. })
        ));
        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ board: }").unwrap();
        assert!(matches!(
            GridsightConfig::load_json(&bad),
            Err(GridsightIoError::Json { .. })
        ));
    }
}
