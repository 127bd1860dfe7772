use crate::{ConfigError, Result, SetKey, StationConfig};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{info, warn};

struct Inner {
    config: StationConfig,
    version: u64,
}

/// Owner of the shared configuration.
///
/// All mutations (HMI SET/SAVE, dashboard edits) are serialized through the
/// write lock; readers clone a snapshot per cycle and never observe a
/// partial write. The version counter bumps on every mutation so consumers
/// can notice changes without comparing snapshots.
pub struct ConfigStore {
    path: PathBuf,
    inner: RwLock<Inner>,
}

impl ConfigStore {
    /// Load the configuration from `path`, writing defaults if it is absent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let config = if path.exists() {
            read_config(&path)?
        } else {
            info!("no configuration file at {}, writing defaults", path.display());
            let config = StationConfig::default();
            write_config(&path, &config)?;
            config
        };
        Ok(Self {
            path,
            inner: RwLock::new(Inner { config, version: 1 }),
        })
    }

    pub fn snapshot(&self) -> StationConfig {
        self.read().config.clone()
    }

    pub fn version(&self) -> u64 {
        self.read().version
    }

    /// Persist the current in-memory configuration.
    pub fn save(&self) -> Result<()> {
        // Write lock so a save never interleaves with a mutation
        let inner = self.write();
        write_config(&self.path, &inner.config)
    }

    /// Re-read the file, discarding unsaved in-memory changes.
    pub fn reload(&self) -> Result<()> {
        let config = read_config(&self.path)?;
        let mut inner = self.write();
        inner.config = config;
        inner.version += 1;
        Ok(())
    }

    /// Replace the whole configuration (dashboard collaborator path).
    pub fn replace(&self, config: StationConfig) -> Result<()> {
        config.validate().map_err(ConfigError::Invalid)?;
        let mut inner = self.write();
        inner.config = config;
        inner.version += 1;
        Ok(())
    }

    /// Apply one `SET` field write, in millimetres. In-memory only.
    pub fn apply_set(&self, key: SetKey, value_mm: f64) -> Result<()> {
        if !value_mm.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "{key:?}: value must be finite"
            )));
        }
        if key.requires_non_negative() && value_mm < 0.0 {
            warn!("rejecting negative value {} for {:?}", value_mm, key);
            return Err(ConfigError::Invalid(format!("{key:?}: must be >= 0")));
        }
        let mut inner = self.write();
        let t = &mut inner.config.targets;
        match key {
            SetKey::D1Target => t.d1_target = value_mm,
            SetKey::D1Tol => t.d1_tol = value_mm,
            SetKey::D2Target => t.d2_target = value_mm,
            SetKey::D2Tol => t.d2_tol = value_mm,
            SetKey::LenTarget => t.len_target = value_mm,
            SetKey::LenTol => t.len_tol = value_mm,
            SetKey::DDeltaMax => t.ddelta_max = value_mm,
            SetKey::End1Max => t.end1_max = value_mm,
            SetKey::End2Max => t.end2_max = value_mm,
            SetKey::Offset(idx) => {
                if idx >= inner.config.offsets_mm.0.len() {
                    return Err(ConfigError::Invalid(format!("offset index {idx}")));
                }
                inner.config.offsets_mm.0[idx] = value_mm;
            }
        }
        inner.version += 1;
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn read_config(path: &Path) -> Result<StationConfig> {
    let raw = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
    let config: StationConfig =
        serde_json::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
    config.validate().map_err(ConfigError::Invalid)?;
    Ok(config)
}

/// Write to a sibling temp file and rename so a concurrent load never sees
/// a partial file.
fn write_config(path: &Path, config: &StationConfig) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
    }
    let json = serde_json::to_string_pretty(config).map_err(|e| ConfigError::Parse(e.to_string()))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|e| ConfigError::Io(e.to_string()))?;
    fs::rename(&tmp, path).map_err(|e| ConfigError::Io(e.to_string()))?;
    Ok(())
}
