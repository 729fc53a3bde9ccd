//! Trained-model persistence.
//!
//! Models are JSON files named `{symbol}_{interval}_v{schema}.json`. Writes go
//! through a temp file and an atomic rename under a writer lock, so a reader
//! never sees a half-written model.

use dashmap::DashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use super::features::SCHEMA_VERSION;
use super::TrainedModel;
use crate::error::{AppError, Result};

/// Where trained models live.
pub trait ModelStore: Send + Sync {
    /// Persist a model, replacing any previous one for the same key.
    fn save(&self, model: &TrainedModel) -> Result<()>;

    /// Load the model for `symbol`/`interval` trained on the running schema.
    fn load(&self, symbol: &str, interval: &str) -> Result<Arc<TrainedModel>>;
}

/// Filesystem-backed store with an in-memory cache of loaded models.
pub struct FileModelStore {
    dir: PathBuf,
    write_lock: RwLock<()>,
    cache: DashMap<String, Arc<TrainedModel>>,
}

/// Filename-safe `{symbol}_{interval}` prefix.
fn base_key(symbol: &str, interval: &str) -> String {
    format!("{}_{}", symbol, interval)
        .replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|', ' '], "_")
}

fn lock_poisoned() -> AppError {
    AppError::Internal("model store lock poisoned".to_string())
}

impl FileModelStore {
    /// Open (and create if needed) a model directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        debug!("Model store at {}", dir.display());
        Ok(Self {
            dir,
            write_lock: RwLock::new(()),
            cache: DashMap::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, symbol: &str, interval: &str, version: u32) -> PathBuf {
        self.dir
            .join(format!("{}_v{}.json", base_key(symbol, interval), version))
    }

    /// Schema versions on disk for this key other than the running one.
    fn other_versions(&self, symbol: &str, interval: &str) -> Vec<u32> {
        let prefix = format!("{}_v", base_key(symbol, interval));
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };

        let mut versions: Vec<u32> = entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                let version = name.strip_prefix(&prefix)?.strip_suffix(".json")?;
                version.parse::<u32>().ok()
            })
            .filter(|v| *v != SCHEMA_VERSION)
            .collect();
        versions.sort_unstable();
        versions
    }
}

impl ModelStore for FileModelStore {
    fn save(&self, model: &TrainedModel) -> Result<()> {
        let _guard = self.write_lock.write().map_err(|_| lock_poisoned())?;

        let path = self.path_for(&model.symbol, &model.interval, model.schema.version);
        let tmp = self.dir.join(format!(".{}.tmp", Uuid::new_v4()));

        let content = serde_json::to_vec_pretty(model)?;
        fs::write(&tmp, content)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        let key = base_key(&model.symbol, &model.interval);
        if model.schema.is_current() {
            self.cache.insert(key, Arc::new(model.clone()));
        } else {
            self.cache.remove(&key);
        }
        info!("Saved model {} to {}", model.id, path.display());
        Ok(())
    }

    fn load(&self, symbol: &str, interval: &str) -> Result<Arc<TrainedModel>> {
        let key = base_key(symbol, interval);
        if let Some(model) = self.cache.get(&key) {
            return Ok(model.clone());
        }

        let _guard = self.write_lock.read().map_err(|_| lock_poisoned())?;
        let path = self.path_for(symbol, interval, SCHEMA_VERSION);

        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let others = self.other_versions(symbol, interval);
                return Err(match others.last() {
                    Some(version) => AppError::SchemaMismatch(format!(
                        "model for {} {} uses feature schema v{}, running v{}. Retrain with /train.",
                        symbol, interval, version, SCHEMA_VERSION
                    )),
                    None => AppError::ModelNotFound,
                });
            }
            Err(e) => return Err(e.into()),
        };

        let model: TrainedModel = serde_json::from_slice(&content)?;
        if !model.schema.is_current() {
            return Err(AppError::SchemaMismatch(format!(
                "model for {} {} was trained on features {:?}, running {:?}",
                symbol,
                interval,
                model.schema.names,
                super::FEATURE_NAMES
            )));
        }

        let model = Arc::new(model);
        self.cache.insert(key, model.clone());
        debug!("Loaded model {} from {}", model.id, path.display());
        Ok(model)
    }
}
