//! Index manifest
//!
//! `manifest.json` in the store directory records what a completed build
//! contains. It is written only after the last batch lands, so a missing
//! manifest next to a non-empty store means the previous build was cut short.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::Result;

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    pub collection: String,
    pub embedding_model: String,
    pub dimension: usize,
    pub document_count: u64,
    /// SHA-256 of the dataset file the index was built from
    pub dataset_checksum: String,
    pub created_at: DateTime<Utc>,
}

/// Outcome of comparing a manifest against the current setup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestCheck {
    /// Index is complete and built from this dataset with this model
    Current,
    /// Built with a different embedding model; vectors are incompatible
    ModelMismatch { found: String },
    /// Dataset, collection or stored count no longer match
    Stale { reason: String },
}

impl IndexManifest {
    pub fn path_in(store_dir: &Path) -> PathBuf {
        store_dir.join(MANIFEST_FILE)
    }

    /// Read the manifest, `None` if the store has never completed a build
    pub fn load(store_dir: &Path) -> Result<Option<Self>> {
        let path = Self::path_in(store_dir);
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    pub fn save(&self, store_dir: &Path) -> Result<()> {
        fs::create_dir_all(store_dir)?;
        let json = serde_json::to_string_pretty(self)?;
        fs::write(Self::path_in(store_dir), json)?;
        Ok(())
    }

    /// Delete the manifest if present
    pub fn remove(store_dir: &Path) -> Result<()> {
        let path = Self::path_in(store_dir);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Model mismatch takes precedence over staleness
    ///
    /// `stored_dimension` is the vector length the store reports, if it
    /// holds any vectors.
    pub fn check(
        &self,
        embedding_model: &str,
        collection: &str,
        dataset_checksum: &str,
        stored_count: u64,
        stored_dimension: Option<usize>,
    ) -> ManifestCheck {
        if self.embedding_model != embedding_model {
            return ManifestCheck::ModelMismatch {
                found: self.embedding_model.clone(),
            };
        }
        if self.collection != collection {
            return ManifestCheck::Stale {
                reason: format!("collection changed from '{}'", self.collection),
            };
        }
        if self.dataset_checksum != dataset_checksum {
            return ManifestCheck::Stale {
                reason: "dataset contents changed".to_string(),
            };
        }
        if self.document_count != stored_count {
            return ManifestCheck::Stale {
                reason: format!(
                    "store holds {} documents, manifest expects {}",
                    stored_count, self.document_count
                ),
            };
        }
        if let Some(dimension) = stored_dimension {
            if dimension != self.dimension {
                return ManifestCheck::Stale {
                    reason: format!(
                        "store vectors have {} dimensions, manifest expects {}",
                        dimension, self.dimension
                    ),
                };
            }
        }
        ManifestCheck::Current
    }
}
