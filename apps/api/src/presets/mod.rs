//! Named job-requirement presets persisted to a flat JSON file.
//!
//! Last write wins on the preset name. The pipeline treats loaded presets
//! as ordinary inputs and relies on nothing beyond that.

pub mod handlers;

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::models::role_track::RoleTrack;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPreset {
    #[serde(alias = "jd")]
    pub job_description: String,
    #[serde(default)]
    pub must_haves: String,
    #[serde(alias = "role_type", deserialize_with = "deserialize_role_track")]
    pub role_track: RoleTrack,
}

fn deserialize_role_track<'de, D>(deserializer: D) -> Result<RoleTrack, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

pub type PresetMap = BTreeMap<String, JobPreset>;

/// File contents before per-entry validation. Writes go through this form
/// so entries this build cannot read are carried over untouched.
type RawPresets = BTreeMap<String, Value>;

pub struct PresetStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles.
    write_lock: Mutex<()>,
}

impl PresetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// All readable presets. Entries that fail to parse are skipped; an
    /// unreadable file is an empty store.
    pub async fn load(&self) -> PresetMap {
        match self.read_raw().await {
            Ok(raw) => parse_entries(raw),
            Err(e) => {
                warn!("{e:#}");
                PresetMap::new()
            }
        }
    }

    /// Fails without writing if the existing file cannot be parsed.
    pub async fn save(
        &self,
        name: &str,
        job_description: &str,
        must_haves: &str,
        role_track: RoleTrack,
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut presets = self.read_raw().await?;
        let preset = JobPreset {
            job_description: job_description.to_string(),
            must_haves: must_haves.to_string(),
            role_track,
        };
        presets.insert(
            name.to_string(),
            serde_json::to_value(&preset).context("Failed to serialize preset")?,
        );
        self.write(&presets).await?;
        info!("Saved preset '{name}'");
        Ok(())
    }

    /// Removes a preset. Returns whether it existed.
    pub async fn delete(&self, name: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut presets = self.read_raw().await?;
        if presets.remove(name).is_none() {
            return Ok(false);
        }
        self.write(&presets).await?;
        info!("Deleted preset '{name}'");
        Ok(true)
    }

    async fn read_raw(&self) -> Result<RawPresets> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(RawPresets::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Could not read presets from {}", self.path.display())
                })
            }
        };

        serde_json::from_str(&raw)
            .with_context(|| format!("Malformed preset file {}", self.path.display()))
    }

    async fn write(&self, presets: &RawPresets) -> Result<()> {
        let json = serde_json::to_string_pretty(presets).context("Failed to serialize presets")?;
        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("Failed to write presets to {}", self.path.display()))
    }
}

fn parse_entries(raw: RawPresets) -> PresetMap {
    raw.into_iter()
        .filter_map(|(name, value)| match serde_json::from_value::<JobPreset>(value) {
            Ok(preset) => Some((name, preset)),
            Err(e) => {
                warn!("Skipping unreadable preset '{name}': {e}");
                None
            }
        })
        .collect()
}
