//! Simulated cloud backend
//!
//! Plays the part of a provider's management API. Networks live in memory and,
//! when the store was opened from a path, are written back to a JSON file after
//! every mutation so separate runs see the same cloud.

use crate::error::{LocalError, Result};
use chrono::{DateTime, Utc};
use plumin_cloud::{CidrBlock, ResourceKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

/// File name of the persisted cloud inside a state directory
pub const CLOUD_FILE: &str = "local-cloud.json";

/// Persisted contents of the simulated cloud
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CloudData {
    /// Next id sequence value
    next_seq: u64,

    /// Networks indexed by provider id
    networks: BTreeMap<String, NetworkInfo>,
}

impl Default for CloudData {
    fn default() -> Self {
        Self {
            next_seq: 1,
            networks: BTreeMap::new(),
        }
    }
}

/// A network as the simulated cloud reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub id: String,
    pub logical_name: String,
    pub cidr_block: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NetworkInfo {
    /// Properties in the shape a declaration produces
    pub fn properties(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut props = serde_json::Map::new();
        props.insert(
            "cidr_block".to_string(),
            serde_json::Value::String(self.cidr_block.clone()),
        );
        props.insert(
            "tags".to_string(),
            serde_json::Value::Object(
                self.tags
                    .iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                    .collect(),
            ),
        );
        props
    }
}

/// Requested network settings
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkConfig {
    pub logical_name: String,
    pub cidr_block: String,
    pub tags: BTreeMap<String, String>,
}

impl NetworkConfig {
    /// Read settings from declared properties
    pub fn from_properties(
        logical_name: &str,
        properties: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self> {
        let cidr_block = properties
            .get("cidr_block")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                LocalError::InvalidConfig(format!("{}: missing cidr_block", logical_name))
            })?;
        cidr_block.parse::<CidrBlock>()?;

        let tags = match properties.get("tags") {
            Some(v) if !v.is_null() => serde_json::from_value(v.clone())?,
            _ => BTreeMap::new(),
        };

        Ok(Self {
            logical_name: logical_name.to_string(),
            cidr_block: cidr_block.to_string(),
            tags,
        })
    }
}

/// Simulated cloud backend
pub struct LocalStore {
    path: Option<PathBuf>,
    data: Mutex<CloudData>,
}

impl LocalStore {
    /// Cloud that lives only as long as this value
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: Mutex::new(CloudData::default()),
        }
    }

    /// Open (or start) a cloud persisted at `path`
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let content = fs::read_to_string(&path).await?;
            let data: CloudData = serde_json::from_str(&content)?;
            tracing::debug!(
                "Loaded local cloud with {} networks from {}",
                data.networks.len(),
                path.display()
            );
            data
        } else {
            CloudData::default()
        };

        Ok(Self {
            path: Some(path),
            data: Mutex::new(data),
        })
    }

    /// Set the sequence value the next id is derived from
    pub fn with_next_id(mut self, next: u64) -> Self {
        self.data.get_mut().next_seq = next;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn list_networks(&self) -> Vec<NetworkInfo> {
        self.data.lock().await.networks.values().cloned().collect()
    }

    /// Find a network by the logical name it was created under
    pub async fn find_network(&self, logical_name: &str) -> Option<NetworkInfo> {
        self.data
            .lock()
            .await
            .networks
            .values()
            .find(|n| n.logical_name == logical_name)
            .cloned()
    }

    pub async fn create_network(&self, config: &NetworkConfig) -> Result<NetworkInfo> {
        let mut data = self.data.lock().await;

        if data
            .networks
            .values()
            .any(|n| n.logical_name == config.logical_name)
        {
            return Err(LocalError::AlreadyExists(config.logical_name.clone()));
        }

        let seq = data.next_seq;
        data.next_seq = seq.checked_add(1).ok_or_else(|| {
            LocalError::InvalidConfig("network id sequence exhausted".to_string())
        })?;
        let id = format!("{}-{:08x}", ResourceKind::Vpc.id_prefix(), seq);

        let now = Utc::now();
        let network = NetworkInfo {
            id: id.clone(),
            logical_name: config.logical_name.clone(),
            cidr_block: config.cidr_block.clone(),
            tags: config.tags.clone(),
            created_at: now,
            updated_at: now,
        };
        data.networks.insert(id, network.clone());

        self.persist(&data).await?;
        Ok(network)
    }

    pub async fn update_network(&self, id: &str, config: &NetworkConfig) -> Result<NetworkInfo> {
        let mut data = self.data.lock().await;

        let network = data
            .networks
            .get_mut(id)
            .ok_or_else(|| LocalError::NetworkNotFound(id.to_string()))?;
        network.cidr_block = config.cidr_block.clone();
        network.tags = config.tags.clone();
        network.updated_at = Utc::now();
        let updated = network.clone();

        self.persist(&data).await?;
        Ok(updated)
    }

    pub async fn delete_network(&self, id: &str) -> Result<NetworkInfo> {
        let mut data = self.data.lock().await;

        let removed = data
            .networks
            .remove(id)
            .ok_or_else(|| LocalError::NetworkNotFound(id.to_string()))?;

        self.persist(&data).await?;
        Ok(removed)
    }

    async fn persist(&self, data: &CloudData) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }

        // Write to a temp file and rename so a crash never leaves half a file
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(data)?).await?;
        fs::rename(&tmp, path).await?;

        tracing::debug!("Persisted local cloud to {}", path.display());
        Ok(())
    }
}
