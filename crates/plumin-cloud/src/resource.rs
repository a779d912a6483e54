//! Declared resources

use crate::output::Output;
use serde::{Deserialize, Serialize};

/// Resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Virtual private cloud network
    Vpc,
}

impl ResourceKind {
    /// Provider type token
    pub fn type_token(&self) -> &'static str {
        match self {
            ResourceKind::Vpc => "aws:ec2/vpc:Vpc",
        }
    }

    /// Prefix of provider-assigned ids
    pub fn id_prefix(&self) -> &'static str {
        match self {
            ResourceKind::Vpc => "vpc",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Vpc => write!(f, "vpc"),
        }
    }
}

/// A resource registered with a provisioning context.
///
/// Cloning is cheap and every clone observes the same `id` output.
#[derive(Debug, Clone)]
pub struct ResourceDescriptor {
    kind: ResourceKind,
    logical_name: String,
    properties: serde_json::Map<String, serde_json::Value>,
    id: Output,
}

impl ResourceDescriptor {
    pub(crate) fn new(
        kind: ResourceKind,
        logical_name: String,
        properties: serde_json::Map<String, serde_json::Value>,
        id: Output,
    ) -> Self {
        Self {
            kind,
            logical_name,
            properties,
            id,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn logical_name(&self) -> &str {
        &self.logical_name
    }

    pub fn properties(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.properties
    }

    /// Get a property as a specific type
    pub fn property<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.properties
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Provider-assigned id, pending until the apply phase settles it
    pub fn id(&self) -> &Output {
        &self.id
    }

    /// Get the full resource key (kind:logical_name)
    pub fn key(&self) -> String {
        format!("{}:{}", self.kind, self.logical_name)
    }
}
