//! Cloud provider trait definition

use crate::action::{ApplyResult, Plan};
use crate::error::Result;
use crate::resource::ResourceKind;
use crate::state::ProviderState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cloud provider abstraction trait
///
/// Providers turn declared resources into real ones. They own authentication,
/// diffing against what already exists, and the API calls that create,
/// update and delete.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Returns the provider name (e.g., "local")
    fn name(&self) -> &str;

    /// Returns the provider display name for UI
    fn display_name(&self) -> &str;

    /// Check if the provider is properly configured and authenticated
    async fn check_auth(&self) -> Result<AuthStatus>;

    /// Get the current state of all resources managed by this provider,
    /// keyed by logical name
    async fn get_state(&self) -> Result<ProviderState>;

    /// Calculate the diff between desired and current state
    async fn plan(&self, desired: &ResourceSet) -> Result<Plan>;

    /// Apply the planned actions
    async fn apply(&self, plan: &Plan) -> Result<ApplyResult>;

    /// Destroy a specific resource by logical name
    async fn destroy(&self, logical_name: &str) -> Result<()>;

    /// Destroy all resources managed by this provider
    async fn destroy_all(&self) -> Result<ApplyResult>;
}

/// Authentication status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether authentication is valid
    pub authenticated: bool,

    /// Account/user information if available
    pub account_info: Option<String>,

    /// Error message if not authenticated
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            account_info: None,
            error: Some(error.into()),
        }
    }
}

/// Set of resources to be managed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceSet {
    /// Resources indexed by kind and logical name
    pub resources: BTreeMap<String, ResourceConfig>,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, resource: ResourceConfig) {
        self.resources.insert(resource.key(), resource);
    }

    pub fn get(&self, kind: ResourceKind, logical_name: &str) -> Option<&ResourceConfig> {
        let key = format!("{}:{}", kind, logical_name);
        self.resources.get(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceConfig> {
        self.resources.values()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Desired configuration for a single resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Resource type
    pub kind: ResourceKind,

    /// Logical name the resource was declared under
    pub logical_name: String,

    /// Resource-specific properties
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl ResourceConfig {
    pub fn new(
        kind: ResourceKind,
        logical_name: impl Into<String>,
        properties: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            kind,
            logical_name: logical_name.into(),
            properties,
        }
    }

    /// Get the full resource key (kind:logical_name)
    pub fn key(&self) -> String {
        format!("{}:{}", self.kind, self.logical_name)
    }

    /// Get a property as a specific type
    pub fn get_property<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.properties
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vpc(name: &str, cidr: &str) -> ResourceConfig {
        let props = json!({ "cidr_block": cidr, "tags": {} });
        ResourceConfig::new(
            ResourceKind::Vpc,
            name,
            props.as_object().cloned().unwrap_or_default(),
        )
    }

    #[test]
    fn test_resource_set_lookup() {
        let mut set = ResourceSet::new();
        set.add(vpc("a", "10.0.0.0/16"));
        set.add(vpc("b", "10.1.0.0/16"));

        assert_eq!(set.len(), 2);
        assert!(set.get(ResourceKind::Vpc, "a").is_some());
        assert!(set.get(ResourceKind::Vpc, "c").is_none());
        assert_eq!(
            set.iter().map(|r| r.key()).collect::<Vec<_>>(),
            vec!["vpc:a", "vpc:b"]
        );
    }

    #[test]
    fn test_get_property() {
        let config = vpc("a", "10.0.0.0/16");
        assert_eq!(
            config.get_property::<String>("cidr_block").as_deref(),
            Some("10.0.0.0/16")
        );
        assert_eq!(config.get_property::<u32>("cidr_block"), None);
        assert_eq!(config.get_property::<String>("missing"), None);
    }

    #[test]
    fn test_auth_status() {
        let ok = AuthStatus::ok("local");
        assert!(ok.authenticated);
        assert_eq!(ok.account_info.as_deref(), Some("local"));

        let failed = AuthStatus::failed("no credentials");
        assert!(!failed.authenticated);
        assert_eq!(failed.error.as_deref(), Some("no credentials"));
    }
}
