//! Local provider implementation

use crate::error::{LocalError, Result};
use crate::store::{LocalStore, NetworkConfig, NetworkInfo};
use async_trait::async_trait;
use plumin_cloud::{
    Action, ActionType, ApplyResult, AuthStatus, CloudProvider, Plan, ProviderState,
    ResourceKind, ResourceSet, ResourceState,
};
use std::path::Path;

/// Provider backed by a [`LocalStore`] instead of a real cloud API
pub struct LocalProvider {
    store: LocalStore,
}

impl LocalProvider {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// Provider over a throwaway in-memory cloud
    pub fn in_memory() -> Self {
        Self::new(LocalStore::in_memory())
    }

    /// Provider over a cloud persisted at `path`
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(LocalStore::open(path).await?))
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    fn network_state(network: &NetworkInfo) -> ResourceState {
        let mut resource = ResourceState::new(network.id.clone(), ResourceKind::Vpc);
        resource.created_at = network.created_at;
        resource.updated_at = network.updated_at;
        for (key, value) in network.properties() {
            resource.attributes.insert(key, value);
        }
        resource
    }

    async fn apply_action(&self, action: &Action, result: &mut ApplyResult) -> Result<()> {
        match action.action_type {
            ActionType::Create => {
                tracing::info!("Creating network: {}", action.logical_name);
                let config = self.config_for(action)?;
                let network = self.store.create_network(&config).await?;
                result.add_resolved(
                    action,
                    network.id.clone(),
                    format!("Created network {} ({})", network.logical_name, network.id),
                );
            }
            ActionType::Update => {
                tracing::info!("Updating network: {}", action.logical_name);
                let config = self.config_for(action)?;
                let id = Self::existing_id(action)?;
                let network = self.store.update_network(id, &config).await?;
                result.add_resolved(
                    action,
                    network.id.clone(),
                    format!("Updated network {} ({})", network.logical_name, network.id),
                );
            }
            ActionType::Delete => {
                tracing::info!("Deleting network: {}", action.logical_name);
                let id = Self::existing_id(action)?;
                self.store.delete_network(id).await?;
                result.add_success(action, format!("Deleted network {} ({})", action.logical_name, id));
            }
            ActionType::NoOp => {
                let id = Self::existing_id(action)?;
                result.add_resolved(
                    action,
                    id.to_string(),
                    format!("Network {} is up to date", action.logical_name),
                );
            }
        }
        Ok(())
    }

    fn config_for(&self, action: &Action) -> Result<NetworkConfig> {
        let properties = action.properties().ok_or_else(|| {
            LocalError::InvalidConfig(format!("{}: action has no properties", action.id))
        })?;
        NetworkConfig::from_properties(&action.logical_name, properties)
    }

    fn existing_id(action: &Action) -> Result<&str> {
        action
            .existing_id()
            .ok_or_else(|| LocalError::InvalidConfig(format!("{}: action has no id", action.id)))
    }
}

#[async_trait]
impl CloudProvider for LocalProvider {
    fn name(&self) -> &str {
        "local"
    }

    fn display_name(&self) -> &str {
        "Local simulated cloud"
    }

    async fn check_auth(&self) -> plumin_cloud::Result<AuthStatus> {
        let account = match self.store.path() {
            Some(path) => format!("local ({})", path.display()),
            None => "local (in-memory)".to_string(),
        };
        Ok(AuthStatus::ok(account))
    }

    async fn get_state(&self) -> plumin_cloud::Result<ProviderState> {
        let mut state = ProviderState::new();
        for network in self.store.list_networks().await {
            state.add(network.logical_name.clone(), Self::network_state(&network));
        }
        Ok(state)
    }

    async fn plan(&self, desired: &ResourceSet) -> plumin_cloud::Result<Plan> {
        let current = self.store.list_networks().await;
        let mut actions = Vec::new();

        for resource in desired.iter() {
            if resource.kind != ResourceKind::Vpc {
                return Err(LocalError::UnsupportedKind(resource.kind.to_string()).into());
            }

            let properties = serde_json::Value::Object(resource.properties.clone());
            let existing = current
                .iter()
                .find(|n| n.logical_name == resource.logical_name);

            let action = match existing {
                None => Action::new(
                    ActionType::Create,
                    resource.kind,
                    &resource.logical_name,
                    format!("Create network {}", resource.logical_name),
                )
                .with_detail("properties", properties),
                Some(network) if network.properties() == resource.properties => Action::new(
                    ActionType::NoOp,
                    resource.kind,
                    &resource.logical_name,
                    format!("Network {} is up to date", resource.logical_name),
                )
                .with_detail("id", serde_json::json!(network.id)),
                Some(network) => Action::new(
                    ActionType::Update,
                    resource.kind,
                    &resource.logical_name,
                    format!("Update network {} ({})", resource.logical_name, network.id),
                )
                .with_detail("id", serde_json::json!(network.id))
                .with_detail("properties", properties),
            };
            actions.push(action);
        }

        // Networks no longer declared are removed
        for network in &current {
            if desired.get(ResourceKind::Vpc, &network.logical_name).is_none() {
                actions.push(
                    Action::new(
                        ActionType::Delete,
                        ResourceKind::Vpc,
                        &network.logical_name,
                        format!("Delete network {} ({})", network.logical_name, network.id),
                    )
                    .with_detail("id", serde_json::json!(network.id)),
                );
            }
        }

        Ok(Plan::new(actions))
    }

    async fn apply(&self, plan: &Plan) -> plumin_cloud::Result<ApplyResult> {
        let mut result = ApplyResult::new();
        let start = std::time::Instant::now();

        for action in &plan.actions {
            if let Err(e) = self.apply_action(action, &mut result).await {
                tracing::warn!("{} failed: {}", action.id, e);
                result.add_failure(action, e.to_string());
            }
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }

    async fn destroy(&self, logical_name: &str) -> plumin_cloud::Result<()> {
        let network = self
            .store
            .find_network(logical_name)
            .await
            .ok_or_else(|| LocalError::NetworkNotFound(logical_name.to_string()))?;

        self.store.delete_network(&network.id).await?;
        Ok(())
    }

    async fn destroy_all(&self) -> plumin_cloud::Result<ApplyResult> {
        let mut result = ApplyResult::new();
        let start = std::time::Instant::now();

        for network in self.store.list_networks().await {
            let action = Action::new(
                ActionType::Delete,
                ResourceKind::Vpc,
                &network.logical_name,
                format!("Delete network {}", network.logical_name),
            )
            .with_detail("id", serde_json::json!(network.id));

            match self.store.delete_network(&network.id).await {
                Ok(_) => result.add_success(
                    &action,
                    format!("Deleted network {} ({})", network.logical_name, network.id),
                ),
                Err(e) => result.add_failure(&action, e.to_string()),
            }
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }
}
