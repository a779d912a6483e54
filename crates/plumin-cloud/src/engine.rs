//! Provisioning engine
//!
//! Drives a finalized [`Deployment`] through a [`CloudProvider`]: plan, apply,
//! resolve every pending resource id from the apply results, then record the
//! outcome in run state.

use crate::action::{ActionType, ApplyResult, Plan, PlanSummary};
use crate::context::Deployment;
use crate::error::{CloudError, Result};
use crate::output::OutputState;
use crate::provider::CloudProvider;
use crate::state::{GlobalState, ResourceState, StateManager};
use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome of `up`
#[derive(Debug, Clone, Serialize)]
pub struct UpResult {
    /// What the plan decided to do
    pub summary: PlanSummary,

    /// What the provider actually did
    pub apply: ApplyResult,

    /// Exported outputs that resolved
    pub outputs: BTreeMap<String, serde_json::Value>,

    /// Exported outputs that failed, with the reason
    pub failed_outputs: BTreeMap<String, String>,
}

impl UpResult {
    pub fn is_success(&self) -> bool {
        self.apply.is_success() && self.failed_outputs.is_empty()
    }
}

/// Runs preview/up/destroy against one provider and one state directory
pub struct Engine {
    provider: Box<dyn CloudProvider>,
    state: StateManager,
}

impl Engine {
    pub fn new(provider: Box<dyn CloudProvider>, state: StateManager) -> Self {
        Self { provider, state }
    }

    pub fn provider(&self) -> &dyn CloudProvider {
        self.provider.as_ref()
    }

    /// Plan without applying. Resource ids stay pending.
    pub async fn preview(&self, deployment: &Deployment) -> Result<Plan> {
        self.ensure_auth().await?;
        let plan = self.provider.plan(&deployment.resource_set()).await?;
        tracing::info!(
            "Preview of {}/{}: {}",
            deployment.project(),
            deployment.stack(),
            plan.summary()
        );
        Ok(plan)
    }

    /// Plan, apply, resolve outputs and save run state
    pub async fn up(&self, mut deployment: Deployment) -> Result<UpResult> {
        self.ensure_auth().await?;
        let lock = self.state.acquire_lock().await?;

        let plan = self.provider.plan(&deployment.resource_set()).await?;
        let summary = plan.summary();
        tracing::info!(
            "Updating {}/{}: {}",
            deployment.project(),
            deployment.stack(),
            summary
        );

        let apply = self.provider.apply(&plan).await?;
        for failure in &apply.failed {
            tracing::warn!(
                "Action {} failed: {}",
                failure.action_id,
                failure.error.as_deref().unwrap_or("unknown error")
            );
        }

        self.resolve_ids(&mut deployment, &apply)?;

        let mut state = self.state.load().await?;
        self.record_resources(&mut state, &deployment, &plan, &apply);

        let mut outputs = BTreeMap::new();
        let mut failed_outputs = BTreeMap::new();
        for (name, output) in deployment.outputs() {
            match output {
                OutputState::Resolved(value) => {
                    outputs.insert(name, value);
                }
                other => {
                    failed_outputs.insert(name, other.to_string());
                }
            }
        }
        state.set_outputs(outputs.clone());

        self.state.save(&state).await?;
        lock.release().await?;

        Ok(UpResult {
            summary,
            apply,
            outputs,
            failed_outputs,
        })
    }

    /// Delete everything the provider manages and clear run state
    pub async fn destroy(&self) -> Result<ApplyResult> {
        self.ensure_auth().await?;
        let lock = self.state.acquire_lock().await?;

        let result = self.provider.destroy_all().await?;
        tracing::info!(
            "Destroyed {} resources ({} failed)",
            result.succeeded.len(),
            result.failed.len()
        );

        let mut state = self.state.load().await?;
        if result.is_success() {
            state.clear();
        } else {
            for done in &result.succeeded {
                let key =
                    GlobalState::resource_key(self.provider.name(), done.kind, &done.logical_name);
                state.remove_resource(&key);
            }
            state.set_outputs(BTreeMap::new());
        }
        self.state.save(&state).await?;
        lock.release().await?;

        Ok(result)
    }

    /// Outputs recorded by the last successful `up`
    pub async fn outputs(&self) -> Result<BTreeMap<String, serde_json::Value>> {
        Ok(self.state.load().await?.outputs)
    }

    async fn ensure_auth(&self) -> Result<()> {
        let auth = self.provider.check_auth().await?;
        if !auth.authenticated {
            return Err(CloudError::AuthError(format!(
                "{}: {}",
                self.provider.display_name(),
                auth.error.as_deref().unwrap_or("not authenticated")
            )));
        }
        tracing::debug!(
            "Authenticated with {} ({})",
            self.provider.display_name(),
            auth.account_info.as_deref().unwrap_or("unknown account")
        );
        Ok(())
    }

    fn resolve_ids(&self, deployment: &mut Deployment, apply: &ApplyResult) -> Result<()> {
        let names: Vec<String> = deployment
            .unresolved()
            .into_iter()
            .map(str::to_string)
            .collect();

        for name in names {
            match apply.for_resource(&name) {
                Some(result) if result.success => match &result.physical_id {
                    Some(id) => deployment.resolve(&name, id.clone())?,
                    None => deployment.fail(&name, "provider returned no id")?,
                },
                Some(result) => deployment.fail(
                    &name,
                    result
                        .error
                        .clone()
                        .unwrap_or_else(|| "apply failed".to_string()),
                )?,
                None => deployment.fail(&name, "resource was not applied")?,
            }
        }
        Ok(())
    }

    fn record_resources(
        &self,
        state: &mut GlobalState,
        deployment: &Deployment,
        plan: &Plan,
        apply: &ApplyResult,
    ) {
        let provider = self.provider.name();

        for resource in deployment.resources() {
            let key = GlobalState::resource_key(provider, resource.kind(), resource.logical_name());
            let Some(id) = resource.id().value().and_then(|v| v.as_str().map(str::to_string))
            else {
                continue;
            };

            let created_at = state.get_resource(&key).map(|r| r.created_at);
            let mut entry = ResourceState::new(id, resource.kind());
            if let Some(created_at) = created_at {
                entry.created_at = created_at;
            }
            for (k, v) in resource.properties() {
                entry.set_attribute(k.clone(), v.clone());
            }
            state.set_resource(key, entry);
        }

        for action in plan.actions_by_type(ActionType::Delete) {
            let deleted = apply
                .for_resource(&action.logical_name)
                .is_some_and(|r| r.success);
            if deleted {
                let key = GlobalState::resource_key(provider, action.kind, &action.logical_name);
                state.remove_resource(&key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::context::ProvisioningContext;
    use crate::provider::{AuthStatus, ResourceSet};
    use crate::resource::ResourceKind;
    use crate::state::ProviderState;
    use async_trait::async_trait;
    use serde_json::json;

    /// Provider that creates everything with a fixed id, or fails every action
    struct FixedProvider {
        id: String,
        fail: bool,
        authenticated: bool,
        destroyed: Vec<(String, bool)>,
    }

    impl FixedProvider {
        fn new(id: &str, fail: bool) -> Self {
            Self {
                id: id.to_string(),
                fail,
                authenticated: true,
                destroyed: Vec::new(),
            }
        }

        fn unauthenticated(mut self) -> Self {
            self.authenticated = false;
            self
        }

        /// Outcome `destroy_all` reports for a resource
        fn destroys(mut self, logical_name: &str, ok: bool) -> Self {
            self.destroyed.push((logical_name.to_string(), ok));
            self
        }
    }

    #[async_trait]
    impl CloudProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        fn display_name(&self) -> &str {
            "Fixed"
        }

        async fn check_auth(&self) -> Result<AuthStatus> {
            if self.authenticated {
                Ok(AuthStatus::ok("test"))
            } else {
                Ok(AuthStatus::failed("token expired"))
            }
        }

        async fn get_state(&self) -> Result<ProviderState> {
            Ok(ProviderState::new())
        }

        async fn plan(&self, desired: &ResourceSet) -> Result<Plan> {
            Ok(Plan::new(
                desired
                    .iter()
                    .map(|r| {
                        Action::new(ActionType::Create, r.kind, &r.logical_name, "create")
                    })
                    .collect(),
            ))
        }

        async fn apply(&self, plan: &Plan) -> Result<ApplyResult> {
            let mut result = ApplyResult::new();
            for action in &plan.actions {
                if self.fail {
                    result.add_failure(action, "permission denied".to_string());
                } else {
                    result.add_resolved(action, self.id.clone(), "created".to_string());
                }
            }
            Ok(result)
        }

        async fn destroy(&self, _logical_name: &str) -> Result<()> {
            Ok(())
        }

        async fn destroy_all(&self) -> Result<ApplyResult> {
            let mut result = ApplyResult::new();
            for (name, ok) in &self.destroyed {
                let action = Action::new(ActionType::Delete, ResourceKind::Vpc, name, "delete");
                if *ok {
                    result.add_success(&action, "deleted".to_string());
                } else {
                    result.add_failure(&action, "still in use".to_string());
                }
            }
            Ok(result)
        }
    }

    fn create_vpc() -> Deployment {
        let mut ctx = ProvisioningContext::new("create-vpc", "dev");
        let vpc = ctx
            .declare_network(
                "my-vpc",
                "10.0.0.0/16",
                BTreeMap::from([("Name".to_string(), "my-vpc".to_string())]),
            )
            .unwrap();
        ctx.export_output("vpc_id", vpc.id()).unwrap();
        ctx.finalize()
    }

    #[tokio::test]
    async fn test_up_resolves_outputs_and_saves_state() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::new(
            Box::new(FixedProvider::new("vpc-0123abcd", false)),
            StateManager::new(dir.path()),
        );

        let result = engine.up(create_vpc()).await.unwrap();
        assert!(result.is_success());
        assert_eq!(result.summary.create, 1);
        assert_eq!(result.outputs["vpc_id"], json!("vpc-0123abcd"));

        let saved = engine.outputs().await.unwrap();
        assert_eq!(saved, BTreeMap::from([("vpc_id".to_string(), json!("vpc-0123abcd"))]));

        let state = StateManager::new(dir.path()).load().await.unwrap();
        let vpc = state.get_resource("fixed:vpc:my-vpc").unwrap();
        assert_eq!(vpc.id, "vpc-0123abcd");
        assert_eq!(vpc.get_attribute::<String>("cidr_block").as_deref(), Some("10.0.0.0/16"));
    }

    #[tokio::test]
    async fn test_failed_apply_fails_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::new(
            Box::new(FixedProvider::new("unused", true)),
            StateManager::new(dir.path()),
        );

        let result = engine.up(create_vpc()).await.unwrap();
        assert!(!result.is_success());
        assert!(result.outputs.is_empty());
        assert_eq!(
            result.failed_outputs["vpc_id"],
            "[failed: permission denied]"
        );
        assert!(engine.outputs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_preview_leaves_ids_pending() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::new(
            Box::new(FixedProvider::new("vpc-1", false)),
            StateManager::new(dir.path()),
        );

        let deployment = create_vpc();
        let plan = engine.preview(&deployment).await.unwrap();
        assert_eq!(plan.summary().create, 1);
        assert!(deployment.resources()[0].id().is_pending());
        assert!(!dir.path().join(".plumin/state.json").exists());
    }

    #[tokio::test]
    async fn test_up_refuses_when_locked() {
        let dir = tempfile::tempdir().unwrap();
        let state = StateManager::new(dir.path());
        let _lock = state.acquire_lock().await.unwrap();

        let engine = Engine::new(
            Box::new(FixedProvider::new("vpc-1", false)),
            StateManager::new(dir.path()),
        );
        assert!(matches!(
            engine.up(create_vpc()).await,
            Err(crate::CloudError::LockError(_))
        ));
    }

    #[tokio::test]
    async fn test_destroy_clears_state() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::new(
            Box::new(FixedProvider::new("vpc-1", false)),
            StateManager::new(dir.path()),
        );

        engine.up(create_vpc()).await.unwrap();
        engine.destroy().await.unwrap();

        let state = StateManager::new(dir.path()).load().await.unwrap();
        assert!(state.resources.is_empty());
        assert!(state.outputs.is_empty());
    }

    #[tokio::test]
    async fn test_unauthenticated_provider_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::new(
            Box::new(FixedProvider::new("vpc-1", false).unauthenticated()),
            StateManager::new(dir.path()),
        );

        let deployment = create_vpc();
        match engine.preview(&deployment).await {
            Err(CloudError::AuthError(message)) => {
                assert_eq!(message, "Fixed: token expired")
            }
            other => panic!("expected AuthError, got {:?}", other.map(|_| ())),
        }
        assert!(matches!(
            engine.up(deployment).await,
            Err(CloudError::AuthError(_))
        ));
        assert!(!dir.path().join(".plumin/lock.json").exists());
    }

    #[tokio::test]
    async fn test_partial_destroy_removes_exact_keys() {
        let dir = tempfile::tempdir().unwrap();

        let mut ctx = ProvisioningContext::new("create-vpc", "dev");
        ctx.declare_network("x", "10.0.0.0/16", BTreeMap::new()).unwrap();
        ctx.declare_network("a:x", "10.1.0.0/16", BTreeMap::new()).unwrap();
        let setup = Engine::new(
            Box::new(FixedProvider::new("vpc-1", false)),
            StateManager::new(dir.path()),
        );
        setup.up(ctx.finalize()).await.unwrap();

        let engine = Engine::new(
            Box::new(
                FixedProvider::new("vpc-1", false)
                    .destroys("x", true)
                    .destroys("a:x", false),
            ),
            StateManager::new(dir.path()),
        );
        let result = engine.destroy().await.unwrap();
        assert!(!result.is_success());

        let state = StateManager::new(dir.path()).load().await.unwrap();
        assert!(state.get_resource("fixed:vpc:x").is_none());
        assert!(state.get_resource("fixed:vpc:a:x").is_some());
    }
}
