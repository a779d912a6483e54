//! Action types for cloud resource management

use crate::resource::ResourceKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Represents a planned action for a cloud resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// Unique identifier for the action
    pub id: String,

    /// Type of action to perform
    pub action_type: ActionType,

    /// Resource type
    pub kind: ResourceKind,

    /// Logical name of the resource
    pub logical_name: String,

    /// Description of the action
    pub description: String,

    /// Additional details about the action (desired properties, existing id)
    pub details: HashMap<String, serde_json::Value>,
}

impl Action {
    pub fn new(
        action_type: ActionType,
        kind: ResourceKind,
        logical_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let logical_name = logical_name.into();
        Self {
            id: format!("{}-{}", action_type, logical_name),
            action_type,
            kind,
            logical_name,
            description: description.into(),
            details: HashMap::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }

    /// Provider id of the existing resource, for update/delete/no-op actions
    pub fn existing_id(&self) -> Option<&str> {
        self.details.get("id").and_then(|v| v.as_str())
    }

    /// Desired properties, for create/update actions
    pub fn properties(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        self.details.get("properties").and_then(|v| v.as_object())
    }
}

/// Type of action to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Create a new resource
    Create,
    /// Update an existing resource
    Update,
    /// Delete a resource
    Delete,
    /// No changes needed
    NoOp,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Update => write!(f, "update"),
            ActionType::Delete => write!(f, "delete"),
            ActionType::NoOp => write!(f, "no-op"),
        }
    }
}

/// Result of applying actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResult {
    /// Successfully applied actions
    pub succeeded: Vec<ActionResult>,

    /// Failed actions
    pub failed: Vec<ActionResult>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl ApplyResult {
    pub fn new() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn add_success(&mut self, action: &Action, message: String) {
        self.succeeded.push(ActionResult {
            action_id: action.id.clone(),
            kind: action.kind,
            logical_name: action.logical_name.clone(),
            success: true,
            message,
            physical_id: None,
            error: None,
        });
    }

    /// Record a success that leaves the resource in place with a known id
    pub fn add_resolved(&mut self, action: &Action, physical_id: String, message: String) {
        self.succeeded.push(ActionResult {
            action_id: action.id.clone(),
            kind: action.kind,
            logical_name: action.logical_name.clone(),
            success: true,
            message,
            physical_id: Some(physical_id),
            error: None,
        });
    }

    pub fn add_failure(&mut self, action: &Action, error: String) {
        self.failed.push(ActionResult {
            action_id: action.id.clone(),
            kind: action.kind,
            logical_name: action.logical_name.clone(),
            success: false,
            message: String::new(),
            physical_id: None,
            error: Some(error),
        });
    }

    /// Find the result for a resource
    pub fn for_resource(&self, logical_name: &str) -> Option<&ActionResult> {
        self.succeeded
            .iter()
            .chain(self.failed.iter())
            .find(|r| r.logical_name == logical_name)
    }
}

impl Default for ApplyResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a single action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    /// ID of the action
    pub action_id: String,

    /// Kind of the resource the action touched
    pub kind: ResourceKind,

    /// Logical name of the resource the action touched
    pub logical_name: String,

    /// Whether the action succeeded
    pub success: bool,

    /// Success message
    pub message: String,

    /// Provider-assigned id of the resource after the action
    pub physical_id: Option<String>,

    /// Error message if failed
    pub error: Option<String>,
}

/// Plan containing all actions to be applied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// List of actions to perform
    pub actions: Vec<Action>,

    /// Whether the plan has any changes
    pub has_changes: bool,
}

impl Plan {
    pub fn new(actions: Vec<Action>) -> Self {
        let has_changes = actions.iter().any(|a| a.action_type != ActionType::NoOp);
        Self {
            actions,
            has_changes,
        }
    }

    pub fn actions_by_type(&self, action_type: ActionType) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .collect()
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            create: self.actions_by_type(ActionType::Create).len(),
            update: self.actions_by_type(ActionType::Update).len(),
            delete: self.actions_by_type(ActionType::Delete).len(),
            no_change: self.actions_by_type(ActionType::NoOp).len(),
        }
    }
}

/// Summary of planned actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub delete: usize,
    pub no_change: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to create, {} to update, {} to delete, {} unchanged",
            self.create, self.update, self.delete, self.no_change
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plan_summary() {
        let plan = Plan::new(vec![
            Action::new(ActionType::Create, ResourceKind::Vpc, "a", "create a"),
            Action::new(ActionType::NoOp, ResourceKind::Vpc, "b", "b unchanged"),
            Action::new(ActionType::Delete, ResourceKind::Vpc, "c", "delete c"),
        ]);

        assert!(plan.has_changes);
        let summary = plan.summary();
        assert_eq!(summary.create, 1);
        assert_eq!(summary.delete, 1);
        assert_eq!(summary.no_change, 1);
        assert_eq!(
            summary.to_string(),
            "1 to create, 0 to update, 1 to delete, 1 unchanged"
        );
    }

    #[test]
    fn test_noop_plan_has_no_changes() {
        let plan = Plan::new(vec![Action::new(
            ActionType::NoOp,
            ResourceKind::Vpc,
            "a",
            "a unchanged",
        )]);
        assert!(!plan.has_changes);
        assert!(!Plan::new(Vec::new()).has_changes);
    }

    #[test]
    fn test_action_details() {
        let action = Action::new(ActionType::Update, ResourceKind::Vpc, "a", "update a")
            .with_detail("id", json!("vpc-00000001"))
            .with_detail("properties", json!({"cidr_block": "10.0.0.0/16"}));

        assert_eq!(action.id, "update-a");
        assert_eq!(action.existing_id(), Some("vpc-00000001"));
        assert_eq!(
            action.properties().unwrap()["cidr_block"],
            json!("10.0.0.0/16")
        );
    }

    #[test]
    fn test_apply_result_lookup() {
        let create = Action::new(ActionType::Create, ResourceKind::Vpc, "a", "create a");
        let broken = Action::new(ActionType::Create, ResourceKind::Vpc, "b", "create b");

        let mut result = ApplyResult::new();
        result.add_resolved(&create, "vpc-1".to_string(), "created".to_string());
        result.add_failure(&broken, "quota exceeded".to_string());

        assert!(!result.is_success());
        assert_eq!(
            result.for_resource("a").unwrap().physical_id.as_deref(),
            Some("vpc-1")
        );
        assert_eq!(
            result.for_resource("b").unwrap().error.as_deref(),
            Some("quota exceeded")
        );
        assert_eq!(result.for_resource("a").unwrap().kind, ResourceKind::Vpc);
        assert!(result.for_resource("c").is_none());
    }
}
