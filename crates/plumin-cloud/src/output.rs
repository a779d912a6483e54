//! Deferred values resolved by the engine
//!
//! An [`Output`] is the read side of a value that only becomes known once the
//! apply phase has run, such as a provider-assigned resource id. The single
//! write side is an [`OutputResolver`]. `resolve` and `fail` consume it, so an
//! output can be settled exactly once.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Resolution state of an output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum OutputState {
    /// Waiting on the apply phase
    Pending,
    /// Value is known
    Resolved(serde_json::Value),
    /// Resolution failed with a message
    Failed(String),
}

impl OutputState {
    pub fn is_pending(&self) -> bool {
        matches!(self, OutputState::Pending)
    }
}

impl std::fmt::Display for OutputState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputState::Pending => write!(f, "[unknown]"),
            OutputState::Resolved(serde_json::Value::String(s)) => write!(f, "{}", s),
            OutputState::Resolved(v) => write!(f, "{}", v),
            OutputState::Failed(e) => write!(f, "[failed: {}]", e),
        }
    }
}

/// Read handle to a deferred value. Clones share the same state.
#[derive(Debug, Clone)]
pub struct Output {
    rx: watch::Receiver<OutputState>,
}

impl Output {
    /// Create a pending output and the resolver that settles it
    pub fn pending() -> (Output, OutputResolver) {
        let (tx, rx) = watch::channel(OutputState::Pending);
        (Output { rx }, OutputResolver { tx })
    }

    /// An output whose value is already known
    pub fn known(value: impl Into<serde_json::Value>) -> Output {
        let (_tx, rx) = watch::channel(OutputState::Resolved(value.into()));
        Output { rx }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> OutputState {
        self.rx.borrow().clone()
    }

    /// Resolved value, if any
    pub fn value(&self) -> Option<serde_json::Value> {
        match &*self.rx.borrow() {
            OutputState::Resolved(v) => Some(v.clone()),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.rx.borrow().is_pending()
    }

    pub fn is_resolved(&self) -> bool {
        matches!(&*self.rx.borrow(), OutputState::Resolved(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(&*self.rx.borrow(), OutputState::Failed(_))
    }

    /// Wait until the output is resolved or failed
    pub async fn wait(&self) -> OutputState {
        let mut rx = self.rx.clone();
        match rx.wait_for(|state| !state.is_pending()).await {
            Ok(state) => state.clone(),
            // Only reachable if the sender vanished without settling, which
            // the resolver's Drop rules out
            Err(_) => OutputState::Failed("resolver dropped".to_string()),
        }
    }
}

impl From<&str> for Output {
    fn from(value: &str) -> Self {
        Output::known(value)
    }
}

impl From<String> for Output {
    fn from(value: String) -> Self {
        Output::known(value)
    }
}

impl From<serde_json::Value> for Output {
    fn from(value: serde_json::Value) -> Self {
        Output::known(value)
    }
}

impl From<&Output> for Output {
    fn from(value: &Output) -> Self {
        value.clone()
    }
}

/// Write side of a pending [`Output`]
#[derive(Debug)]
pub struct OutputResolver {
    tx: watch::Sender<OutputState>,
}

impl OutputResolver {
    pub fn resolve(self, value: impl Into<serde_json::Value>) {
        self.tx.send_replace(OutputState::Resolved(value.into()));
    }

    pub fn fail(self, message: impl Into<String>) {
        self.tx.send_replace(OutputState::Failed(message.into()));
    }
}

impl Drop for OutputResolver {
    fn drop(&mut self) {
        if self.tx.borrow().is_pending() {
            self.tx
                .send_replace(OutputState::Failed("resolver dropped".to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pending_then_resolved() {
        let (output, resolver) = Output::pending();
        assert!(output.is_pending());
        assert_eq!(output.value(), None);

        resolver.resolve("vpc-0123abcd");
        assert!(output.is_resolved());
        assert_eq!(output.value(), Some(json!("vpc-0123abcd")));
    }

    #[test]
    fn test_pending_then_failed() {
        let (output, resolver) = Output::pending();
        resolver.fail("quota exceeded");
        assert!(output.is_failed());
        assert_eq!(output.state(), OutputState::Failed("quota exceeded".to_string()));
        assert_eq!(output.value(), None);
    }

    #[test]
    fn test_dropped_resolver_fails_output() {
        let (output, resolver) = Output::pending();
        drop(resolver);
        assert!(output.is_failed());
    }

    #[test]
    fn test_resolved_value_survives_resolver_drop() {
        let (output, resolver) = Output::pending();
        resolver.resolve(json!(42));
        assert_eq!(output.value(), Some(json!(42)));
    }

    #[test]
    fn test_clones_share_state() {
        let (output, resolver) = Output::pending();
        let other = output.clone();
        resolver.resolve("vpc-1");
        assert_eq!(other.value(), Some(json!("vpc-1")));
    }

    #[test]
    fn test_known_values() {
        let a: Output = "plain".into();
        let b: Output = json!({"k": 1}).into();
        assert_eq!(a.value(), Some(json!("plain")));
        assert_eq!(b.value(), Some(json!({"k": 1})));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(OutputState::Pending.to_string(), "[unknown]");
        assert_eq!(OutputState::Resolved(json!("vpc-1")).to_string(), "vpc-1");
        assert_eq!(OutputState::Resolved(json!(3)).to_string(), "3");
        assert_eq!(
            OutputState::Failed("boom".to_string()).to_string(),
            "[failed: boom]"
        );
    }

    #[tokio::test]
    async fn test_wait_wakes_on_resolve() {
        let (output, resolver) = Output::pending();
        let waiter = tokio::spawn({
            let output = output.clone();
            async move { output.wait().await }
        });

        tokio::task::yield_now().await;
        resolver.resolve("vpc-late");

        let state = waiter.await.unwrap();
        assert_eq!(state, OutputState::Resolved(json!("vpc-late")));
    }

    #[test]
    fn test_wait_on_settled_output_returns_immediately() {
        let output = Output::known("now");
        assert_eq!(
            tokio_test::block_on(output.wait()),
            OutputState::Resolved(json!("now"))
        );

        let (failed, resolver) = Output::pending();
        resolver.fail("denied");
        assert_eq!(
            tokio_test::block_on(failed.wait()),
            OutputState::Failed("denied".to_string())
        );
    }
}
