//! Plumin declarative provisioning
//!
//! This crate provides the resource declaration model and a minimal
//! provisioning engine. A program declares resources and outputs on a
//! [`ProvisioningContext`], finalizes it into a [`Deployment`], and an
//! [`Engine`] drives the deployment through a [`CloudProvider`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   plumin CLI                     │
//! │            (preview / up / destroy)              │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                 plumin-cloud                     │
//! │  ┌──────────────────┐  ┌──────────────────────┐ │
//! │  │ ProvisioningCtx  │─▶│ Engine (plan/apply)  │ │
//! │  │ Output handles   │  │ State Mgmt           │ │
//! │  └──────────────────┘  └──────────┬───────────┘ │
//! │                trait CloudProvider │             │
//! └────────────────────────────────────┼────────────┘
//!                                      │
//!                              ┌───────▼───────┐
//!                              │     local     │
//!                              │   provider    │
//!                              └───────────────┘
//! ```

pub mod action;
pub mod cidr;
pub mod context;
pub mod engine;
pub mod error;
pub mod output;
pub mod provider;
pub mod resource;
pub mod state;

// Re-exports
pub use action::{Action, ActionResult, ActionType, ApplyResult, Plan, PlanSummary};
pub use cidr::CidrBlock;
pub use context::{Deployment, ProvisioningContext};
pub use engine::{Engine, UpResult};
pub use error::{CloudError, NameScope, Result};
pub use output::{Output, OutputResolver, OutputState};
pub use provider::{AuthStatus, CloudProvider, ResourceConfig, ResourceSet};
pub use resource::{ResourceDescriptor, ResourceKind};
pub use state::{GlobalState, ProviderState, ResourceState, StateLock, StateManager};
