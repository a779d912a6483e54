//! Local simulated cloud provider for Plumin
//!
//! This crate implements the CloudProvider trait against a simulated cloud
//! kept in memory or in a JSON file, so programs can be previewed and applied
//! without any account.
//!
//! # Features
//!
//! - Network (VPC) management (create, update in place, delete)
//! - Provider ids assigned as `vpc-xxxxxxxx` from a persisted sequence
//! - Re-running an unchanged program plans no changes
//!
//! # Example
//!
//! ```ignore
//! use plumin_cloud_local::LocalProvider;
//! use plumin_cloud::CloudProvider;
//!
//! let provider = LocalProvider::open(".plumin/local-cloud.json").await?;
//!
//! let plan = provider.plan(&deployment.resource_set()).await?;
//! let result = provider.apply(&plan).await?;
//! ```

pub mod error;
pub mod provider;
pub mod store;

pub use error::{LocalError, Result};
pub use provider::LocalProvider;
pub use store::{CLOUD_FILE, LocalStore, NetworkConfig, NetworkInfo};
