//! Provisioning context
//!
//! A [`ProvisioningContext`] collects the resources and outputs a program
//! declares. It is passed explicitly to the program instead of living in a
//! process-wide global, and goes through `new` (init), `declare_*` /
//! `export_output` (collect) and [`ProvisioningContext::finalize`].
//!
//! ```
//! use plumin_cloud::ProvisioningContext;
//! use std::collections::BTreeMap;
//!
//! let mut ctx = ProvisioningContext::new("create-vpc", "dev");
//! let tags = BTreeMap::from([("Name".to_string(), "my-vpc".to_string())]);
//! let vpc = ctx.declare_network("my-vpc", "10.0.0.0/16", tags)?;
//! ctx.export_output("vpc_id", vpc.id())?;
//!
//! let deployment = ctx.finalize();
//! assert!(vpc.id().is_pending());
//! assert_eq!(deployment.resources().len(), 1);
//! # Ok::<(), plumin_cloud::CloudError>(())
//! ```

use crate::cidr::CidrBlock;
use crate::error::{CloudError, NameScope, Result};
use crate::output::{Output, OutputResolver, OutputState};
use crate::provider::{ResourceConfig, ResourceSet};
use crate::resource::{ResourceDescriptor, ResourceKind};
use std::collections::{BTreeMap, HashMap};

/// Collects registrations for one provisioning run
#[derive(Debug)]
pub struct ProvisioningContext {
    project: String,
    stack: String,
    resources: Vec<ResourceDescriptor>,
    resolvers: HashMap<String, OutputResolver>,
    outputs: BTreeMap<String, Output>,
}

impl ProvisioningContext {
    pub fn new(project: impl Into<String>, stack: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            stack: stack.into(),
            resources: Vec::new(),
            resolvers: HashMap::new(),
            outputs: BTreeMap::new(),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn stack(&self) -> &str {
        &self.stack
    }

    /// Declare a virtual private cloud.
    ///
    /// `address_block` must be CIDR notation. The returned descriptor's
    /// [`id`](ResourceDescriptor::id) stays pending until an engine applies
    /// the finalized deployment.
    pub fn declare_network(
        &mut self,
        logical_name: &str,
        address_block: &str,
        tags: BTreeMap<String, String>,
    ) -> Result<ResourceDescriptor> {
        address_block.parse::<CidrBlock>()?;

        let mut properties = serde_json::Map::new();
        properties.insert(
            "cidr_block".to_string(),
            serde_json::Value::String(address_block.to_string()),
        );
        properties.insert("tags".to_string(), serde_json::to_value(tags)?);

        self.register_resource(ResourceKind::Vpc, logical_name, properties)
    }

    /// Register a resource of any kind
    pub fn register_resource(
        &mut self,
        kind: ResourceKind,
        logical_name: &str,
        properties: serde_json::Map<String, serde_json::Value>,
    ) -> Result<ResourceDescriptor> {
        if logical_name.trim().is_empty() {
            return Err(CloudError::Validation(
                "logical name must not be empty".to_string(),
            ));
        }
        if self.resolvers.contains_key(logical_name) {
            return Err(CloudError::DuplicateName {
                scope: NameScope::Resource,
                name: logical_name.to_string(),
            });
        }

        let (id, resolver) = Output::pending();
        let descriptor =
            ResourceDescriptor::new(kind, logical_name.to_string(), properties, id);

        tracing::debug!("Registered {} {}", kind, logical_name);
        self.resolvers.insert(logical_name.to_string(), resolver);
        self.resources.push(descriptor.clone());
        Ok(descriptor)
    }

    /// Register a named output of the run
    pub fn export_output(&mut self, name: &str, value: impl Into<Output>) -> Result<()> {
        if self.outputs.contains_key(name) {
            return Err(CloudError::DuplicateName {
                scope: NameScope::Output,
                name: name.to_string(),
            });
        }
        self.outputs.insert(name.to_string(), value.into());
        tracing::debug!("Registered output {}", name);
        Ok(())
    }

    pub fn resources(&self) -> &[ResourceDescriptor] {
        &self.resources
    }

    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.outputs.keys().map(String::as_str)
    }

    /// Close registration and hand the collected declarations to an engine
    pub fn finalize(self) -> Deployment {
        Deployment {
            project: self.project,
            stack: self.stack,
            resources: self.resources,
            resolvers: self.resolvers,
            outputs: self.outputs,
        }
    }
}

/// Finalized declarations of one run, ready for an engine.
///
/// Holds the write side of every resource id.
#[derive(Debug)]
pub struct Deployment {
    project: String,
    stack: String,
    resources: Vec<ResourceDescriptor>,
    resolvers: HashMap<String, OutputResolver>,
    outputs: BTreeMap<String, Output>,
}

impl Deployment {
    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn stack(&self) -> &str {
        &self.stack
    }

    pub fn resources(&self) -> &[ResourceDescriptor] {
        &self.resources
    }

    /// Desired state for a provider
    pub fn resource_set(&self) -> ResourceSet {
        let mut set = ResourceSet::new();
        for resource in &self.resources {
            set.add(ResourceConfig::new(
                resource.kind(),
                resource.logical_name(),
                resource.properties().clone(),
            ));
        }
        set
    }

    /// Settle a resource's id. Fails if the resource is unknown or its id
    /// was already settled.
    pub fn resolve(&mut self, logical_name: &str, id: impl Into<String>) -> Result<()> {
        let resolver = self.take_resolver(logical_name)?;
        let id = id.into();
        tracing::info!("Resolved {} -> {}", logical_name, id);
        resolver.resolve(id);
        Ok(())
    }

    /// Mark a resource's id as failed
    pub fn fail(&mut self, logical_name: &str, message: impl Into<String>) -> Result<()> {
        let resolver = self.take_resolver(logical_name)?;
        let message = message.into();
        tracing::warn!("Resolution of {} failed: {}", logical_name, message);
        resolver.fail(message);
        Ok(())
    }

    fn take_resolver(&mut self, logical_name: &str) -> Result<OutputResolver> {
        self.resolvers.remove(logical_name).ok_or_else(|| {
            CloudError::StateError(format!(
                "no pending id for resource '{}' (unknown or already resolved)",
                logical_name
            ))
        })
    }

    /// Logical names whose id has not been settled yet
    pub fn unresolved(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.resolvers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Current state of every exported output
    pub fn outputs(&self) -> BTreeMap<String, OutputState> {
        self.outputs
            .iter()
            .map(|(name, output)| (name.clone(), output.state()))
            .collect()
    }

    /// Values of every exported output, or the first pending/failed one as an error
    pub fn resolved_outputs(&self) -> Result<BTreeMap<String, serde_json::Value>> {
        let mut values = BTreeMap::new();
        for (name, output) in &self.outputs {
            match output.state() {
                OutputState::Resolved(v) => {
                    values.insert(name.clone(), v);
                }
                OutputState::Pending => return Err(CloudError::OutputPending(name.clone())),
                OutputState::Failed(message) => {
                    return Err(CloudError::OutputFailed {
                        name: name.clone(),
                        message,
                    });
                }
            }
        }
        Ok(values)
    }
}
