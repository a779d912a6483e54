//! The provisioning program

use plumin_cloud::{ProvisioningContext, Result};
use std::collections::BTreeMap;

/// One VPC with a Name tag, exporting its id
pub fn create_vpc(ctx: &mut ProvisioningContext) -> Result<()> {
    let tags = BTreeMap::from([("Name".to_string(), "my-vpc".to_string())]);
    let vpc = ctx.declare_network("my-vpc", "10.0.0.0/16", tags)?;

    ctx.export_output("vpc_id", vpc.id())?;
    Ok(())
}
