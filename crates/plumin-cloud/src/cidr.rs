//! CIDR notation address blocks
//!
//! Only the syntax is checked here. Whether the range is usable, has its host
//! bits cleared, or overlaps another network is left to the provider.

use crate::error::{CloudError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::net::IpAddr;
use std::str::FromStr;

/// A syntactically valid `address/prefix` block such as `10.0.0.0/16`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CidrBlock {
    addr: IpAddr,
    prefix: u8,
}

impl CidrBlock {
    pub fn new(addr: IpAddr, prefix: u8) -> Result<Self> {
        let max = max_prefix(&addr);
        if prefix > max {
            return Err(CloudError::Validation(format!(
                "prefix length /{} exceeds /{} for {}",
                prefix, max, addr
            )));
        }
        Ok(Self { addr, prefix })
    }

    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    pub fn is_ipv4(&self) -> bool {
        self.addr.is_ipv4()
    }
}

fn max_prefix(addr: &IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

impl FromStr for CidrBlock {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| {
            CloudError::Validation(format!("invalid CIDR block '{}': {}", s, reason))
        };

        let (addr, prefix) = s
            .split_once('/')
            .ok_or_else(|| invalid("missing '/prefix'"))?;

        let addr: IpAddr = addr.parse().map_err(|_| invalid("malformed address"))?;

        // u8::from_str accepts a leading '+', so check the digits ourselves
        let well_formed = !prefix.is_empty()
            && prefix.len() <= 3
            && prefix.bytes().all(|b| b.is_ascii_digit())
            && (prefix == "0" || !prefix.starts_with('0'));
        if !well_formed {
            return Err(invalid("malformed prefix length"));
        }
        let prefix: u8 = prefix
            .parse()
            .map_err(|_| invalid("malformed prefix length"))?;

        if prefix > max_prefix(&addr) {
            return Err(invalid("prefix length out of range"));
        }

        Ok(Self { addr, prefix })
    }
}

impl std::fmt::Display for CidrBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix)
    }
}

impl Serialize for CidrBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CidrBlock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
