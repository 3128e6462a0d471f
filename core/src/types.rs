//! Typed views of `avail.*` results.
//!
//! # Design
//! These are decoded from the lower-cased `Value` tree, so field names here
//! are the API's names folded to lower case. Unknown fields are ignored so
//! additions on the server side do not break decoding.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

/// A data center a Linode can be deployed in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Datacenter {
    #[serde(rename = "datacenterid")]
    pub id: u64,
    pub location: String,
    pub abbr: String,
}

/// An installable distribution image.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Distribution {
    #[serde(rename = "distributionid")]
    pub id: u64,
    pub label: String,
    #[serde(rename = "is64bit", deserialize_with = "flag", default)]
    pub is_64bit: bool,
    #[serde(rename = "minimagesize", default)]
    pub min_image_size: u64,
    #[serde(rename = "requirespvopskernel", deserialize_with = "flag", default)]
    pub requires_pvops_kernel: bool,
    #[serde(rename = "create_dt", default)]
    pub created: Option<String>,
}

/// A bootable kernel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Kernel {
    #[serde(rename = "kernelid")]
    pub id: u64,
    pub label: String,
    #[serde(rename = "isxen", deserialize_with = "flag", default)]
    pub is_xen: bool,
    #[serde(rename = "iskvm", deserialize_with = "flag", default)]
    pub is_kvm: bool,
    #[serde(rename = "ispvops", deserialize_with = "flag", default)]
    pub is_pvops: bool,
}

/// A purchasable plan and its per-datacenter availability.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinodePlan {
    #[serde(rename = "planid")]
    pub id: u64,
    pub label: String,
    pub price: f64,
    #[serde(default)]
    pub hourly: Option<f64>,
    pub ram: u64,
    pub disk: u64,
    pub xfer: u64,
    #[serde(default)]
    pub cores: u32,
    /// Remaining capacity keyed by datacenter id.
    #[serde(default)]
    pub avail: BTreeMap<String, u64>,
}

/// The API reports booleans as `0` / `1`.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(n) => n != 0,
    })
}
