use serde::{Deserialize, Serialize};

use crate::host::Host;

/// How scanner workers should interpret [`Target::value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Domain,
    Ip,
}

/// Normalized scan target handed to scanner workers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub alias: String,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: TargetType,
}

impl Target {
    /// Derive the target for `host`.
    ///
    /// The domain name wins whenever it is set; the IP address is only used
    /// when the host has no domain name.
    pub fn resolve(host: &Host) -> Self {
        let (kind, value) = if host.domain_name.is_empty() {
            (TargetType::Ip, &host.ip_address)
        } else {
            (TargetType::Domain, &host.domain_name)
        };

        Target {
            alias: host.alias.clone(),
            value: value.clone(),
            kind,
        }
    }
}
