use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{HostId, OperatorId, TenantId};

/// Login material scanner tools may use against a host.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Person who receives reports about a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rapporteur {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub is_principal: bool,
}

/// A tenant-owned host as persisted by host management.
///
/// At least one of `domain_name` / `ip_address` is non-empty; an empty string
/// means "not set". `alias` is unique across all tenants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    pub id: HostId,
    pub tenant_id: TenantId,
    pub operator_id: OperatorId,
    pub domain_name: String,
    pub ip_address: String,
    pub alias: String,
    #[serde(default)]
    pub credentials: Vec<Credential>,
    #[serde(default)]
    pub rapporteurs: Vec<Rapporteur>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHost {
    pub tenant_id: TenantId,
    pub operator_id: OperatorId,
    pub domain_name: String,
    pub ip_address: String,
    pub alias: String,
    #[serde(default)]
    pub credentials: Vec<Credential>,
    #[serde(default)]
    pub rapporteurs: Vec<Rapporteur>,
}

impl NewHost {
    /// Strip surrounding whitespace from the address fields and alias so a
    /// blank value is stored as "not set".
    pub fn normalized(mut self) -> Self {
        self.domain_name = self.domain_name.trim().to_string();
        self.ip_address = self.ip_address.trim().to_string();
        self.alias = self.alias.trim().to_string();
        self
    }

    /// `true` when a domain name or an IP address is set.
    pub fn has_address(&self) -> bool {
        !self.domain_name.trim().is_empty() || !self.ip_address.trim().is_empty()
    }
}
