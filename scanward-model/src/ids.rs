use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ModelError;

/// Storage-assigned identifier of a tenant-owned host.
///
/// Callers hand host IDs around as decimal strings; [`HostId::parse`] is the
/// single place those strings become typed IDs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
pub struct HostId(pub i64);

impl HostId {
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        if raw.is_empty() {
            return Err(ModelError::EmptyId("host"));
        }
        match raw.parse::<i64>() {
            Ok(value) if value > 0 => Ok(HostId(value)),
            _ => Err(ModelError::InvalidId {
                kind: "host",
                raw: raw.to_string(),
            }),
        }
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl FromStr for HostId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a catalogued scan tool.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
pub struct ToolId(pub i64);

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Serialize,
            Deserialize,
        )]
        #[serde(transparent)]
        #[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn parse(raw: &str) -> Result<Self, ModelError> {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(ModelError::EmptyId($kind));
                }
                Uuid::parse_str(trimmed).map($name).map_err(|_| {
                    ModelError::InvalidId {
                        kind: $kind,
                        raw: raw.to_string(),
                    }
                })
            }

            pub fn to_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Identifier of a scan; assigned when the scan row is inserted.
    ScanId,
    "scan"
);
uuid_id!(
    /// Tenant that owns hosts and scans.
    TenantId,
    "tenant"
);
uuid_id!(
    /// Operator (user) acting on behalf of a tenant.
    OperatorId,
    "operator"
);

impl ScanId {
    pub fn new() -> Self {
        ScanId(Uuid::now_v7())
    }
}

impl Default for ScanId {
    fn default() -> Self {
        Self::new()
    }
}
