use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::ToolId;

/// A registered scanning capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    pub id: ToolId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Tools every deployment registers at bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinTool {
    Whois,
    DnsLookup,
    Harvester,
    PortScan,
}

impl BuiltinTool {
    pub const ALL: [BuiltinTool; 4] = [
        BuiltinTool::Whois,
        BuiltinTool::DnsLookup,
        BuiltinTool::Harvester,
        BuiltinTool::PortScan,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinTool::Whois => "whois",
            BuiltinTool::DnsLookup => "dns_lookup",
            BuiltinTool::Harvester => "harvester",
            BuiltinTool::PortScan => "port_scan",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            BuiltinTool::Whois => "Registrar and ownership lookup",
            BuiltinTool::DnsLookup => "DNS record enumeration",
            BuiltinTool::Harvester => {
                "Public e-mail, subdomain and employee harvesting"
            }
            BuiltinTool::PortScan => "TCP port and service discovery",
        }
    }
}
