//! Shared fixtures for core integration tests.
#![allow(dead_code)]

pub mod bus;
pub mod store;

pub use bus::RecordingBus;
pub use store::{InMemoryStore, RowCounts};

use uuid::Uuid;

use scanward_model::{OperatorId, TenantId};

pub const TENANT: TenantId = TenantId(Uuid::from_u128(0x7E4A_0001));
pub const OTHER_TENANT: TenantId = TenantId(Uuid::from_u128(0x7E4A_0002));
pub const OPERATOR: OperatorId = OperatorId(Uuid::from_u128(0x0BE2_0001));
