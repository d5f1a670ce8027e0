//! Repository ports consumed by the scan orchestration services.
//! Postgres implementations live under `database::infrastructure::postgres`.

pub mod hosts;
pub mod scans;
pub mod tools;
