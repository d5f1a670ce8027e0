pub mod hosts;
pub mod scans;
pub mod tools;

pub use hosts::PostgresHostsRepository;
pub use scans::{PostgresScanStore, PostgresScanTransaction};
pub use tools::PostgresToolsRepository;
