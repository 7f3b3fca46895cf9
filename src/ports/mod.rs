//! Port traits: the seams between the domain core and the outside world.

pub mod data_port;
pub mod catalog_port;
pub mod rate_limit_port;
pub mod config_port;
pub mod report_port;
