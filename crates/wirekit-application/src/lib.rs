//! Application Layer - wirekit
//!
//! Boundary contracts between the component model and the container
//! machinery. Everything here is a trait; implementations live in
//! `wirekit-infrastructure`.
//!
//! ## Ports
//!
//! - `ports::configure`: configuration lookups by dotted path
//! - `ports::registry`: the definition registry and its queries
//! - `ports::processors`: post processor hooks around component creation
//! - `ports::aware`: setter injection of container handles
//! - `ports::scanner`: field discovery over component metadata
//! - `ports::factory`: the component factory and typed lookups
//! - `ports::runner`: callbacks run once the container is refreshed

pub mod ports;

pub use ports::*;
