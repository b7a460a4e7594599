//! Common utilities and abstractions for services

/// Watchable value cells for bridge state
pub mod property;

pub use property::Property;
