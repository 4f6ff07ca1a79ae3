//! Application Layer - Ports, services and use cases.
//!
//! This layer defines the interfaces the snapshot depends on and the
//! orchestration that drives them. It never talks to the network directly.

/// Port interfaces for external systems (catalog, history, storage).
pub mod ports;

/// Trade history collector and artifact publisher.
pub mod services;

/// The snapshot use case.
pub mod use_cases;
