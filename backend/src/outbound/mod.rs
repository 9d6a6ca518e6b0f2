//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **care_api**: reqwest client for the external care REST API, which owns
//!   every account, alert and outage record.
//!
//! Adapters are thin translators between domain types and wire
//! representations. They contain no business logic.

pub mod care_api;
