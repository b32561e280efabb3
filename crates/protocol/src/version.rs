//! Protocol versioning for daemon IPC communication.
//!
//! # Version History
//!
//! | Version | Changes |
//! |---------|---------|
//! | 1 | Initial protocol version |
//!
//! # Breaking Changes (require PROTOCOL_VERSION bump)
//!
//! - Removing or renaming fields of `UsageData` or `SiteAggregate`
//! - Changing field types
//! - Removing request, response or `TabEvent` variants
//!
//! # Non-Breaking Changes (safe without version bump)
//!
//! - Adding new optional fields with `#[serde(default)]`
//! - Adding new request/response variants
//! - Adding new `TabEvent` variants
//!
//! `MIN_SUPPORTED_VERSION` stays one behind `PROTOCOL_VERSION` once a second
//! version exists, so a client and daemon one release apart can still talk.

/// Current protocol version. Bump when making breaking changes.
pub const PROTOCOL_VERSION: u32 = 1;

/// Minimum protocol version this build can communicate with.
pub const MIN_SUPPORTED_VERSION: u32 = 1;
