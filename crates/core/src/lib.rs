//! `hrdesk-core`
//!
//! Shared building blocks for the employee-management client.
//!
//! This crate holds **pure** types (no HTTP, no storage): identifiers, the
//! backend's response envelope and the client-side validation error.

pub mod envelope;
pub mod error;
pub mod id;

pub use envelope::{ApiEnvelope, Pagination};
pub use error::{DomainError, DomainResult};
pub use id::{LeaveId, SalaryId, UserId};
