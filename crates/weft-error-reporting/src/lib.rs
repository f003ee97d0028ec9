//! Diagnostic messages for Weft.
//!
//! Every recoverable problem in the render core (an unresolved slot
//! selector, a handler that failed on one node) is reported as a
//! [`DiagnosticMessage`] rather than an `Err`. Fatal problems are typed
//! errors in the crates that raise them; this crate only carries the
//! message structure and the aggregation machinery.
//!
//! # Structure
//!
//! - [`DiagnosticMessage`]: kind + optional stable code + title + problem
//!   statement + detail bullets + hints + location
//! - [`DiagnosticMessageBuilder`]: the recommended way to construct messages
//! - [`DiagnosticCollector`]: ordered aggregation across a render
//! - [`catalog`]: the stable error-code catalog (`W-RES-1`, `W-SLT-1`, ...)

pub mod builder;
pub mod catalog;
pub mod collector;
pub mod diagnostic;

pub use builder::DiagnosticMessageBuilder;
pub use catalog::{ERROR_CATALOG, ErrorCodeInfo, get_error_info};
pub use collector::DiagnosticCollector;
pub use diagnostic::{DetailItem, DetailKind, DiagnosticKind, DiagnosticMessage, Location};
