//! Service layer for finsum business logic.
//!
//! This module contains domain logic separated from UI concerns.
//! Sessions can be driven by the CLI or any other front end.

pub mod session;

pub use session::{BatchOutcome, Session, SessionError, SessionEvent};
