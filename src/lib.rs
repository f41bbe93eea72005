//! finsum: identification, analysis and summarization of financial documents.
//!
//! The [`store::DocumentStore`] tracks each document's lifecycle from remote
//! service responses; a [`services::Session`] drives it through a
//! [`service::DocumentService`].

pub mod cli;
pub mod config;
pub mod models;
pub mod service;
pub mod services;
pub mod store;

pub use config::Settings;
pub use models::{DocumentId, DocumentRecord, LifecycleStep};
pub use service::{DocumentService, HttpDocumentService, ServiceError};
pub use services::{BatchOutcome, Session, SessionError, SessionEvent};
pub use store::{DocumentStore, SelectionSet, StoreSnapshot};
