//! DocuMate: chat with PDF documents through a remote document service.
//!
//! The backend does the parsing and answering; this crate keeps the
//! per-document conversations, the active selection and the upload staging in
//! sync with its two endpoints.

pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod notice;
pub mod session;
pub mod staging;
mod ui;

pub use client::{DocumentService, HttpDocumentService};
pub use config::Config;
pub use error::{ApiError, StageError};
pub use session::{SendOutcome, Workspace};
