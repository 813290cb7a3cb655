//! cloudnotes-core - Core library for cloudnotes
//!
//! This crate binds a UI layer to a managed backend (auth, GraphQL data API,
//! object storage). It reconciles the initial session fetch with the live
//! auth event stream into an observable UI model and exposes fire-and-forget
//! note and image operations.

pub mod auth;
pub mod backend;
pub mod config;
pub mod data;
pub mod error;
pub mod models;
pub mod session;
pub mod storage;
pub mod util;

pub use backend::{AccessLevel, BackendClient, SignInRequest};
pub use error::{Error, Result};
pub use models::{Note, NoteId, NoteRecord};
pub use session::{SessionOrchestrator, SignInStatus, Subscription, UiModel};
