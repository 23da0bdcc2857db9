//! govsearch: hybrid search and grounded chat over government data.
//!
//! The heavy lifting lives in [`govsearch_hybrid`]: result normalisation,
//! merge strategies, the sticky local-fallback resolver and the API client.
//! This crate adds what a front-end needs on top:
//!
//! - **Config**: TOML file plus environment overrides ([`config`])
//! - **Chat**: context retrieval before each turn ([`chat`])
//! - **Session**: history, mode and in-flight state ([`session`])
//! - **Display**: plain-text rendering of results and citations ([`display`])

pub mod chat;
pub mod config;
pub mod display;
pub mod error;
pub mod session;

pub use chat::{ChatContextPolicy, ChatResponse};
pub use config::AppConfig;
pub use error::{AppError, Result};
pub use session::{LoadingIndicator, Session};
