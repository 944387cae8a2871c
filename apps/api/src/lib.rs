//! Vitae: resume layout estimation, export planning, draft persistence, and the HTTP
//! service built on them.
//!
//! The layout modules are host-facing: a live preview drives `layout::LayoutSession`
//! through `layout::session::ResizeNotifier` and measures with
//! `layout::measure::measure_deferred`. The binary only serves the HTTP routes.

pub mod autosave;
pub mod config;
pub mod errors;
pub mod export;
pub mod layout;
pub mod llm_client;
pub mod mailer;
pub mod models;
pub mod optimize;
pub mod routes;
pub mod state;
pub mod templates;
