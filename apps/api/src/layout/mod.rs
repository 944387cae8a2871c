// Print layout estimation for the resume preview.
// Heights come from a Renderer (static table or text metrics); the packer turns them
// into A4 pages; the session caches measurements across recomputes.

pub mod font_metrics;
pub mod handlers;
pub mod heights;
pub mod measure;
pub mod packer;
pub mod session;

// Re-export the public API consumed by the route handlers.
pub use measure::{HeuristicRenderer, Renderer, TextMetricsRenderer, TextStyle};
pub use packer::{PageBreak, PageGeometry, PageLayout};
pub use session::LayoutSession;
