//! Page rendering.
//!
//! Turns a named page plus a serializable payload into HTML.

mod page_renderer;

pub use page_renderer::{Page, PageRenderer};
