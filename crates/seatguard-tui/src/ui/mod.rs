//! Terminal UI module using ratatui.
//!
//! - `render`: Screen rendering and overlays
//! - `input`: Keyboard event handling
//! - `styles`: Color scheme and text styling

pub mod input;
pub mod render;
pub mod styles;
