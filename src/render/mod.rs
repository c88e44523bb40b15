//! Software rendering: pixel surface, text rasterization, and the message
//! compositor.

pub mod compositor;
pub mod surface;
pub mod text;

pub use compositor::{MessageCompositor, RenderMode};
pub use surface::Surface;
pub use text::TextRenderer;
