pub mod render;

pub use render::{FrameStats, SkiaRenderer, render_text_pixmap};
