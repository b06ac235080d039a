pub mod generation;
pub mod image;
pub mod text;

pub use generation::*;
pub use image::*;
pub use text::*;
