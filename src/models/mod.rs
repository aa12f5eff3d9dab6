pub mod alias;
pub mod image;

pub use alias::*;
pub use image::*;
