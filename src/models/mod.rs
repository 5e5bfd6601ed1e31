pub mod img2img;
pub mod outcome;

pub use img2img::*;
pub use outcome::*;
