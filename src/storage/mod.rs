pub mod file;
pub mod traits;

pub use file::FileImageStore;
pub use traits::ImageStore;
