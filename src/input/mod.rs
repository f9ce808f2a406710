mod reader;

pub use reader::{ImageReader, MAX_IMAGE_SIZE};
