mod driver;
mod recorder;
mod selector;
mod uploader;

pub use driver::UploadDriver;
pub use recorder::Recorder;
pub use selector::{FileSelector, PathSelector, SelectionError};
pub use uploader::Uploader;
