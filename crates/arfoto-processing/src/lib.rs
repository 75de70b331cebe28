//! arfoto processing
//!
//! Turns a selected photo into a gallery entry: validation, JPEG compression,
//! blob upload and the gallery record write, driven by [`UploadDriver`].

pub mod compression;
pub mod upload;
pub mod validator;

pub use compression::{select_filter, ImageCompressor};
pub use upload::{FileSelector, PathSelector, Recorder, SelectionError, UploadDriver, Uploader};
pub use validator::{MediaValidator, ValidationError};
