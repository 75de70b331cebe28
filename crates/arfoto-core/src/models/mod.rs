pub mod avatar;
pub mod gallery;
pub mod media;
pub mod state;

pub use avatar::Avatar;
pub use gallery::{GalleryRecord, NewGalleryRecord};
pub use media::{CompressedAsset, MediaAsset, UploadTarget};
pub use state::{PipelineStage, PipelineState};
