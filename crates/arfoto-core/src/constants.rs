//! Pipeline defaults.

/// Upload ceiling: files of this size or larger are rejected.
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Content types accepted by the validator. `image/jpg` is non-standard but
/// some mobile browsers report it.
pub const ALLOWED_IMAGE_CONTENT_TYPES: [&str; 4] =
    ["image/jpeg", "image/jpg", "image/png", "image/webp"];

pub const DEFAULT_MAX_IMAGE_WIDTH: u32 = 1920;
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Every compressed asset is re-encoded to this format.
pub const OUTPUT_CONTENT_TYPE: &str = "image/jpeg";
pub const OUTPUT_EXTENSION: &str = "jpg";

pub const DEFAULT_STORAGE_KEY_PREFIX: &str = "fotos_feria";
pub const DEFAULT_STORAGE_KEY_LABEL: &str = "feria";
pub const DEFAULT_GALLERY_COLLECTION: &str = "galeria";

/// Accept filter handed to the platform file picker.
pub const FILE_INPUT_ACCEPT: &str = "image/*";
