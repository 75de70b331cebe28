use bytes::Bytes;

/// A file handed over by the selector, before validation.
#[derive(Debug, Clone)]
pub struct MediaAsset {
    pub data: Bytes,
    pub content_type: String,
    pub size: u64,
    pub original_filename: String,
}

impl MediaAsset {
    pub fn new(
        original_filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let data = data.into();
        Self {
            size: data.len() as u64,
            data,
            content_type: content_type.into(),
            original_filename: original_filename.into(),
        }
    }
}

/// Re-encoded output of the compressor.
#[derive(Debug, Clone)]
pub struct CompressedAsset {
    pub data: Bytes,
    pub content_type: &'static str,
    pub width: u32,
    pub height: u32,
    pub size: u64,
}

/// Where a compressed asset lives in blob storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub key: String,
    /// Set once the blob store has resolved a retrieval URL for `key`.
    pub url: Option<String>,
}

impl UploadTarget {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            url: None,
        }
    }

    pub fn resolved(self, url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..self
        }
    }
}
