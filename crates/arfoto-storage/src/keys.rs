//! Shared key generation for storage backends.
//!
//! Key format: `{prefix}/{label}_{millis}_{name}.{ext}`.

use regex::Regex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::LazyLock;

use crate::traits::{StorageError, StorageResult};

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Replace every run of whitespace with a single `_`.
pub fn sanitize_name(name: &str) -> String {
    WHITESPACE_RUN.replace_all(name, "_").into_owned()
}

/// Reject keys that could escape a backend's root.
pub fn validate_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty() || storage_key.contains("..") || storage_key.starts_with('/') {
        return Err(StorageError::InvalidKey(format!(
            "Storage key contains invalid characters: {}",
            storage_key
        )));
    }
    Ok(())
}

fn wall_clock_millis() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

/// Generates unique storage keys for one pipeline instance.
///
/// The timestamp is the wall clock in milliseconds, bumped so that it is strictly
/// greater than the previous one handed out by this generator.
pub struct StorageKeyGenerator {
    prefix: String,
    label: String,
    extension: String,
    clock: fn() -> u64,
    last_millis: AtomicU64,
}

impl StorageKeyGenerator {
    pub fn new(
        prefix: impl Into<String>,
        label: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        Self::with_clock(prefix, label, extension, wall_clock_millis)
    }

    pub fn with_clock(
        prefix: impl Into<String>,
        label: impl Into<String>,
        extension: impl Into<String>,
        clock: fn() -> u64,
    ) -> Self {
        Self {
            prefix: prefix.into().trim_end_matches('/').to_string(),
            label: label.into(),
            extension: extension.into(),
            clock,
            last_millis: AtomicU64::new(0),
        }
    }

    fn next_millis(&self) -> u64 {
        let now = (self.clock)();
        let (Ok(previous) | Err(previous)) =
            self.last_millis
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                    Some(now.max(last + 1))
                });
        now.max(previous + 1)
    }

    /// Generate the key for a photo of the avatar called `name`.
    pub fn generate(&self, name: &str) -> String {
        let millis = self.next_millis();
        format!(
            "{}/{}_{}_{}.{}",
            self.prefix,
            self.label,
            millis,
            sanitize_name(name),
            self.extension
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frozen_clock() -> u64 {
        1_700_000_000_000
    }

    #[test]
    fn test_sanitize_collapses_whitespace_runs() {
        assert_eq!(sanitize_name("Papá  Noel"), "Papá_Noel");
        assert_eq!(sanitize_name("a\tb \n c"), "a_b_c");
        assert_eq!(sanitize_name(" edge "), "_edge_");
        assert_eq!(sanitize_name("Robot"), "Robot");
    }

    #[test]
    fn test_generate_key_layout() {
        let keys = StorageKeyGenerator::with_clock("fotos_feria", "feria", "jpg", frozen_clock);
        assert_eq!(
            keys.generate("Papá Noel"),
            "fotos_feria/feria_1700000000000_Papá_Noel.jpg"
        );
    }

    #[test]
    fn test_generate_is_unique_under_frozen_clock() {
        let keys = StorageKeyGenerator::with_clock("fotos_feria", "feria", "jpg", frozen_clock);
        let first = keys.generate("Robot");
        let second = keys.generate("Robot");
        assert_ne!(first, second);
        assert_eq!(second, "fotos_feria/feria_1700000000001_Robot.jpg");
    }

    #[test]
    fn test_trailing_slash_in_prefix_is_dropped() {
        let keys = StorageKeyGenerator::with_clock("photos/", "feria", "jpg", frozen_clock);
        assert!(keys.generate("x").starts_with("photos/feria_"));
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("fotos_feria/a.jpg").is_ok());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("").is_err());
    }
}
