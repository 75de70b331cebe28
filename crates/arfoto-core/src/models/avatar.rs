use serde::{Deserialize, Serialize};

/// A named 3D model shown through the AR viewer.
///
/// Special avatars form a two-model scene: `file` is previewed in the page and
/// `secondary_file` is only added once the platform AR session opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Avatar {
    pub name: String,
    pub file: String,
    #[serde(default)]
    pub is_special: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_file: Option<String>,
}

impl Avatar {
    pub fn new(name: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            is_special: false,
            secondary_file: None,
        }
    }

    /// Build a two-model scene avatar.
    pub fn special(
        name: impl Into<String>,
        file: impl Into<String>,
        secondary_file: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            is_special: true,
            secondary_file: Some(secondary_file.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_catalog_entry() {
        let json = r#"{"name":"Papá Noel","file":"/models/santa.glb","isSpecial":true,"secondaryFile":"/models/tree.glb"}"#;
        let avatar: Avatar = serde_json::from_str(json).unwrap();
        assert_eq!(
            avatar,
            Avatar::special("Papá Noel", "/models/santa.glb", "/models/tree.glb")
        );
    }

    #[test]
    fn test_deserialize_defaults() {
        let avatar: Avatar =
            serde_json::from_str(r#"{"name":"Robot","file":"/models/robot.glb"}"#).unwrap();
        assert!(!avatar.is_special);
        assert!(avatar.secondary_file.is_none());
    }
}
