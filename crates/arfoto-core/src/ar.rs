//! AR viewer and file-input descriptors.
//!
//! The 3D viewer widget and the platform file picker are external. This module
//! only describes how to configure them for a given avatar, so the page layer can
//! render one component regardless of avatar kind or capture setup.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::str::FromStr;

use crate::constants::FILE_INPUT_ACCEPT;
use crate::locale::Locale;
use crate::models::Avatar;

/// Characters left alone by `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const AR_MODES: [&str; 3] = ["scene-viewer", "webxr", "quick-look"];

fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// Rendering flags for the model viewer widget.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub src: String,
    pub alt: String,
    pub ar: bool,
    pub ar_modes: Vec<&'static str>,
    pub ar_scale: Option<&'static str>,
    pub camera_controls: bool,
    pub shadow_intensity: f32,
    pub auto_rotate: bool,
    pub rotation_per_second_deg: u16,
    pub camera_orbit: Option<String>,
}

impl ViewerConfig {
    pub fn for_avatar(avatar: &Avatar) -> Self {
        if avatar.is_special {
            // Preview only: the platform session loads both models through the intent link.
            Self {
                src: avatar.file.clone(),
                alt: avatar.name.clone(),
                ar: false,
                ar_modes: Vec::new(),
                ar_scale: None,
                camera_controls: true,
                shadow_intensity: 1.0,
                auto_rotate: true,
                rotation_per_second_deg: 15,
                camera_orbit: Some("0deg 75deg 2.5m".to_string()),
            }
        } else {
            Self {
                src: avatar.file.clone(),
                alt: avatar.name.clone(),
                ar: true,
                ar_modes: AR_MODES.to_vec(),
                ar_scale: Some("auto"),
                camera_controls: true,
                shadow_intensity: 1.0,
                auto_rotate: true,
                rotation_per_second_deg: 30,
                camera_orbit: None,
            }
        }
    }

    /// Widget attributes in declaration order. Boolean attributes carry an empty value.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        let mut attrs = vec![("src", self.src.clone()), ("alt", self.alt.clone())];
        if self.ar {
            attrs.push(("ar", String::new()));
            attrs.push(("ar-modes", self.ar_modes.join(" ")));
        }
        if let Some(scale) = self.ar_scale {
            attrs.push(("ar-scale", scale.to_string()));
        }
        if self.camera_controls {
            attrs.push(("camera-controls", String::new()));
        }
        attrs.push(("shadow-intensity", format!("{}", self.shadow_intensity)));
        if self.auto_rotate {
            attrs.push(("auto-rotate", String::new()));
            attrs.push((
                "rotation-per-second",
                format!("{}deg", self.rotation_per_second_deg),
            ));
        }
        if let Some(orbit) = &self.camera_orbit {
            attrs.push(("camera-orbit", orbit.clone()));
        }
        attrs
    }

    pub fn help_text(&self, locale: Locale) -> &'static str {
        match (self.ar, locale) {
            (true, Locale::Es) => "👆 Arrastra para rotar • 🔍 Pellizca para zoom",
            (true, Locale::En) => "👆 Drag to rotate • 🔍 Pinch to zoom",
            (false, Locale::Es) => "🎄 Vista previa • En AR verás el árbol también",
            (false, Locale::En) => "🎄 Preview • In AR you will see the tree too",
        }
    }
}

/// Android Scene Viewer intent carrying both models of a special scene.
///
/// `origin` is the page origin the model paths are relative to and
/// `fallback_url` is where the browser returns when ARCore is unavailable.
/// Returns `None` for avatars without a secondary model.
pub fn scene_viewer_intent(origin: &str, avatar: &Avatar, fallback_url: &str) -> Option<String> {
    if !avatar.is_special {
        return None;
    }
    let secondary = avatar.secondary_file.as_deref()?;
    let origin = origin.trim_end_matches('/');

    Some(format!(
        "intent://arvr.google.com/scene-viewer/1.0?file={}&file={}&mode=ar_preferred&resizable=false\
         #Intent;scheme=https;package=com.google.ar.core;action=android.intent.action.VIEW;\
         S.browser_fallback_url={};end;",
        encode_component(&format!("{}{}", origin, avatar.file)),
        encode_component(&format!("{}{}", origin, secondary)),
        encode_component(fallback_url),
    ))
}

/// Hint asking the platform picker to open the camera directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureHint {
    Environment,
}

impl CaptureHint {
    pub fn as_attribute(self) -> &'static str {
        match self {
            CaptureHint::Environment => "environment",
        }
    }
}

/// One "request file selection with filter F and capture-hint H" call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRequest {
    pub accept: String,
    pub capture: Option<CaptureHint>,
}

impl FileRequest {
    pub fn gallery() -> Self {
        Self {
            accept: FILE_INPUT_ACCEPT.to_string(),
            capture: None,
        }
    }

    pub fn camera() -> Self {
        Self {
            accept: FILE_INPUT_ACCEPT.to_string(),
            capture: Some(CaptureHint::Environment),
        }
    }
}

/// Which selection buttons the upload panel offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureSources {
    #[default]
    GalleryOnly,
    CameraAndGallery,
}

impl CaptureSources {
    pub fn requests(self) -> Vec<FileRequest> {
        match self {
            CaptureSources::GalleryOnly => vec![FileRequest::gallery()],
            CaptureSources::CameraAndGallery => vec![FileRequest::camera(), FileRequest::gallery()],
        }
    }
}

impl FromStr for CaptureSources {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gallery" | "gallery_only" => Ok(CaptureSources::GalleryOnly),
            "camera_and_gallery" | "both" => Ok(CaptureSources::CameraAndGallery),
            _ => Err(anyhow::anyhow!("Invalid capture sources: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_avatar_enables_ar() {
        let config = ViewerConfig::for_avatar(&Avatar::new("Robot", "/models/robot.glb"));
        let attrs = config.attributes();

        assert!(attrs.contains(&("ar", String::new())));
        assert!(attrs.contains(&("ar-modes", "scene-viewer webxr quick-look".to_string())));
        assert!(attrs.contains(&("rotation-per-second", "30deg".to_string())));
        assert!(attrs.iter().all(|(name, _)| *name != "camera-orbit"));
    }

    #[test]
    fn test_special_avatar_is_preview_only() {
        let avatar = Avatar::special("Navidad", "/models/santa.glb", "/models/tree.glb");
        let config = ViewerConfig::for_avatar(&avatar);

        assert!(!config.ar);
        assert!(config.attributes().iter().all(|(name, _)| *name != "ar"));
        assert_eq!(config.camera_orbit.as_deref(), Some("0deg 75deg 2.5m"));
        assert!(config.help_text(Locale::Es).contains("árbol"));
    }

    #[test]
    fn test_scene_viewer_intent_encodes_both_models() {
        let avatar = Avatar::special("Navidad", "/models/santa claus.glb", "/models/tree.glb");
        let url = scene_viewer_intent(
            "https://feria.example/",
            &avatar,
            "https://feria.example/ar?x=1",
        )
        .unwrap();

        assert!(url.starts_with("intent://arvr.google.com/scene-viewer/1.0?file=https%3A%2F%2Fferia.example%2Fmodels%2Fsanta%20claus.glb&file=https%3A%2F%2Fferia.example%2Fmodels%2Ftree.glb&mode=ar_preferred&resizable=false#Intent;"));
        assert!(url.ends_with("S.browser_fallback_url=https%3A%2F%2Fferia.example%2Far%3Fx%3D1;end;"));
    }

    #[test]
    fn test_scene_viewer_intent_requires_special_scene() {
        let avatar = Avatar::new("Robot", "/models/robot.glb");
        assert!(scene_viewer_intent("https://feria.example", &avatar, "/").is_none());
    }

    #[test]
    fn test_capture_sources_requests() {
        assert_eq!(
            CaptureSources::GalleryOnly.requests(),
            vec![FileRequest::gallery()]
        );
        let both = CaptureSources::CameraAndGallery.requests();
        assert_eq!(both.len(), 2);
        assert_eq!(both[0].capture, Some(CaptureHint::Environment));
        assert_eq!(both[1].accept, "image/*");
    }
}
