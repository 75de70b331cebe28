use arfoto_core::{Avatar, Locale, PipelineState, ViewerConfig};
use serde::Serialize;

/// One line of terminal output for a pipeline transition.
pub fn describe_state(state: &PipelineState, locale: Locale) -> Option<String> {
    match state {
        PipelineState::Idle => None,
        PipelineState::Running { progress } => Some(format!(
            "[{:>3}%] {}",
            progress,
            locale.uploading_message()
        )),
        PipelineState::Succeeded => Some(format!("[100%] {}", locale.success_message())),
        PipelineState::Failed { message, .. } => Some(message.clone()),
    }
}

/// Build the avatar for the `ar-link` and `upload` commands. A secondary model
/// makes it a two-model scene.
pub fn avatar_from_args(name: &str, model: &str, secondary: Option<&str>) -> Avatar {
    match secondary {
        Some(secondary) => Avatar::special(name, model, secondary),
        None => Avatar::new(name, model),
    }
}

#[derive(Debug, Serialize)]
pub struct ArLink {
    pub attributes: serde_json::Map<String, serde_json::Value>,
    pub help: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
}

pub fn ar_link(avatar: &Avatar, origin: &str, fallback_url: &str, locale: Locale) -> ArLink {
    let viewer = ViewerConfig::for_avatar(avatar);
    let attributes = viewer
        .attributes()
        .into_iter()
        .map(|(name, value)| (name.to_string(), serde_json::Value::String(value)))
        .collect();
    ArLink {
        attributes,
        help: viewer.help_text(locale),
        intent: arfoto_core::ar::scene_viewer_intent(origin, avatar, fallback_url),
    }
}


/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
