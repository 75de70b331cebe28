use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Language of user-facing notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

impl Locale {
    /// Notification shown once the gallery record is written.
    pub fn success_message(self) -> &'static str {
        match self {
            Locale::Es => "¡Foto guardada exitosamente! 🎉",
            Locale::En => "Photo saved successfully! 🎉",
        }
    }

    /// Label shown next to the progress bar while a run is active.
    pub fn uploading_message(self) -> &'static str {
        match self {
            Locale::Es => "Subiendo tu foto...",
            Locale::En => "Uploading your photo...",
        }
    }
}

impl FromStr for Locale {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "es" | "es-es" | "es-mx" => Ok(Locale::Es),
            "en" | "en-us" | "en-gb" => Ok(Locale::En),
            _ => Err(anyhow::anyhow!("Unsupported locale: {}", s)),
        }
    }
}

impl Display for Locale {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Locale::Es => write!(f, "es"),
            Locale::En => write!(f, "en"),
        }
    }
}
