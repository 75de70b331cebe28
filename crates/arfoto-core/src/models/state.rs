use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Progress reported as soon as a file has been selected.
pub const PROGRESS_FILE_SELECTED: u8 = 10;

/// Stages of one pipeline run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Validate,
    Compress,
    Upload,
    ResolveUrl,
    Record,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 5] = [
        PipelineStage::Validate,
        PipelineStage::Compress,
        PipelineStage::Upload,
        PipelineStage::ResolveUrl,
        PipelineStage::Record,
    ];

    /// Progress indicator value once this stage has completed.
    pub fn completed_progress(self) -> u8 {
        match self {
            PipelineStage::Validate => 25,
            PipelineStage::Compress => 50,
            PipelineStage::Upload => 75,
            PipelineStage::ResolveUrl => 90,
            PipelineStage::Record => 100,
        }
    }

    /// Stages that wait on a remote acknowledgement.
    pub fn is_network(self) -> bool {
        matches!(
            self,
            PipelineStage::Upload | PipelineStage::ResolveUrl | PipelineStage::Record
        )
    }
}

impl Display for PipelineStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            PipelineStage::Validate => write!(f, "validate"),
            PipelineStage::Compress => write!(f, "compress"),
            PipelineStage::Upload => write!(f, "upload"),
            PipelineStage::ResolveUrl => write!(f, "resolve_url"),
            PipelineStage::Record => write!(f, "record"),
        }
    }
}

/// Status projection observed by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PipelineState {
    #[default]
    Idle,
    Running {
        progress: u8,
    },
    Failed {
        code: &'static str,
        message: String,
    },
    Succeeded,
}

impl PipelineState {
    /// Value for the progress bar. Failed runs show 0, matching the reset that
    /// follows the failure notification.
    pub fn progress(&self) -> u8 {
        match self {
            PipelineState::Idle | PipelineState::Failed { .. } => 0,
            PipelineState::Running { progress } => *progress,
            PipelineState::Succeeded => 100,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, PipelineState::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, PipelineState::Running { .. })
    }

    /// File-selection controls are disabled while a run is active.
    pub fn accepts_selection(&self) -> bool {
        self.is_idle()
    }

    pub fn failure_code(&self) -> Option<&'static str> {
        match self {
            PipelineState::Failed { code, .. } => Some(code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_progress_is_strictly_increasing() {
        let mut last = PROGRESS_FILE_SELECTED;
        for stage in PipelineStage::ALL {
            assert!(stage.completed_progress() > last, "{stage} does not advance");
            last = stage.completed_progress();
        }
        assert_eq!(last, 100);
    }

    #[test]
    fn test_failed_state_reports_zero_progress() {
        let state = PipelineState::Failed {
            code: "FILE_TOO_LARGE",
            message: "too big".to_string(),
        };
        assert_eq!(state.progress(), 0);
        assert_eq!(state.failure_code(), Some("FILE_TOO_LARGE"));
        assert!(!state.accepts_selection());
    }

    #[test]
    fn test_state_serializes_with_status_tag() {
        let json = serde_json::to_value(PipelineState::Running { progress: 50 }).unwrap();
        assert_eq!(json["status"], "running");
        assert_eq!(json["progress"], 50);
    }
}
