//! Upload driver: validate → compress → upload → resolve URL → record.
//!
//! One driver runs at most one upload at a time. Every state transition is
//! published on a watch channel (latest state) and a broadcast channel (full
//! sequence), so a UI can both render the current progress bar and replay
//! what happened.

use arfoto_core::models::state::PROGRESS_FILE_SELECTED;
use arfoto_core::{
    Avatar, ErrorMetadata, FileRequest, GalleryRecord, Locale, LogLevel, MediaAsset,
    PipelineConfig, PipelineError, PipelineStage, PipelineState,
};
use arfoto_db::DocumentStore;
use arfoto_storage::BlobStore;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;

use super::recorder::Recorder;
use super::selector::FileSelector;
use super::uploader::Uploader;
use crate::compression::ImageCompressor;
use crate::validator::MediaValidator;

const TRANSITION_BUFFER: usize = 32;

pub struct UploadDriver {
    validator: MediaValidator,
    compressor: ImageCompressor,
    uploader: Uploader,
    recorder: Recorder,
    locale: Locale,
    stage_timeout: Option<Duration>,
    state: watch::Sender<PipelineState>,
    transitions: broadcast::Sender<PipelineState>,
}

impl UploadDriver {
    pub fn new(
        validator: MediaValidator,
        compressor: ImageCompressor,
        uploader: Uploader,
        recorder: Recorder,
    ) -> Self {
        let (state, _) = watch::channel(PipelineState::Idle);
        let (transitions, _) = broadcast::channel(TRANSITION_BUFFER);
        Self {
            validator,
            compressor,
            uploader,
            recorder,
            locale: Locale::default(),
            stage_timeout: None,
            state,
            transitions,
        }
    }

    pub fn from_config(
        config: &PipelineConfig,
        blobs: Arc<dyn BlobStore>,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        Self::new(
            MediaValidator::from_config(config),
            ImageCompressor::from_config(config),
            Uploader::from_config(blobs, config),
            Recorder::new(documents, config.gallery_collection.clone()),
        )
        .with_locale(config.locale)
        .with_stage_timeout(config.stage_timeout)
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Bound each network stage. `None` waits indefinitely.
    pub fn with_stage_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stage_timeout = timeout;
        self
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn state(&self) -> PipelineState {
        self.state.borrow().clone()
    }

    /// Latest-state view.
    pub fn watch(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    /// Every transition from now on, in order.
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineState> {
        self.transitions.subscribe()
    }

    fn publish(&self, next: PipelineState) {
        self.state.send_replace(next.clone());
        // No subscribers is fine.
        let _ = self.transitions.send(next);
    }

    /// Leave `Failed` after the user dismissed the notification.
    pub fn acknowledge(&self) {
        let changed = self.state.send_if_modified(|state| {
            if matches!(state, PipelineState::Failed { .. }) {
                *state = PipelineState::Idle;
                true
            } else {
                false
            }
        });
        if changed {
            let _ = self.transitions.send(PipelineState::Idle);
        }
    }

    /// Return to `Idle` from any finished state. Rejected while a run is active.
    pub fn reset(&self) -> Result<(), PipelineError> {
        let mut busy = false;
        let changed = self.state.send_if_modified(|state| match state {
            PipelineState::Running { .. } => {
                busy = true;
                false
            }
            PipelineState::Idle => false,
            _ => {
                *state = PipelineState::Idle;
                true
            }
        });
        if busy {
            return Err(PipelineError::Busy);
        }
        if changed {
            let _ = self.transitions.send(PipelineState::Idle);
        }
        Ok(())
    }

    /// Claim the driver for a new run. Only an idle driver can start one.
    fn begin(&self) -> Result<(), PipelineError> {
        let started = self.state.send_if_modified(|state| {
            if state.is_idle() {
                *state = PipelineState::Running {
                    progress: PROGRESS_FILE_SELECTED,
                };
                true
            } else {
                false
            }
        });
        if !started {
            tracing::debug!(state = ?self.state(), "Rejected upload: driver is not idle");
            return Err(PipelineError::Busy);
        }
        let _ = self.transitions.send(PipelineState::Running {
            progress: PROGRESS_FILE_SELECTED,
        });
        Ok(())
    }

    pub async fn run(&self, avatar: &Avatar, asset: MediaAsset) -> Result<GalleryRecord, PipelineError> {
        self.begin()?;
        let result = self.execute(avatar, asset, None).await;
        self.finish(result)
    }

    /// Like [`run`](Self::run), but aborts with `Cancelled` once `cancel` fires.
    /// A blob that was already written stays in storage.
    pub async fn run_with_cancel(
        &self,
        avatar: &Avatar,
        asset: MediaAsset,
        cancel: CancellationToken,
    ) -> Result<GalleryRecord, PipelineError> {
        self.begin()?;
        let result = self.execute(avatar, asset, Some(&cancel)).await;
        self.finish(result)
    }

    /// Ask `selector` for a file and run the pipeline on it.
    ///
    /// Returns `Ok(None)` without touching the state when nothing was selected.
    pub async fn select_and_run(
        &self,
        selector: &dyn FileSelector,
        request: &FileRequest,
        avatar: &Avatar,
    ) -> Result<Option<GalleryRecord>, PipelineError> {
        if !self.state.borrow().accepts_selection() {
            return Err(PipelineError::Busy);
        }

        let asset = match selector.select(request).await {
            Ok(Some(asset)) => asset,
            Ok(None) => {
                tracing::debug!("File picker dismissed");
                return Ok(None);
            }
            Err(e) => {
                tracing::warn!(error = %e, "File selection failed");
                return Err(PipelineError::Selection(e.to_string()));
            }
        };

        self.run(avatar, asset).await.map(Some)
    }

    async fn execute(
        &self,
        avatar: &Avatar,
        asset: MediaAsset,
        cancel: Option<&CancellationToken>,
    ) -> Result<GalleryRecord, PipelineError> {
        let started = Instant::now();
        tracing::info!(
            avatar = %avatar.name,
            file = %asset.original_filename,
            content_type = %asset.content_type,
            size_bytes = asset.size,
            "Upload started"
        );

        self.validator.validate(&asset.content_type, asset.size)?;
        self.advance(PipelineStage::Validate, started);

        let compressed = self
            .stage(
                PipelineStage::Compress,
                cancel,
                self.compressor.compress(asset.data),
            )
            .await?;
        tracing::debug!(
            width = compressed.width,
            height = compressed.height,
            size_bytes = compressed.size,
            "Image compressed"
        );
        self.advance(PipelineStage::Compress, started);

        let target = self.uploader.target_for(avatar);
        self.stage(
            PipelineStage::Upload,
            cancel,
            self.uploader.put(&target, &compressed),
        )
        .await?;
        self.advance(PipelineStage::Upload, started);

        let key = target.key.clone();
        let result = async {
            let target = self
                .stage(
                    PipelineStage::ResolveUrl,
                    cancel,
                    self.uploader.resolve(target),
                )
                .await?;
            self.advance(PipelineStage::ResolveUrl, started);

            let url = target.url.unwrap_or_default();
            let record = self
                .stage(
                    PipelineStage::Record,
                    cancel,
                    self.recorder.record(&url, avatar, compressed.size),
                )
                .await?;
            self.advance(PipelineStage::Record, started);
            Ok::<_, PipelineError>(record)
        }
        .await;

        if let Err(e) = &result {
            tracing::warn!(
                key = %key,
                error = %e,
                "Blob uploaded but gallery record was not written; leaving orphaned blob"
            );
        }
        result
    }

    /// Await one stage, bounded by the stage timeout (network stages only) and
    /// the cancellation token.
    async fn stage<T, F>(
        &self,
        stage: PipelineStage,
        cancel: Option<&CancellationToken>,
        work: F,
    ) -> Result<T, PipelineError>
    where
        F: Future<Output = Result<T, PipelineError>>,
    {
        let bounded = async {
            match self.stage_timeout.filter(|_| stage.is_network()) {
                Some(timeout) => match tokio::time::timeout(timeout, work).await {
                    Ok(result) => result,
                    Err(_) => Err(PipelineError::Timeout { stage, timeout }),
                },
                None => work.await,
            }
        };

        match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(PipelineError::Cancelled),
                result = bounded => result,
            },
            None => bounded.await,
        }
    }

    fn advance(&self, stage: PipelineStage, started: Instant) {
        let progress = stage.completed_progress();
        tracing::info!(
            stage = %stage,
            progress,
            duration_ms = started.elapsed().as_millis() as u64,
            "Stage completed"
        );
        self.publish(PipelineState::Running { progress });
    }

    fn finish(
        &self,
        result: Result<GalleryRecord, PipelineError>,
    ) -> Result<GalleryRecord, PipelineError> {
        match &result {
            Ok(record) => {
                tracing::info!(
                    record_id = %record.id,
                    url = %record.url,
                    "{}",
                    self.locale.success_message()
                );
                self.publish(PipelineState::Succeeded);
            }
            Err(e) => {
                let code = e.error_code();
                match e.log_level() {
                    LogLevel::Debug => tracing::debug!(code, error = %e, "Upload failed"),
                    LogLevel::Warn => tracing::warn!(code, error = %e, "Upload failed"),
                    LogLevel::Error => tracing::error!(code, error = %e, "Upload failed"),
                }
                self.publish(PipelineState::Failed {
                    code,
                    message: e.client_message(self.locale),
                });
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arfoto_db::MemoryDocumentStore;
    use arfoto_storage::MemoryStorage;

    fn driver() -> UploadDriver {
        let config = PipelineConfig::default();
        UploadDriver::from_config(
            &config,
            Arc::new(MemoryStorage::default()),
            Arc::new(MemoryDocumentStore::new()),
        )
    }

    fn failed() -> PipelineState {
        PipelineState::Failed {
            code: "DECODE_ERROR",
            message: "x".to_string(),
        }
    }

    #[test]
    fn test_acknowledge_only_leaves_failed() {
        let driver = driver();
        driver.acknowledge();
        assert!(driver.state().is_idle());

        driver.publish(PipelineState::Succeeded);
        driver.acknowledge();
        assert_eq!(driver.state(), PipelineState::Succeeded);

        driver.publish(failed());
        driver.acknowledge();
        assert!(driver.state().is_idle());
    }

    #[test]
    fn test_reset_rejected_while_running() {
        let driver = driver();
        driver.publish(PipelineState::Running { progress: 50 });
        assert!(matches!(driver.reset(), Err(PipelineError::Busy)));
        assert_eq!(driver.state().progress(), 50);

        driver.publish(PipelineState::Succeeded);
        driver.reset().unwrap();
        assert!(driver.state().is_idle());
    }

    #[tokio::test]
    async fn test_begin_is_exclusive() {
        let driver = driver();
        driver.begin().unwrap();
        assert!(matches!(driver.begin(), Err(PipelineError::Busy)));
        assert_eq!(driver.state().progress(), PROGRESS_FILE_SELECTED);
    }

    #[tokio::test]
    async fn test_timeout_only_bounds_network_stages() {
        let driver = driver().with_stage_timeout(Some(Duration::from_millis(10)));

        let slow = || async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok::<_, PipelineError>(())
        };

        driver
            .stage(PipelineStage::Compress, None, slow())
            .await
            .unwrap();
        let err = driver
            .stage(PipelineStage::Upload, None, slow())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Timeout {
                stage: PipelineStage::Upload,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_cancelled_token_wins() {
        let driver = driver();
        let token = CancellationToken::new();
        token.cancel();

        let err = driver
            .stage(PipelineStage::Record, Some(&token), async {
                Ok::<_, PipelineError>(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Cancelled));
    }
}
