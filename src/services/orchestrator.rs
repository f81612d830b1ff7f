//! The reading run: profile upsert, remote analysis, reading insert, paced
//! by the simulated progress tracker.
//!
//! Each stage consumes the previous stage's value, so a reading can only be
//! saved from an `Analyzed` run, which in turn needs a saved profile.

use super::identity::Identity;
use super::progress::ProgressTracker;
use super::upload::PalmImage;
use super::workflow::Notice;
use crate::configuration::ProgressSettings;
use crate::connectors::{AnalysisConnector, ConnectorError};
use crate::db::ReadingStore;
use crate::forms::{AnalysisRequest, PromptProfile};
use crate::models::{AnalysisOutcome, AnalysisResult, NewPalmReading, PalmReading, User, UserProfile};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

pub const STATUS_UPLOADING: &str = "Uploading your palm photo...";
pub const STATUS_ANALYZING: &str = "Analyzing your palm...";
pub const STATUS_SAVING: &str = "Saving your reading...";
pub const STATUS_FINISHING: &str = "Finished! Just a second...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadingStage {
    Idle,
    UploadingImage,
    SavingProfile,
    Analyzing,
    SavingReading,
    Done,
    Error,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReadingError {
    #[error("{0}")]
    Transport(#[from] ConnectorError),
    /// The analysis judged the photo unusable.
    #[error("{0}")]
    ContentRejected(String),
    #[error("{0}")]
    Persistence(String),
    #[error("Please log in to generate a reading.")]
    AuthRequired,
}

impl ReadingError {
    pub fn notice(&self) -> Notice {
        match self {
            Self::ContentRejected(message) => Notice::error("Image Issue", message.clone()),
            other => Notice::error("Error", other.to_string()),
        }
    }
}

struct ImageStaged {
    user: Arc<User>,
    profile: UserProfile,
    image: PalmImage,
}

struct ProfileSaved {
    user: Arc<User>,
    profile: UserProfile,
    image: PalmImage,
}

struct Analyzed {
    user: Arc<User>,
    image: PalmImage,
    analysis: AnalysisResult,
}

impl ImageStaged {
    async fn save_profile(self, store: &dyn ReadingStore) -> Result<ProfileSaved, ReadingError> {
        store
            .upsert_profile(&self.user.id, &self.profile)
            .await
            .map_err(ReadingError::Persistence)?;

        Ok(ProfileSaved {
            user: self.user,
            profile: self.profile,
            image: self.image,
        })
    }
}

impl ProfileSaved {
    async fn analyze(self, connector: &dyn AnalysisConnector) -> Result<Analyzed, ReadingError> {
        let request = AnalysisRequest {
            user_profile: PromptProfile::from(&self.profile),
            palm_image_base64: self.image.compressed.data_uri.clone(),
        };

        match connector.analyze(&request).await? {
            AnalysisOutcome::Completed(analysis) => Ok(Analyzed {
                user: self.user,
                image: self.image,
                analysis,
            }),
            AnalysisOutcome::Rejected(message) => Err(ReadingError::ContentRejected(message)),
        }
    }
}

impl Analyzed {
    async fn save(self, store: &dyn ReadingStore) -> Result<PalmReading, ReadingError> {
        store
            .insert_reading(NewPalmReading {
                user_id: self.user.id.clone(),
                palm_image_url: Some(self.image.storage_key),
                analysis_data: self.analysis,
            })
            .await
            .map_err(ReadingError::Persistence)
    }
}

pub struct ReadingOrchestrator {
    identity: Identity,
    store: Arc<dyn ReadingStore>,
    analysis: Arc<dyn AnalysisConnector>,
    settings: ProgressSettings,
}

impl ReadingOrchestrator {
    pub fn new(
        identity: Identity,
        store: Arc<dyn ReadingStore>,
        analysis: Arc<dyn AnalysisConnector>,
        settings: ProgressSettings,
    ) -> Self {
        Self {
            identity,
            store,
            analysis,
            settings,
        }
    }

    /// One full run. On failure the progress is back at 0% in the `Error`
    /// stage; nothing written before the failure is rolled back.
    #[tracing::instrument(name = "Generate palm reading", skip_all)]
    pub async fn run(
        &self,
        profile: UserProfile,
        image: PalmImage,
        progress: &ProgressTracker,
    ) -> Result<PalmReading, ReadingError> {
        let result = self.stages(profile, image, progress).await;
        match &result {
            Ok(reading) => tracing::info!("Palm reading {} is ready", reading.id),
            Err(err) => {
                tracing::warn!("Palm reading failed: {}", err);
                progress.reset(ReadingStage::Error);
            }
        }
        result
    }

    async fn stages(
        &self,
        profile: UserProfile,
        image: PalmImage,
        progress: &ProgressTracker,
    ) -> Result<PalmReading, ReadingError> {
        let user = self.identity.user().cloned().ok_or(ReadingError::AuthRequired)?;
        let pacing = |ms: u64| Duration::from_millis(ms);
        let settings = &self.settings;

        progress.enter(ReadingStage::UploadingImage, Some(STATUS_UPLOADING));
        progress
            .animate_to(settings.upload_checkpoint, pacing(settings.upload_pacing_ms))
            .finished()
            .await;

        progress.enter(ReadingStage::SavingProfile, None);
        let staged = ImageStaged {
            user,
            profile,
            image,
        };
        let saved = staged.save_profile(self.store.as_ref()).await?;

        progress.enter(ReadingStage::Analyzing, Some(STATUS_ANALYZING));
        let animation =
            progress.animate_to(settings.analyze_checkpoint, pacing(settings.analyze_pacing_ms));
        let analyzed = match saved.analyze(self.analysis.as_ref()).await {
            Ok(analyzed) => {
                animation.finished().await;
                analyzed
            }
            Err(err) => {
                animation.cancel();
                return Err(err);
            }
        };

        progress.enter(ReadingStage::SavingReading, Some(STATUS_SAVING));
        let animation =
            progress.animate_to(settings.saving_checkpoint, pacing(settings.saving_pacing_ms));
        let reading = match analyzed.save(self.store.as_ref()).await {
            Ok(reading) => {
                animation.finished().await;
                reading
            }
            Err(err) => {
                animation.cancel();
                return Err(err);
            }
        };

        progress.set_status(STATUS_FINISHING);
        progress
            .animate_to(100.0, pacing(settings.finalize_pacing_ms))
            .finished()
            .await;
        tokio::time::sleep(pacing(settings.settle_ms)).await;
        progress.enter(ReadingStage::Done, None);

        Ok(reading)
    }
}
