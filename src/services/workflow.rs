//! Per-user position in the welcome → upload → profile → progress →
//! reading → chat sequence, plus what each step has collected so far.

use super::orchestrator::{ReadingError, ReadingOrchestrator};
use super::progress::{ProgressSnapshot, ProgressTracker};
use super::upload::PalmImage;
use crate::models::{PalmReading, UserProfile};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Welcome,
    Upload,
    Profile,
    Progress,
    Reading,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// A short user-facing message with its severity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn error(title: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            title: title.to_string(),
            message: message.into(),
        }
    }

    pub fn success(title: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            title: title.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorkflowError {
    #[error("Not available while on the {0:?} step")]
    InvalidStep(Step),
    #[error("Please upload a palm photo first.")]
    NoImage,
    #[error("No palm reading yet.")]
    NoReading,
}

pub struct Workflow {
    step: Step,
    image: Option<PalmImage>,
    profile: Option<UserProfile>,
    reading: Option<PalmReading>,
    progress: ProgressTracker,
    notice: Option<Notice>,
}

impl Workflow {
    pub fn new(tick: Duration) -> Self {
        Self {
            step: Step::Welcome,
            image: None,
            profile: None,
            reading: None,
            progress: ProgressTracker::new(tick),
            notice: None,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn reading(&self) -> Option<&PalmReading> {
        self.reading.as_ref()
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Nothing may change under a reading run.
    pub fn ensure_idle(&self) -> Result<(), WorkflowError> {
        match self.step {
            Step::Progress => Err(WorkflowError::InvalidStep(self.step)),
            _ => Ok(()),
        }
    }

    /// A fresh photo replaces any earlier one and moves on to the profile form.
    pub fn image_ready(&mut self, image: PalmImage) -> Result<(), WorkflowError> {
        self.ensure_idle()?;
        self.image = Some(image);
        self.step = Step::Profile;
        self.notice = Some(Notice::success(
            "Image uploaded successfully!",
            "Your palm image is ready for analysis.",
        ));
        Ok(())
    }

    pub fn upload_failed(&mut self, notice: Notice) -> Result<(), WorkflowError> {
        self.ensure_idle()?;
        self.step = Step::Upload;
        self.notice = Some(notice);
        Ok(())
    }

    /// Forget the photo; remote storage is left alone.
    pub fn clear_image(&mut self) -> Result<(), WorkflowError> {
        self.ensure_idle()?;
        self.image = None;
        self.step = Step::Upload;
        self.notice = None;
        Ok(())
    }

    /// Hand the staged photo to a new run.
    pub fn start_reading(&mut self, profile: UserProfile) -> Result<PalmImage, WorkflowError> {
        if self.step != Step::Profile {
            return Err(WorkflowError::InvalidStep(self.step));
        }
        let image = self.image.clone().ok_or(WorkflowError::NoImage)?;

        self.profile = Some(profile);
        self.progress.reset(super::orchestrator::ReadingStage::Idle);
        self.notice = None;
        self.step = Step::Progress;
        Ok(image)
    }

    /// Every failure sends the user back to upload with the photo discarded.
    pub fn reading_finished(&mut self, result: Result<PalmReading, ReadingError>) {
        match result {
            Ok(reading) => {
                self.reading = Some(reading);
                self.step = Step::Reading;
                self.notice = Some(Notice::success(
                    "Reading Generated!",
                    "Your personalized palm reading is ready.",
                ));
            }
            Err(err) => {
                self.image = None;
                self.step = Step::Upload;
                self.notice = Some(err.notice());
            }
        }
    }

    /// Return visit: show the stored reading.
    pub fn restore(&mut self, reading: PalmReading) -> Result<(), WorkflowError> {
        self.ensure_idle()?;
        self.reading = Some(reading);
        self.step = Step::Reading;
        Ok(())
    }

    pub fn open_chat(&mut self) -> Result<Uuid, WorkflowError> {
        let reading_id = self.reading.as_ref().map(|r| r.id).ok_or(WorkflowError::NoReading)?;
        self.ensure_idle()?;
        self.step = Step::Chat;
        Ok(reading_id)
    }

    pub fn view(&self) -> WorkflowView {
        WorkflowView {
            step: self.step,
            progress: self.progress.snapshot(),
            preview: self.image.as_ref().map(|i| i.compressed.data_uri.clone()),
            image_key: self.image.as_ref().map(|i| i.storage_key.clone()),
            profile: self.profile.clone(),
            reading_id: self.reading.as_ref().map(|r| r.id),
            notice: self.notice.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowView {
    pub step: Step,
    pub progress: ProgressSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

/// Run `orchestrator` in the background and record the outcome on `workflow`.
/// Not tied to any request: the run finishes even if nobody is watching.
pub fn spawn_reading(
    workflow: Arc<Mutex<Workflow>>,
    orchestrator: ReadingOrchestrator,
    profile: UserProfile,
    image: PalmImage,
    progress: ProgressTracker,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let result = orchestrator.run(profile, image, &progress).await;
        workflow.lock().await.reading_finished(result);
    })
}

struct Entry {
    workflow: Arc<Mutex<Workflow>>,
    touched: Instant,
}

/// In-memory workflows keyed by user id. Workflows untouched for
/// `idle_timeout` are dropped once nothing else holds them.
pub struct WorkflowRegistry {
    tick: Duration,
    idle_timeout: Duration,
    workflows: RwLock<HashMap<String, Entry>>,
}

impl WorkflowRegistry {
    pub fn new(tick: Duration, idle_timeout: Duration) -> Self {
        Self {
            tick,
            idle_timeout,
            workflows: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, user_id: &str) -> Option<Arc<Mutex<Workflow>>> {
        let mut workflows = self.workflows.write().await;
        let entry = workflows.get_mut(user_id)?;
        entry.touched = Instant::now();
        Some(entry.workflow.clone())
    }

    pub async fn get_or_create(&self, user_id: &str) -> Arc<Mutex<Workflow>> {
        let now = Instant::now();
        let mut workflows = self.workflows.write().await;
        self.prune(&mut workflows, now);

        let entry = workflows.entry(user_id.to_string()).or_insert_with(|| Entry {
            workflow: Arc::new(Mutex::new(Workflow::new(self.tick))),
            touched: now,
        });
        entry.touched = now;
        entry.workflow.clone()
    }

    /// Sign-out. A run in flight still finishes, against the detached workflow.
    pub async fn remove(&self, user_id: &str) -> bool {
        self.workflows.write().await.remove(user_id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.workflows.read().await.len()
    }

    /// A workflow still shared with a request or a reading run is kept.
    fn prune(&self, workflows: &mut HashMap<String, Entry>, now: Instant) {
        let before = workflows.len();
        workflows.retain(|_, entry| {
            now.duration_since(entry.touched) < self.idle_timeout
                || Arc::strong_count(&entry.workflow) > 1
        });

        let dropped = before - workflows.len();
        if dropped > 0 {
            tracing::debug!(dropped, "Idle workflows dropped");
        }
    }
}
