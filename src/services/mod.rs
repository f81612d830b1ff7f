pub mod chat;
pub mod compressor;
pub mod identity;
pub mod orchestrator;
pub mod palmist;
pub mod progress;
pub mod prompts;
pub mod report;
pub mod upload;
pub mod workflow;

pub use chat::{ChatController, ChatError, ChatStart, Exchange, StartedSession};
pub use compressor::{compress, CompressError, CompressedImage};
pub use identity::Identity;
pub use orchestrator::{ReadingError, ReadingOrchestrator, ReadingStage};
pub use palmist::Palmist;
pub use progress::{ProgressAnimation, ProgressSnapshot, ProgressTracker};
pub use report::{ReportPage, ReportView, ScoreBand};
pub use upload::{PalmImage, SelectedFile, UploadController, UploadError, ValidationError};
pub use workflow::{spawn_reading, Notice, Severity, Step, Workflow, WorkflowError, WorkflowRegistry, WorkflowView};
