//! Event - lifecycle event kinds and payloads
//!
//! This module defines the closed set of job/worker lifecycle events the
//! host emits, plus the payload data each of them carries. Payload values
//! expose their string form through `Display`; that string is what ends up
//! substituted into operator message templates.

use serde::{Deserialize, Serialize};

/// The payload arity of an event, deciding which template placeholders
/// are available for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventShape {
    /// A single job (`{job}`)
    Job,
    /// A job error (`{job}`, `{task}`, `{report}`)
    JobError,
    /// A single worker (`{slave}`)
    Worker,
    /// A worker plus the job it touches (`{slave}`, `{job}`)
    WorkerJob,
}

impl EventShape {
    /// Get the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Job => "job",
            Self::JobError => "job-error",
            Self::Worker => "worker",
            Self::WorkerJob => "worker-job",
        }
    }
}

impl std::fmt::Display for EventShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One of the 18 lifecycle events the host can fire.
///
/// The variant names follow the host's own event vocabulary, including the
/// legacy "Slave" naming for worker nodes; operator-facing configuration
/// keys are derived from these names and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Job finished rendering
    JobFinished,
    /// Job deleted from the queue
    JobDeleted,
    /// Job failed
    JobFailed,
    /// Job pended
    JobPended,
    /// Job released from pending
    JobReleased,
    /// Job requeued
    JobRequeued,
    /// Job resumed from suspension
    JobResumed,
    /// Job purged from the repository
    JobPurged,
    /// Job started rendering
    JobStarted,
    /// Job submitted to the queue
    JobSubmitted,
    /// Job suspended
    JobSuspended,
    /// A task of a job reported an error
    JobError,
    /// Worker became idle
    SlaveIdle,
    /// Worker stalled
    SlaveStalled,
    /// Worker came online
    SlaveStarted,
    /// Worker went offline
    SlaveStopped,
    /// Worker started rendering a job
    SlaveRendering,
    /// Worker is picking up a job
    SlaveStartingJob,
}

impl EventKind {
    /// Every event kind, in the order handlers are attached.
    pub const ALL: [EventKind; 18] = [
        Self::JobFinished,
        Self::JobDeleted,
        Self::JobFailed,
        Self::JobPended,
        Self::JobReleased,
        Self::JobRequeued,
        Self::JobResumed,
        Self::JobPurged,
        Self::JobStarted,
        Self::JobSubmitted,
        Self::JobSuspended,
        Self::JobError,
        Self::SlaveIdle,
        Self::SlaveStalled,
        Self::SlaveStarted,
        Self::SlaveStopped,
        Self::SlaveRendering,
        Self::SlaveStartingJob,
    ];

    /// The host-side callback name for this event (`"OnJobFinished"`, ...).
    ///
    /// Configuration keys are built from this name, so it keeps the `On`
    /// prefix the host uses.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::JobFinished => "OnJobFinished",
            Self::JobDeleted => "OnJobDeleted",
            Self::JobFailed => "OnJobFailed",
            Self::JobPended => "OnJobPended",
            Self::JobReleased => "OnJobReleased",
            Self::JobRequeued => "OnJobRequeued",
            Self::JobResumed => "OnJobResumed",
            Self::JobPurged => "OnJobPurged",
            Self::JobStarted => "OnJobStarted",
            Self::JobSubmitted => "OnJobSubmitted",
            Self::JobSuspended => "OnJobSuspended",
            Self::JobError => "OnJobError",
            Self::SlaveIdle => "OnSlaveIdle",
            Self::SlaveStalled => "OnSlaveStalled",
            Self::SlaveStarted => "OnSlaveStarted",
            Self::SlaveStopped => "OnSlaveStopped",
            Self::SlaveRendering => "OnSlaveRendering",
            Self::SlaveStartingJob => "OnSlaveStartingJob",
        }
    }

    /// The payload shape this event fires with.
    #[must_use]
    pub fn shape(&self) -> EventShape {
        match self {
            Self::JobFinished
            | Self::JobDeleted
            | Self::JobFailed
            | Self::JobPended
            | Self::JobReleased
            | Self::JobRequeued
            | Self::JobResumed
            | Self::JobPurged
            | Self::JobStarted
            | Self::JobSubmitted
            | Self::JobSuspended => EventShape::Job,
            Self::JobError => EventShape::JobError,
            Self::SlaveIdle | Self::SlaveStalled | Self::SlaveStarted | Self::SlaveStopped => {
                EventShape::Worker
            }
            Self::SlaveRendering | Self::SlaveStartingJob => EventShape::WorkerJob,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A job as seen by the notification bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInfo {
    /// Repository job ID
    pub id: String,
    /// Job name as shown to operators
    pub name: String,
}

impl JobInfo {
    /// Create a new job reference
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for JobInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The task of a job that raised an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInfo {
    /// Task identifier within the job
    pub id: String,
}

impl TaskInfo {
    /// Create a new task reference
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl std::fmt::Display for TaskInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// An error report attached to a failed task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportInfo {
    /// Report message text
    pub message: String,
}

impl ReportInfo {
    /// Create a new report
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ReportInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// A worker node (render node) on the farm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerInfo {
    /// Worker hostname
    pub name: String,
}

impl WorkerInfo {
    /// Create a new worker reference
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl std::fmt::Display for WorkerInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The data a fired event carries, tagged by shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventPayload {
    /// Job lifecycle payload
    Job(JobInfo),
    /// Job error payload
    JobError {
        /// Job that got an error
        job: JobInfo,
        /// Task that raised the error
        task: TaskInfo,
        /// Error report
        report: ReportInfo,
    },
    /// Worker lifecycle payload
    Worker(WorkerInfo),
    /// Worker plus the job it is handling
    WorkerJob {
        /// Worker picking up or rendering the job
        worker: WorkerInfo,
        /// The related job
        job: JobInfo,
    },
}

impl EventPayload {
    /// The shape of this payload.
    #[must_use]
    pub fn shape(&self) -> EventShape {
        match self {
            Self::Job(_) => EventShape::Job,
            Self::JobError { .. } => EventShape::JobError,
            Self::Worker(_) => EventShape::Worker,
            Self::WorkerJob { .. } => EventShape::WorkerJob,
        }
    }

    /// The closed placeholder map for template rendering.
    ///
    /// Worker events keep the legacy `slave` placeholder so templates
    /// written against the host's older vocabulary keep working.
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Job(job) => vec![("job", job.to_string())],
            Self::JobError { job, task, report } => vec![
                ("job", job.to_string()),
                ("task", task.to_string()),
                ("report", report.to_string()),
            ],
            Self::Worker(worker) => vec![("slave", worker.to_string())],
            Self::WorkerJob { worker, job } => {
                vec![("slave", worker.to_string()), ("job", job.to_string())]
            }
        }
    }
}
