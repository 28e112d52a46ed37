//! JSON shapes exchanged with the scraping service.
//!
//! Field names follow what the service serves (`job_id`, `jobs_processed`,
//! ...); the camel-case spellings are accepted as aliases.

use chrono::{DateTime, NaiveDateTime};
use monitor_core::{JobHandle, JobRequest, JobStatus, JobStatusKind, JobSummary};
use serde::{Deserialize, Serialize};

use crate::{FailureKind, RequestError};

#[derive(Debug, Serialize)]
pub(crate) struct SubmitBody<'a> {
    platform: &'a str,
    job_keywords: &'a str,
    job_location: &'a str,
    max_pages: i64,
    headless: bool,
}

impl<'a> From<&'a JobRequest> for SubmitBody<'a> {
    fn from(request: &'a JobRequest) -> Self {
        Self {
            platform: request.platform.as_str(),
            job_keywords: &request.keywords,
            job_location: &request.location,
            max_pages: request.max_pages,
            headless: request.headless,
        }
    }
}

/// Job ids arrive as numbers from the reference service but are opaque here.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireJobId {
    Number(u64),
    Text(String),
}

impl WireJobId {
    fn into_handle(self) -> Option<JobHandle> {
        match self {
            WireJobId::Number(n) => Some(JobHandle::new(n.to_string())),
            WireJobId::Text(s) if !s.trim().is_empty() => Some(JobHandle::new(s)),
            WireJobId::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum WireStatus {
    Running,
    Completed,
    Error,
}

impl From<WireStatus> for JobStatusKind {
    fn from(status: WireStatus) -> Self {
        match status {
            WireStatus::Running => JobStatusKind::Running,
            WireStatus::Completed => JobStatusKind::Completed,
            WireStatus::Error => JobStatusKind::Error,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SubmitReply {
    #[serde(default, alias = "jobId")]
    job_id: Option<WireJobId>,
}

#[derive(Debug, Deserialize)]
struct StatusReply {
    #[serde(default)]
    status: Option<WireStatus>,
    #[serde(default)]
    progress: Option<String>,
    #[serde(default, alias = "processedCount")]
    jobs_processed: u64,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HistoryReply {
    #[serde(default)]
    jobs: Vec<WireSummary>,
}

#[derive(Debug, Deserialize)]
struct WireSummary {
    #[serde(alias = "jobId")]
    job_id: WireJobId,
    #[serde(default)]
    platform: String,
    #[serde(default, alias = "keywords")]
    job_keywords: String,
    #[serde(default, alias = "location")]
    job_location: Option<String>,
    status: WireStatus,
    #[serde(default, alias = "startedAt")]
    started_at: Option<String>,
    #[serde(default, alias = "resultsCount")]
    results_count: Option<u64>,
    #[serde(default)]
    error: Option<String>,
}

pub(crate) fn decode_submit(body: &[u8]) -> Result<JobHandle, RequestError> {
    let reply: SubmitReply = serde_json::from_slice(body)
        .map_err(|err| RequestError::new(FailureKind::Decode, err.to_string()))?;
    reply
        .job_id
        .and_then(WireJobId::into_handle)
        .ok_or_else(|| RequestError::new(FailureKind::MissingJobId, "response carried no job id"))
}

pub(crate) fn decode_status(body: &[u8]) -> Result<JobStatus, RequestError> {
    let reply: StatusReply = serde_json::from_slice(body)
        .map_err(|err| RequestError::new(FailureKind::Decode, err.to_string()))?;
    let Some(status) = reply.status else {
        return Err(match reply.error {
            Some(message) => RequestError::new(FailureKind::UnknownJob, message),
            None => RequestError::new(FailureKind::Decode, "response carried no status"),
        });
    };
    Ok(JobStatus {
        status: status.into(),
        progress_text: reply.progress.unwrap_or_default(),
        processed_count: reply.jobs_processed,
        error: reply.error,
    })
}

pub(crate) fn decode_history(body: &[u8]) -> Result<Vec<JobSummary>, RequestError> {
    let reply: HistoryReply = serde_json::from_slice(body)
        .map_err(|err| RequestError::new(FailureKind::Decode, err.to_string()))?;
    reply
        .jobs
        .into_iter()
        .map(|job| {
            let handle = job
                .job_id
                .into_handle()
                .ok_or_else(|| RequestError::new(FailureKind::MissingJobId, "history entry without id"))?;
            Ok(JobSummary {
                handle,
                platform: job.platform,
                keywords: job.job_keywords,
                location: job.job_location,
                status: job.status.into(),
                started_at: job.started_at.as_deref().and_then(parse_timestamp),
                results_count: job.results_count,
                error: job.error,
            })
        })
        .collect()
}

/// Accepts RFC 3339 as well as the offset-less ISO form the service emits.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_local());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()
}
