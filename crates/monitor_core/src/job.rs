use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use thiserror::Error;

/// Opaque identifier of one remote job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self(job_id.into())
    }

    pub fn job_id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    LinkedIn,
    RubyOnRemote,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::LinkedIn => "linkedin",
            Platform::RubyOnRemote => "rubyonremote",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linkedin" => Ok(Platform::LinkedIn),
            "rubyonremote" => Ok(Platform::RubyOnRemote),
            other => Err(ValidationError::UnknownPlatform(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("max pages must be a positive integer, got {0}")]
    NonPositiveMaxPages(i64),
    #[error("unknown platform {0:?}")]
    UnknownPlatform(String),
}

/// Parameters of a scraping job as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub platform: Platform,
    pub keywords: String,
    pub location: String,
    pub max_pages: i64,
    pub headless: bool,
}

impl JobRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_pages < 1 {
            return Err(ValidationError::NonPositiveMaxPages(self.max_pages));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatusKind {
    Running,
    Completed,
    Error,
}

impl JobStatusKind {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatusKind::Running => "running",
            JobStatusKind::Completed => "completed",
            JobStatusKind::Error => "error",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatusKind::Running)
    }
}

impl fmt::Display for JobStatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One answer of the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatus {
    pub status: JobStatusKind,
    pub progress_text: String,
    pub processed_count: u64,
    pub error: Option<String>,
}

impl JobStatus {
    pub fn running(progress_text: impl Into<String>, processed_count: u64) -> Self {
        Self {
            status: JobStatusKind::Running,
            progress_text: progress_text.into(),
            processed_count,
            error: None,
        }
    }

    pub fn completed(progress_text: impl Into<String>, processed_count: u64) -> Self {
        Self {
            status: JobStatusKind::Completed,
            progress_text: progress_text.into(),
            processed_count,
            error: None,
        }
    }

    pub fn errored(error: impl Into<String>) -> Self {
        Self {
            status: JobStatusKind::Error,
            progress_text: String::new(),
            processed_count: 0,
            error: Some(error.into()),
        }
    }
}

/// History entry as listed by the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSummary {
    pub handle: JobHandle,
    pub platform: String,
    pub keywords: String,
    pub location: Option<String>,
    pub status: JobStatusKind,
    /// Server-local start time.
    pub started_at: Option<NaiveDateTime>,
    pub results_count: Option<u64>,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(max_pages: i64) -> JobRequest {
        JobRequest {
            platform: Platform::LinkedIn,
            keywords: "engineer".into(),
            location: "remote".into(),
            max_pages,
            headless: true,
        }
    }

    #[test]
    fn max_pages_must_be_positive() {
        assert!(request(1).validate().is_ok());
        assert_eq!(
            request(0).validate(),
            Err(ValidationError::NonPositiveMaxPages(0))
        );
        assert_eq!(
            request(-2).validate(),
            Err(ValidationError::NonPositiveMaxPages(-2))
        );
    }

    #[test]
    fn platform_parses_case_insensitively() {
        assert_eq!("LinkedIn".parse::<Platform>(), Ok(Platform::LinkedIn));
        assert_eq!(" rubyonremote ".parse::<Platform>(), Ok(Platform::RubyOnRemote));
        assert!(matches!(
            "indeed".parse::<Platform>(),
            Err(ValidationError::UnknownPlatform(name)) if name == "indeed"
        ));
    }
}
