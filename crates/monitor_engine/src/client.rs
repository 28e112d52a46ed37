use std::time::Duration;

use futures_util::StreamExt;
use monitor_core::{JobHandle, JobRequest, JobStatus, JobSummary};
use reqwest::header::CONTENT_DISPOSITION;
use url::Url;

use crate::wire::{self, SubmitBody};
use crate::{
    DownloadError, FailureKind, HistoryFetchError, RequestError, StatusFetchError,
    SubmissionError,
};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Root of the service API; relative endpoint paths are joined onto it.
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Upper bound for one whole round trip, so a hung request cannot stall
    /// the poll loop forever.
    pub request_timeout: Duration,
    pub max_download_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000/api/".to_string(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
            max_download_bytes: 64 * 1024 * 1024,
        }
    }
}

/// Single round trips against the scraping service. No retries.
#[async_trait::async_trait]
pub trait JobStatusClient: Send + Sync {
    async fn submit(&self, request: &JobRequest) -> Result<JobHandle, SubmissionError>;

    async fn fetch_status(&self, handle: &JobHandle) -> Result<JobStatus, StatusFetchError>;

    async fn fetch_history(&self) -> Result<Vec<JobSummary>, HistoryFetchError>;

    /// Where the finished job's result file can be downloaded.
    fn download_url(&self, handle: &JobHandle) -> String;
}

/// Result file as served by the download endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    /// Filename suggested by `Content-Disposition`, unsanitized.
    pub suggested_name: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ReqwestJobClient {
    client: reqwest::Client,
    base: Url,
    settings: ClientSettings,
}

impl ReqwestJobClient {
    pub fn new(settings: ClientSettings) -> Result<Self, RequestError> {
        let mut raw = settings.base_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base = Url::parse(&raw)
            .map_err(|err| RequestError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| RequestError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            client,
            base,
            settings,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, RequestError> {
        self.base
            .join(path)
            .map_err(|err| RequestError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    fn job_endpoint(&self, prefix: &str, handle: &JobHandle) -> Result<Url, RequestError> {
        let mut url = self.endpoint(prefix)?;
        url.path_segments_mut()
            .map_err(|_| RequestError::new(FailureKind::InvalidUrl, "base url cannot be a base"))?
            .pop_if_empty()
            .push(handle.job_id());
        Ok(url)
    }

    async fn read_body(response: reqwest::Response) -> Result<Vec<u8>, RequestError> {
        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(bytes.to_vec())
    }

    async fn get(&self, url: Url) -> Result<Vec<u8>, RequestError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::read_body(response).await
    }

    /// Streams the result file of a finished job into memory.
    pub async fn download(&self, handle: &JobHandle) -> Result<DownloadedFile, DownloadError> {
        let url = self
            .job_endpoint("download/", handle)
            .map_err(DownloadError::Request)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| DownloadError::Request(map_reqwest_error(err)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Request(RequestError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            )));
        }

        let suggested_name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(attachment_filename);

        let max_bytes = self.settings.max_download_bytes;
        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| DownloadError::Request(map_reqwest_error(err)))?;
            if bytes.len() as u64 + chunk.len() as u64 > max_bytes {
                return Err(DownloadError::Request(RequestError::new(
                    FailureKind::Decode,
                    format!("result larger than {max_bytes} bytes"),
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(DownloadedFile {
            suggested_name,
            bytes,
        })
    }
}

#[async_trait::async_trait]
impl JobStatusClient for ReqwestJobClient {
    async fn submit(&self, request: &JobRequest) -> Result<JobHandle, SubmissionError> {
        let url = self.endpoint("scrape").map_err(SubmissionError)?;
        let response = self
            .client
            .post(url)
            .json(&SubmitBody::from(request))
            .send()
            .await
            .map_err(|err| SubmissionError(map_reqwest_error(err)))?;
        let body = Self::read_body(response).await.map_err(SubmissionError)?;
        wire::decode_submit(&body).map_err(SubmissionError)
    }

    async fn fetch_status(&self, handle: &JobHandle) -> Result<JobStatus, StatusFetchError> {
        let url = self
            .job_endpoint("status/", handle)
            .map_err(StatusFetchError)?;
        let body = self.get(url).await.map_err(StatusFetchError)?;
        wire::decode_status(&body).map_err(StatusFetchError)
    }

    async fn fetch_history(&self) -> Result<Vec<JobSummary>, HistoryFetchError> {
        let url = self.endpoint("jobs").map_err(HistoryFetchError)?;
        let body = self.get(url).await.map_err(HistoryFetchError)?;
        wire::decode_history(&body).map_err(HistoryFetchError)
    }

    fn download_url(&self, handle: &JobHandle) -> String {
        match self.job_endpoint("download/", handle) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}download/{}", self.base, handle.job_id()),
        }
    }
}

fn map_reqwest_error(err: reqwest::Error) -> RequestError {
    if err.is_timeout() {
        return RequestError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return RequestError::new(FailureKind::Decode, err.to_string());
    }
    RequestError::new(FailureKind::Network, err.to_string())
}

/// Extracts `filename` from an `attachment; filename="..."` header value.
fn attachment_filename(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}
