//! VirusTotal v3 engine client over libcurl.
//!
//! `POST {base}/urls` creates an analysis, `GET {base}/analyses/{id}` reports
//! its progress. Each [`VirusTotalSession`] owns one curl handle, so the
//! submission and every poll of one analysis reuse the same connection, and
//! dropping the session closes it.

mod parse;

use super::{EngineError, JobId, JobReport, ScanEngine};
use crate::config::EngineSettings;
use crate::retry::TransportKind;
use crate::url_model::NormalizedUrl;
use std::sync::Arc;

/// Shareable engine client; hands out one session per analysis.
#[derive(Debug, Clone)]
pub struct VirusTotalClient {
    settings: Arc<EngineSettings>,
}

impl VirusTotalClient {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }

    /// Open a call-scoped session. The connection lives as long as the session.
    pub fn session(&self) -> VirusTotalSession {
        VirusTotalSession {
            settings: Arc::clone(&self.settings),
            handle: None,
        }
    }
}

/// One analysis' worth of engine traffic.
pub struct VirusTotalSession {
    settings: Arc<EngineSettings>,
    /// Taken while a request runs on the blocking pool.
    handle: Option<curl::easy::Easy>,
}

impl std::fmt::Debug for VirusTotalSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirusTotalSession")
            .field("base_url", &self.settings.base_url)
            .field("connected", &self.handle.is_some())
            .finish()
    }
}

#[derive(Debug)]
enum Request {
    Post { path: String, form: String },
    Get { path: String },
}

#[derive(Debug)]
struct RawResponse {
    status: u16,
    body: String,
}

impl VirusTotalSession {
    /// Runs one request on the blocking pool, keeping the handle for reuse.
    async fn execute(&mut self, request: Request) -> Result<RawResponse, EngineError> {
        let easy = self.handle.take().unwrap_or_else(curl::easy::Easy::new);
        let settings = Arc::clone(&self.settings);
        let (easy, result) = tokio::task::spawn_blocking(move || {
            let mut easy = easy;
            let result = perform(&mut easy, &settings, &request);
            (easy, result)
        })
        .await
        .map_err(|e| EngineError::Transport {
            kind: TransportKind::Other,
            message: format!("engine request task failed: {e}"),
        })?;
        self.handle = Some(easy);
        result
    }
}

impl ScanEngine for VirusTotalSession {
    async fn submit(&mut self, url: &NormalizedUrl) -> Result<JobId, EngineError> {
        let form = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("url", url.as_str())
            .finish();
        let resp = self
            .execute(Request::Post {
                path: "urls".to_string(),
                form,
            })
            .await?;
        if !(200..300).contains(&resp.status) {
            return Err(EngineError::Rejected {
                status: resp.status,
                body: resp.body,
            });
        }
        parse::job_id(&resp.body)
    }

    async fn poll(&mut self, job: &JobId) -> Result<JobReport, EngineError> {
        let resp = self
            .execute(Request::Get {
                path: format!("analyses/{}", job.as_str()),
            })
            .await?;
        if resp.status != 200 {
            return Err(EngineError::Rejected {
                status: resp.status,
                body: resp.body,
            });
        }
        parse::job_report(&resp.body)
    }
}

/// Performs `request` on `easy` in the current thread.
fn perform(
    easy: &mut curl::easy::Easy,
    settings: &EngineSettings,
    request: &Request,
) -> Result<RawResponse, EngineError> {
    // reset() keeps the connection cache, so the session still reuses its connection.
    easy.reset();

    let path = match request {
        Request::Post { path, .. } | Request::Get { path } => path,
    };
    let url = format!("{}/{}", settings.base_url.trim_end_matches('/'), path);
    easy.url(&url).map_err(EngineError::from_curl)?;
    easy.connect_timeout(settings.connect_timeout)
        .map_err(EngineError::from_curl)?;
    easy.timeout(settings.request_timeout)
        .map_err(EngineError::from_curl)?;

    let mut headers = curl::easy::List::new();
    headers
        .append(&format!("x-apikey: {}", settings.api_key.expose()))
        .map_err(EngineError::from_curl)?;
    headers
        .append("accept: application/json")
        .map_err(EngineError::from_curl)?;

    match request {
        Request::Post { form, .. } => {
            headers
                .append("content-type: application/x-www-form-urlencoded")
                .map_err(EngineError::from_curl)?;
            easy.post(true).map_err(EngineError::from_curl)?;
            easy.post_fields_copy(form.as_bytes())
                .map_err(EngineError::from_curl)?;
        }
        Request::Get { .. } => {
            easy.get(true).map_err(EngineError::from_curl)?;
        }
    }
    easy.http_headers(headers).map_err(EngineError::from_curl)?;

    let mut body = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer
            .write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })
            .map_err(EngineError::from_curl)?;
        transfer.perform().map_err(EngineError::from_curl)?;
    }

    let code = easy.response_code().map_err(EngineError::from_curl)?;
    Ok(RawResponse {
        status: u16::try_from(code).unwrap_or(u16::MAX),
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}
