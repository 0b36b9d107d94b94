use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

pub use reqwest::blocking::Client;

/// Bodies above this size are truncated; suggestion payloads are far smaller.
pub const DEFAULT_MAX_BODY_BYTES: usize = 512 * 1024;

#[derive(Clone, Debug)]
pub struct NetConfig {
    /// Transport-level timeout for one request, connect included.
    pub timeout: Duration,
    pub user_agent: String,
    pub max_body_bytes: usize,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: "typeahead/0.1".to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

#[derive(Clone, Debug)]
pub struct FetchResult {
    pub url: String,           // final URL after redirects
    pub requested_url: String, // what we asked for
    pub status: Option<u16>,
    pub body: String,
    pub bytes: usize,
    pub content_type: Option<String>,
    pub duration_ms: u128,
    pub error: Option<String>,
}

impl FetchResult {
    fn failed(requested_url: String, started: Instant, error: String) -> Self {
        Self {
            url: requested_url.clone(),
            requested_url,
            status: None,
            body: String::new(),
            bytes: 0,
            content_type: None,
            duration_ms: started.elapsed().as_millis(),
            error: Some(error),
        }
    }

    /// A response arrived with a 2xx status.
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.status.is_some_and(|s| (200..300).contains(&s))
    }
}

pub type FetchCallback = Arc<dyn Fn(FetchResult) + Send + Sync>;

pub fn build_client(config: &NetConfig) -> Result<Client, String> {
    Client::builder()
        .timeout(config.timeout)
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| format!("client build error: {e}"))
}

/// GET `url` on a worker thread and hand the outcome to `cb`.
///
/// At most `max_body_bytes` of the body are read; pass 0 when only arrival
/// matters. If `cancel` is set before the request starts or before the
/// callback would run, the callback is never invoked.
pub fn fetch_text(
    client: Client,
    url: String,
    max_body_bytes: usize,
    cancel: Arc<AtomicBool>,
    cb: FetchCallback,
) {
    thread::spawn(move || {
        if cancel.load(Ordering::Acquire) {
            log::trace!(target: "net", "skipping cancelled request {url}");
            return;
        }

        let started = Instant::now();
        let requested_url = url;

        let result = (|| -> Result<FetchResult, String> {
            let resp = client
                .get(&requested_url)
                .send()
                .map_err(|e| e.to_string())?;
            let status = resp.status().as_u16();
            let final_url = resp.url().to_string();
            let content_type = resp
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string());

            let mut limited = resp.take(max_body_bytes as u64);
            let mut buf = Vec::with_capacity(max_body_bytes.min(64 * 1024));
            limited.read_to_end(&mut buf).map_err(|e| e.to_string())?;

            Ok(FetchResult {
                requested_url: requested_url.clone(),
                url: final_url,
                status: Some(status),
                bytes: buf.len(),
                body: String::from_utf8_lossy(&buf).into_owned(),
                content_type,
                duration_ms: started.elapsed().as_millis(),
                error: None,
            })
        })();

        if cancel.load(Ordering::Acquire) {
            log::trace!(target: "net", "dropping result of cancelled request {requested_url}");
            return;
        }

        match result {
            Ok(ok) => cb(ok),
            Err(err) => cb(FetchResult::failed(requested_url, started, err)),
        }
    });
}
