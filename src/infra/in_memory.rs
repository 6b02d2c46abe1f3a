use crate::app::ports::{HttpClientPort, HttpGetResult, SleeperPort};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

/// In-memory HTTP client for development/testing.
///
/// Responses are queued per URL and served in order; the last queued response
/// for a URL keeps being served once the queue is down to one entry. Requests
/// to unknown URLs fail like a transport error.
#[derive(Clone, Default)]
pub struct ScriptedHttp {
    routes: Arc<Mutex<HashMap<String, VecDeque<Result<HttpGetResult, String>>>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ScriptedHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, status: u16, body: impl Into<String>) -> &Self {
        self.push(
            url,
            Ok(HttpGetResult {
                status,
                body: body.into(),
            }),
        )
    }

    pub fn fail(&self, url: &str, message: impl Into<String>) -> &Self {
        self.push(url, Err(message.into()))
    }

    fn push(&self, url: &str, response: Result<HttpGetResult, String>) -> &Self {
        let mut routes = self.routes.lock().unwrap();
        routes.entry(url.to_string()).or_default().push_back(response);
        self
    }

    /// Every URL requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl HttpClientPort for ScriptedHttp {
    async fn get(&self, url: &str) -> Result<HttpGetResult, String> {
        self.requests.lock().unwrap().push(url.to_string());

        let mut routes = self.routes.lock().unwrap();
        let queue = routes
            .get_mut(url)
            .ok_or_else(|| format!("connection refused: {url}"))?;
        let response = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        debug!("ScriptedHttp: {} -> {:?}", url, response.as_ref().map(|r| r.as_ref().map(|ok| ok.status)));
        response.unwrap_or_else(|| Err(format!("no scripted response: {url}")))
    }
}

/// Sleeper that returns immediately and remembers every requested delay.
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl SleeperPort for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}
