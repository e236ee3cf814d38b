// Test mocks for the URL pipeline.
//
// MockTransport (Transport): HashMap-based URL→status, with per-method
// overrides and URLs that fail at the transport level. Records every call so
// tests can assert which probes were made.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Result, TransportError};
use crate::transport::{ProbeMethod, Transport};

/// Returns `Err` for unregistered URLs.
/// Builder pattern: `.on_status()`, `.on_method()`, `.failing()`.
pub struct MockTransport {
    name: String,
    statuses: HashMap<String, u16>,
    by_method: HashMap<(String, ProbeMethod), u16>,
    failing: HashSet<String>,
    calls: Mutex<Vec<(String, ProbeMethod)>>,
}

impl MockTransport {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            statuses: HashMap::new(),
            by_method: HashMap::new(),
            failing: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Status for any method.
    pub fn on_status(mut self, url: &str, status: u16) -> Self {
        self.statuses.insert(url.to_string(), status);
        self
    }

    /// Status for one method, taking precedence over `on_status`.
    pub fn on_method(mut self, url: &str, method: ProbeMethod, status: u16) -> Self {
        self.by_method.insert((url.to_string(), method), status);
        self
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn calls(&self) -> Vec<(String, ProbeMethod)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn probe(&self, url: &str, method: ProbeMethod) -> Result<u16> {
        self.calls.lock().unwrap().push((url.to_string(), method));
        if self.failing.contains(url) {
            return Err(TransportError::Network(format!("{}: connection refused", self.name)));
        }
        self.by_method
            .get(&(url.to_string(), method))
            .or_else(|| self.statuses.get(url))
            .copied()
            .ok_or_else(|| {
                TransportError::Network(format!("{}: no status registered for {url}", self.name))
            })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
