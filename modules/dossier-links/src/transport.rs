// Reachability probes. `HttpTransport` is the primary client; `CurlTransport`
// shells out to curl, which gets through some fronting that rejects reqwest.

use std::time::Duration;

use async_trait::async_trait;
use dossier_common::Config;
use tracing::debug;

use crate::error::{Result, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeMethod {
    /// Metadata-only request.
    Head,
    /// Full content request.
    Get,
}

/// Issues one request and reports the final HTTP status after redirects.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn probe(&self, url: &str, method: ProbeMethod) -> Result<u16>;

    fn name(&self) -> &str;
}

// --- reqwest ---

pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(Self { client, timeout })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.liveness_timeout, &config.user_agent)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn probe(&self, url: &str, method: ProbeMethod) -> Result<u16> {
        let request = match method {
            ProbeMethod::Head => self.client.head(url),
            ProbeMethod::Get => self.client.get(url),
        };
        let resp = request.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(self.timeout)
            } else {
                TransportError::from(e)
            }
        })?;
        Ok(resp.status().as_u16())
    }

    fn name(&self) -> &str {
        "http"
    }
}

// --- curl subprocess ---

pub struct CurlTransport {
    curl_bin: String,
    timeout: Duration,
    user_agent: String,
}

impl CurlTransport {
    pub fn new(
        curl_bin: impl Into<String>,
        timeout: Duration,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            curl_bin: curl_bin.into(),
            timeout,
            user_agent: user_agent.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.curl_bin,
            config.liveness_timeout,
            &config.user_agent,
        )
    }

    fn args(&self, url: &str, method: ProbeMethod) -> Vec<String> {
        let mut args: Vec<String> = [
            "--silent",
            "--location",
            "--max-redirs",
            "5",
            "--output",
            "/dev/null",
            "--write-out",
            "%{http_code}",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.push("--max-time".to_string());
        args.push(self.timeout.as_secs().max(1).to_string());
        args.push("--user-agent".to_string());
        args.push(self.user_agent.clone());
        if method == ProbeMethod::Head {
            args.push("--head".to_string());
        }
        args.push(url.to_string());
        args
    }
}

#[async_trait]
impl Transport for CurlTransport {
    async fn probe(&self, url: &str, method: ProbeMethod) -> Result<u16> {
        let parsed = url::Url::parse(url).map_err(|_| TransportError::InvalidUrl(url.to_string()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(TransportError::InvalidUrl(url.to_string()));
        }

        // curl enforces --max-time itself; the outer bound covers process startup.
        let output = tokio::time::timeout(
            self.timeout + Duration::from_secs(2),
            tokio::process::Command::new(&self.curl_bin)
                .args(self.args(url, method))
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| TransportError::Timeout(self.timeout))?
        .map_err(|e| TransportError::Process(format!("{}: {e}", self.curl_bin)))?;

        let code = String::from_utf8_lossy(&output.stdout);
        let status = parse_http_code(&code)
            .ok_or_else(|| TransportError::Process(format!("unexpected curl output: {code:?}")))?;
        if status == 0 {
            // curl reports 000 when no response arrived (DNS, refused, TLS).
            debug!(url, exit = ?output.status.code(), "curl got no response");
            return Err(TransportError::Network(format!(
                "no response (curl exit {:?})",
                output.status.code()
            )));
        }
        Ok(status)
    }

    fn name(&self) -> &str {
        "curl"
    }
}

fn parse_http_code(stdout: &str) -> Option<u16> {
    stdout.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curl_head_args_end_with_url() {
        let curl = CurlTransport::new("curl", Duration::from_secs(5), "ua");
        let args = curl.args("https://example.com", ProbeMethod::Head);
        assert_eq!(args.last().map(String::as_str), Some("https://example.com"));
        assert!(args.contains(&"--head".to_string()));
        assert!(args.contains(&"%{http_code}".to_string()));
    }

    #[test]
    fn curl_get_args_omit_head() {
        let curl = CurlTransport::new("curl", Duration::from_millis(300), "ua");
        let args = curl.args("https://example.com", ProbeMethod::Get);
        assert!(!args.contains(&"--head".to_string()));
        // sub-second timeouts round up to curl's one-second minimum
        let idx = args.iter().position(|a| a == "--max-time").unwrap();
        assert_eq!(args[idx + 1], "1");
    }

    #[test]
    fn http_code_parsing() {
        assert_eq!(parse_http_code("200"), Some(200));
        assert_eq!(parse_http_code("000\n"), Some(0));
        assert_eq!(parse_http_code("<html>"), None);
    }

    #[tokio::test]
    async fn curl_rejects_non_http_schemes() {
        let curl = CurlTransport::new("curl", Duration::from_secs(1), "ua");
        let err = curl
            .probe("file:///etc/passwd", ProbeMethod::Get)
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl(_)));
    }
}
