// URL liveness with anti-bot tolerance.
//
// Order of evidence:
// 1. Anti-bot domain + profile-shaped path: alive without a request.
// 2. HEAD on the primary transport; 400/403/404/405 retried as GET.
// 3. Transport failure or a block status (403/429) on the primary is retried
//    on the fallback transport.
// 4. 2xx/3xx is alive. On anti-bot domains 403/429/503 is alive too: the
//    challenge page proves the resource exists behind it.
// Nothing here returns an error. Failures become `Reachability::Error`.

use std::sync::Arc;
use std::time::Duration;

use dossier_common::Config;
use tracing::{debug, warn};

use crate::classify::{classify, is_profile_shaped, Reachability};
use crate::error::{Result, TransportError};
use crate::registry;
use crate::transport::{CurlTransport, HttpTransport, ProbeMethod, Transport};

/// HEAD responses that may just mean "HEAD not supported here".
const GET_RETRY_STATUSES: &[u16] = &[400, 403, 404, 405];
/// Primary-transport statuses that look like client fingerprint blocking.
const FALLBACK_STATUSES: &[u16] = &[403, 429];
/// Challenge statuses accepted as alive on anti-bot domains.
const ANTI_BOT_ALIVE_STATUSES: &[u16] = &[403, 429, 503];

pub struct LivenessChecker {
    primary: Arc<dyn Transport>,
    fallback: Option<Arc<dyn Transport>>,
    timeout: Duration,
}

impl LivenessChecker {
    pub fn new(
        primary: Arc<dyn Transport>,
        fallback: Option<Arc<dyn Transport>>,
        timeout: Duration,
    ) -> Self {
        Self {
            primary,
            fallback,
            timeout,
        }
    }

    /// reqwest as primary, curl as fallback.
    pub fn from_config(config: &Config) -> Result<Self> {
        let primary = HttpTransport::from_config(config)?;
        let fallback = CurlTransport::from_config(config);
        Ok(Self::new(
            Arc::new(primary),
            Some(Arc::new(fallback)),
            config.liveness_timeout,
        ))
    }

    pub async fn is_reachable(&self, url: &str) -> bool {
        let domain_key = classify(url);
        self.check(url, &domain_key).await == Reachability::Reachable
    }

    pub async fn check(&self, url: &str, domain_key: &str) -> Reachability {
        let anti_bot = registry::is_anti_bot(domain_key);
        if anti_bot && is_profile_shaped(url, domain_key) {
            debug!(url, domain = domain_key, "Anti-bot profile URL accepted without probing");
            return Reachability::Reachable;
        }

        let outcome = match self.probe_with(self.primary.as_ref(), url).await {
            Ok(status) if !FALLBACK_STATUSES.contains(&status) => Ok(status),
            primary => match &self.fallback {
                Some(fallback) => {
                    debug!(
                        url,
                        primary = ?primary.as_ref().map_err(ToString::to_string),
                        fallback = fallback.name(),
                        "Retrying probe on fallback transport"
                    );
                    match self.probe_with(fallback.as_ref(), url).await {
                        Ok(status) => Ok(status),
                        // Keep a status from the primary over a fallback failure.
                        Err(e) => primary.or(Err(e)),
                    }
                }
                None => primary,
            },
        };

        match outcome {
            Ok(status) => {
                let reachability = reachability_for(status, anti_bot);
                debug!(url, status, ?reachability, "Probed URL");
                reachability
            }
            Err(e) => {
                warn!(url, error = %e, "Liveness probe failed, treating as unreachable");
                Reachability::Error
            }
        }
    }

    /// HEAD, then GET when the HEAD status is ambiguous.
    async fn probe_with(&self, transport: &dyn Transport, url: &str) -> Result<u16> {
        let status = self.timed(transport, url, ProbeMethod::Head).await?;
        if GET_RETRY_STATUSES.contains(&status) {
            debug!(url, status, transport = transport.name(), "HEAD rejected, retrying with GET");
            return self.timed(transport, url, ProbeMethod::Get).await;
        }
        Ok(status)
    }

    async fn timed(
        &self,
        transport: &dyn Transport,
        url: &str,
        method: ProbeMethod,
    ) -> Result<u16> {
        tokio::time::timeout(self.timeout, transport.probe(url, method))
            .await
            .map_err(|_| TransportError::Timeout(self.timeout))?
    }
}

fn reachability_for(status: u16, anti_bot: bool) -> Reachability {
    if (200..400).contains(&status) {
        Reachability::Reachable
    } else if anti_bot && ANTI_BOT_ALIVE_STATUSES.contains(&status) {
        Reachability::Reachable
    } else {
        Reachability::Dead
    }
}
