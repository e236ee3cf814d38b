//! Reference URL curation: classify URLs against a domain registry, probe
//! their liveness, and produce a deduplicated, capped, deterministic ranking.

pub mod classify;
pub mod curator;
pub mod error;
pub mod liveness;
pub mod ranker;
pub mod registry;
pub mod transport;

#[cfg(feature = "test-support")]
pub mod testing;

pub use classify::{
    classify, domain_class, is_ad_host, is_profile_shaped, DomainClass, Reachability, UrlCandidate,
};
pub use curator::{Curation, UrlCurator};
pub use error::{Result, TransportError};
pub use liveness::LivenessChecker;
pub use ranker::rank;
pub use transport::{CurlTransport, HttpTransport, ProbeMethod, Transport};
