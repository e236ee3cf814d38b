//! Scrape orchestration: drive every registered extractor against one entity,
//! share fetched records through a session cache, and report progress as
//! events.

pub mod cache;
pub mod error;
pub mod extractor;
pub mod orchestrator;
pub mod progress;

#[cfg(feature = "test-support")]
pub mod testing;

pub use cache::{shared_cache, ScrapeCache, SharedCache};
pub use error::{Result, ScoutError};
pub use extractor::{guess_from_template, Extractor};
pub use orchestrator::{BatchHandle, BatchOutcome, BatchSummary, ScrapeOrchestrator};
pub use progress::{Progress, ScrapeEvent, ScrapeStatus};
