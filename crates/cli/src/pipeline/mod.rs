//! Pipeline orchestration module.

mod orchestrator;
mod record;
mod stats;
mod writer;

pub use orchestrator::{Pipeline, PipelineConfig};
pub use record::OutcomeRecord;
pub use stats::PipelineStats;
pub use writer::{OutcomeWriter, WriterStats, FAILURE_FILE, SUCCESS_FILE};
