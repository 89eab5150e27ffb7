// Module declarations
pub(crate) mod pipeline_model;
pub(crate) mod pipeline_service;

// Re-export the public interface
pub use pipeline_model::{
    normalize, parse_order_timestamp, NormalizedRecord, PipelineRunSummary, RawOrderRecord,
};
pub use pipeline_service::PipelineRunner;
