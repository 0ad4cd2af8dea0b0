pub mod controller;
pub mod propagator;
pub mod state;

pub use controller::{AcceptedAnalysis, AnalysisPipeline, SubmissionReport};
pub use propagator::ResultPropagator;
pub use state::{activity_entry_for, PipelineState, ANALYSIS_COMPLETED_TITLE};
