pub mod generator;
pub mod random;
pub mod simulator;

pub use generator::generate_result;
pub use random::{RandomSource, RngSource};
pub use simulator::{AnalysisSimulator, PendingAnalysis};
