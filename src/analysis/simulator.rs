use std::{
    ops::Range,
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::{task::JoinHandle, time};
use tokio_util::sync::CancellationToken;

use crate::error::{FailureReason, PipelineError};
use crate::models::{AnalysisResult, UploadCandidate};
use crate::settings::PipelineSettings;

use super::{generate_result, RandomSource};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_info;

type SharedSource = Arc<Mutex<Box<dyn RandomSource>>>;

/// Stands in for the processing backend: every analysis completes after a
/// random delay with a randomly generated result.
#[derive(Clone)]
pub struct AnalysisSimulator {
    source: SharedSource,
    delay_range: Range<u64>,
    pest_probability: f64,
}

impl AnalysisSimulator {
    pub fn new(settings: &PipelineSettings, source: Box<dyn RandomSource>) -> Self {
        Self {
            source: Arc::new(Mutex::new(source)),
            delay_range: settings.delay_min_ms..settings.delay_max_ms,
            pest_probability: settings.pest_probability,
        }
    }

    /// Schedules the analysis and returns at once. Must be called from
    /// inside a tokio runtime.
    pub fn analyze(&self, candidate: &UploadCandidate) -> PendingAnalysis {
        let delay_ms = with_source(&self.source, |source| {
            source.uniform_u64(self.delay_range.clone())
        });
        let delay = Duration::from_millis(delay_ms);

        log_info!(
            "analysis of '{}' scheduled, completes in {}ms",
            candidate.file_name,
            delay_ms
        );

        let handle = tokio::spawn({
            let source = Arc::clone(&self.source);
            let file_name = candidate.file_name.clone();
            let pest_probability = self.pest_probability;
            async move {
                time::sleep(delay).await;
                with_source(&source, |source| {
                    generate_result(&file_name, source, pest_probability)
                })
            }
        });

        PendingAnalysis {
            file_name: candidate.file_name.clone(),
            delay,
            handle,
        }
    }
}

fn with_source<T>(source: &SharedSource, f: impl FnOnce(&mut dyn RandomSource) -> T) -> T {
    let mut guard = match source.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    f(guard.as_mut())
}

/// An analysis that has been started but not yet observed.
pub struct PendingAnalysis {
    file_name: String,
    delay: Duration,
    handle: JoinHandle<AnalysisResult>,
}

impl PendingAnalysis {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn abort(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn wait(&mut self) -> Result<AnalysisResult, PipelineError> {
        match (&mut self.handle).await {
            Ok(result) => Ok(result),
            Err(err) if err.is_cancelled() => Err(self.failure(FailureReason::Cancelled)),
            Err(err) => Err(self.failure(FailureReason::Crashed(err.to_string()))),
        }
    }

    /// Waits for completion, giving up after `timeout` or when `cancel`
    /// fires. The task is aborted in both of those cases.
    pub async fn settle(
        mut self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, PipelineError> {
        let outcome = tokio::select! {
            waited = time::timeout(timeout, self.wait()) => waited.ok(),
            _ = cancel.cancelled() => None,
        };

        match outcome {
            Some(result) => result,
            None => {
                self.abort();
                let reason = if cancel.is_cancelled() {
                    FailureReason::Cancelled
                } else {
                    FailureReason::TimedOut {
                        after_ms: timeout.as_millis() as u64,
                    }
                };
                Err(self.failure(reason))
            }
        }
    }

    fn failure(&self, reason: FailureReason) -> PipelineError {
        PipelineError::AnalysisFailure {
            file_name: self.file_name.clone(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::RngSource;
    use std::ops::RangeInclusive;

    fn sim_settings() -> PipelineSettings {
        PipelineSettings {
            delay_min_ms: 3000,
            delay_max_ms: 5000,
            ..PipelineSettings::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn analyze_returns_before_completion() {
        let simulator = AnalysisSimulator::new(&sim_settings(), Box::new(RngSource::seeded(1)));
        let pending = simulator.analyze(&UploadCandidate::new("a.tif", 10));

        assert!(!pending.is_finished());
        assert!(pending.delay() >= Duration::from_millis(3000));
        assert!(pending.delay() < Duration::from_millis(5000));
    }

    #[tokio::test(start_paused = true)]
    async fn completes_after_drawn_delay() {
        let simulator = AnalysisSimulator::new(&sim_settings(), Box::new(RngSource::seeded(2)));
        let mut pending = simulator.analyze(&UploadCandidate::new("b.raw", 10));
        let start = time::Instant::now();

        let result = pending.wait().await.unwrap();

        assert_eq!(result.source_file_name, "b.raw");
        assert!(result.within_documented_ranges());
        assert!(start.elapsed() >= pending.delay());
    }

    #[tokio::test(start_paused = true)]
    async fn settle_times_out_and_aborts() {
        let simulator = AnalysisSimulator::new(&sim_settings(), Box::new(RngSource::seeded(3)));
        let pending = simulator.analyze(&UploadCandidate::new("slow.hdr", 10));
        let cancel = CancellationToken::new();

        let err = pending
            .settle(Duration::from_millis(100), &cancel)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            PipelineError::AnalysisFailure {
                file_name: "slow.hdr".into(),
                reason: FailureReason::TimedOut { after_ms: 100 },
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn settle_reports_cancellation() {
        let simulator = AnalysisSimulator::new(&sim_settings(), Box::new(RngSource::seeded(4)));
        let pending = simulator.analyze(&UploadCandidate::new("c.tiff", 10));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = pending
            .settle(Duration::from_secs(30), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::AnalysisFailure {
                reason: FailureReason::Cancelled,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn many_analyses_run_concurrently() {
        let simulator = AnalysisSimulator::new(&sim_settings(), Box::new(RngSource::seeded(5)));
        let start = time::Instant::now();

        let pending: Vec<_> = (0..20)
            .map(|i| simulator.analyze(&UploadCandidate::new(format!("f{i}.tif"), 1)))
            .collect();
        for mut analysis in pending {
            analysis.wait().await.unwrap();
        }

        // Sequential execution would need at least 20 * 3s.
        assert!(start.elapsed() < Duration::from_millis(5000));
    }

    /// Delays resolve instantly; the first value draw panics.
    struct FaultySource;

    impl RandomSource for FaultySource {
        fn uniform_u64(&mut self, range: Range<u64>) -> u64 {
            range.start
        }

        fn uniform_u32(&mut self, _range: RangeInclusive<u32>) -> u32 {
            panic!("sensor calibration table missing");
        }

        fn uniform_f64(&mut self, range: RangeInclusive<f64>) -> f64 {
            *range.start()
        }

        fn chance(&mut self, _p: f64) -> bool {
            false
        }

        fn pick(&mut self, _len: usize) -> usize {
            0
        }
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_generator_is_reported_as_crash() {
        let simulator = AnalysisSimulator::new(&sim_settings(), Box::new(FaultySource));
        let mut pending = simulator.analyze(&UploadCandidate::new("broken.tif", 10));

        let err = pending.wait().await.unwrap_err();

        match err {
            PipelineError::AnalysisFailure {
                file_name,
                reason: FailureReason::Crashed(detail),
            } => {
                assert_eq!(file_name, "broken.tif");
                assert!(!detail.is_empty());
            }
            other => panic!("expected a crash, got {other:?}"),
        }

        // The poisoned source lock is recovered on the next draw.
        let next = simulator.analyze(&UploadCandidate::new("next.tif", 10));
        assert_eq!(next.delay(), Duration::from_millis(3000));
    }
}
