use std::{sync::Arc, time::Duration};

use anyhow::Result;
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    analysis::{AnalysisSimulator, PendingAnalysis, RandomSource, RngSource},
    error::{FailureReason, PipelineError},
    intake::FileFilter,
    models::{
        ActivityLogEntry, AnalysisRecord, AnalysisResult, HealthMetricsSnapshot, Notification,
        NotificationKind, PipelineStats, UploadCandidate, ViewContext,
    },
    settings::PipelineSettings,
    view::{NotificationCenter, ViewSink},
};

use super::{PipelineState, ResultPropagator};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// An upload that passed the filter and is now being analysed. `id` is
/// the key for [`AnalysisPipeline::analysis_status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedAnalysis {
    pub id: Uuid,
    pub file_name: String,
}

/// What happened to each file of one submission.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReport {
    pub accepted: Vec<AcceptedAnalysis>,
    #[serde(serialize_with = "serialize_errors")]
    pub rejected: Vec<PipelineError>,
}

fn serialize_errors<S>(errors: &[PipelineError], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(errors.iter().map(|err| err.to_string()))
}

/// Counts one analysis as in flight for as long as it is alive, including
/// when the watcher unwinds.
struct InFlightGuard(Arc<watch::Sender<usize>>);

impl InFlightGuard {
    fn enter(counter: &Arc<watch::Sender<usize>>) -> Self {
        counter.send_modify(|count| *count += 1);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.send_modify(|count| *count = count.saturating_sub(1));
    }
}

/// Entry point for the surrounding UI. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct AnalysisPipeline {
    state: Arc<Mutex<PipelineState>>,
    filter: FileFilter,
    simulator: AnalysisSimulator,
    propagator: ResultPropagator,
    notifications: NotificationCenter,
    analysis_timeout: Duration,
    cancel: CancellationToken,
    in_flight: Arc<watch::Sender<usize>>,
}

impl AnalysisPipeline {
    pub fn new(settings: PipelineSettings, view: Arc<dyn ViewSink>) -> Result<Self> {
        Self::with_random_source(settings, view, Box::new(RngSource::from_entropy()))
    }

    pub fn with_random_source(
        settings: PipelineSettings,
        view: Arc<dyn ViewSink>,
        source: Box<dyn RandomSource>,
    ) -> Result<Self> {
        settings.validate()?;

        let state = Arc::new(Mutex::new(PipelineState::new(
            settings.activity_log_capacity,
            settings.status_history_capacity,
        )));
        let (in_flight, _) = watch::channel(0usize);

        Ok(Self {
            filter: FileFilter::from_settings(&settings),
            simulator: AnalysisSimulator::new(&settings, source),
            propagator: ResultPropagator::new(Arc::clone(&state), Arc::clone(&view)),
            notifications: NotificationCenter::new(view, settings.notification_ttl()),
            analysis_timeout: settings.analysis_timeout(),
            cancel: CancellationToken::new(),
            in_flight: Arc::new(in_flight),
            state,
        })
    }

    /// Validates every candidate and starts an analysis for each accepted
    /// one. Returns without waiting for any analysis to finish.
    pub async fn submit_files<I>(&self, candidates: I) -> SubmissionReport
    where
        I: IntoIterator<Item = UploadCandidate>,
    {
        let mut report = SubmissionReport::default();

        for candidate in candidates {
            if let Err(err) = self.filter.validate(&candidate) {
                log_warn!("rejected upload: {err}");
                self.state.lock().await.stats.record_rejection();
                self.notifications.show(Notification::error(err.to_string()));
                report.rejected.push(err);
                continue;
            }

            if self.cancel.is_cancelled() {
                let err = PipelineError::AnalysisFailure {
                    file_name: candidate.file_name.clone(),
                    reason: FailureReason::Cancelled,
                };
                log_warn!("pipeline shut down, not analysing '{}'", candidate.file_name);
                report.rejected.push(err);
                continue;
            }

            let id = Uuid::new_v4();
            self.state
                .lock()
                .await
                .history
                .start(id, &candidate.file_name);
            let pending = self.simulator.analyze(&candidate);
            self.spawn_watcher(id, pending);
            report.accepted.push(AcceptedAnalysis {
                id,
                file_name: candidate.file_name,
            });
        }

        if !report.accepted.is_empty() {
            let count = report.accepted.len();
            log_info!("processing {count} hyperspectral file(s)");
            self.notifications.show(Notification::new(
                NotificationKind::Info,
                format!("Processing {count} hyperspectral file(s)..."),
            ));
        }

        report
    }

    fn spawn_watcher(&self, id: Uuid, pending: PendingAnalysis) {
        let guard = InFlightGuard::enter(&self.in_flight);

        let pipeline = self.clone();
        tokio::spawn(async move {
            let _in_flight = guard;
            let file_name = pending.file_name().to_string();
            let result = match pending
                .settle(pipeline.analysis_timeout, &pipeline.cancel)
                .await
            {
                Ok(result) => result,
                Err(err) => return pipeline.report_failure(id, err).await,
            };

            let health_score = result.health_score;
            let propagator = pipeline.propagator.clone();
            let propagated = tokio::spawn(async move { propagator.on_result_ready(result).await });

            match propagated.await {
                Ok(()) => {
                    pipeline.state.lock().await.history.complete(id, health_score);
                    pipeline.notifications.show(Notification::new(
                        NotificationKind::Success,
                        format!("Analysis complete for {file_name}"),
                    ));
                }
                Err(join) => {
                    let err = PipelineError::AnalysisFailure {
                        file_name,
                        reason: FailureReason::Crashed(join.to_string()),
                    };
                    pipeline.report_failure(id, err).await;
                }
            }
        });
    }

    /// Failures are logged, counted and shown; the snapshot and activity log
    /// stay untouched. Cancellations during shutdown are only logged.
    async fn report_failure(&self, id: Uuid, err: PipelineError) {
        log_error!("{err}");
        {
            let mut state = self.state.lock().await;
            state.stats.record_failure();
            state.history.fail(id, err.to_string());
        }

        let cancelled = matches!(
            err,
            PipelineError::AnalysisFailure {
                reason: FailureReason::Cancelled,
                ..
            }
        );
        if !cancelled {
            self.notifications.show(Notification::error(err.to_string()));
        }
    }

    pub async fn set_active_view(&self, view: ViewContext) {
        self.state.lock().await.active_view = view;
    }

    pub async fn active_view(&self) -> ViewContext {
        self.state.lock().await.active_view
    }

    pub async fn activity_log(&self) -> Vec<ActivityLogEntry> {
        self.state.lock().await.activity.to_vec()
    }

    pub async fn metrics(&self) -> Option<HealthMetricsSnapshot> {
        self.state.lock().await.metrics
    }

    pub async fn latest_result(&self) -> Option<AnalysisResult> {
        self.state.lock().await.latest_result.clone()
    }

    pub async fn stats(&self) -> PipelineStats {
        self.state.lock().await.stats.clone()
    }

    /// `None` for unknown ids and for finished records that have aged out.
    pub async fn analysis_status(&self, id: Uuid) -> Option<AnalysisRecord> {
        self.state.lock().await.history.get(id).cloned()
    }

    pub fn in_flight(&self) -> usize {
        *self.in_flight.borrow()
    }

    pub fn visible_notifications(&self) -> Vec<Uuid> {
        self.notifications.visible()
    }

    /// Resolves once no analysis is pending.
    pub async fn wait_idle(&self) {
        let mut rx = self.in_flight.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|count| *count == 0).await;
    }

    /// Aborts every pending analysis and waits for the watchers to finish.
    /// Later submissions are refused.
    pub async fn shutdown(&self) {
        log_info!("shutting down pipeline with {} analyses in flight", self.in_flight());
        self.cancel.cancel();
        self.wait_idle().await;
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
