//! Event-driven workflow engine.
//!
//! Each [`WorkflowEvent`] is dispatched to the stage registered for its
//! [`StageTag`]. Stage invocations run as tasks bounded by a per-stage
//! semaphore; different tickers proceed concurrently while each ticker has at
//! most one invocation in flight. Every invocation commits its mutation to
//! [`SharedState`] under the run lock before its follow-up event is
//! dispatched, and the commit that completes the last ticker produces the
//! report.

use parking_lot::Mutex;
use std::any::Any;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::error::{StageError, WorkflowError};
use super::shared_state::{CommitOutcome, SharedState};
use super::stage::{Stage, StageContext, StageOutput};
use super::stages::{
    AggregateStage, DEFAULT_FETCH_TIMEOUT, DEFAULT_LLM_TIMEOUT, EvaluateStage, FetchStage,
    MetricsStage, RouteStage, ValidateStage,
};
use crate::application::dto::ScreeningReport;
use crate::application::ports::{FinancialDataPort, LlmPort};
use crate::domain::screening::{EntityMutation, Regime, StageTag, WorkflowEvent};
use crate::domain::shared::{RunId, Ticker};
use crate::observability::{record_entity_done, record_run, record_stage_run, update_stage_in_flight};

/// Default concurrent invocations per stage.
pub const DEFAULT_STAGE_CONCURRENCY: usize = 10;

/// Scheduling settings.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Concurrent invocations per stage unless overridden.
    pub default_concurrency: usize,
    /// Per-stage overrides.
    pub stage_concurrency: HashMap<StageTag, usize>,
    /// Force-complete unfinished tickers after this long.
    pub run_deadline: Option<Duration>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_concurrency: DEFAULT_STAGE_CONCURRENCY,
            stage_concurrency: HashMap::new(),
            run_deadline: None,
        }
    }
}

impl EngineSettings {
    /// Concurrency for a stage (at least one).
    #[must_use]
    pub fn concurrency(&self, tag: StageTag) -> usize {
        self.stage_concurrency
            .get(&tag)
            .copied()
            .unwrap_or(self.default_concurrency)
            .max(1)
    }
}

/// Timeouts for the stages that call external systems.
#[derive(Debug, Clone, Copy)]
pub struct StageTimeouts {
    /// Data provider fetch.
    pub fetch: Duration,
    /// Validation agent and evaluation call.
    pub llm: Duration,
}

impl Default for StageTimeouts {
    fn default() -> Self {
        Self {
            fetch: DEFAULT_FETCH_TIMEOUT,
            llm: DEFAULT_LLM_TIMEOUT,
        }
    }
}

/// Dispatch table plus scheduling settings.
pub struct WorkflowEngine {
    stages: HashMap<StageTag, Arc<dyn Stage>>,
    settings: EngineSettings,
}

impl WorkflowEngine {
    /// Engine with an empty dispatch table.
    #[must_use]
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            stages: HashMap::new(),
            settings,
        }
    }

    /// Engine with the full screening pipeline registered.
    #[must_use]
    pub fn standard<D, L>(
        provider: Arc<D>,
        llm: Arc<L>,
        timeouts: StageTimeouts,
        settings: EngineSettings,
    ) -> Self
    where
        D: FinancialDataPort + ?Sized + 'static,
        L: LlmPort + ?Sized + 'static,
    {
        let mut engine = Self::new(settings)
            .with_stage(Arc::new(FetchStage::new(provider, timeouts.fetch)))
            .with_stage(Arc::new(RouteStage))
            .with_stage(Arc::new(ValidateStage::new(Arc::clone(&llm), timeouts.llm)))
            .with_stage(Arc::new(EvaluateStage::new(llm, timeouts.llm)))
            .with_stage(Arc::new(AggregateStage));
        for stage in MetricsStage::all() {
            engine = engine.with_stage(Arc::new(stage));
        }
        engine
    }

    /// Register (or replace) the handler for `stage.tag()`.
    #[must_use]
    pub fn with_stage(mut self, stage: Arc<dyn Stage>) -> Self {
        self.stages.insert(stage.tag(), stage);
        self
    }

    /// Scheduling settings.
    #[must_use]
    pub const fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Check that every stage has a handler.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::MissingStage` for the first unregistered tag.
    pub fn ensure_complete(&self) -> Result<(), WorkflowError> {
        match StageTag::ALL.iter().find(|t| !self.stages.contains_key(t)) {
            Some(tag) => Err(WorkflowError::MissingStage(*tag)),
            None => Ok(()),
        }
    }

    /// Screen `tickers` against `regime`.
    ///
    /// Per-ticker failures never abort the run; they show up as degraded
    /// entries in the report.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::Configuration` for an empty ticker list,
    /// `WorkflowError::MissingStage` for an incomplete dispatch table and
    /// `WorkflowError::Cancelled` when `cancel` fires.
    pub async fn run(
        &self,
        regime: Regime,
        tickers: Vec<Ticker>,
        cancel: &CancellationToken,
    ) -> Result<ScreeningReport, WorkflowError> {
        self.ensure_complete()?;
        let run_id = RunId::generate();
        let state = SharedState::new(run_id.clone(), regime, tickers)?;
        let entities = state.entity_ids().len();

        let span = tracing::info_span!(
            "screening.run",
            run.id = %run_id,
            run.regime = %regime,
            entities
        );
        let started = Instant::now();
        let result = RunDriver::new(self, state)
            .drive(cancel, self.settings.run_deadline)
            .instrument(span)
            .await;

        let outcome = match &result {
            Ok(_) => "completed",
            Err(e) => e.outcome(),
        };
        record_run(outcome, entities, started.elapsed().as_secs_f64());
        result
    }
}

/// One stage invocation's committed result.
struct Step {
    ticker: Ticker,
    next: Option<WorkflowEvent>,
    report: Option<Box<ScreeningReport>>,
}

struct InFlight {
    stage: Arc<dyn Stage>,
    ctx: Arc<StageContext>,
}

/// Per-run scheduler state. Lives for one `run` call.
struct RunDriver<'a> {
    engine: &'a WorkflowEngine,
    state: Arc<Mutex<SharedState>>,
    limits: HashMap<StageTag, Arc<Semaphore>>,
    tasks: JoinSet<Result<Step, WorkflowError>>,
    running: HashMap<Id, InFlight>,
    busy: HashSet<Ticker>,
    mailbox: HashMap<Ticker, VecDeque<WorkflowEvent>>,
    stage_load: HashMap<StageTag, usize>,
}

impl<'a> RunDriver<'a> {
    fn new(engine: &'a WorkflowEngine, state: SharedState) -> Self {
        let limits = StageTag::ALL
            .iter()
            .map(|tag| {
                let permits = engine.settings.concurrency(*tag);
                (*tag, Arc::new(Semaphore::new(permits)))
            })
            .collect();
        Self {
            engine,
            state: Arc::new(Mutex::new(state)),
            limits,
            tasks: JoinSet::new(),
            running: HashMap::new(),
            busy: HashSet::new(),
            mailbox: HashMap::new(),
            stage_load: HashMap::new(),
        }
    }

    async fn drive(
        mut self,
        cancel: &CancellationToken,
        deadline: Option<Duration>,
    ) -> Result<ScreeningReport, WorkflowError> {
        let seeds = self.state.lock().entity_ids().to_vec();
        tracing::info!(tickers = ?seeds, "Screening started");
        for ticker in seeds {
            self.enqueue(WorkflowEvent::ProcessTicker { ticker })?;
        }

        let deadline = async move {
            match deadline {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(deadline);

        loop {
            if self.tasks.is_empty() {
                let pending = self.state.lock().unfinished().len();
                return Err(WorkflowError::Stalled { pending });
            }

            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tracing::warn!("Screening cancelled");
                    self.tasks.abort_all();
                    return Err(WorkflowError::Cancelled);
                }
                () = &mut deadline => {
                    return self.expire().await;
                }
                Some(joined) = self.tasks.join_next_with_id() => {
                    if let Some(report) = self.on_joined(joined)? {
                        tracing::info!(entities = report.tickers.len(), "Screening finalized");
                        return Ok(report);
                    }
                }
            }
        }
    }

    /// Queue an event behind any in-flight work for the same ticker.
    fn enqueue(&mut self, event: WorkflowEvent) -> Result<(), WorkflowError> {
        let ticker = event.ticker().clone();
        self.mailbox.entry(ticker.clone()).or_default().push_back(event);
        self.pump(&ticker)
    }

    /// Start the next queued event for `ticker` if it is idle.
    fn pump(&mut self, ticker: &Ticker) -> Result<(), WorkflowError> {
        if self.busy.contains(ticker) {
            return Ok(());
        }
        let Some(event) = self.mailbox.get_mut(ticker).and_then(VecDeque::pop_front) else {
            return Ok(());
        };
        self.spawn(event)
    }

    fn spawn(&mut self, event: WorkflowEvent) -> Result<(), WorkflowError> {
        let tag = event.target_stage();
        let stage = self
            .engine
            .stages
            .get(&tag)
            .cloned()
            .ok_or(WorkflowError::MissingStage(tag))?;
        let limit = self
            .limits
            .get(&tag)
            .cloned()
            .ok_or(WorkflowError::MissingStage(tag))?;

        let (run_id, regime, entity) = {
            let state = self.state.lock();
            let entity = state
                .snapshot(event.ticker())
                .ok_or_else(|| WorkflowError::UnknownEntity(event.ticker().to_string()))?;
            (state.run_id().clone(), state.regime(), entity)
        };
        let ticker = event.ticker().clone();
        let ctx = Arc::new(StageContext {
            run_id,
            regime,
            event,
            entity,
        });

        let span = tracing::info_span!("screening.stage", stage = %tag, ticker = %ticker);
        let handle = self.tasks.spawn(
            invoke(
                Arc::clone(&stage),
                limit,
                Arc::clone(&self.state),
                Arc::clone(&ctx),
            )
            .instrument(span),
        );
        self.running.insert(handle.id(), InFlight { stage, ctx });
        self.busy.insert(ticker);
        self.adjust_load(tag, true);
        Ok(())
    }

    fn on_joined(
        &mut self,
        joined: Result<(Id, Result<Step, WorkflowError>), JoinError>,
    ) -> Result<Option<ScreeningReport>, WorkflowError> {
        let step = match joined {
            Ok((id, result)) => {
                self.release(id);
                result?
            }
            Err(err) => {
                let Some(task) = self.release(err.id()) else {
                    return Ok(None);
                };
                if !err.is_panic() {
                    return Ok(None);
                }
                let tag = task.stage.tag();
                let error = StageError::Panicked {
                    stage: tag,
                    message: panic_message(err.into_panic()),
                };
                tracing::error!(
                    ticker = %task.ctx.event.ticker(),
                    stage = %tag,
                    error = %error,
                    "Stage panicked, recovering"
                );
                record_stage_run(tag.as_str(), error.outcome(), 0.0);
                let output = task.stage.recover(&task.ctx, &error);
                commit(&self.state, task.ctx.event.ticker(), output)?
            }
        };

        if let Some(report) = step.report {
            return Ok(Some(*report));
        }
        self.busy.remove(&step.ticker);
        if let Some(next) = step.next {
            self.mailbox
                .entry(step.ticker.clone())
                .or_default()
                .push_back(next);
        }
        self.pump(&step.ticker)?;
        Ok(None)
    }

    fn release(&mut self, id: Id) -> Option<InFlight> {
        let task = self.running.remove(&id)?;
        self.adjust_load(task.stage.tag(), false);
        Some(task)
    }

    fn adjust_load(&mut self, tag: StageTag, started: bool) {
        let load = self.stage_load.entry(tag).or_default();
        if started {
            *load += 1;
        } else {
            *load = load.saturating_sub(1);
        }
        update_stage_in_flight(tag.as_str(), *load);
    }

    /// Deadline elapsed: abort in-flight work and force-complete the rest.
    async fn expire(mut self) -> Result<ScreeningReport, WorkflowError> {
        self.tasks.abort_all();
        while let Some(joined) = self.tasks.join_next().await {
            if let Ok(Ok(Step {
                report: Some(report),
                ..
            })) = joined
            {
                return Ok(*report);
            }
        }

        let mut state = self.state.lock();
        let unfinished = state.unfinished();
        tracing::warn!(abandoned = ?unfinished, "Run deadline elapsed");
        for ticker in &unfinished {
            record_entity_done("abandoned");
            let outcome = state.commit(
                ticker,
                EntityMutation::Abandoned {
                    reason: "run deadline elapsed".to_string(),
                },
            )?;
            if let CommitOutcome::Finalized(report) = outcome {
                return Ok(*report);
            }
        }
        Err(WorkflowError::Stalled {
            pending: unfinished.len(),
        })
    }
}

/// Run one stage invocation and commit its output.
async fn invoke(
    stage: Arc<dyn Stage>,
    limit: Arc<Semaphore>,
    state: Arc<Mutex<SharedState>>,
    ctx: Arc<StageContext>,
) -> Result<Step, WorkflowError> {
    // The semaphore is never closed while the run is alive.
    let _permit = limit
        .acquire_owned()
        .await
        .map_err(|_| WorkflowError::Cancelled)?;

    let tag = stage.tag();
    let started = Instant::now();
    let result = match stage.timeout() {
        Some(limit) => tokio::time::timeout(limit, stage.run(&ctx))
            .await
            .unwrap_or_else(|_| {
                Err(StageError::Timeout {
                    stage: tag,
                    timeout: limit,
                })
            }),
        None => stage.run(&ctx).await,
    };

    let output = match result {
        Ok(output) => {
            tracing::debug!(
                ticker = %ctx.event.ticker(),
                stage = %tag,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Stage committed"
            );
            record_stage_run(tag.as_str(), "ok", started.elapsed().as_secs_f64());
            output
        }
        Err(error) => {
            tracing::warn!(
                ticker = %ctx.event.ticker(),
                stage = %tag,
                elapsed_ms = started.elapsed().as_millis() as u64,
                error = %error,
                "Stage failed, using degraded output"
            );
            record_stage_run(tag.as_str(), error.outcome(), started.elapsed().as_secs_f64());
            stage.recover(&ctx, &error)
        }
    };

    commit(&state, ctx.event.ticker(), output)
}

fn commit(
    state: &Mutex<SharedState>,
    ticker: &Ticker,
    output: StageOutput,
) -> Result<Step, WorkflowError> {
    let completes = matches!(output.mutation, EntityMutation::Completed);
    let outcome = state.lock().commit(ticker, output.mutation)?;
    if completes {
        record_entity_done("completed");
    }
    let report = match outcome {
        CommitOutcome::Finalized(report) => Some(report),
        CommitOutcome::Applied | CommitOutcome::AlreadyCompleted => None,
    };
    Ok(Step {
        ticker: ticker.clone(),
        next: output.next,
        report,
    })
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}
