//! End-to-end tests for the screening workflow.
//!
//! Drives the engine through the use cases with in-process adapters:
//! seeded or fixture-file financials and a scripted language model.

#![allow(clippy::unwrap_used)]

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use regime_screener::application::dto::{ScreeningReport, ScreeningRequestDto, TickerOutcome};
use regime_screener::application::ports::{
    AgentRun, AgentTool, DataProviderError, FetchedFinancials, FinancialDataPort, LlmError,
    LlmPort, ResponseSchema, StatementAccessor,
};
use regime_screener::application::use_cases::{ScreenTickerUseCase, ScreenTickersUseCase};
use regime_screener::application::workflow::{EngineSettings, StageTimeouts, WorkflowEngine};
use regime_screener::domain::screening::{Regime, StageTag, StatementKind};
use regime_screener::domain::shared::Ticker;
use regime_screener::infrastructure::llm::ScriptedLlm;
use regime_screener::infrastructure::market_data::{
    FixtureDataProvider, InMemoryDataProvider, samples,
};

// =============================================================================
// Helpers
// =============================================================================

fn tickers_use_case(provider: InMemoryDataProvider, llm: ScriptedLlm) -> ScreenTickersUseCase {
    ScreenTickersUseCase::from_ports(
        Arc::new(provider),
        Arc::new(llm),
        StageTimeouts::default(),
        EngineSettings::default(),
    )
}

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Structured calls sleep briefly and record how many overlap.
#[derive(Default)]
struct GaugeLlm {
    current: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

#[async_trait]
impl LlmPort for GaugeLlm {
    async fn complete_structured(
        &self,
        _prompt: &str,
        _schema: &ResponseSchema,
    ) -> Result<Value, LlmError> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        Ok(json!({ "explanation": "gauged", "score": 60 }))
    }

    async fn run_agent(
        &self,
        _prompt: &str,
        _tools: &[AgentTool],
        _accessor: &dyn StatementAccessor,
    ) -> Result<AgentRun, LlmError> {
        Ok(AgentRun::default())
    }
}

/// Records, per ticker, which external calls are in flight and in what order.
#[derive(Default)]
struct CallTrace {
    in_flight: Mutex<HashMap<String, usize>>,
    steps: Mutex<HashMap<String, Vec<String>>>,
    per_ticker_peak: AtomicUsize,
    total: AtomicUsize,
    total_peak: AtomicUsize,
}

impl CallTrace {
    fn enter(&self, ticker: &str, step: &str) {
        {
            let mut in_flight = self.in_flight.lock();
            let count = in_flight.entry(ticker.to_string()).or_default();
            *count += 1;
            self.per_ticker_peak.fetch_max(*count, Ordering::SeqCst);
        }
        let now = self.total.fetch_add(1, Ordering::SeqCst) + 1;
        self.total_peak.fetch_max(now, Ordering::SeqCst);
        self.push(ticker, format!("{step}:start"));
    }

    fn exit(&self, ticker: &str, step: &str) {
        self.push(ticker, format!("{step}:end"));
        self.total.fetch_sub(1, Ordering::SeqCst);
        if let Some(count) = self.in_flight.lock().get_mut(ticker) {
            *count -= 1;
        }
    }

    fn push(&self, ticker: &str, entry: String) {
        self.steps
            .lock()
            .entry(ticker.to_string())
            .or_default()
            .push(entry);
    }

    fn steps_for(&self, ticker: &str) -> Vec<String> {
        self.steps.lock().get(ticker).cloned().unwrap_or_default()
    }
}

const MARKER: &str = "Marker ";
const STEP_DELAY: Duration = Duration::from_millis(15);

/// Industrial sample whose quarterly balance sheet names the ticker.
fn marked_financials(ticker: &Ticker) -> FetchedFinancials {
    let mut fetched = samples::industrial();
    let marker = format!("{MARKER}{ticker}");
    fetched.financials.quarterly_balance_sheet =
        samples::statement(&[(2024, 12, 31)], &[(marker.as_str(), &[1.0][..])]);
    fetched
}

fn marker_in(text: &str) -> String {
    text.split(MARKER)
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .unwrap_or("?")
        .to_string()
}

struct TracedProvider(Arc<CallTrace>);

#[async_trait]
impl FinancialDataPort for TracedProvider {
    async fn fetch(&self, ticker: &Ticker) -> Result<FetchedFinancials, DataProviderError> {
        self.0.enter(ticker.as_str(), "fetch");
        tokio::time::sleep(STEP_DELAY).await;
        self.0.exit(ticker.as_str(), "fetch");
        Ok(marked_financials(ticker))
    }
}

/// The agent reads the ticker from the statements and echoes it in its
/// commentary, which the scoring call then reads back from the prompt.
struct TracedLlm(Arc<CallTrace>);

#[async_trait]
impl LlmPort for TracedLlm {
    async fn complete_structured(
        &self,
        prompt: &str,
        _schema: &ResponseSchema,
    ) -> Result<Value, LlmError> {
        let ticker = marker_in(prompt);
        self.0.enter(&ticker, "evaluate");
        tokio::time::sleep(STEP_DELAY).await;
        self.0.exit(&ticker, "evaluate");
        Ok(json!({ "explanation": format!("scored {ticker}"), "score": 70 }))
    }

    async fn run_agent(
        &self,
        _prompt: &str,
        _tools: &[AgentTool],
        accessor: &dyn StatementAccessor,
    ) -> Result<AgentRun, LlmError> {
        let ticker = marker_in(&accessor.render(StatementKind::QuarterlyBalanceSheet));
        self.0.enter(&ticker, "validate");
        tokio::time::sleep(STEP_DELAY).await;
        self.0.exit(&ticker, "validate");
        Ok(AgentRun {
            text: format!("reviewed {MARKER}{ticker}"),
            tool_calls: vec!["get_quarterly_balance_data".to_string()],
        })
    }
}

// =============================================================================
// Partial failure
// =============================================================================

#[tokio::test]
async fn unknown_ticker_degrades_without_aborting_the_run() {
    let llm = ScriptedLlm::new().with_score(72);
    let use_case = tickers_use_case(InMemoryDataProvider::with_samples(), llm.clone());

    let report = use_case
        .execute(
            &ScreeningRequestDto::from_csv("recession", "ACME,GHOST"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let acme = Ticker::new("ACME");
    let ghost = Ticker::new("GHOST");
    assert_eq!(report.regime, Regime::Recession);
    assert_eq!(report.tickers, vec![acme.clone(), ghost.clone()]);

    assert_eq!(report.evaluation(&acme).unwrap().score(), 72);
    assert!(!report.metrics_for(&acme).unwrap().is_empty());

    let degraded = report.evaluation(&ghost).unwrap();
    assert_eq!(degraded.score(), 0);
    assert_eq!(degraded.explanation(), "No metrics");
    assert!(report.metrics_for(&ghost).unwrap().is_empty());

    // Only the ticker with metrics reaches either model call.
    assert_eq!(llm.agent_calls(), 1);
    assert_eq!(llm.structured_calls(), 1);
}

#[tokio::test]
async fn failed_validation_still_evaluates_without_commentary() {
    let llm = ScriptedLlm::new().failing_agent(LlmError::RateLimited);
    let use_case = tickers_use_case(InMemoryDataProvider::with_samples(), llm.clone());

    let report = use_case
        .execute(
            &ScreeningRequestDto::from_csv("inflation", "ACME"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.evaluation(&Ticker::new("ACME")).unwrap().score(), 50);
    assert_eq!(llm.structured_calls(), 1);
    assert!(llm.prompts().iter().any(|p| p.contains("(none available)")));
}

#[tokio::test]
async fn failed_scoring_yields_zero_score_with_reason() {
    let llm = ScriptedLlm::new().failing_structured(LlmError::Api {
        status: 500,
        message: "upstream exploded".to_string(),
    });
    let use_case = tickers_use_case(InMemoryDataProvider::with_samples(), llm);

    let report = use_case
        .execute(
            &ScreeningRequestDto::from_csv("expansion", "ACME,BANKCO"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    for evaluation in report.evaluations.values() {
        let evaluation = evaluation.as_ref().unwrap();
        assert_eq!(evaluation.score(), 0);
        assert!(evaluation.explanation().contains("upstream exploded"));
    }
}

// =============================================================================
// Fan-out / fan-in
// =============================================================================

#[tokio::test]
async fn many_tickers_join_at_a_single_barrier() {
    let provider = InMemoryDataProvider::new();
    let names: Vec<String> = (0..40).map(|i| format!("CO{i:02}")).collect();
    for (i, name) in names.iter().enumerate() {
        let sample = if i % 4 == 0 {
            samples::bank()
        } else {
            samples::industrial()
        };
        provider.insert(Ticker::new(name.as_str()), sample);
    }
    let llm = ScriptedLlm::new().with_delay(Duration::from_millis(2));
    let mut settings = EngineSettings::default();
    settings.stage_concurrency.insert(StageTag::Validate, 3);

    let engine = WorkflowEngine::standard(
        Arc::new(provider),
        Arc::new(llm.clone()),
        StageTimeouts::default(),
        settings,
    );
    let tickers: Vec<Ticker> = names.iter().map(|n| Ticker::new(n.as_str())).collect();

    let report = engine
        .run(Regime::Stagflation, tickers.clone(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.tickers, tickers);
    assert_eq!(report.evaluations.len(), 40);
    assert_eq!(report.metrics.len(), 40);
    assert!(report.evaluations.values().all(Option::is_some));
    assert_eq!(llm.agent_calls(), 40);
    assert_eq!(llm.structured_calls(), 40);
}

#[tokio::test]
async fn evaluate_stage_respects_its_concurrency_limit() {
    let provider = InMemoryDataProvider::new();
    for i in 0..8 {
        provider.insert(Ticker::new(format!("T{i}")), samples::industrial());
    }
    let llm = Arc::new(GaugeLlm::default());
    let mut settings = EngineSettings::default();
    settings.stage_concurrency.insert(StageTag::Evaluate, 2);

    let engine = WorkflowEngine::standard(
        Arc::new(provider),
        Arc::clone(&llm),
        StageTimeouts::default(),
        settings,
    );
    let tickers: Vec<Ticker> = (0..8).map(|i| Ticker::new(format!("T{i}"))).collect();

    let report = engine
        .run(Regime::Expansion, tickers, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.evaluations.len(), 8);
    assert_eq!(llm.calls.load(Ordering::SeqCst), 8);
    assert!(llm.peak.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn each_ticker_runs_one_stage_at_a_time() {
    let trace = Arc::new(CallTrace::default());
    let engine = WorkflowEngine::standard(
        Arc::new(TracedProvider(Arc::clone(&trace))),
        Arc::new(TracedLlm(Arc::clone(&trace))),
        StageTimeouts::default(),
        EngineSettings::default(),
    );
    let tickers: Vec<Ticker> = (0..6).map(|i| Ticker::new(format!("S{i}"))).collect();

    let report = engine
        .run(Regime::Expansion, tickers.clone(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(trace.per_ticker_peak.load(Ordering::SeqCst), 1);
    assert!(trace.total_peak.load(Ordering::SeqCst) > 1);

    let serial = [
        "fetch:start",
        "fetch:end",
        "validate:start",
        "validate:end",
        "evaluate:start",
        "evaluate:end",
    ];
    for ticker in &tickers {
        assert_eq!(trace.steps_for(ticker.as_str()), serial, "{ticker}");
        let evaluation = report.evaluation(ticker).unwrap();
        assert_eq!(evaluation.explanation(), format!("scored {ticker}"));
        assert!(!report.metrics_for(ticker).unwrap().is_empty());
    }
}

#[tokio::test]
async fn the_same_engine_serves_consecutive_runs() {
    let llm = ScriptedLlm::new();
    let engine = Arc::new(WorkflowEngine::standard(
        Arc::new(InMemoryDataProvider::with_samples()),
        Arc::new(llm.clone()),
        StageTimeouts::default(),
        EngineSettings::default(),
    ));
    let use_case = ScreenTickersUseCase::new(Arc::clone(&engine));
    let cancel = CancellationToken::new();

    let first = use_case
        .execute(&ScreeningRequestDto::from_csv("0", "ACME"), &cancel)
        .await
        .unwrap();
    let second = use_case
        .execute(&ScreeningRequestDto::from_csv("3", "BANKCO"), &cancel)
        .await
        .unwrap();

    assert_eq!(first.regime, Regime::Expansion);
    assert_eq!(second.regime, Regime::Recession);
    assert_eq!(second.tickers, vec![Ticker::new("BANKCO")]);
    assert_eq!(llm.structured_calls(), 2);
}

// =============================================================================
// Report serialization
// =============================================================================

#[tokio::test]
async fn report_round_trip_keeps_ticker_keys() {
    let provider = InMemoryDataProvider::with_samples();
    provider.insert(Ticker::new("INITECH"), samples::industrial());
    let use_case = tickers_use_case(provider, ScriptedLlm::new());

    let report = use_case
        .execute(
            &ScreeningRequestDto::from_csv("stagflation", "ACME,BANKCO,INITECH"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    for ticker in &report.tickers {
        assert!(!report.metrics_for(ticker).unwrap().is_empty(), "{ticker} has no metrics");
    }

    let json = serde_json::to_string(&report).unwrap();
    let restored: ScreeningReport = serde_json::from_str(&json).unwrap();

    let expected: BTreeSet<&str> = ["ACME", "BANKCO", "INITECH"].into_iter().collect();
    let evaluation_keys: BTreeSet<&str> =
        restored.evaluations.keys().map(Ticker::as_str).collect();
    let metric_keys: BTreeSet<&str> = restored.metrics.keys().map(Ticker::as_str).collect();
    assert_eq!(evaluation_keys, expected);
    assert_eq!(metric_keys, expected);
    assert_eq!(restored.tickers, report.tickers);
    assert_eq!(restored.evaluations, report.evaluations);
}

#[tokio::test]
async fn report_round_trip_keeps_degraded_ticker() {
    let use_case = tickers_use_case(InMemoryDataProvider::with_samples(), ScriptedLlm::new());

    let report = use_case
        .execute(
            &ScreeningRequestDto::from_csv("recession", "ACME,GHOST"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let json = serde_json::to_string(&report).unwrap();
    let restored: ScreeningReport = serde_json::from_str(&json).unwrap();

    let ghost = Ticker::new("GHOST");
    assert!(restored.metrics_for(&ghost).unwrap().is_empty());
    assert_eq!(restored.evaluation(&ghost).unwrap().explanation(), "No metrics");
    assert_eq!(restored.evaluations, report.evaluations);
}

// =============================================================================
// Fixture files
// =============================================================================

#[tokio::test]
async fn fixture_files_drive_a_full_run() {
    let llm = ScriptedLlm::new().with_score(65);
    let use_case = ScreenTickersUseCase::from_ports(
        Arc::new(FixtureDataProvider::new(fixture_dir())),
        Arc::new(llm.clone()),
        StageTimeouts::default(),
        EngineSettings::default(),
    );

    let report = use_case
        .execute(
            &ScreeningRequestDto::from_csv("recession", "ACME,BANKCO,GLOBEX"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    for ticker in &report.tickers {
        assert!(!report.metrics_for(ticker).unwrap().is_empty(), "{ticker} has no metrics");
        assert_eq!(report.evaluation(ticker).unwrap().score(), 65);
    }
    assert_eq!(llm.agent_calls(), 3);
}

#[tokio::test]
async fn single_ticker_use_case_reports_no_data_for_missing_fixture() {
    let use_case = ScreenTickerUseCase::new(Arc::new(WorkflowEngine::standard(
        Arc::new(FixtureDataProvider::new(fixture_dir())),
        Arc::new(ScriptedLlm::new()),
        StageTimeouts::default(),
        EngineSettings::default(),
    )));
    let cancel = CancellationToken::new();

    let found = use_case.execute("expansionary", "globex", &cancel).await.unwrap();
    assert!(matches!(found, TickerOutcome::Evaluated(ref e) if e.score() == 50));

    let missing = use_case.execute("expansion", "NOPE", &cancel).await.unwrap();
    assert_eq!(
        missing,
        TickerOutcome::NoData(
            "No financial metrics available for evaluation (Ticker: NOPE).".to_string()
        )
    );
}
