//! Pipeline orchestrator - runs one request through the three stages
//!
//! INPUT → EXTRACT → AGGREGATE → VERIFY → COMPOSE → COMPLETE
//!
//! Stages run strictly in order; the first failure aborts the request.

use crate::classifier::IntentKind;
use crate::error::AssistantError;
use crate::ledger::Ledger;
use crate::llm::LanguageModel;
use crate::models::{PipelineOutcome, Stage};
use crate::period::format_reference_date;
use crate::stages::{AggregationContext, Aggregator, IntentExtractor, ResponseComposer};
use crate::verification::{create_default_verification_engine, VerificationContext, VerificationEngine};
use crate::Result;
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

pub const NO_REQUEST_MESSAGE: &str = "❌ No valid request received.";

/// Source of the reference date, read once per request
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the machine
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Pinned date, for tests and replays
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// What happened to one request
#[derive(Debug)]
pub enum RequestOutcome {
    /// Blank input, no stage was invoked
    Empty,
    Answered(PipelineOutcome),
    Failed(AssistantError),
}

/// Main orchestrator that sequences the stages
pub struct Orchestrator {
    extractor: IntentExtractor,
    aggregator: Aggregator,
    composer: ResponseComposer,
    verification_engine: VerificationEngine,
    clock: Box<dyn Clock>,
}

impl Orchestrator {
    pub fn new(
        extractor: IntentExtractor,
        aggregator: Aggregator,
        composer: ResponseComposer,
        verification_engine: VerificationEngine,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            extractor,
            aggregator,
            composer,
            verification_engine,
            clock,
        }
    }

    /// Wire all three stages to one model with the default rules
    pub fn with_model(
        model: Arc<dyn LanguageModel>,
        ledger: &'static Ledger,
        language: &str,
        currency: &str,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self::new(
            IntentExtractor::new(model.clone()),
            Aggregator::new(model.clone(), ledger),
            ResponseComposer::new(model, language, currency),
            create_default_verification_engine(),
            clock,
        )
    }

    /// Run one request without printing anything
    pub async fn process(&self, request: &str) -> RequestOutcome {
        let request = request.trim();
        if request.is_empty() {
            debug!("Blank request, pipeline not started");
            return RequestOutcome::Empty;
        }

        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline", %run_id);

        match self.run(run_id, request).instrument(span).await {
            Ok(outcome) => RequestOutcome::Answered(outcome),
            Err(e) => {
                warn!(%run_id, error = %e, "Pipeline aborted");
                RequestOutcome::Failed(e)
            }
        }
    }

    /// Run one request and report the result on `out`
    ///
    /// Only console write failures are returned as errors; pipeline
    /// failures are printed and handed back in the outcome.
    pub async fn respond<W>(&self, request: &str, out: &mut W, show_trace: bool) -> Result<RequestOutcome>
    where
        W: AsyncWrite + Unpin,
    {
        if request.trim().is_empty() {
            out.write_all(format!("{}\n", NO_REQUEST_MESSAGE).as_bytes()).await?;
            out.flush().await?;
            return Ok(RequestOutcome::Empty);
        }

        out.write_all("\n🚀 Starting the multi-agent process...\n".as_bytes()).await?;
        out.flush().await?;

        let outcome = self.process(request).await;

        match &outcome {
            RequestOutcome::Answered(result) => {
                out.write_all(format!("\n✅ Final answer:\n{}\n", result.answer).as_bytes()).await?;
                if show_trace {
                    out.write_all(format!("\nRun {} ({} ms):\n", result.run_id, result.elapsed_ms).as_bytes())
                        .await?;
                    for (i, line) in result.reasoning_trace.iter().enumerate() {
                        out.write_all(format!("  {}: {}\n", i + 1, line).as_bytes()).await?;
                    }
                }
            }
            RequestOutcome::Failed(e) => {
                out.write_all(format!("\n❌ Error while running the process: {}\n", e).as_bytes())
                    .await?;
            }
            RequestOutcome::Empty => {
                out.write_all(format!("{}\n", NO_REQUEST_MESSAGE).as_bytes()).await?;
            }
        }

        out.flush().await?;
        Ok(outcome)
    }

    async fn run(&self, run_id: Uuid, request: &str) -> Result<PipelineOutcome> {
        let start_time = Instant::now();
        let mut reasoning_trace = Vec::new();

        // Recomputed per request so a session spanning midnight stays correct
        let reference_date = self.clock.today();

        info!(
            reference_date = %format_reference_date(reference_date),
            request_chars = request.len(),
            "Pipeline: starting"
        );

        reasoning_trace.push(format!(
            "INPUT: request received, reference date {}",
            format_reference_date(reference_date)
        ));

        // === EXTRACT ===
        let intent = self.extractor.run(request).await?;

        debug!(intent = %intent.intent, period = %intent.period, "Intent extracted");
        reasoning_trace.push(format!(
            "EXTRACT: intent '{}', period '{}'",
            intent.intent, intent.period
        ));

        // === AGGREGATE ===
        let ctx = AggregationContext {
            reference_date,
            intent: &intent,
        };
        let aggregate = self.aggregator.run(&ctx).await?;

        debug!(aggregate = aggregate.value(), "Aggregate computed");
        reasoning_trace.push(format!("AGGREGATE: {}", aggregate));

        // === VERIFY ===
        let kind = IntentKind::classify(&intent.intent);
        let report = self.verification_engine.verify(&VerificationContext {
            intent: &intent,
            kind: &kind,
            aggregate,
            reference_date,
            ledger: self.aggregator.ledger(),
        });

        reasoning_trace.push(format!(
            "VERIFY: {} / {} rules passed",
            report.passed_count(),
            report.checks.len()
        ));
        for advisory in &report.advisories {
            reasoning_trace.push(format!("VERIFY (advisory): {}", advisory));
        }

        if !report.verified {
            return Err(AssistantError::Verification(report.issues.join("; ")).in_stage(Stage::Aggregate));
        }

        // === COMPOSE ===
        let answer = self.composer.run(&intent, aggregate).await?;
        reasoning_trace.push("COMPOSE: answer ready".to_string());
        reasoning_trace.push("COMPLETE".to_string());

        let elapsed_ms = start_time.elapsed().as_millis() as u64;

        info!(elapsed_ms, "Pipeline: complete");

        Ok(PipelineOutcome {
            run_id,
            reference_date,
            intent,
            aggregate,
            answer,
            reasoning_trace,
            elapsed_ms,
        })
    }
}
