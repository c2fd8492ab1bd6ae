//! Verification engine for aggregate results
//!
//! Rules-based sanity checks on the aggregator's number before it reaches
//! the composer. Blocking failures abort the request; advisory failures
//! are logged and kept in the reasoning trace.

use crate::classifier::IntentKind;
use crate::ledger::Ledger;
use crate::models::{AggregateResult, IntentRecord};
use crate::period::{resolve_known_period, PeriodWindow};
use chrono::NaiveDate;
use tracing::{info, warn};

/// Amounts closer than this are the same number of cents
const CENT_TOLERANCE: f64 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Advisory,
    Blocking,
}

/// Everything a rule may look at
pub struct VerificationContext<'a> {
    pub intent: &'a IntentRecord,
    pub kind: &'a IntentKind,
    pub aggregate: AggregateResult,
    pub reference_date: NaiveDate,
    pub ledger: &'a Ledger,
}

impl VerificationContext<'_> {
    fn known_window(&self) -> Option<PeriodWindow> {
        resolve_known_period(&self.intent.period, self.reference_date)
    }
}

/// Trait for verification rules
pub trait VerificationRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn severity(&self) -> Severity;

    fn verify(&self, ctx: &VerificationContext<'_>) -> VerificationCheckResult;
}

pub struct VerificationCheckResult {
    pub passed: bool,
    pub details: String,
}

impl VerificationCheckResult {
    fn pass(details: impl Into<String>) -> Self {
        Self {
            passed: true,
            details: details.into(),
        }
    }

    fn fail(details: impl Into<String>) -> Self {
        Self {
            passed: false,
            details: details.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuleCheck {
    pub rule_name: String,
    pub severity: Severity,
    pub passed: bool,
    pub details: String,
}

#[derive(Debug, Clone)]
pub struct VerificationReport {
    pub verified: bool,
    pub checks: Vec<RuleCheck>,
    /// Failed blocking rules
    pub issues: Vec<String>,
    /// Failed advisory rules
    pub advisories: Vec<String>,
}

impl VerificationReport {
    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }
}

/// Verification engine that enforces rules
pub struct VerificationEngine {
    rules: Vec<Box<dyn VerificationRule>>,
}

impl VerificationEngine {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn add_rule(&mut self, rule: Box<dyn VerificationRule>) {
        self.rules.push(rule);
    }

    pub fn verify(&self, ctx: &VerificationContext<'_>) -> VerificationReport {
        let mut checks = Vec::with_capacity(self.rules.len());
        let mut issues = Vec::new();
        let mut advisories = Vec::new();

        for rule in &self.rules {
            let result = rule.verify(ctx);

            if !result.passed {
                let line = format!("{}: {}", rule.name(), result.details);
                match rule.severity() {
                    Severity::Blocking => issues.push(line),
                    Severity::Advisory => {
                        warn!(rule = rule.name(), details = %result.details, "Advisory check failed");
                        advisories.push(line);
                    }
                }
            }

            checks.push(RuleCheck {
                rule_name: rule.name().to_string(),
                severity: rule.severity(),
                passed: result.passed,
                details: result.details,
            });
        }

        let verified = issues.is_empty();

        info!(
            rule_count = self.rules.len(),
            verified = verified,
            "Verification completed"
        );

        VerificationReport {
            verified,
            checks,
            issues,
            advisories,
        }
    }
}

impl Default for VerificationEngine {
    fn default() -> Self {
        Self::new()
    }
}

//
// ========== Rules ==========
//

/// Rule: the aggregate is a real number
pub struct FiniteAmountRule;

impl VerificationRule for FiniteAmountRule {
    fn name(&self) -> &'static str {
        "finite_amount"
    }

    fn severity(&self) -> Severity {
        Severity::Blocking
    }

    fn verify(&self, ctx: &VerificationContext<'_>) -> VerificationCheckResult {
        if ctx.aggregate.value().is_finite() {
            VerificationCheckResult::pass("Aggregate is finite")
        } else {
            VerificationCheckResult::fail(format!("Aggregate {} is not finite", ctx.aggregate.value()))
        }
    }
}

/// Rule: a sum of non-negative amounts cannot be negative
pub struct NonNegativeSpendRule;

impl VerificationRule for NonNegativeSpendRule {
    fn name(&self) -> &'static str {
        "non_negative_spend"
    }

    fn severity(&self) -> Severity {
        Severity::Blocking
    }

    fn verify(&self, ctx: &VerificationContext<'_>) -> VerificationCheckResult {
        if !ctx.kind.is_spend() {
            return VerificationCheckResult::pass("Not a spend intent");
        }

        if ctx.aggregate.value() >= 0.0 {
            VerificationCheckResult::pass("Spend is non-negative")
        } else {
            VerificationCheckResult::fail(format!("Spend {} is negative", ctx.aggregate.value()))
        }
    }
}

/// Rule: a spend sum never exceeds every outflow in the ledger
pub struct WithinLedgerBoundsRule;

impl VerificationRule for WithinLedgerBoundsRule {
    fn name(&self) -> &'static str {
        "within_ledger_bounds"
    }

    fn severity(&self) -> Severity {
        Severity::Blocking
    }

    fn verify(&self, ctx: &VerificationContext<'_>) -> VerificationCheckResult {
        if !ctx.kind.is_spend() {
            return VerificationCheckResult::pass("Not a spend intent");
        }

        let ceiling = ctx.ledger.all_time_outflow();
        if ctx.aggregate.value() <= ceiling + CENT_TOLERANCE {
            VerificationCheckResult::pass(format!("Spend within ledger total {:.2}", ceiling))
        } else {
            VerificationCheckResult::fail(format!(
                "Spend {:.2} exceeds all outflows in the ledger ({:.2})",
                ctx.aggregate.value(),
                ceiling
            ))
        }
    }
}

/// Rule: for periods with a fixed meaning, the model's sum matches a local sum
pub struct KnownPeriodCrossCheckRule;

impl VerificationRule for KnownPeriodCrossCheckRule {
    fn name(&self) -> &'static str {
        "known_period_cross_check"
    }

    fn severity(&self) -> Severity {
        Severity::Advisory
    }

    fn verify(&self, ctx: &VerificationContext<'_>) -> VerificationCheckResult {
        let Some(window) = ctx.known_window() else {
            return VerificationCheckResult::pass("No deterministic period to compare");
        };

        let local = match ctx.kind {
            IntentKind::TotalSpend => ctx.ledger.total_outflow(&window),
            IntentKind::TotalIncome => ctx.ledger.total_inflow(&window),
            IntentKind::Other(_) => {
                return VerificationCheckResult::pass("No local computation for this intent")
            }
        };

        if (local - ctx.aggregate.value()).abs() <= CENT_TOLERANCE {
            VerificationCheckResult::pass(format!("Matches local sum for {}", window))
        } else {
            VerificationCheckResult::fail(format!(
                "Model reported {:.2} but the ledger gives {:.2} for {}",
                ctx.aggregate.value(),
                local,
                window
            ))
        }
    }
}

/// Create a default verification engine with standard rules
pub fn create_default_verification_engine() -> VerificationEngine {
    let mut engine = VerificationEngine::new();
    engine.add_rule(Box::new(FiniteAmountRule));
    engine.add_rule(Box::new(NonNegativeSpendRule));
    engine.add_rule(Box::new(WithinLedgerBoundsRule));
    engine.add_rule(Box::new(KnownPeriodCrossCheckRule));
    engine
}

//
// ================= Tests =================
//

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 3).unwrap()
    }

    fn verify(intent: &IntentRecord, value: f64) -> VerificationReport {
        let kind = IntentKind::classify(&intent.intent);
        let ctx = VerificationContext {
            intent,
            kind: &kind,
            aggregate: AggregateResult(value),
            reference_date: reference(),
            ledger: Ledger::sample(),
        };
        create_default_verification_engine().verify(&ctx)
    }

    #[test]
    fn test_correct_weekly_spend_passes_everything() {
        let intent = IntentRecord::new("total_spend", "this week");
        let report = verify(&intent, 80.0);
        assert!(report.verified);
        assert!(report.advisories.is_empty());
        assert_eq!(report.passed_count(), report.checks.len());
    }

    #[test]
    fn test_negative_spend_is_blocking() {
        let intent = IntentRecord::new("total_spend", "last month");
        let report = verify(&intent, -5.0);
        assert!(!report.verified);
        assert!(report.issues.iter().any(|i| i.starts_with("non_negative_spend")));
    }

    #[test]
    fn test_spend_above_ledger_total_is_blocking() {
        let intent = IntentRecord::new("total_spend", "this year");
        let report = verify(&intent, 1345.0);
        assert!(!report.verified);
        assert!(report.issues.iter().any(|i| i.starts_with("within_ledger_bounds")));
    }

    #[test]
    fn test_cross_check_mismatch_is_advisory() {
        let intent = IntentRecord::new("total_spend", "this week");
        let report = verify(&intent, 65.0);
        assert!(report.verified);
        assert_eq!(report.advisories.len(), 1);
        assert!(report.advisories[0].contains("80.00"));
    }

    #[test]
    fn test_non_spend_intents_skip_spend_rules() {
        let intent = IntentRecord::new("total_income", "this week");
        let report = verify(&intent, 1200.0);
        assert!(report.verified);
        assert!(report.advisories.is_empty());

        let report = verify(&intent, 1300.0);
        assert!(report.verified);
        assert_eq!(report.advisories.len(), 1);
    }

    #[test]
    fn test_composite_spend_intents_are_not_bounded() {
        let report = verify(&IntentRecord::new("net_income_minus_spend", "this week"), 1120.0);
        assert!(report.verified);
        assert!(report.advisories.is_empty());

        let report = verify(&IntentRecord::new("spend_change_vs_last_week", "this week"), -15.0);
        assert!(report.verified);
    }

    #[test]
    fn test_non_finite_is_blocking() {
        let intent = IntentRecord::new("average_ticket", "this week");
        let report = verify(&intent, f64::NAN);
        assert!(!report.verified);
        assert!(report.issues[0].starts_with("finite_amount"));
    }
}
