//! Investment threshold policy.
//!
//! Each time the running income total reaches the threshold, one
//! threshold-worth is consumed and an [`InvestmentOpportunity`] is raised.
//! Only one threshold-worth is consumed per entry, even when a single entry
//! covers several.

use serde::{Deserialize, Serialize};
use shared::InvestmentOpportunity;

pub const DEFAULT_INVESTMENT_THRESHOLD: f64 = 300.0;

/// What happens to the running total when the threshold is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdReset {
    /// Keep the surplus above the threshold
    Rollover,
    /// Start again from zero
    ResetToZero,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdPolicy {
    pub threshold: f64,
    pub reset: ThresholdReset,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_INVESTMENT_THRESHOLD,
            reset: ThresholdReset::Rollover,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdOutcome {
    pub total: f64,
    pub opportunity: Option<InvestmentOpportunity>,
}

impl ThresholdPolicy {
    /// Add `profit` to `running_total` and consume the threshold if reached
    pub fn apply(&self, running_total: f64, profit: f64) -> ThresholdOutcome {
        let new_total = running_total + profit;
        if new_total < self.threshold {
            return ThresholdOutcome {
                total: new_total,
                opportunity: None,
            };
        }

        let carried_over = match self.reset {
            ThresholdReset::Rollover => new_total - self.threshold,
            ThresholdReset::ResetToZero => 0.0,
        };

        ThresholdOutcome {
            total: carried_over,
            opportunity: Some(self.opportunity(new_total, carried_over)),
        }
    }

    fn opportunity(&self, total_before: f64, carried_over: f64) -> InvestmentOpportunity {
        InvestmentOpportunity {
            threshold: self.threshold,
            total_before,
            carried_over,
            title: "🎉 Investment Time!".to_string(),
            body: format!(
                "You have saved ${}! Time to invest.",
                format_threshold(self.threshold)
            ),
        }
    }
}

/// Whole-dollar thresholds print without cents
fn format_threshold(threshold: f64) -> String {
    if threshold.fract() == 0.0 {
        format!("{:.0}", threshold)
    } else {
        format!("{:.2}", threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_threshold_accumulates() {
        let outcome = ThresholdPolicy::default().apply(100.0, 150.0);
        assert_eq!(outcome.total, 250.0);
        assert!(outcome.opportunity.is_none());
    }

    #[test]
    fn test_reaching_threshold_exactly_fires() {
        let outcome = ThresholdPolicy::default().apply(250.0, 50.0);
        assert_eq!(outcome.total, 0.0);
        let opportunity = outcome.opportunity.unwrap();
        assert_eq!(opportunity.total_before, 300.0);
        assert_eq!(opportunity.body, "You have saved $300! Time to invest.");
    }

    #[test]
    fn test_rollover_keeps_surplus() {
        let outcome = ThresholdPolicy::default().apply(250.0, 100.0);
        assert_eq!(outcome.total, 50.0);
        assert_eq!(outcome.opportunity.unwrap().carried_over, 50.0);
    }

    #[test]
    fn test_only_one_threshold_is_consumed_per_entry() {
        let outcome = ThresholdPolicy::default().apply(0.0, 700.0);
        assert_eq!(outcome.total, 400.0);
        assert!(outcome.opportunity.is_some());
    }

    #[test]
    fn test_reset_to_zero_variant() {
        let policy = ThresholdPolicy {
            threshold: 300.0,
            reset: ThresholdReset::ResetToZero,
        };
        let outcome = policy.apply(250.0, 100.0);
        assert_eq!(outcome.total, 0.0);
        assert_eq!(outcome.opportunity.unwrap().total_before, 350.0);
    }

    #[test]
    fn test_fractional_threshold_message() {
        let policy = ThresholdPolicy {
            threshold: 150.5,
            reset: ThresholdReset::Rollover,
        };
        let opportunity = policy.apply(150.0, 1.0).opportunity.unwrap();
        assert_eq!(opportunity.body, "You have saved $150.50! Time to invest.");
    }
}
