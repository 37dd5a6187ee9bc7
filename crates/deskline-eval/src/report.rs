//! Report derivation: grade, issues, recommendations
//!
//! The report is plain data: nested metric maps plus string lists.
//! How it gets serialized or printed is the caller's business.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use deskline_core::{DesklineError, Transcript};

use crate::metrics::{auxiliary_metrics, required_metrics, AuxiliaryMetrics, EvalConfig, RequiredMetrics};

/// Letter grade derived from routing accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_accuracy(routing_accuracy: f64) -> Self {
        if routing_accuracy >= 90.0 {
            Grade::A
        } else if routing_accuracy >= 80.0 {
            Grade::B
        } else if routing_accuracy >= 70.0 {
            Grade::C
        } else if routing_accuracy >= 60.0 {
            Grade::D
        } else {
            Grade::F
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let letter = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(letter)
    }
}

/// Derived batch summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_conversations: u64,
    pub total_turns: u64,
    pub grade: Grade,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

/// The full scored report for one batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    pub required: RequiredMetrics,
    pub auxiliary: AuxiliaryMetrics,
    pub summary: ReportSummary,
}

impl MetricsReport {
    /// Serialize the report as pretty-printed JSON.
    pub fn write_json<W: std::io::Write>(&self, writer: W) -> Result<(), DesklineError> {
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| DesklineError::Report(e.to_string()))
    }
}

/// Stateless evaluator: every call recomputes from the batch it is
/// handed, nothing is carried between calls.
#[derive(Debug, Clone, Default)]
pub struct MetricsEngine {
    config: EvalConfig,
}

impl MetricsEngine {
    pub fn new(config: EvalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn evaluate(&self, batch: &[Transcript]) -> MetricsReport {
        debug!(conversations = batch.len(), "evaluating batch");

        let required = required_metrics(batch, &self.config);
        let auxiliary = auxiliary_metrics(batch);

        let grade = Grade::from_accuracy(required.routing_accuracy);
        let issues = identify_issues(&required, &auxiliary);
        let recommendations = recommend(&required, &auxiliary);

        MetricsReport {
            summary: ReportSummary {
                total_conversations: batch.len() as u64,
                total_turns: batch.iter().map(|t| t.len() as u64).sum(),
                grade,
                issues,
                recommendations,
            },
            required,
            auxiliary,
        }
    }
}

fn identify_issues(required: &RequiredMetrics, auxiliary: &AuxiliaryMetrics) -> Vec<String> {
    let mut issues = Vec::new();

    if required.routing_accuracy < 80.0 {
        issues.push("Low routing accuracy".to_string());
    }
    if required.tool_call_correctness < 90.0 {
        issues.push("Tool call issues".to_string());
    }
    if required.termination_adherence < 100.0 {
        issues.push("Termination marker placement issues".to_string());
    }
    if auxiliary.responder_overlap > 0.5 {
        issues.push("Responder responsibility overlaps".to_string());
    }

    issues
}

fn recommend(required: &RequiredMetrics, auxiliary: &AuxiliaryMetrics) -> Vec<String> {
    let mut recommendations = Vec::new();

    if required.routing_accuracy < 80.0 {
        recommendations.push("Tighten the route ladder to reduce misrouting".to_string());
    }
    if auxiliary.responder_overlap > 0.3 {
        recommendations.push("Clarify responder responsibilities to reduce overlap".to_string());
    }
    if required.tool_call_correctness < 90.0 {
        recommendations.push("Fix tool call construction and validation".to_string());
    }
    if required.termination_adherence < 100.0 {
        recommendations
            .push("Place the termination marker where the active policy expects it".to_string());
    }

    recommendations
}
