//! Deskline Eval: the metrics engine
//!
//! A stateless function of a transcript batch: required metrics
//! (routing, flow, tool calls, latency, termination), auxiliary metrics
//! (overlap, language, context, tool efficiency), and a derived summary
//! with a letter grade. Empty batches and zero denominators score 0;
//! the engine never divides by zero and never errors on absent data.

pub mod metrics;
pub mod report;

pub use metrics::{
    expected_responder, marker_adhered, AuxiliaryMetrics, EvalConfig, RequiredMetrics,
};
pub use report::{Grade, MetricsEngine, MetricsReport, ReportSummary};
