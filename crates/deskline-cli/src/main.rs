//! Binary entrypoint: run an evaluation batch and report the scores.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use deskline_agents::{ResponderBank, ScriptedCompletion};
use deskline_eval::{EvalConfig, MetricsEngine, MetricsReport};
use deskline_routing::{Dispatcher, RoutePolicy};
use deskline_sim::{ConversationRunner, ScenarioCatalog};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Baseline,
    Improved,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackingArg {
    Rules,
    Completion,
}

#[derive(Parser)]
#[command(
    name = "deskline",
    about = "Simulate support-desk conversations and score the transcripts",
    version
)]
struct Args {
    /// Number of conversations to simulate
    #[arg(long, default_value_t = 6)]
    conversations: u32,

    /// Routing policy version
    #[arg(long, value_enum, default_value_t = PolicyArg::Baseline)]
    policy: PolicyArg,

    /// Responder generation
    #[arg(long, value_enum, default_value_t = BackingArg::Rules)]
    backing: BackingArg,

    /// Seed for scenario sampling (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Write the full report as pretty-printed JSON
    #[arg(long)]
    report: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let policy = match args.policy {
        PolicyArg::Baseline => RoutePolicy::baseline(),
        PolicyArg::Improved => RoutePolicy::improved(),
    };
    let marker_placement = policy.marker_placement;

    let bank = match args.backing {
        BackingArg::Rules => ResponderBank::rule_based(marker_placement),
        BackingArg::Completion => ResponderBank::completion_backed(
            Arc::new(canned_completions(args.conversations)),
            marker_placement,
        ),
    };

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    info!(policy = %policy.name, conversations = args.conversations, "starting evaluation");

    let plans = ScenarioCatalog::builtin().plan_batch(args.conversations, &mut rng);
    let mut runner = ConversationRunner::new(Dispatcher::new(policy), bank);
    let transcripts = runner.run_batch(plans);

    let engine = MetricsEngine::new(EvalConfig::new(marker_placement));
    let report = engine.evaluate(&transcripts);

    print_summary(&report);

    if let Some(path) = args.report {
        let file = File::create(&path)
            .with_context(|| format!("creating report file {}", path.display()))?;
        report.write_json(file).context("serializing report")?;
        println!("\nReport written to {}", path.display());
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Canned completion replies for offline completion-backed runs; a real
/// transport slots in behind the same trait. The pool is sized to the
/// batch so later turns exercise the fallback path.
fn canned_completions(conversations: u32) -> ScriptedCompletion {
    let base = [
        r#"Let me look into that for you. <CALL_TOOL=refund_status>{"booking_id": 456}"#,
        r#"I can search for options. <CALL_TOOL=search_flights>{"origin": "BLR", "destination": "DEL", "date": "today", "class": "economy"}"#,
        "Domestic flights allow 15kg check-in and 7kg cabin baggage.",
        r#"I'm sorry to hear that. <CALL_TOOL=file_complaint>{"type": "general", "description": "customer complaint"}"#,
        r#"One moment. <CALL_TOOL=get_passenger_details>{"booking_id": 12345}"#,
        "<END_CALL> Thank you for contacting us. Have a great day!",
    ];
    let turns_upper_bound = conversations as usize * 6;
    ScriptedCompletion::new(
        base.iter()
            .cycle()
            .take(turns_upper_bound)
            .map(|s| s.to_string()),
    )
}

fn print_summary(report: &MetricsReport) {
    println!("Evaluation results");
    println!("==================");
    println!(
        "Conversations: {}   Turns: {}   Grade: {}",
        report.summary.total_conversations, report.summary.total_turns, report.summary.grade
    );

    println!("\nRequired metrics");
    println!("  routing accuracy        {:>7.1}%", report.required.routing_accuracy);
    println!("  misrouting count        {:>7}", report.required.misrouting_count);
    println!("  flow adherence          {:>7.1}%", report.required.flow_adherence);
    println!("  tool call correctness   {:>7.1}%", report.required.tool_call_correctness);
    println!("  router latency          {:>9.3}ms", report.required.router_latency_ms);
    println!("  overall latency         {:>9.3}ms", report.required.overall_latency_ms);
    println!("  termination adherence   {:>7.1}%", report.required.termination_adherence);

    println!("\nAuxiliary metrics");
    println!("  responder overlap       {:>7.2}", report.auxiliary.responder_overlap);
    println!("  language consistency    {:>7.1}%", report.auxiliary.language_consistency);
    println!("  context retention       {:>7.2}", report.auxiliary.context_retention);
    println!("  tool efficiency         {:>7.2}", report.auxiliary.tool_efficiency);

    if !report.summary.issues.is_empty() {
        println!("\nIssues");
        for issue in &report.summary.issues {
            println!("  - {issue}");
        }
    }

    if !report.summary.recommendations.is_empty() {
        println!("\nRecommendations");
        for recommendation in &report.summary.recommendations {
            println!("  - {recommendation}");
        }
    }
}
