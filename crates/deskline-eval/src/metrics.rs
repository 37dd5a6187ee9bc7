//! Metric computation over transcript batches
//!
//! Every ratio guards its denominator: no data means a score of 0, not
//! an error. Batch order is irrelevant; turn order within a transcript
//! is what the flow and context checks read.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use deskline_core::{Category, MarkerPlacement, ResponderId, Transcript, END_CALL_MARKER};

/// Evaluation configuration: where the active policy version expects
/// the termination marker.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EvalConfig {
    pub marker_placement: MarkerPlacement,
}

impl EvalConfig {
    pub fn new(marker_placement: MarkerPlacement) -> Self {
        Self { marker_placement }
    }
}

/// Fixed category -> responder lookup used for routing accuracy.
/// Search is the expected responder when the label is absent or mixed.
pub fn expected_responder(category: Option<Category>) -> ResponderId {
    match category {
        Some(Category::RefundStatus) | Some(Category::FlightSearch) => ResponderId::Search,
        Some(Category::RefundPolicy) | Some(Category::BaggagePolicy) => ResponderId::Policy,
        Some(Category::Complaint) => ResponderId::Complaint,
        Some(Category::BookingDetails) => ResponderId::Booking,
        Some(Category::Mixed) | None => ResponderId::Search,
    }
}

/// A reply adheres only when the marker sits at the configured side.
pub fn marker_adhered(reply: &str, placement: MarkerPlacement) -> bool {
    match placement {
        MarkerPlacement::Start => reply.trim_start().starts_with(END_CALL_MARKER),
        MarkerPlacement::End => reply.trim_end().ends_with(END_CALL_MARKER),
    }
}

/// The required metric set. Percentages in 0-100, latencies in
/// milliseconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequiredMetrics {
    pub routing_accuracy: f64,
    pub misrouting_count: u64,
    pub flow_adherence: f64,
    pub tool_call_correctness: f64,
    pub router_latency_ms: f64,
    pub overall_latency_ms: f64,
    pub termination_adherence: f64,
}

/// The auxiliary metric set. Language consistency is a percentage; the
/// other three are 0-1 scores averaged per conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuxiliaryMetrics {
    pub responder_overlap: f64,
    pub language_consistency: f64,
    pub context_retention: f64,
    pub tool_efficiency: f64,
}

fn pct(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}

fn mean(sum: f64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

pub(crate) fn required_metrics(batch: &[Transcript], config: &EvalConfig) -> RequiredMetrics {
    let mut total_turns = 0u64;
    let mut correct_routings = 0u64;
    let mut misroutings = 0u64;
    let mut flow_violations = 0u64;
    let mut tool_calls_total = 0u64;
    let mut tool_calls_valid = 0u64;
    let mut closer_turns = 0u64;
    let mut closer_adhered = 0u64;
    let mut router_latency_sum = 0.0f64;
    let mut overall_latency_sum = 0.0f64;

    for transcript in batch {
        let last = transcript.len();
        for (index, turn) in transcript.turns().iter().enumerate() {
            total_turns += 1;

            if turn.responder == expected_responder(turn.message.category) {
                correct_routings += 1;
            } else {
                misroutings += 1;
            }

            // Closer may only land on the final turn of its conversation
            if turn.responder == ResponderId::Closer {
                if index + 1 != last {
                    flow_violations += 1;
                }
                closer_turns += 1;
                if marker_adhered(&turn.reply, config.marker_placement) {
                    closer_adhered += 1;
                }
            }

            for call in &turn.tool_calls {
                tool_calls_total += 1;
                if call.is_structurally_valid() {
                    tool_calls_valid += 1;
                }
            }

            router_latency_sum += turn.dispatch_latency.as_secs_f64() * 1000.0;
            overall_latency_sum += turn.turn_latency.as_secs_f64() * 1000.0;
        }
    }

    RequiredMetrics {
        routing_accuracy: pct(correct_routings, total_turns),
        misrouting_count: misroutings,
        flow_adherence: pct(total_turns - flow_violations, total_turns),
        tool_call_correctness: pct(tool_calls_valid, tool_calls_total),
        router_latency_ms: mean(router_latency_sum, total_turns),
        overall_latency_ms: mean(overall_latency_sum, total_turns),
        termination_adherence: pct(closer_adhered, closer_turns),
    }
}

pub(crate) fn auxiliary_metrics(batch: &[Transcript]) -> AuxiliaryMetrics {
    let conversations = batch.len() as u64;
    let mut overlap_sum = 0.0f64;
    let mut language_sum = 0.0f64;
    let mut retention_sum = 0.0f64;
    let mut efficiency_sum = 0.0f64;

    for transcript in batch {
        overlap_sum += responder_overlaps(transcript) as f64;
        language_sum += language_consistency(transcript);
        retention_sum += context_retention(transcript);
        efficiency_sum += tool_efficiency(transcript);
    }

    AuxiliaryMetrics {
        responder_overlap: mean(overlap_sum, conversations),
        language_consistency: mean(language_sum, conversations) * 100.0,
        context_retention: mean(retention_sum, conversations),
        tool_efficiency: mean(efficiency_sum, conversations),
    }
}

/// Number of responders that served more than one distinct category
/// within the conversation, a signal of scope bleed.
fn responder_overlaps(transcript: &Transcript) -> usize {
    let mut served: HashMap<ResponderId, HashSet<Option<Category>>> = HashMap::new();
    for turn in transcript.turns() {
        served
            .entry(turn.responder)
            .or_default()
            .insert(turn.message.category);
    }
    served.values().filter(|categories| categories.len() > 1).count()
}

/// 1 minus the fraction of turns whose reply carries none of the
/// declared language's indicator tokens. Default-language
/// conversations pass trivially.
fn language_consistency(transcript: &Transcript) -> f64 {
    let tokens = transcript.language.indicator_tokens();
    if tokens.is_empty() || transcript.is_empty() {
        return 1.0;
    }

    let mismatches = transcript
        .turns()
        .iter()
        .filter(|turn| {
            let reply = turn.reply.to_lowercase();
            !tokens.iter().any(|token| reply.contains(token))
        })
        .count();

    1.0 - mismatches as f64 / transcript.len() as f64
}

/// Fraction of non-first turns whose reply shares one of the first
/// three lowercased tokens of the preceding customer message. A crude
/// proxy for context use, not semantic similarity.
fn context_retention(transcript: &Transcript) -> f64 {
    let turns = transcript.turns();
    if turns.len() < 2 {
        return 0.0;
    }

    let mut hits = 0usize;
    for pair in turns.windows(2) {
        let previous = pair[0].message.text.to_lowercase();
        let reply = pair[1].reply.to_lowercase();
        if previous
            .split_whitespace()
            .take(3)
            .any(|token| reply.contains(token))
        {
            hits += 1;
        }
    }

    hits as f64 / (turns.len() - 1).max(1) as f64
}

/// Penalizes both under- and over-use of tool calls against a baseline
/// of one call every other turn.
fn tool_efficiency(transcript: &Transcript) -> f64 {
    let actual: usize = transcript.turns().iter().map(|t| t.tool_calls.len()).sum();
    let optimal = transcript.len() as f64 * 0.5;
    let efficiency = 1.0 - (actual as f64 - optimal).abs() / optimal.max(1.0);
    efficiency.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskline_core::{Language, Message, ToolCallRequest, TurnRecord};
    use std::time::Duration;

    fn turn(
        transcript: &Transcript,
        text: &str,
        category: Option<Category>,
        responder: ResponderId,
        reply: &str,
        tool_calls: Vec<ToolCallRequest>,
    ) -> TurnRecord {
        let mut message = Message::new(text);
        message.category = category;
        TurnRecord {
            conversation_id: transcript.conversation_id,
            turn: transcript.next_turn(),
            message,
            responder,
            reply: reply.to_string(),
            tool_calls,
            dispatch_latency: Duration::from_micros(10),
            turn_latency: Duration::from_micros(100),
            ts: chrono::Utc::now(),
        }
    }

    fn transcript_with(
        language: Language,
        turns: &[(&str, Option<Category>, ResponderId, &str)],
    ) -> Transcript {
        let mut transcript = Transcript::new(1, Category::Mixed, language);
        for (text, category, responder, reply) in turns {
            let record = turn(&transcript, text, *category, *responder, reply, vec![]);
            transcript.push_turn(record);
        }
        transcript
    }

    #[test]
    fn test_all_correct_batch_scores_exactly_100() {
        let transcript = transcript_with(
            Language::English,
            &[
                ("refund?", Some(Category::RefundStatus), ResponderId::Search, "checking"),
                ("baggage?", Some(Category::BaggagePolicy), ResponderId::Policy, "15kg"),
            ],
        );

        let metrics = required_metrics(&[transcript], &EvalConfig::default());
        assert_eq!(metrics.routing_accuracy, 100.0);
        assert_eq!(metrics.misrouting_count, 0);
    }

    #[test]
    fn test_closer_mid_conversation_breaks_flow() {
        let transcript = transcript_with(
            Language::English,
            &[
                ("bye", Some(Category::Mixed), ResponderId::Closer, "<END_CALL> bye"),
                ("wait, one more thing", Some(Category::Mixed), ResponderId::Search, "sure"),
            ],
        );

        let metrics = required_metrics(&[transcript], &EvalConfig::default());
        assert!(metrics.flow_adherence < 100.0);
    }

    #[test]
    fn test_closer_on_final_turn_keeps_flow_at_100() {
        let transcript = transcript_with(
            Language::English,
            &[
                ("hi", Some(Category::Mixed), ResponderId::Search, "hello"),
                ("bye", Some(Category::Mixed), ResponderId::Closer, "<END_CALL> bye"),
            ],
        );

        let metrics = required_metrics(&[transcript], &EvalConfig::default());
        assert_eq!(metrics.flow_adherence, 100.0);
    }

    #[test]
    fn test_termination_adherence_is_placement_aware() {
        let transcript = transcript_with(
            Language::English,
            &[("bye", Some(Category::Mixed), ResponderId::Closer, "<END_CALL> Thank you...")],
        );
        let batch = [transcript];

        let start = required_metrics(&batch, &EvalConfig::new(MarkerPlacement::Start));
        assert_eq!(start.termination_adherence, 100.0);

        let end = required_metrics(&batch, &EvalConfig::new(MarkerPlacement::End));
        assert_eq!(end.termination_adherence, 0.0);
    }

    #[test]
    fn test_no_closer_turns_means_adherence_zero_not_error() {
        let transcript = transcript_with(
            Language::English,
            &[("hi", Some(Category::Mixed), ResponderId::Search, "hello")],
        );

        let metrics = required_metrics(&[transcript], &EvalConfig::default());
        assert_eq!(metrics.termination_adherence, 0.0);
    }

    #[test]
    fn test_empty_batch_scores_zero_everywhere() {
        let metrics = required_metrics(&[], &EvalConfig::default());
        assert_eq!(metrics.routing_accuracy, 0.0);
        assert_eq!(metrics.tool_call_correctness, 0.0);
        assert_eq!(metrics.router_latency_ms, 0.0);

        let auxiliary = auxiliary_metrics(&[]);
        assert_eq!(auxiliary.responder_overlap, 0.0);
        assert_eq!(auxiliary.tool_efficiency, 0.0);
    }

    #[test]
    fn test_tool_call_correctness_structural_only() {
        let mut transcript = Transcript::new(1, Category::RefundStatus, Language::English);
        let record = turn(
            &transcript,
            "refund status for 456",
            Some(Category::RefundStatus),
            ResponderId::Search,
            "checking",
            vec![
                ToolCallRequest::new("refund_status").with_param("booking_id", 456),
                ToolCallRequest::new("confirm_booking"),
            ],
        );
        transcript.push_turn(record);

        let metrics = required_metrics(&[transcript], &EvalConfig::default());
        assert_eq!(metrics.tool_call_correctness, 100.0);
    }

    #[test]
    fn test_expected_responder_lookup() {
        assert_eq!(expected_responder(Some(Category::RefundStatus)), ResponderId::Search);
        assert_eq!(expected_responder(Some(Category::BaggagePolicy)), ResponderId::Policy);
        assert_eq!(expected_responder(Some(Category::Complaint)), ResponderId::Complaint);
        assert_eq!(expected_responder(Some(Category::BookingDetails)), ResponderId::Booking);
        assert_eq!(expected_responder(None), ResponderId::Search);
        assert_eq!(expected_responder(Some(Category::Mixed)), ResponderId::Search);
    }

    #[test]
    fn test_language_consistency_flags_english_reply_to_spanish_customer() {
        let consistent = transcript_with(
            Language::Spanish,
            &[("hola", Some(Category::RefundStatus), ResponderId::Search, "Hola, gracias por esperar")],
        );
        let inconsistent = transcript_with(
            Language::Spanish,
            &[("hola", Some(Category::RefundStatus), ResponderId::Search, "I'll check that for you")],
        );

        let auxiliary = auxiliary_metrics(&[consistent]);
        assert_eq!(auxiliary.language_consistency, 100.0);

        let auxiliary = auxiliary_metrics(&[inconsistent]);
        assert_eq!(auxiliary.language_consistency, 0.0);
    }

    #[test]
    fn test_context_retention_reads_previous_message_tokens() {
        let transcript = transcript_with(
            Language::English,
            &[
                ("refund for booking 789", Some(Category::RefundStatus), ResponderId::Search, "noted"),
                ("and the status?", Some(Category::RefundStatus), ResponderId::Search, "your refund is on its way"),
            ],
        );

        let auxiliary = auxiliary_metrics(&[transcript]);
        assert_eq!(auxiliary.context_retention, 1.0);
    }

    #[test]
    fn test_overlap_counts_multi_category_responders() {
        let transcript = transcript_with(
            Language::English,
            &[
                ("refund status?", Some(Category::RefundStatus), ResponderId::Search, "ok"),
                ("find a flight", Some(Category::FlightSearch), ResponderId::Search, "ok"),
            ],
        );

        let auxiliary = auxiliary_metrics(&[transcript]);
        assert_eq!(auxiliary.responder_overlap, 1.0);
    }

    #[test]
    fn test_tool_efficiency_peaks_at_half_the_turns() {
        let mut transcript = Transcript::new(1, Category::RefundStatus, Language::English);
        let with_call = turn(
            &transcript,
            "refund status for 456",
            Some(Category::RefundStatus),
            ResponderId::Search,
            "checking",
            vec![ToolCallRequest::new("refund_status")],
        );
        transcript.push_turn(with_call);
        let without_call = turn(
            &transcript,
            "thanks",
            Some(Category::RefundStatus),
            ResponderId::Search,
            "welcome",
            vec![],
        );
        transcript.push_turn(without_call);

        let auxiliary = auxiliary_metrics(&[transcript]);
        assert_eq!(auxiliary.tool_efficiency, 1.0);
    }
}
