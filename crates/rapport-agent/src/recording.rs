// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric names and recording helpers.
//!
//! Without an installed recorder every call here is a no-op.

use metrics::{describe_counter, describe_histogram};
use rapport_core::StyleTag;

/// Describe all rapport metrics for exporters that support descriptions.
pub fn register_metrics() {
    describe_counter!("rapport_turns_total", "Turns answered, by style and outcome");
    describe_counter!("rapport_cache_lookups_total", "Response cache lookups, by result");
    describe_counter!(
        "rapport_completion_failures_total",
        "Completion calls that ended in a fallback reply"
    );
    describe_counter!("rapport_moderation_total", "Moderation verdicts with profanity");
    describe_counter!("rapport_commands_total", "Commands handled");
    describe_counter!("rapport_contexts_swept_total", "Idle contexts removed");
    describe_histogram!("rapport_completion_latency_seconds", "Completion call latency");
}

pub fn record_turn(style: StyleTag, outcome: &'static str) {
    metrics::counter!("rapport_turns_total", "style" => style.to_string(), "outcome" => outcome)
        .increment(1);
}

pub fn record_cache(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    metrics::counter!("rapport_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_completion_failure(kind: &'static str) {
    metrics::counter!("rapport_completion_failures_total", "kind" => kind).increment(1);
}

pub fn record_completion_latency(seconds: f64) {
    metrics::histogram!("rapport_completion_latency_seconds").record(seconds);
}

pub fn record_moderation(verdict: &'static str) {
    metrics::counter!("rapport_moderation_total", "verdict" => verdict).increment(1);
}

pub fn record_command(command: &'static str) {
    metrics::counter!("rapport_commands_total", "command" => command).increment(1);
}

pub fn record_swept(count: usize) {
    metrics::counter!("rapport_contexts_swept_total").increment(count as u64);
}
