// Metrics over persisted session artifacts
//
// Success rate comes from the outputs; turn efficiency, tool refusals and
// relevance come from the traces.

use std::collections::BTreeMap;
use std::fmt;

use super::types::{MetricsReport, RelevanceStats, SafetyStats, TurnStats};
use crate::logging::{SessionTrace, TraceEvent};
use crate::output::ConversationOutput;
use crate::providers::types::Role;

/// Phrases that suggest the assistant started debugging instead of recording
const TROUBLESHOOTING_PHRASES: &[&str] = &[
    "have you tried",
    "try restarting",
    "you could try",
    "you should try",
    "stack trace",
    "to debug",
    "root cause",
    "the fix is",
    "a possible solution",
];

pub fn calculate(
    traces: &[SessionTrace],
    outputs: &[ConversationOutput],
    turn_budget: usize,
) -> MetricsReport {
    MetricsReport {
        conversations: outputs.len(),
        successful: outputs.iter().filter(|o| o.success).count(),
        turns: turn_stats(traces, turn_budget),
        safety: safety_stats(traces),
        relevance: relevance_stats(traces),
    }
}

fn turn_stats(traces: &[SessionTrace], budget: usize) -> Option<TurnStats> {
    let turns: Vec<usize> = traces.iter().map(SessionTrace::user_turns).collect();
    let min = *turns.iter().min()?;
    let max = *turns.iter().max()?;

    let n = turns.len() as f64;
    let average = turns.iter().sum::<usize>() as f64 / n;
    let stdev = if turns.len() > 1 {
        let var = turns
            .iter()
            .map(|&t| (t as f64 - average).powi(2))
            .sum::<f64>()
            / (n - 1.0);
        var.sqrt()
    } else {
        0.0
    };

    Some(TurnStats {
        average,
        min,
        max,
        stdev,
        budget_used_pct: if budget == 0 {
            0.0
        } else {
            average / budget as f64 * 100.0
        },
        budget,
    })
}

fn safety_stats(traces: &[SessionTrace]) -> SafetyStats {
    let mut rejections: BTreeMap<String, usize> = BTreeMap::new();
    let mut aborted_sessions = 0;

    for trace in traces {
        for event in trace.events() {
            match event {
                TraceEvent::SessionAborted { .. } => aborted_sessions += 1,
                TraceEvent::Finalized {
                    rejection: Some(reason),
                    ..
                } => *rejections.entry(reason.clone()).or_default() += 1,
                _ => {}
            }
        }
    }

    SafetyStats {
        tool_calls: traces.iter().map(SessionTrace::tool_calls).sum(),
        refused_tool_calls: traces.iter().map(SessionTrace::refused_tool_calls).sum(),
        aborted_sessions,
        rejections: rejections.into_iter().collect(),
    }
}

fn relevance_stats(traces: &[SessionTrace]) -> RelevanceStats {
    let mut stats = RelevanceStats {
        assistant_messages: 0,
        troubleshooting_messages: 0,
    };

    for event in traces.iter().flat_map(SessionTrace::events) {
        if let TraceEvent::Message {
            role: Role::Assistant,
            content,
        } = event
        {
            stats.assistant_messages += 1;
            let lowered = content.to_lowercase();
            if TROUBLESHOOTING_PHRASES.iter().any(|p| lowered.contains(p)) {
                stats.troubleshooting_messages += 1;
            }
        }
    }

    stats
}

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(60);

        writeln!(f, "{rule}")?;
        writeln!(f, "BUG REPORT SESSION METRICS")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "Conversations analyzed: {}", self.conversations)?;
        writeln!(f)?;

        writeln!(f, "Success rate: {:.2}%", self.success_rate())?;
        writeln!(f, "  Successful: {}", self.successful)?;
        writeln!(f, "  Failed:     {}", self.conversations - self.successful)?;
        writeln!(f)?;

        match &self.turns {
            Some(t) => {
                writeln!(f, "Efficiency (budget {} turns):", t.budget)?;
                writeln!(f, "  Average turns: {:.2}", t.average)?;
                writeln!(f, "  Min / max:     {} / {}", t.min, t.max)?;
                writeln!(f, "  Std deviation: {:.2}", t.stdev)?;
                writeln!(f, "  Budget used:   {:.2}%", t.budget_used_pct)?;
            }
            None => writeln!(f, "Efficiency: no traces")?,
        }
        writeln!(f)?;

        writeln!(f, "Safety:")?;
        writeln!(f, "  Tool calls:         {}", self.safety.tool_calls)?;
        writeln!(f, "  Refused tool calls: {}", self.safety.refused_tool_calls)?;
        writeln!(f, "  Aborted sessions:   {}", self.safety.aborted_sessions)?;
        for (reason, count) in &self.safety.rejections {
            writeln!(f, "  Rejected x{count}: {reason}")?;
        }
        writeln!(f)?;

        writeln!(f, "Relevance:")?;
        writeln!(
            f,
            "  Assistant messages: {}",
            self.relevance.assistant_messages
        )?;
        writeln!(
            f,
            "  Troubleshooting:    {}",
            self.relevance.troubleshooting_messages
        )?;
        writeln!(f, "  Reporting focus:    {:.2}%", self.relevance.relevance_pct())?;
        write!(f, "{rule}")
    }
}
