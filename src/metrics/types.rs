// Metrics data types

use serde::Serialize;

/// User turns per conversation, relative to the budget
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnStats {
    pub average: f64,
    pub min: usize,
    pub max: usize,
    pub stdev: f64,
    /// Average turns as a percentage of the budget
    pub budget_used_pct: f64,
    pub budget: usize,
}

/// How often the tool layer refused a request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafetyStats {
    pub tool_calls: usize,
    pub refused_tool_calls: usize,
    /// Sessions that hit the tool-round cap
    pub aborted_sessions: usize,
    /// Finalize rejections by reason
    pub rejections: Vec<(String, usize)>,
}

/// Whether the assistant stayed on reporting rather than troubleshooting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelevanceStats {
    pub assistant_messages: usize,
    pub troubleshooting_messages: usize,
}

impl RelevanceStats {
    pub fn relevance_pct(&self) -> f64 {
        if self.assistant_messages == 0 {
            return 100.0;
        }
        let focused = self.assistant_messages - self.troubleshooting_messages;
        focused as f64 / self.assistant_messages as f64 * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub conversations: usize,
    pub successful: usize,
    pub turns: Option<TurnStats>,
    pub safety: SafetyStats,
    pub relevance: RelevanceStats,
}

impl MetricsReport {
    pub fn success_rate(&self) -> f64 {
        if self.conversations == 0 {
            return 0.0;
        }
        self.successful as f64 / self.conversations as f64 * 100.0
    }
}
