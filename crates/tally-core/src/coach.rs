//! Coaching message generation
//!
//! Turns a pre-aggregated analysis snapshot plus a short slice of chat
//! history into one natural-language message. The offline stub path renders
//! a deterministic template from the numeric fields and never touches the
//! network; it is used for local testing and when the feature has no
//! provider configured.

use tracing::debug;

use crate::ai::{ExtractionBackend, ProviderClient};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::{AnalysisSnapshot, ChatMessage};

/// How many trailing conversation messages are forwarded
const MAX_HISTORY: usize = 10;

/// Per-message character budget, keeps the provider request bounded
const MAX_MESSAGE_CHARS: usize = 400;

/// Coaching message generator
pub struct CoachGenerator {
    client: Option<ProviderClient>,
    debug_responses: bool,
}

impl CoachGenerator {
    pub fn new(client: ProviderClient, config: &PipelineConfig) -> Self {
        Self {
            client: Some(client),
            debug_responses: config.debug_responses,
        }
    }

    /// Generator with no provider at all; always answers offline
    pub fn offline() -> Self {
        Self {
            client: None,
            debug_responses: false,
        }
    }

    /// Produce one coaching message for the snapshot
    ///
    /// The snapshot is read-only input; failures propagate to the caller,
    /// which owns the fallback UX.
    pub async fn generate(
        &self,
        snapshot: &AnalysisSnapshot,
        history: &[ChatMessage],
    ) -> Result<String> {
        let client = match &self.client {
            Some(c) if !c.is_stub() => c,
            _ => return Ok(offline_message(snapshot)),
        };

        let prompt = coach_prompt(snapshot, history);
        let raw = client.complete(&prompt).await?;
        if self.debug_responses {
            debug!(provider = client.name(), raw = %raw, "Raw coach response");
        }
        Ok(raw.trim().to_string())
    }
}

/// Build the persona-bound coaching prompt
pub fn coach_prompt(snapshot: &AnalysisSnapshot, history: &[ChatMessage]) -> String {
    let tone = snapshot.tone.as_deref().unwrap_or("supportive");

    let mut prompt = format!(
        "You are a personal spending coach. Be {tone}, talk about the current \
         month only, never predict or forecast future spending, and answer in \
         at most 120 words.\n\nThis month: ${total:.2} spent across {count} \
         expenses (avg ${avg:.2}).\n",
        tone = tone,
        total = snapshot.total_spent,
        count = snapshot.expense_count,
        avg = snapshot.average_expense,
    );

    for stat in &snapshot.categories {
        match stat.budget {
            Some(budget) => prompt.push_str(&format!(
                "- {}: ${:.2} of ${:.2} budget ({} left)\n",
                stat.category,
                stat.spent,
                budget,
                stat.remaining
                    .map(|r| format!("${:.2}", r))
                    .unwrap_or_else(|| "n/a".into()),
            )),
            None => prompt.push_str(&format!("- {}: ${:.2}\n", stat.category, stat.spent)),
        }
    }

    if !snapshot.top_merchants.is_empty() {
        let merchants = snapshot
            .top_merchants
            .iter()
            .map(|m| format!("{} (${:.2})", m.name, m.total))
            .collect::<Vec<_>>()
            .join(", ");
        prompt.push_str(&format!("Top merchants: {}\n", merchants));
    }
    if let Some(ref weekday) = snapshot.most_active_weekday {
        prompt.push_str(&format!("Most active day: {}\n", weekday));
    }

    let recent = trailing_history(history);
    if !recent.is_empty() {
        prompt.push_str("\nRecent conversation:\n");
        for message in recent {
            prompt.push_str(&format!("{}: {}\n", message.role, message.content));
        }
    }

    prompt.push_str("\nWrite one coaching message for the user.");
    prompt
}

/// Last `MAX_HISTORY` messages, each truncated to `MAX_MESSAGE_CHARS`
fn trailing_history(history: &[ChatMessage]) -> Vec<ChatMessage> {
    history
        .iter()
        .rev()
        .take(MAX_HISTORY)
        .rev()
        .map(|m| ChatMessage {
            role: m.role.clone(),
            content: m.content.chars().take(MAX_MESSAGE_CHARS).collect(),
        })
        .collect()
}

/// Deterministic templated message for the offline path
pub fn offline_message(snapshot: &AnalysisSnapshot) -> String {
    let top_category = snapshot
        .categories
        .iter()
        .max_by(|a, b| a.spent.total_cmp(&b.spent))
        .filter(|c| c.spent > 0.0);

    let mut message = format!(
        "So far this month you've spent ${:.2} across {} expenses, about ${:.2} each.",
        snapshot.total_spent, snapshot.expense_count, snapshot.average_expense
    );

    if let Some(stat) = top_category {
        match stat.budget {
            Some(budget) if budget > 0.0 => message.push_str(&format!(
                " {} is your biggest category at ${:.2} of a ${:.2} budget.",
                stat.category, stat.spent, budget
            )),
            _ => message.push_str(&format!(
                " {} is your biggest category at ${:.2}.",
                stat.category, stat.spent
            )),
        }
    }

    message.push_str(" Keep logging expenses as they happen and you'll stay on top of it.");
    message
}
