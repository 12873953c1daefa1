//! Budget threshold monitoring
//!
//! On every new expense the monitor folds the month's persisted expenses
//! (plus the just-added batch) into a per-category accumulator, compares it
//! to the configured limits, and emits approaching/exceeded alerts. Alerts
//! are advisory: a broken budget configuration is logged and skipped, never
//! propagated to the expense-creation path.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use tracing::{debug, warn};

use crate::models::{AlertSeverity, BudgetAlert, BudgetSnapshot, Category, ExpenseRecord};

/// Spend ratio at which an "approaching" alert fires
const APPROACHING_THRESHOLD: f64 = 0.85;

/// How long after a run completes before the same (user, month) may fire
/// again; absorbs bursts of back-to-back expense additions
const GUARD_RELEASE_DELAY: Duration = Duration::from_secs(2);

/// Process-local re-entrancy guard keyed by (user, month)
///
/// Test-and-set only: a concurrent invocation observing "already running"
/// skips cleanly instead of waiting. Best-effort, not durable dedup.
#[derive(Default)]
pub struct MonitorGuard {
    in_flight: Mutex<HashSet<String>>,
}

impl MonitorGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the key; false means another run holds it
    pub fn try_acquire(&self, key: &str) -> bool {
        match self.in_flight.lock() {
            Ok(mut set) => set.insert(key.to_string()),
            Err(_) => false,
        }
    }

    pub fn release(&self, key: &str) {
        if let Ok(mut set) = self.in_flight.lock() {
            set.remove(key);
        }
    }
}

/// Budget threshold monitor
#[derive(Clone)]
pub struct BudgetMonitor {
    guard: Arc<MonitorGuard>,
    release_delay: Duration,
}

impl Default for BudgetMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl BudgetMonitor {
    pub fn new() -> Self {
        Self {
            guard: Arc::new(MonitorGuard::new()),
            release_delay: GUARD_RELEASE_DELAY,
        }
    }

    /// Override the guard release delay (tests)
    pub fn with_release_delay(mut self, delay: Duration) -> Self {
        self.release_delay = delay;
        self
    }

    /// Check month-to-date spending against the budget and return alerts
    ///
    /// `existing` is the user's persisted expense list; `just_added` is the
    /// batch created in this invocation (not yet reflected in `existing`).
    /// Returns no alerts when another run holds the guard for this
    /// (user, month).
    pub async fn check(
        &self,
        user_id: &str,
        budgets: &BudgetSnapshot,
        existing: &[ExpenseRecord],
        just_added: &[ExpenseRecord],
        today: NaiveDate,
    ) -> Vec<BudgetAlert> {
        let key = format!("{}:{:04}-{:02}", user_id, today.year(), today.month());
        if !self.guard.try_acquire(&key) {
            debug!(key = %key, "Budget check already in flight, skipping");
            return Vec::new();
        }

        let mut spent = accumulate(existing, today);
        for (category, amount) in accumulate(just_added, today) {
            *spent.entry(category).or_insert(0.0) += amount;
        }
        let alerts = evaluate(&spent, budgets);

        // Release a beat after the run so rapid back-to-back additions
        // don't double-fire the same crossing.
        let guard = Arc::clone(&self.guard);
        let delay = self.release_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            guard.release(&key);
        });

        alerts
    }
}

/// Fold expenses dated in `today`'s month into per-category totals
///
/// Expenses with line items are summed item by item (each into its own
/// category); itemless expenses contribute their receipt-level total to the
/// receipt category.
pub fn accumulate(expenses: &[ExpenseRecord], today: NaiveDate) -> HashMap<Category, f64> {
    let mut totals: HashMap<Category, f64> = HashMap::new();

    for expense in expenses {
        if expense.date.year() != today.year() || expense.date.month() != today.month() {
            continue;
        }
        if expense.items.is_empty() {
            *totals.entry(expense.category).or_insert(0.0) += expense.total_amount;
        } else {
            for item in &expense.items {
                if let Some(amount) = item.amount() {
                    *totals.entry(item.category).or_insert(0.0) += amount;
                }
            }
        }
    }

    totals
}

/// Compare accumulated spend to limits, emitting at most one alert per
/// category
pub fn evaluate(spent: &HashMap<Category, f64>, budgets: &BudgetSnapshot) -> Vec<BudgetAlert> {
    let mut alerts = Vec::new();

    for category in Category::ALL {
        let limit = budgets.limits.get(&category).copied().unwrap_or(0.0);
        if limit == 0.0 {
            continue;
        }
        if !limit.is_finite() || limit < 0.0 {
            warn!(category = %category, limit, "Ignoring malformed budget limit");
            continue;
        }

        let total = spent.get(&category).copied().unwrap_or(0.0);
        let ratio = total / limit;
        let percentage = (ratio * 100.0).round() as u32;

        if ratio >= 1.0 {
            alerts.push(BudgetAlert {
                category,
                percentage,
                severity: AlertSeverity::Exceeded,
            });
        } else if ratio >= APPROACHING_THRESHOLD {
            alerts.push(BudgetAlert {
                category,
                percentage,
                severity: AlertSeverity::Approaching,
            });
        }
    }

    alerts
}
