//! Per-date realized P&L and the daily loss circuit breaker.

use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DayState {
    pub net_pnl: f64,
    /// Latches once the cap is reached; never cleared for that date.
    pub stopped: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyGuard {
    loss_cap: f64,
    days: BTreeMap<NaiveDate, DayState>,
}

impl DailyGuard {
    pub fn new(loss_cap: f64) -> Self {
        DailyGuard {
            loss_cap,
            days: BTreeMap::new(),
        }
    }

    /// Add a realized net P&L to `date`. Returns true when this call
    /// tripped the breaker.
    pub fn record(&mut self, date: NaiveDate, net_pnl: f64) -> bool {
        let day = self.days.entry(date).or_default();
        day.net_pnl += net_pnl;
        if !day.stopped && day.net_pnl <= self.loss_cap {
            day.stopped = true;
            return true;
        }
        false
    }

    pub fn is_stopped(&self, date: NaiveDate) -> bool {
        self.days.get(&date).is_some_and(|d| d.stopped)
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayState> {
        self.days.get(&date)
    }
}
