use chrono::{Local, NaiveDate};

/// Per-day query budget. Resets when the local date changes.
#[derive(Debug, Clone)]
pub struct DailyUsage {
    pub date: NaiveDate,
    pub used: u32,
    pub limit: u32,
}

impl DailyUsage {
    pub fn new(limit: u32) -> Self {
        Self {
            date: Local::now().date_naive(),
            used: 0,
            limit,
        }
    }

    fn roll_over(&mut self, today: NaiveDate) {
        if today != self.date {
            self.date = today;
            self.used = 0;
        }
    }

    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.used)
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.limit
    }

    /// At or past 80% of the budget.
    pub fn is_near_limit(&self) -> bool {
        self.used as f64 >= self.limit as f64 * 0.8
    }

    pub fn try_consume(&mut self) -> bool {
        self.try_consume_on(Local::now().date_naive())
    }

    pub fn try_consume_on(&mut self, today: NaiveDate) -> bool {
        self.roll_over(today);
        if self.is_exhausted() {
            return false;
        }
        self.used += 1;
        true
    }
}
