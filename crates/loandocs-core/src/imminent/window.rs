use chrono::{Local, Months, NaiveDate};

/// Default look-ahead for the imminent listing, in calendar months.
pub const DEFAULT_WINDOW_MONTHS: u32 = 2;

/// Options for the imminent-deadline extraction.
#[derive(Debug, Clone)]
pub struct ImminentOptions {
    pub today: NaiveDate,
    pub window_months: u32,
}

impl ImminentOptions {
    pub fn new(today: NaiveDate) -> Self {
        ImminentOptions {
            today,
            window_months: DEFAULT_WINDOW_MONTHS,
        }
    }

    pub fn with_window_months(mut self, months: u32) -> Self {
        self.window_months = months;
        self
    }

    pub fn window(&self) -> Window {
        // Month addition clamps to the last day of shorter months
        let end = self
            .today
            .checked_add_months(Months::new(self.window_months))
            .unwrap_or(NaiveDate::MAX);
        Window {
            start: self.today,
            end,
        }
    }
}

impl Default for ImminentOptions {
    fn default() -> Self {
        ImminentOptions::new(Local::now().date_naive())
    }
}

/// Inclusive date range `start ..= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
