pub mod csv;
pub mod queries;
pub mod routes;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// MODELS

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    Daily,
    Weekly,
    Monthly,
}

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Summary {
    pub total_completed: i64,
    pub last_completed: Option<DateTime<Utc>>,
    pub productive_days: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MostProductiveDay {
    pub date: Option<NaiveDate>,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartEntry {
    pub display_date: String,
    pub count: i64,
    pub iso_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub period: ReportPeriod,
    pub chart_data: Vec<ChartEntry>,
    pub summary: Summary,
    pub most_productive: MostProductiveDay,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub period: Option<String>,
}

impl ReportPeriod {
    /// Unknown or missing keywords fall back to `Weekly`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("daily") => ReportPeriod::Daily,
            Some("monthly") => ReportPeriod::Monthly,
            _ => ReportPeriod::Weekly,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReportPeriod::Daily => "daily",
            ReportPeriod::Weekly => "weekly",
            ReportPeriod::Monthly => "monthly",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReportPeriod::Daily => "Today",
            ReportPeriod::Weekly => "Last 7 Days",
            ReportPeriod::Monthly => "Last 30 Days",
        }
    }

    fn days_back(self) -> u64 {
        match self {
            ReportPeriod::Daily => 0,
            ReportPeriod::Weekly => 6,
            ReportPeriod::Monthly => 30,
        }
    }

    /// Calendar-day window ending on `today`.
    pub fn window(self, today: NaiveDate) -> Window {
        let start = today
            .checked_sub_days(Days::new(self.days_back()))
            .unwrap_or(NaiveDate::MIN);

        Window { start, end: today }
    }
}

impl Window {
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

// HELPER FUNCTIONS

/// `Mon, Jun 10`
pub fn display_date(date: NaiveDate) -> String {
    date.format("%a, %b %-d").to_string()
}

/// Highest count wins; on a tie the earliest date wins.
pub fn most_productive_day(counts: &[DailyCount]) -> MostProductiveDay {
    let mut best: Option<&DailyCount> = None;

    for entry in counts {
        match best {
            Some(b) if entry.count < b.count => {}
            Some(b) if entry.count == b.count && entry.date >= b.date => {}
            _ => best = Some(entry),
        }
    }

    match best {
        Some(b) if b.count > 0 => MostProductiveDay {
            date: Some(b.date),
            count: b.count,
        },
        _ => MostProductiveDay { date: None, count: 0 },
    }
}

/// One entry per calendar day of the window, zero where nothing was completed.
pub fn zero_fill(window: &Window, counts: &[DailyCount]) -> Vec<ChartEntry> {
    window
        .days()
        .map(|day| ChartEntry {
            display_date: display_date(day),
            count: counts
                .iter()
                .find(|c| c.date == day)
                .map(|c| c.count)
                .unwrap_or(0),
            iso_date: day,
        })
        .collect()
}

pub fn assemble(
    period: ReportPeriod,
    window: Window,
    counts: &[DailyCount],
    summary: Summary,
) -> Report {
    Report {
        period,
        chart_data: zero_fill(&window, counts),
        summary,
        most_productive: most_productive_day(counts),
        start_date: window.start,
        end_date: window.end,
    }
}
