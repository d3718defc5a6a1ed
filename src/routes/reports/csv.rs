use std::fmt::Write;

use chrono::NaiveDate;

use super::Report;

/// Completions per productive day, to one decimal place. Rounds the exact
/// quotient half-up in integer arithmetic, so 23/20 gives `1.2`.
pub fn average_per_day(total_completed: i64, productive_days: i64) -> String {
    if productive_days <= 0 {
        return "0".to_string();
    }

    let tenths = (total_completed * 20 + productive_days) / (productive_days * 2);
    format!("{}.{}", tenths / 10, tenths % 10)
}

/// Plain-text export of a report.
///
/// Day labels such as `Mon, Jun 10` are written unquoted, so a breakdown
/// line splits on its last comma only.
pub fn render_csv(report: &Report, generated_on: NaiveDate) -> String {
    let summary = &report.summary;
    let mut csv = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(csv, "Productivity Report - {}", report.period.label());
    let _ = writeln!(csv, "Generated on: {}", generated_on.format("%-m/%-d/%Y"));
    let _ = writeln!(csv);
    let _ = writeln!(csv, "Summary:");
    let _ = writeln!(csv, "Total Completed,{}", summary.total_completed);
    let _ = writeln!(csv, "Productive Days,{}", summary.productive_days);
    let _ = writeln!(
        csv,
        "Average Per Day,{}",
        average_per_day(summary.total_completed, summary.productive_days)
    );
    let _ = writeln!(csv, "Best Day,{}", report.most_productive.count);
    let _ = writeln!(csv);
    let _ = writeln!(csv, "Daily Breakdown:");
    let _ = writeln!(csv, "Date,Tasks Completed");

    for entry in &report.chart_data {
        let _ = writeln!(csv, "{},{}", entry.display_date, entry.count);
    }

    csv
}

pub fn file_name(report: &Report, generated_on: NaiveDate) -> String {
    format!(
        "productivity-report-{}-{}.csv",
        report.period.as_str(),
        generated_on.format("%Y-%m-%d")
    )
}
