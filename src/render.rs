//! Plain-text rendering of view models for terminal output.

use crate::aggregate::CategoryCount;
use crate::distribution::{CompanySeries, Histogram};
use crate::view::{DashboardView, SummaryView, ViewModel};
use std::fmt::Write;

const BAR_WIDTH: usize = 40;

pub fn render_view(view: &ViewModel, table_rows: usize) -> String {
    match view {
        ViewModel::Summary(summary) => render_summary(summary, table_rows),
        ViewModel::Dashboard(dashboard) => render_dashboard(dashboard, table_rows),
    }
}

pub fn render_summary(view: &SummaryView, table_rows: usize) -> String {
    let mut out = String::new();
    out.push_str("=== Complaint Summary ===\n");
    let _ = writeln!(
        out,
        "Filters: company={} state={} city={}",
        view.company, view.state, view.city
    );
    let _ = writeln!(
        out,
        "Total complaints for {}: {}",
        view.company, view.company_cases
    );
    let _ = writeln!(
        out,
        "Overall cases: {} | Matching rows: {}",
        view.overall_cases, view.filtered_rows
    );
    out.push('\n');

    out.push_str(&render_table("Ranking by State", "State", "Complaints", &view.state_ranking, table_rows));
    out.push('\n');
    out.push_str(&render_table("Ranking by City", "City", "Complaints", &view.city_ranking, table_rows));
    out.push('\n');
    out.push_str(&render_table("Total by Status", "Status", "Cases", &view.status_totals, table_rows));
    out
}

pub fn render_dashboard(view: &DashboardView, table_rows: usize) -> String {
    let mut out = String::new();
    out.push_str("=== Complaint Dashboard ===\n");
    let _ = writeln!(
        out,
        "Filters: company={} state={} status={} min description length={} (max {})",
        view.company,
        view.state,
        view.status,
        view.min_description_length,
        view.max_description_length
    );
    let _ = writeln!(
        out,
        "Matching rows: {} | Cases: {}",
        view.filtered_rows, view.filtered_cases
    );
    out.push('\n');

    for series in &view.time_series {
        out.push_str(&render_series(series));
        out.push('\n');
    }

    let status_title = format!("Complaints by Status - {}", view.company);
    out.push_str(&render_bars(&status_title, &view.status_histogram, table_rows));
    out.push('\n');

    let length_title = format!("Description Length Distribution - {}", view.company);
    out.push_str(&render_histogram(&length_title, &view.description_length_histogram));
    out.push('\n');

    let state_title = format!("Complaints by State - {}", view.company);
    out.push_str(&render_bars(&state_title, &view.state_histogram, table_rows));
    out
}

pub fn render_table(
    title: &str,
    label_header: &str,
    count_header: &str,
    rows: &[CategoryCount],
    limit: usize,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", title);

    let shown = rows.len().min(limit);
    let label_width = rows
        .iter()
        .take(shown)
        .map(|row| row.category.chars().count())
        .chain(std::iter::once(label_header.chars().count()))
        .max()
        .unwrap_or(0);

    let _ = writeln!(out, "  {:<label_width$}  {}", label_header, count_header);
    if rows.is_empty() {
        out.push_str("  (no rows)\n");
        return out;
    }
    for row in rows.iter().take(shown) {
        let _ = writeln!(out, "  {:<label_width$}  {:>width$}", row.category, row.count, width = count_header.len());
    }
    if rows.len() > shown {
        let _ = writeln!(out, "  … {} more", rows.len() - shown);
    }
    out
}

pub fn render_bars(title: &str, entries: &[CategoryCount], limit: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", title);
    if entries.is_empty() {
        out.push_str("  (no data)\n");
        return out;
    }

    let shown = entries.len().min(limit);
    let max_count = entries.iter().map(|e| e.count).max().unwrap_or(0);
    let label_width = entries
        .iter()
        .take(shown)
        .map(|e| e.category.chars().count())
        .max()
        .unwrap_or(0);

    for entry in entries.iter().take(shown) {
        let _ = writeln!(
            out,
            "  {:<label_width$} | {} {}",
            entry.category,
            bar(entry.count, max_count),
            entry.count
        );
    }
    if entries.len() > shown {
        let _ = writeln!(out, "  … {} more", entries.len() - shown);
    }
    out
}

pub fn render_histogram(title: &str, histogram: &Histogram) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", title);
    if histogram.is_empty() {
        out.push_str("  (no data)\n");
        return out;
    }

    let max_count = histogram.bins.iter().map(|b| b.count).max().unwrap_or(0);
    let last = histogram.bins.len() - 1;
    for (idx, bin) in histogram.bins.iter().enumerate().filter(|(_, b)| b.count > 0) {
        // The last bin also holds the maximum.
        let close = if idx == last { ']' } else { ')' };
        let _ = writeln!(
            out,
            "  [{:>8.1}, {:>8.1}{} | {} {}",
            bin.lower,
            bin.upper,
            close,
            bar(bin.count, max_count),
            bin.count
        );
    }
    out
}

pub fn render_series(series: &CompanySeries) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", series.title);
    if series.points.is_empty() {
        out.push_str("  (no data)\n");
        return out;
    }
    for point in &series.points {
        let _ = writeln!(out, "  {}  {}", point.date.format("%Y-%m-%d"), point.case_count);
    }
    out
}

fn bar(count: u64, max_count: u64) -> String {
    if max_count == 0 {
        return String::new();
    }
    let len = ((count as f64 / max_count as f64) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(len.max(usize::from(count > 0)))
}
