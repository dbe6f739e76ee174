//! View computation tests
//!
//! Summary and dashboard view models over record fixtures and a CSV export
//! written to the temp directory, plus the two view-level failure modes.

use chrono::NaiveDate;
use complaint_dashboard::aggregate::CategoryCount;
use complaint_dashboard::config::DashboardConfig;
use complaint_dashboard::render;
use complaint_dashboard::schema::ViewKind;
use complaint_dashboard::{
    compute_view, ComplaintRecord, DashboardError, DashboardView, Dataset, FilterSelection,
    Selection, Session, SummaryView, ViewModel,
};
use polars::prelude::*;
use std::fs;
use std::path::PathBuf;

fn day(month: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, d).unwrap()
}

fn fixture() -> Dataset {
    let record = |company: &str, state: &str, city: &str, status: &str, cases: u64, text: &str, date: NaiveDate| {
        ComplaintRecord::new(company, status, cases, text)
            .with_state(state)
            .with_city(city)
            .with_date(date)
            .with_branding(format!("{state}.png"), format!("{company}.png"))
    };

    Dataset::from_records(&[
        record("Acme", "SP", "Campinas", "open", 3, "late delivery", day(1, 5)),
        record("Bolt", "RJ", "Niterói", "resolved", 5, "charged twice", day(1, 9)),
        record("Acme", "RJ", "Rio de Janeiro", "resolved", 2, "broken item", day(2, 1)),
        record("Cora", "SP", "Santos", "open", 7, "app crashes on login", day(2, 14)),
        record("Acme", "SP", "Santos", "open", 4, "rude support", day(1, 20)),
        record("Acme", "SP", "Campinas", "pending", 1, "no answer", day(3, 2)),
    ])
    .unwrap()
}

fn write_csv(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("complaint_dashboard_tests");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_summary_view_for_company() {
    let dataset = fixture();
    let selection = FilterSelection::new().company(Selection::only("Acme"));

    let view = SummaryView::compute(&dataset, &selection).unwrap();

    assert_eq!(view.company_options, vec!["All", "Acme", "Bolt", "Cora"]);
    assert_eq!(view.state_options, vec!["All", "RJ", "SP"]);
    assert_eq!(view.overall_cases, 22);
    assert_eq!(view.company_cases, 10);
    assert_eq!(view.filtered_rows, 4);
    assert_eq!(
        view.state_ranking,
        vec![CategoryCount::new("SP", 3), CategoryCount::new("RJ", 1)]
    );
    assert_eq!(
        view.city_ranking,
        vec![
            CategoryCount::new("Campinas", 2),
            CategoryCount::new("Rio de Janeiro", 1),
            CategoryCount::new("Santos", 1),
        ]
    );
    assert_eq!(
        view.status_totals,
        vec![
            CategoryCount::new("open", 2),
            CategoryCount::new("pending", 1),
            CategoryCount::new("resolved", 1),
        ]
    );
}

#[test]
fn test_summary_company_total_ignores_state_and_city() {
    let dataset = fixture();
    let selection = FilterSelection::new()
        .company(Selection::only("Acme"))
        .state(Selection::only("RJ"));

    let view = SummaryView::compute(&dataset, &selection).unwrap();

    assert_eq!(view.company_cases, 10);
    assert_eq!(view.filtered_rows, 1);
    assert_eq!(view.city_ranking, vec![CategoryCount::new("Rio de Janeiro", 1)]);
}

#[test]
fn test_summary_missing_status_column() {
    let frame = df![
        "company" => ["A", "B"],
        "state" => ["X", "Y"],
        "city" => ["P", "Q"],
        "case_count" => [3u64, 5],
        "flag" => ["x.png", "y.png"],
        "logo" => ["a.png", "b.png"],
        "description" => ["abc", "abcdef"]
    ]
    .unwrap();
    let dataset = Dataset::from_frame(frame).unwrap();

    let err = SummaryView::compute(&dataset, &FilterSelection::new()).unwrap_err();
    match err {
        DashboardError::MissingColumns(missing) => assert_eq!(missing, vec!["status"]),
        other => panic!("expected MissingColumns, got {other}"),
    }
    assert_eq!(
        DashboardError::MissingColumns(vec!["status".to_string()]).to_string(),
        "Missing columns in data: status. Check the data structure."
    );
}

#[test]
fn test_dashboard_view_all_companies() {
    let dataset = fixture();
    let view = DashboardView::compute(&dataset, &FilterSelection::new(), 50).unwrap();

    assert_eq!(view.filtered_rows, 6);
    assert_eq!(view.filtered_cases, 22);
    assert_eq!(view.max_description_length, 20);
    assert_eq!(view.status_options, vec!["All", "open", "pending", "resolved"]);

    let companies: Vec<&str> = view.time_series.iter().map(|s| s.company.as_str()).collect();
    assert_eq!(companies, vec!["Acme", "Bolt", "Cora"]);

    let acme_dates: Vec<NaiveDate> = view.time_series[0].points.iter().map(|p| p.date).collect();
    assert_eq!(acme_dates, vec![day(1, 5), day(1, 20), day(2, 1), day(3, 2)]);

    assert_eq!(
        view.status_histogram,
        vec![
            CategoryCount::new("open", 14),
            CategoryCount::new("pending", 1),
            CategoryCount::new("resolved", 7),
        ]
    );
    assert_eq!(
        view.state_histogram,
        vec![CategoryCount::new("RJ", 7), CategoryCount::new("SP", 15)]
    );
    assert_eq!(view.description_length_histogram.bins.len(), 50);
    assert_eq!(view.description_length_histogram.total(), 6);
}

#[test]
fn test_dashboard_view_keeps_empty_series_for_unmatched_companies() {
    let dataset = fixture();
    let selection = FilterSelection::new()
        .status(Selection::only("open"))
        .min_description_length(13);

    let view = DashboardView::compute(&dataset, &selection, 50).unwrap();

    assert_eq!(view.filtered_rows, 2);
    assert_eq!(view.time_series.len(), 3);
    assert_eq!(view.time_series[0].points.len(), 1);
    assert!(view.time_series[1].points.is_empty());
    assert_eq!(view.time_series[2].points[0].case_count, 7);
}

#[test]
fn test_dashboard_view_single_company_title() {
    let dataset = fixture();
    let selection = FilterSelection::new()
        .company(Selection::only("Acme"))
        .state(Selection::only("SP"))
        .city(Selection::only("Niterói"));

    let view = DashboardView::compute(&dataset, &selection, 50).unwrap();

    // City does not apply to the dashboard.
    assert_eq!(view.filtered_rows, 3);
    assert_eq!(view.time_series.len(), 1);
    assert_eq!(view.time_series[0].title, "Cases over time - Acme in SP");
    assert_eq!(view.filtered_cases, 8);
}

#[test]
fn test_views_require_loaded_session() {
    let session = Session::new();
    let config = DashboardConfig::default();

    for kind in [ViewKind::Summary, ViewKind::Dashboard] {
        let err = compute_view(&session, kind, &FilterSelection::new(), &config).unwrap_err();
        assert!(matches!(err, DashboardError::DataNotLoaded));
    }
}

#[test]
fn test_compute_view_dispatch_and_json() {
    let session = Session::with_dataset(fixture());
    let config = DashboardConfig::default();

    let view = compute_view(&session, ViewKind::Dashboard, &FilterSelection::new(), &config).unwrap();
    assert_eq!(view.kind(), ViewKind::Dashboard);

    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["view"], "dashboard");
    assert_eq!(json["filtered_cases"], 22);
    assert_eq!(json["company"], "all");

    let round_trip: ViewModel = serde_json::from_value(json).unwrap();
    assert_eq!(round_trip.kind(), ViewKind::Dashboard);

    let text = render::render_view(&view, 10);
    assert!(text.contains("Cases over time - Cora"));
    assert!(text.contains("Description Length Distribution - All"));
}

#[test]
fn test_csv_export_with_portuguese_headers() {
    let path = write_csv(
        "complaints_pt.csv",
        "empresa,estado,cidade,status,casos,bandeira,logo,descrição,data,extra\n\
         Acme,SP,Campinas,open,3,sp.png,acme.png,late delivery,2024-01-05,x\n\
         Bolt,,,resolved,5,,bolt.png,charged twice,09/01/2024,y\n\
         Acme,RJ,Rio,open,2,rj.png,acme.png,broken,2024-02-01T10:00:00Z,z\n",
    );

    let mut session = Session::new();
    session.load_csv(&path).unwrap();
    let dataset = session.dataset().unwrap();

    assert_eq!(dataset.height(), 3);
    assert!(!dataset.has_column("extra"));

    let records = dataset.records().unwrap();
    assert_eq!(records[1].state.as_deref(), Some("All"));
    assert_eq!(records[1].city.as_deref(), Some("All"));
    assert_eq!(records[1].date, Some(day(1, 9)));
    assert_eq!(records[2].date, Some(day(2, 1)));

    let summary = SummaryView::compute(dataset, &FilterSelection::new()).unwrap();
    assert_eq!(summary.overall_cases, 10);
    assert_eq!(summary.state_options, vec!["All", "RJ", "SP"]);

    let text = render::render_summary(&summary, 20);
    assert!(text.contains("Ranking by City"));
    assert!(text.contains("Total complaints for All: 10"));
}

#[test]
fn test_csv_rejects_invalid_case_count() {
    let path = write_csv(
        "complaints_bad_count.csv",
        "company,state,city,status,case_count,description,date\n\
         Acme,SP,Campinas,open,three,late,2024-01-05\n",
    );

    let err = Dataset::load_csv(&path).unwrap_err();
    match err {
        DashboardError::InvalidRecord { line, column, .. } => {
            assert_eq!(line, 2);
            assert_eq!(column, "case_count");
        }
        other => panic!("expected InvalidRecord, got {other}"),
    }
}

#[test]
fn test_csv_missing_logo_halts_summary() {
    let path = write_csv(
        "complaints_no_logo.csv",
        "company,state,city,status,case_count,flag,description,date\n\
         Acme,SP,Campinas,open,3,sp.png,late,2024-01-05\n",
    );
    let session = {
        let mut session = Session::new();
        session.load_csv(&path).unwrap();
        session
    };
    let config = DashboardConfig::default();

    let err = compute_view(&session, ViewKind::Summary, &FilterSelection::new(), &config).unwrap_err();
    assert!(matches!(err, DashboardError::MissingColumns(ref m) if m == &vec!["logo".to_string()]));

    let dashboard = compute_view(&session, ViewKind::Dashboard, &FilterSelection::new(), &config);
    assert!(dashboard.is_ok());
}
