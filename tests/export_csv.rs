// Report and site list exports written to disk.

mod helpers;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use helpers::{policy, site, site_list};
use library_versioning::export::{
    default_report_filename, export_report_csv, export_site_list,
};
use library_versioning::{BatchReport, SiteResult};

fn sample_report() -> BatchReport {
    BatchReport::with_timestamp(
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 0).unwrap(),
        policy(),
        vec![
            SiteResult::from_library_outcomes(
                site("https://contoso.sharepoint.com/sites/hr"),
                4,
                1,
            ),
            SiteResult::unreachable(
                site("https://contoso.sharepoint.com/sites/gone"),
                "site not found (HTTP 404), check the address",
            ),
        ],
    )
}

#[test]
fn test_report_csv_file_contents() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let report = sample_report();
    let output = temp_dir.path().join(default_report_filename(&report));

    let rows = export_report_csv(&report, Some(&output)).expect("export should succeed");
    assert_eq!(rows, 2);
    assert!(output.ends_with("sharepoint-report-2024-03-09.csv"));

    let mut reader = csv::Reader::from_path(&output).expect("Failed to open CSV");
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["Site URL", "Status", "Bibliotecas OK", "Bibliotecas Erro", "Erro"]
    );

    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(
        records[0].iter().collect::<Vec<_>>(),
        vec!["https://contoso.sharepoint.com/sites/hr", "Sucesso", "4", "1", ""]
    );
    // The comma in the error message must survive quoting.
    assert_eq!(
        records[1].iter().collect::<Vec<_>>(),
        vec![
            "https://contoso.sharepoint.com/sites/gone",
            "Falha",
            "0",
            "0",
            "site not found (HTTP 404), check the address"
        ]
    );
}

#[test]
fn test_site_list_export_round_trips_through_parser() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let output = temp_dir.path().join("sites.txt");
    let sites = site_list(&[
        "https://contoso.sharepoint.com/sites/a",
        "https://contoso.sharepoint.com/sites/b",
        "https://contoso.sharepoint.com/sites/a",
    ]);

    let count = export_site_list(&sites, Some(&output)).expect("export should succeed");
    assert_eq!(count, 3);

    let text = std::fs::read_to_string(&output).unwrap();
    let parsed = library_versioning::app::parse_site_list(&text);
    assert_eq!(parsed.sites, sites);
    assert!(parsed.rejected.is_empty());
}

#[test]
fn test_export_to_missing_directory_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let output = temp_dir.path().join("missing").join("report.csv");

    assert!(export_report_csv(&sample_report(), Some(&output)).is_err());
}
