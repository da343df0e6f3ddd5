//! Integration tests for work plan construction

#[path = "common/mod.rs"]
mod common;

use chrono::NaiveDate;
use common::write_region_csv;
use kma_cli::downloader::{build_intervals, build_plan, load_regions};
use kma_cli::models::{resolve_variables, IntervalMode};
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn range_intervals_cover_the_full_range_exactly() {
    let cases = [
        (date(2021, 1, 1), date(2021, 3, 1)),
        (date(2021, 1, 15), date(2021, 6, 3)),
        (date(2020, 12, 31), date(2021, 1, 1)),
        (date(2019, 2, 28), date(2021, 3, 1)),
    ];

    for (start, end) in cases {
        let intervals = build_intervals(start, end, IntervalMode::Range);
        assert!(!intervals.is_empty(), "start < end must yield intervals");
        assert_eq!(intervals[0].start, start.format("%Y%m%d").to_string());
        assert_eq!(
            intervals.last().unwrap().end,
            end.format("%Y%m%d").to_string(),
            "last interval must be clipped to the end date"
        );
        for pair in intervals.windows(2) {
            assert_eq!(
                pair[0].end, pair[1].start,
                "intervals must be contiguous and non-overlapping"
            );
        }
        for interval in &intervals {
            assert!(interval.start < interval.end);
        }
    }
}

#[test]
fn plan_is_deterministic_across_builds() {
    let tmp = TempDir::new().unwrap();
    let region_file = tmp.path().join("regions.csv");
    write_region_csv(
        &region_file,
        &[
            ("서울특별시", "강남구", "역삼동", "89_123"),
            ("서울특별시", "강남구", "삼성동", "89_124"),
        ],
    );
    let regions = load_regions(&region_file).unwrap();
    let intervals = build_intervals(date(2021, 1, 1), date(2021, 3, 1), IntervalMode::Range);
    let variables = resolve_variables(&["1시간기온".to_string(), "습도".to_string()]);

    let first = build_plan(&regions, &intervals, &variables).unwrap();
    let second = build_plan(&regions, &intervals, &variables).unwrap();

    assert_eq!(first.len(), 2 * 2 * 2);
    let names_first: Vec<String> = first.iter().map(|u| u.expected_csv_name()).collect();
    let names_second: Vec<String> = second.iter().map(|u| u.expected_csv_name()).collect();
    assert_eq!(names_first, names_second);

    // Region-major, interval-second, variable-minor
    assert_eq!(names_first[0], "역삼동_1시간기온_20210101_20210201.csv");
    assert_eq!(names_first[1], "역삼동_습도_20210101_20210201.csv");
    assert_eq!(names_first[2], "역삼동_1시간기온_20210201_20210301.csv");
    assert_eq!(names_first[4], "삼성동_1시간기온_20210101_20210201.csv");
}

#[test]
fn monthly_mode_labels_every_touched_month() {
    let intervals = build_intervals(date(2020, 11, 20), date(2021, 2, 10), IntervalMode::Monthly);
    let labels: Vec<&str> = intervals.iter().map(|i| i.start.as_str()).collect();
    assert_eq!(labels, vec!["202011", "202012", "202101", "202102"]);
}
