//! Integration tests for loading the dataset from disk.

use chrono::NaiveDate;
use core_types::{Record, Risk, ViewFilter};
use dataset::{load_table, CanonicalTable, DatasetError, DatasetStore, OPTIONAL_COLUMNS, REQUIRED_COLUMNS};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

const HEADER: &str = "Date,Open,Close,Volume,Beta,PE_Ratio,EPS,DividendYield,MarketCap,Sector,Industry";

fn write_csv(body: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{body}").unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_rows_with_bad_dates_are_dropped_and_order_is_kept() {
    let file = write_csv(&format!(
        "{HEADER}\n\
         2023-01-03,100,110,1000000,0.8,15,2.1,1.5,5e9,Technology,Software\n\
         not-a-date,100,110,1000000,0.8,15,2.1,1.5,5e9,Technology,Software\n\
         2023-01-02,50,45,2000000,1.3,9,1.0,0.0,1e9,Energy,Oil & Gas\n"
    ));

    let table = load_table(file.path()).unwrap();

    assert_eq!(table.len(), 2);
    let first = &table.records()[0];
    assert_eq!(first.date, NaiveDate::from_ymd_opt(2023, 1, 3).unwrap());
    assert_eq!(first.return_pct, Some(10.0));
    assert_eq!(first.risk, Some(Risk::Low));
    assert_eq!(first.sector.as_deref(), Some("Technology"));

    let second = &table.records()[1];
    assert_eq!(second.risk, Some(Risk::High));
    assert_eq!(second.industry.as_deref(), Some("Oil & Gas"));
    assert_eq!(second.return_pct, Some(-10.0));
}

#[test]
fn test_bad_numbers_become_missing_without_dropping_the_row() {
    let file = write_csv(&format!(
        "{HEADER}\n2023-01-03,abc,110,,1.0,--,2.1,1.5,5e9,Technology,Software\n"
    ));

    let table = load_table(file.path()).unwrap();
    let record = &table.records()[0];

    assert_eq!(record.open, None);
    assert_eq!(record.return_pct, None);
    assert_eq!(record.volume, None);
    assert_eq!(record.pe_ratio, None);
    assert_eq!(record.risk, Some(Risk::Medium));
}

#[test]
fn test_optional_columns_are_read_when_present() {
    let file = write_csv(
        "Date,Open,Close,Volume,Beta,PE_Ratio,EPS,DividendYield,MarketCap,Sector,Industry,52W_High,52W_Low,InstitutionOwnership,FloatShares\n\
         2023-01-03,100,110,1000,1.0,15,2.1,1.5,5e9,Technology,Software,150,90,60,2500000\n",
    );

    let table = load_table(file.path()).unwrap();
    let record = &table.records()[0];

    assert_eq!(record.high_52w, Some(150.0));
    assert_eq!(record.low_52w, Some(90.0));
    assert_eq!(record.institution_ownership, Some(60.0));
    assert_eq!(record.float_shares, Some(2_500_000.0));
}

#[test]
fn test_missing_required_column_is_a_schema_error() {
    let file = write_csv("Date,Open,Close,Volume\n2023-01-03,1,2,3\n");

    match load_table(file.path()) {
        Err(DatasetError::Schema(column)) => assert_eq!(column, "Beta"),
        other => panic!("expected a schema error, got {other:?}"),
    }
}

#[test]
fn test_every_required_column_is_checked() {
    for missing in REQUIRED_COLUMNS {
        let header: Vec<&str> = REQUIRED_COLUMNS.into_iter().filter(|c| *c != missing).collect();
        let file = write_csv(&format!("{}\n", header.join(",")));

        match load_table(file.path()) {
            Err(DatasetError::Schema(column)) => assert_eq!(column, missing),
            other => panic!("expected a schema error for {missing}, got {other:?}"),
        }
    }
}

#[test]
fn test_optional_columns_are_not_required() {
    let file = write_csv(&format!("{HEADER}\n2023-01-03,100,110,1000000,0.8,15,2.1,1.5,5e9,Technology,Software\n"));
    assert!(OPTIONAL_COLUMNS.iter().all(|c| !HEADER.contains(c)));

    let table = load_table(file.path()).unwrap();
    let record = &table.records()[0];
    assert_eq!(record.high_52w, None);
    assert_eq!(record.float_shares, None);
}

#[test]
fn test_missing_file_is_data_unavailable() {
    let result = load_table(std::path::Path::new("/definitely/not/here.csv"));
    assert!(matches!(result, Err(DatasetError::DataUnavailable { .. })));
}

#[test]
fn test_store_loads_once_and_shares_the_table() {
    let file = write_csv(&format!(
        "{HEADER}\n2023-01-03,100,110,1000000,0.8,15,2.1,1.5,5e9,Technology,Software\n"
    ));
    let store = DatasetStore::new(file.path());
    assert!(!store.is_loaded());

    let first = store.table().unwrap();
    let second = store.table().unwrap();

    assert!(store.is_loaded());
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.filter(&ViewFilter::default()).len(), 1);
}

#[test]
fn test_store_retries_after_a_failed_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("StockMarket.csv");
    let store = DatasetStore::new(&path);

    assert!(store.table().is_err());
    assert!(!store.is_loaded());

    std::fs::write(
        &path,
        format!("{HEADER}\n2023-01-03,100,110,1000000,0.8,15,2.1,1.5,5e9,Technology,Software\n"),
    )
    .unwrap();

    assert_eq!(store.table().unwrap().len(), 1);
}

#[test]
fn test_store_from_table_never_reads_the_path() {
    let record = Record {
        close: Some(10.0),
        ..Record::new(NaiveDate::from_ymd_opt(2023, 1, 3).unwrap())
    };
    let store = DatasetStore::from_table("/definitely/not/here.csv", CanonicalTable::new(vec![record]));

    assert!(store.is_loaded());
    assert_eq!(store.table().unwrap().len(), 1);
    assert_eq!(store.path(), std::path::Path::new("/definitely/not/here.csv"));
}
