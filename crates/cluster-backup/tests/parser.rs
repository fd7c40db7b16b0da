//! Tests for the output parser
//!

use cluster_backup::{
    Integrity,
    parser::{
        FormatVersion, OutputParser, ParseError, ProcessingTime, convert_size_to_bytes,
        parse_backup_output, parse_check_output, parse_cleanup_output, parse_stats_output,
        snapshots::parse_snapshots,
    },
};
use common::{BACKUP_OUTPUT, CHECK_OUTPUT, FORGET_OUTPUT, STATS_OUTPUT};

mod common;

#[test]
fn size_units() {
    assert_eq!(convert_size_to_bytes("10 B").unwrap(), 10.0);
    assert_eq!(convert_size_to_bytes("3 KiB").unwrap(), 3.0 * 1024.0);
    assert_eq!(convert_size_to_bytes("3 MiB").unwrap(), 3.0 * 1024.0 * 1024.0);
    assert_eq!(
        convert_size_to_bytes("3 GiB").unwrap(),
        3.0 * 1024.0 * 1024.0 * 1024.0
    );
    assert_eq!(convert_size_to_bytes("1.5 KiB").unwrap(), 1536.0);
}

#[test]
fn size_is_monotonic() {
    for unit in ["B", "KiB", "MiB", "GiB"] {
        let mut previous = -1.0;
        for n in 0..100 {
            let bytes = convert_size_to_bytes(&format!("{n} {unit}")).unwrap();
            assert!(bytes > previous, "{n} {unit}");
            previous = bytes;
        }
    }
}

#[test]
fn size_errors() {
    assert!(matches!(
        convert_size_to_bytes("10 TiB"),
        Err(ParseError::UnknownUnit(unit)) if unit == "TiB"
    ));
    assert!(matches!(
        convert_size_to_bytes("10 kB"),
        Err(ParseError::UnknownUnit(_))
    ));
    assert!(matches!(
        convert_size_to_bytes("10"),
        Err(ParseError::InvalidSize(_))
    ));
    assert!(matches!(
        convert_size_to_bytes("ten B"),
        Err(ParseError::InvalidSizeValue(..))
    ));
}

#[test]
fn fractional_minutes() {
    let time = ProcessingTime::from_fractional_minutes("5:30").unwrap();
    assert_eq!((time.minutes(), time.seconds()), (5, 18));
    assert_eq!(time.to_string(), "5m18s");

    let time = ProcessingTime::from_fractional_minutes("0:05").unwrap();
    assert_eq!(time.to_string(), "0m3s");

    let time = ProcessingTime::from_fractional_minutes("0:50").unwrap();
    assert_eq!(time.to_string(), "0m30s");
}

#[test]
fn fractional_minutes_carry() {
    // .99 of a minute rounds to 59 seconds, it does not reach a full minute.
    assert_eq!(
        ProcessingTime::from_fractional_minutes("0:99")
            .unwrap()
            .to_string(),
        "0m59s"
    );
    assert_eq!(
        ProcessingTime::from_fractional_minutes("1:99")
            .unwrap()
            .to_string(),
        "1m59s"
    );

    // A fraction worth exactly 60 seconds rolls into the minutes.
    assert_eq!(
        ProcessingTime::from_fractional_minutes("0:100")
            .unwrap()
            .to_string(),
        "1m0s"
    );
    assert_eq!(
        ProcessingTime::from_fractional_minutes("1:150")
            .unwrap()
            .to_string(),
        "2m30s"
    );
}

#[test]
fn clock_time() {
    assert_eq!(
        ProcessingTime::from_clock("1:05").unwrap(),
        ProcessingTime::new(1, 5).unwrap()
    );
    assert_eq!(
        ProcessingTime::from_clock("1:02:03").unwrap(),
        ProcessingTime::new(62, 3).unwrap()
    );
    assert!(ProcessingTime::from_clock("1:2:3:4").is_err());
}

#[test]
fn processing_time_errors() {
    assert!(matches!(
        ProcessingTime::from_fractional_minutes("0-05"),
        Err(ParseError::InvalidDuration(_))
    ));
    assert!(ProcessingTime::from_fractional_minutes("a:05").is_err());
    assert!(ProcessingTime::from_fractional_minutes("0:5x").is_err());
}

#[test]
fn processing_time_overflow() {
    assert!(ProcessingTime::new(u64::MAX, 0).is_none());
    assert!(ProcessingTime::new(u64::MAX / 60, 60).is_none());
    assert_eq!(
        ProcessingTime::new(0, u64::MAX).map(|time| time.as_seconds()),
        Some(u64::MAX)
    );

    assert!(matches!(
        ProcessingTime::from_fractional_minutes("307445734561825861:00"),
        Err(ParseError::InvalidDuration(_))
    ));
    assert!(matches!(
        ProcessingTime::from_clock("307445734561825861:00:00"),
        Err(ParseError::InvalidDuration(_))
    ));
    assert!("307445734561825861m0s".parse::<ProcessingTime>().is_err());

    let output = "processed 1 files, 10 B in 307445734561825861:00\n";
    assert!(matches!(
        parse_backup_output(output.as_bytes(), FormatVersion::Legacy),
        Err(ParseError::InvalidDuration(_))
    ));
}

#[test]
fn processing_time_text() {
    let time: ProcessingTime = "2m30s".parse().unwrap();
    assert_eq!(Some(time), ProcessingTime::new(2, 30));
    assert_eq!(time.as_seconds(), 150);
    assert!("2m30".parse::<ProcessingTime>().is_err());
}

#[test]
fn backup_output() {
    let result = parse_backup_output(BACKUP_OUTPUT.as_bytes(), FormatVersion::Legacy).unwrap();

    assert_eq!(result.snapshot.as_deref(), Some("abc123"));
    assert_eq!(result.size.as_deref(), Some("10 B"));
    assert_eq!(result.uploaded.as_deref(), Some("10 B"));
    assert_eq!(result.processing_time, ProcessingTime::new(0, 3));
    assert_eq!(result.file_stats.total_files, Some(1));
    assert_eq!(result.file_stats.new_files, Some(1));
    assert_eq!(result.file_stats.modified_files, Some(0));
    assert_eq!(result.file_stats.unmodified_files, Some(0));
    assert_eq!(result.integrity, Integrity::Unknown);
}

#[test]
fn backup_output_clock_format() {
    let output = "processed 1204 files, 1.532 GiB in 1:02:07\nsnapshot 79766175 saved\n";
    let result = FormatVersion::Clock.parse_backup(output.as_bytes()).unwrap();

    assert_eq!(result.file_stats.total_files, Some(1204));
    assert_eq!(result.size.as_deref(), Some("1.532 GiB"));
    assert_eq!(result.processing_time, ProcessingTime::new(62, 7));
    assert_eq!(result.snapshot.as_deref(), Some("79766175"));
}

#[test]
fn counts_are_not_reconciled() {
    let output = "Files: 3 new, 4 changed, 5 unmodified\nprocessed 1 files, 10 B in 0:05\n";
    let result = parse_backup_output(output.as_bytes(), FormatVersion::Legacy).unwrap();

    assert_eq!(result.file_stats.total_files, Some(1));
    assert_eq!(result.file_stats.new_files, Some(3));
    assert_eq!(result.file_stats.modified_files, Some(4));
    assert_eq!(result.file_stats.unmodified_files, Some(5));
}

#[test]
fn unknown_lines_are_ignored() {
    let output = "using parent snapshot 1a2b3c4d\nscan finished in 0.215s: 1 files, 10 B\n";
    let result = parse_backup_output(output.as_bytes(), FormatVersion::Legacy).unwrap();

    assert!(result.snapshot.is_none());
    assert!(result.size.is_none());
    assert!(result.file_stats.is_empty());
}

#[test]
fn backup_output_errors() {
    let parse = |output: &str| parse_backup_output(output.as_bytes(), FormatVersion::Legacy);

    assert!(matches!(
        parse("Files: 1 new, 0 changed"),
        Err(ParseError::TooFewFields(..))
    ));
    assert!(matches!(
        parse("Files: x new, 0 changed, 0 unmodified"),
        Err(ParseError::InvalidNumber(..))
    ));
    assert!(matches!(
        parse("Added to the repo:"),
        Err(ParseError::TooFewFields(..))
    ));
    assert!(matches!(
        parse("Added to the repo: 10 TiB"),
        Err(ParseError::UnknownUnit(_))
    ));
    assert!(matches!(
        parse("processed 1 files, 10 B"),
        Err(ParseError::TooFewFields(..))
    ));
    assert!(matches!(
        parse("processed 1 files, 10 B in 5s"),
        Err(ParseError::InvalidDuration(_))
    ));
    assert!(matches!(
        parse("snapshot saved"),
        Err(ParseError::TooFewFields(..))
    ));
}

#[test]
fn check_output() {
    assert!(parse_check_output(CHECK_OUTPUT.as_bytes()));
    assert!(parse_check_output(b"  no errors were found  \r\n"));

    assert!(!parse_check_output(b""));
    assert!(!parse_check_output(b"Fatal: repository contains errors\n"));
    assert!(!parse_check_output(b"no errors were found yet\n"));
    assert!(!parse_check_output(b"check snapshots, trees and blobs\n"));
}

#[test]
fn cleanup_output() {
    let summary = parse_cleanup_output(FORGET_OUTPUT.as_bytes()).unwrap();
    assert_eq!(summary.kept, 1);
    assert_eq!(summary.removed, 2);

    let summary = parse_cleanup_output(b"").unwrap();
    assert_eq!((summary.kept, summary.removed), (0, 0));
}

#[test]
fn cleanup_output_sums_groups() {
    let output =
        "keep 2 snapshots:\nremove 1 snapshots:\n\nkeep 3 snapshots:\nremove 4 snapshots:\n";
    let summary = parse_cleanup_output(output.as_bytes()).unwrap();

    assert_eq!(summary.kept, 5);
    assert_eq!(summary.removed, 5);
}

#[test]
fn stats_output() {
    let statistics = parse_stats_output(STATS_OUTPUT.as_bytes()).unwrap();

    assert_eq!(statistics.size.as_deref(), Some("1.125 KiB"));
    assert_eq!(statistics.snapshot_count, Some(3));
    assert!(statistics.snapshots_removed_on_last_cleanup.is_none());

    assert!(parse_stats_output(b"").unwrap().is_empty());
    assert!(matches!(
        parse_stats_output(b"Total Size: 2 PiB"),
        Err(ParseError::UnknownUnit(_))
    ));
}

#[test]
fn snapshots_json() {
    let output = r#"[{"time":"2024-01-02T10:00:00.123456789+00:00","tree":"e4b5a8c2","paths":["/tmp/restic/backup"],"hostname":"node-1","username":"root","uid":0,"gid":0,"tags":["nightly"],"id":"4bba301e2c2f1d3a","short_id":"4bba301e"}]"#;
    let snapshots = parse_snapshots(output.as_bytes()).unwrap();

    assert_eq!(snapshots.len(), 1);
    let snapshot = snapshots.first().unwrap();
    assert_eq!(snapshot.id, "4bba301e2c2f1d3a");
    assert_eq!(snapshot.hostname, "node-1");
    assert_eq!(snapshot.paths, ["/tmp/restic/backup"]);
    assert_eq!(snapshot.tags, ["nightly"]);

    assert!(parse_snapshots(b"null").unwrap().is_empty());
    assert!(parse_snapshots(b"[]").unwrap().is_empty());
    assert!(parse_snapshots(b"Fatal: no repository").is_err());
}
