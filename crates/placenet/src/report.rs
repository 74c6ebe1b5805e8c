//! Accuracy report formatting and the append-only report file.

use std::{
    fs::OpenOptions,
    io::Write,
    path::Path,
};

use chrono::{Local, NaiveDateTime};
use placenet_metric::AccuracyReport;

use crate::error::{PlacenetError, PlacenetResult};

/// Timestamp layout of a report block header.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// The two summary lines of a report, without trailing newlines.
pub fn summary_lines(report: &AccuracyReport) -> [String; 2] {
    [
        format!(
            " - Evaluate on {} pairs of (fg, bg) images, pred_acc={:.4}",
            report.total, report.pred_acc
        ),
        format!(
            " - Evaluate on {} (no_replica) pairs of (fg, bg) images, pred_acc={:.4}",
            report.group_count, report.pred_acc_no_replica
        ),
    ]
}

/// One timestamped report block, newline terminated.
pub fn format_block(timestamp: NaiveDateTime, report: &AccuracyReport) -> String {
    let [raw, no_replica] = summary_lines(report);
    format!(
        "{}\n{raw}\n{no_replica}\n",
        timestamp.format(TIMESTAMP_FORMAT)
    )
}

/// Append a block stamped with the current local time to `path`.
///
/// The file is created if it does not exist; earlier blocks are kept.
///
/// # Errors
///
/// Returns [`PlacenetError::ReportWrite`] if the file cannot be opened or
/// written.
pub fn append_report(path: &Path, report: &AccuracyReport) -> PlacenetResult<()> {
    append_report_at(path, report, Local::now().naive_local())
}

/// Append a block with an explicit timestamp to `path`.
///
/// # Errors
///
/// Returns [`PlacenetError::ReportWrite`] if the file cannot be opened or
/// written.
pub fn append_report_at(
    path: &Path,
    report: &AccuracyReport,
    timestamp: NaiveDateTime,
) -> PlacenetResult<()> {
    let write_err = |source| PlacenetError::ReportWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(write_err)?;
    file.write_all(format_block(timestamp, report).as_bytes())
        .map_err(write_err)?;

    tracing::info!(path = %path.display(), "appended accuracy report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::NaiveDate;

    use super::*;

    fn sample_report() -> AccuracyReport {
        AccuracyReport {
            pred_acc: 0.6,
            pred_acc_no_replica: (2.0 / 3.0 + 0.5) / 2.0,
            total: 5,
            group_count: 2,
        }
    }

    fn timestamp(second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|d| d.and_hms_micro_opt(14, 5, second, 123_456))
            .unwrap()
    }

    #[test]
    fn block_matches_report_layout() {
        let block = format_block(timestamp(7), &sample_report());

        assert_eq!(
            block,
            "2024-03-09 14:05:07.123456\n\
             \x20- Evaluate on 5 pairs of (fg, bg) images, pred_acc=0.6000\n\
             \x20- Evaluate on 2 (no_replica) pairs of (fg, bg) images, pred_acc=0.5833\n"
        );
    }

    #[test]
    fn accuracies_use_four_decimals() {
        let report = AccuracyReport {
            pred_acc: 1.0,
            pred_acc_no_replica: 0.0,
            total: 1,
            group_count: 1,
        };
        let [raw, no_replica] = summary_lines(&report);

        assert!(raw.ends_with("pred_acc=1.0000"));
        assert!(no_replica.ends_with("pred_acc=0.0000"));
    }

    #[test]
    fn repeated_runs_append_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eval_acc.txt");

        append_report_at(&path, &sample_report(), timestamp(1)).unwrap();
        append_report_at(&path, &sample_report(), timestamp(2)).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "2024-03-09 14:05:01.123456");
        assert_eq!(lines[3], "2024-03-09 14:05:02.123456");
        assert_eq!(lines[1], lines[4]);
    }

    #[test]
    fn unwritable_path_is_a_report_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("eval_acc.txt");

        assert!(matches!(
            append_report(&path, &sample_report()),
            Err(PlacenetError::ReportWrite { .. })
        ));
    }
}
