//! Per-preview CSV export.

use super::PreviewReport;
use std::io::Write;

/// Export one row per preview
///
/// CSV columns: preview, identity_key, captured_at, outcome, raw_path, detail
pub fn export_csv<W: Write>(rows: &[PreviewReport], mut writer: W) -> std::io::Result<()> {
    writeln!(writer, "preview,identity_key,captured_at,outcome,raw_path,detail")?;

    for row in rows {
        writeln!(
            writer,
            "{},{},{},{},{},{}",
            escape(&row.preview),
            escape(row.identity_key.as_deref().unwrap_or("")),
            row.captured_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
            row.status,
            escape(
                &row.raw_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default()
            ),
            escape(&row.detail),
        )?;
    }

    writer.flush()
}

/// Quote a field if it contains a separator, quote or newline
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reporter::PreviewStatus;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    #[test]
    fn csv_has_header_and_one_row_per_preview() {
        let rows = vec![
            PreviewReport {
                preview: "IMG_0001.jpg".to_string(),
                identity_key: Some("0001".to_string()),
                captured_at: NaiveDate::from_ymd_opt(2024, 5, 1)
                    .unwrap()
                    .and_hms_opt(10, 0, 0),
                status: PreviewStatus::Matched,
                raw_path: Some(PathBuf::from("/card/_DSC0001.ARW")),
                detail: String::new(),
            },
            PreviewReport {
                preview: "holiday, beach.jpg".to_string(),
                identity_key: None,
                captured_at: None,
                status: PreviewStatus::Unmatched,
                raw_path: None,
                detail: "identity or timestamp unavailable".to_string(),
            },
        ];

        let mut out = Vec::new();
        export_csv(&rows, &mut out).unwrap();
        let csv = String::from_utf8(out).unwrap();
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "IMG_0001.jpg,0001,2024-05-01 10:00:00,matched,/card/_DSC0001.ARW,"
        );
        assert_eq!(
            lines[2],
            "\"holiday, beach.jpg\",,,unmatched,,identity or timestamp unavailable"
        );
    }

    #[test]
    fn quotes_are_doubled() {
        assert_eq!(escape("say \"cheese\""), "\"say \"\"cheese\"\"\"");
        assert_eq!(escape("plain"), "plain");
    }
}
