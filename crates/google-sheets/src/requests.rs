//! Builders for Sheets batch-update requests, A1 ranges and Drive queries.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};
use sheet_core::{CheckboxRule, SortOrder, SPREADSHEET_MIME_TYPE};

/// Convert a 0-based column index to its A1 letters (0 → `A`, 26 → `AA`).
pub fn column_letters(column: usize) -> String {
    let mut n = column + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Quote a worksheet title for use in A1 notation.
pub fn quote_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// A1 range of a rectangular block; positions are 0-based sheet indices.
pub fn block_range(title: &str, position: usize, rows: usize, columns: usize) -> String {
    let last_column = column_letters(columns.saturating_sub(1));
    format!(
        "{}!A{}:{}{}",
        quote_title(title),
        position + 1,
        last_column,
        position + rows.max(1)
    )
}

/// A1 reference of a single cell; indices are 0-based.
pub fn cell_range(title: &str, position: usize, column: usize) -> String {
    format!(
        "{}!{}{}",
        quote_title(title),
        column_letters(column),
        position + 1
    )
}

/// `insertDimension` request for `count` rows before index `at`.
pub fn insert_rows(sheet_id: i64, at: usize, count: usize) -> Value {
    json!({
        "insertDimension": {
            "range": {
                "sheetId": sheet_id,
                "dimension": "ROWS",
                "startIndex": at,
                "endIndex": at + count
            },
            "inheritFromBefore": false
        }
    })
}

/// `deleteDimension` request for the row at `position`.
pub fn delete_row(sheet_id: i64, position: usize) -> Value {
    json!({
        "deleteDimension": {
            "range": {
                "sheetId": sheet_id,
                "dimension": "ROWS",
                "startIndex": position,
                "endIndex": position + 1
            }
        }
    })
}

/// `sortRange` request over every row below the header.
pub fn sort_rows(sheet_id: i64, column: usize, order: SortOrder) -> Value {
    json!({
        "sortRange": {
            "range": {
                "sheetId": sheet_id,
                "startRowIndex": 1,
                "startColumnIndex": 0
            },
            "sortSpecs": [
                { "dimensionIndex": column, "sortOrder": order.as_str() }
            ]
        }
    })
}

/// `setDataValidation` request applying or clearing a checkbox on one cell.
pub fn checkbox_rule(sheet_id: i64, rule: &CheckboxRule) -> Value {
    let range = json!({
        "sheetId": sheet_id,
        "startRowIndex": rule.position,
        "endRowIndex": rule.position + 1,
        "startColumnIndex": rule.column,
        "endColumnIndex": rule.column + 1
    });
    if rule.checkbox {
        json!({
            "setDataValidation": {
                "range": range,
                "rule": {
                    "condition": { "type": "BOOLEAN" },
                    "showCustomUi": true
                }
            }
        })
    } else {
        // An omitted rule clears validation on the range.
        json!({ "setDataValidation": { "range": range } })
    }
}

/// Escape a literal for a Drive query string.
pub fn escape_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Drive query for spreadsheets in a folder, optionally filtered.
pub fn folder_query(
    folder: &str,
    name_fragment: Option<&str>,
    modified_since: Option<DateTime<Utc>>,
) -> String {
    let mut query = format!(
        "'{}' in parents and mimeType='{}' and trashed=false",
        escape_query_literal(folder),
        SPREADSHEET_MIME_TYPE
    );
    if let Some(fragment) = name_fragment {
        query.push_str(&format!(
            " and name contains '{}'",
            escape_query_literal(fragment)
        ));
    }
    if let Some(since) = modified_since {
        query.push_str(&format!(
            " and modifiedTime >= '{}'",
            since.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(11), "L");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(27), "AB");
        assert_eq!(column_letters(701), "ZZ");
        assert_eq!(column_letters(702), "AAA");
    }

    #[test]
    fn test_ranges() {
        assert_eq!(block_range("גיליון1", 1, 3, 12), "'גיליון1'!A2:L4");
        assert_eq!(cell_range("Bob's", 4, 2), "'Bob''s'!C5");
    }

    #[test]
    fn test_checkbox_rule_clear_has_no_rule() {
        let clear = checkbox_rule(
            7,
            &CheckboxRule {
                position: 2,
                column: 4,
                checkbox: false,
            },
        );
        assert!(clear["setDataValidation"].get("rule").is_none());
        assert_eq!(clear["setDataValidation"]["range"]["startColumnIndex"], 4);

        let apply = checkbox_rule(
            7,
            &CheckboxRule {
                position: 2,
                column: 4,
                checkbox: true,
            },
        );
        assert_eq!(
            apply["setDataValidation"]["rule"]["condition"]["type"],
            "BOOLEAN"
        );
    }

    #[test]
    fn test_sort_request() {
        let request = sort_rows(3, 0, SortOrder::Descending);
        assert_eq!(request["sortRange"]["range"]["startRowIndex"], 1);
        assert_eq!(request["sortRange"]["sortSpecs"][0]["sortOrder"], "DESCENDING");
    }

    #[test]
    fn test_folder_query_escapes_fragment() {
        let since = Utc.with_ymd_and_hms(2026, 10, 2, 8, 0, 0).unwrap();
        let query = folder_query("f1", Some("O'Malley"), Some(since));
        assert!(query.starts_with("'f1' in parents and mimeType='application/vnd.google-apps.spreadsheet'"));
        assert!(query.contains("name contains 'O\\'Malley'"));
        assert!(query.ends_with("modifiedTime >= '2026-10-02T08:00:00Z'"));
    }
}
