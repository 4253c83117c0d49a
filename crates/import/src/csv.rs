use serde::Serialize;

/// One data line of a CSV export: header name to raw cell, in header order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawRow {
    /// 1-based position among the data rows (header and blank lines excluded).
    pub number: usize,
    fields: Vec<(String, String)>,
}

impl RawRow {
    pub fn new(number: usize, fields: Vec<(String, String)>) -> Self {
        RawRow { number, fields }
    }

    /// Cell under `header`. Missing trailing cells read as `""`.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    /// Cell under `header`, trimmed, or `None` when absent or blank.
    pub fn value(&self, header: Option<&str>) -> Option<&str> {
        header
            .and_then(|h| self.get(h))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(h, v)| (h.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedCsv {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// Tokenizes CSV text into headers and rows.
///
/// Accepts LF, CRLF and lone CR terminators in any mix, RFC 4180 quoting with
/// `""` escapes, and skips lines that are blank or whitespace only. A line of
/// separators only, such as `,,`, is still a data row. Ragged
/// rows are tolerated: short rows are padded with `""`, extra cells dropped.
/// Never fails; a record the reader cannot decode is skipped.
pub fn parse(text: &str) -> ParsedCsv {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(error = %e, "skipping undecodable csv record");
                continue;
            }
        };
        let blank = record.iter().all(|cell| cell.trim().is_empty());
        // A whitespace-only line reads as one blank cell; `,,` is a row of
        // empty cells and is kept once the header is known.
        if blank && (headers.is_none() || record.len() <= 1) {
            continue;
        }
        match &headers {
            None => {
                headers = Some(
                    record
                        .iter()
                        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
                        .collect(),
                );
            }
            Some(names) => {
                let fields = names
                    .iter()
                    .enumerate()
                    .map(|(i, name)| (name.clone(), record.get(i).unwrap_or_default().to_string()))
                    .collect();
                rows.push(RawRow::new(rows.len() + 1, fields));
            }
        }
    }

    ParsedCsv {
        headers: headers.unwrap_or_default(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic() {
        let csv = parse("Name,Age,City\nAlice,30,Montreal\nBob,25,Toronto");
        assert_eq!(csv.headers, vec!["Name", "Age", "City"]);
        assert_eq!(csv.rows.len(), 2);
        assert_eq!(csv.rows[0].get("Age"), Some("30"));
        assert_eq!(csv.rows[1].get("City"), Some("Toronto"));
    }

    #[test]
    fn row_count_independent_of_line_endings() {
        for sep in ["\n", "\r\n", "\r"] {
            let text = ["a,b", "1,2", "3,4", "5,6"].join(sep);
            assert_eq!(parse(&text).rows.len(), 3, "separator {sep:?}");
        }
        let mixed = "a,b\r\n1,2\n3,4\r5,6\r\n";
        assert_eq!(parse(mixed).rows.len(), 3);
    }

    #[test]
    fn blank_lines_skipped() {
        let csv = parse("a,b\n\n1,2\n   \n\r\n3,4\n\n");
        assert_eq!(csv.rows.len(), 2);
        assert_eq!(csv.rows[1].get("a"), Some("3"));
    }

    #[test]
    fn separator_only_lines_are_rows() {
        let csv = parse("a,b,c\n1,2,3\n,,\n  ,  , \n4,5,6\n");
        assert_eq!(csv.rows.len(), 4);
        assert_eq!(csv.rows[1].get("a"), Some(""));
        assert_eq!(csv.rows[1].number, 2);
        assert_eq!(csv.rows[3].get("a"), Some("4"));
    }

    #[test]
    fn quoted_fields_with_commas_and_escapes() {
        let csv = parse("vendor,note\n\"Shell, Inc.\",\"He said \"\"hi\"\"\"\n");
        assert_eq!(csv.rows[0].get("vendor"), Some("Shell, Inc."));
        assert_eq!(csv.rows[0].get("note"), Some("He said \"hi\""));
    }

    #[test]
    fn empty_and_header_only_inputs() {
        assert_eq!(parse(""), ParsedCsv::default());
        assert_eq!(parse("\n\n  \n"), ParsedCsv::default());
        let header_only = parse("a,b,c\n");
        assert_eq!(header_only.headers.len(), 3);
        assert!(header_only.rows.is_empty());
    }

    #[test]
    fn ragged_rows_are_padded() {
        let csv = parse("a,b,c\n1\n1,2,3,4\n");
        assert_eq!(csv.rows[0].get("c"), Some(""));
        assert_eq!(csv.rows[1].len(), 3);
    }

    #[test]
    fn unterminated_quote_does_not_panic() {
        let csv = parse("a,b\n\"open,1\n2,3\n");
        assert_eq!(csv.headers, vec!["a", "b"]);
        assert!(csv.rows.len() <= 2);
    }

    #[test]
    fn bom_and_whitespace_trimmed_from_headers() {
        let csv = parse("\u{feff} Date , Amount\n2024-01-01,5\n");
        assert_eq!(csv.headers, vec!["Date", "Amount"]);
    }

    #[test]
    fn rows_are_numbered_from_one() {
        let csv = parse("a\n\n1\n2\n");
        assert_eq!(csv.rows[0].number, 1);
        assert_eq!(csv.rows[1].number, 2);
    }

    #[test]
    fn value_trims_and_hides_blanks() {
        let csv = parse("a,b\n  x ,  \n");
        assert_eq!(csv.rows[0].value(Some("a")), Some("x"));
        assert_eq!(csv.rows[0].value(Some("b")), None);
        assert_eq!(csv.rows[0].value(None), None);
    }
}
