//! Mapping between notice parameters and rows.
//!
//! The first row uses bare field names (`from`, `to`, ...). Later rows carry
//! a numeric suffix starting at 2 (`from2`, `to2`, ...). A suffix of 1 is an
//! alias for the bare name. Parameters that are not row fields or flags are
//! discarded when a notice is parsed.

use super::row::{RowField, RowFields};
use crate::page::{ParamMap, ParamValue};

/// Parameter that collapses the notice's row list.
pub const COLLAPSE_PARAM: &str = "collapse";
/// Parameter that renders the notice as a small floating box.
pub const SMALL_PARAM: &str = "small";

/// Decoded contents of a notice's parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedNotice {
    pub collapsed: bool,
    pub small: bool,
    pub rows: Vec<RowFields>,
}

fn flag(params: &ParamMap, name: &str) -> bool {
    params
        .get(name)
        .is_some_and(|value| !value.wt.trim().is_empty())
}

fn value(params: &ParamMap, name: &str) -> Option<String> {
    params.get(name).map(|value| value.wt.clone())
}

/// Fields carrying `suffix` (the empty string for bare names).
fn suffixed_row(params: &ParamMap, suffix: &str) -> Option<RowFields> {
    let mut found = false;
    let mut fields = RowFields::new();
    for field in RowField::ALL {
        if let Some(v) = value(params, &format!("{}{}", field.as_str(), suffix)) {
            found = true;
            fields.set(field, Some(v));
        }
    }
    found.then_some(fields)
}

/// Decode flags and rows from raw parameters.
pub fn decode(params: &ParamMap) -> DecodedNotice {
    let mut rows = Vec::new();

    // Bare names win over suffix 1 for the same field.
    let bare = suffixed_row(params, "");
    let first = suffixed_row(params, "1");
    match (bare, first) {
        (Some(mut bare), Some(first)) => {
            for (field, v) in first.iter() {
                if bare.get(field).is_none() {
                    bare.set(field, Some(v.to_string()));
                }
            }
            rows.push(bare);
        }
        (Some(row), None) | (None, Some(row)) => rows.push(row),
        (None, None) => {}
    }

    if !rows.is_empty() {
        let mut suffix = 2;
        while let Some(row) = suffixed_row(params, &suffix.to_string()) {
            rows.push(row);
            suffix += 1;
        }
    }

    DecodedNotice {
        collapsed: flag(params, COLLAPSE_PARAM),
        small: flag(params, SMALL_PARAM),
        rows,
    }
}

/// Encode flags and rows into a fresh parameter map.
///
/// Row `i` (0-based) uses bare names when `i == 0` and suffix `i + 1`
/// otherwise. Absent fields are omitted.
pub fn encode<'a, I>(collapsed: bool, small: bool, rows: I) -> ParamMap
where
    I: IntoIterator<Item = &'a RowFields>,
{
    let mut params = ParamMap::new();
    if collapsed {
        params.insert(COLLAPSE_PARAM.to_string(), ParamValue::new("yes"));
    }
    if small {
        params.insert(SMALL_PARAM.to_string(), ParamValue::new("yes"));
    }
    for (index, row) in rows.into_iter().enumerate() {
        let suffix = if index == 0 {
            String::new()
        } else {
            (index + 1).to_string()
        };
        for (field, v) in row.iter() {
            params.insert(format!("{}{}", field.as_str(), suffix), ParamValue::new(v));
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ParamMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), ParamValue::new(*v)))
            .collect()
    }

    #[test]
    fn test_decode_single_bare_row() {
        let decoded = decode(&params(&[("from", "X"), ("date", "2020-01-01")]));
        assert_eq!(decoded.rows.len(), 1);
        assert_eq!(decoded.rows[0].get(RowField::From), Some("X"));
        assert_eq!(decoded.rows[0].get(RowField::Date), Some("2020-01-01"));
        assert_eq!(decoded.rows[0].get(RowField::To), None);
        assert!(!decoded.collapsed);
        assert!(!decoded.small);
    }

    #[test]
    fn test_decode_numbered_rows() {
        let decoded = decode(&params(&[("from", "X"), ("from2", "Y"), ("to3", "Z")]));
        let froms: Vec<Option<&str>> = decoded
            .rows
            .iter()
            .map(|r| r.get(RowField::From))
            .collect();
        assert_eq!(froms, vec![Some("X"), Some("Y"), None]);
        assert_eq!(decoded.rows[2].get(RowField::To), Some("Z"));
    }

    #[test]
    fn test_decode_stops_at_gap() {
        let decoded = decode(&params(&[("from", "X"), ("from2", "Y"), ("from4", "W")]));
        assert_eq!(decoded.rows.len(), 2);
    }

    #[test]
    fn test_suffix_one_is_alias_for_bare() {
        let decoded = decode(&params(&[("from1", "X"), ("to1", "A"), ("from2", "Y")]));
        assert_eq!(decoded.rows.len(), 2);
        assert_eq!(decoded.rows[0].get(RowField::From), Some("X"));
        assert_eq!(decoded.rows[0].get(RowField::To), Some("A"));
    }

    #[test]
    fn test_bare_name_wins_over_suffix_one() {
        let decoded = decode(&params(&[("from", "X"), ("from1", "Old"), ("to1", "A")]));
        assert_eq!(decoded.rows.len(), 1);
        assert_eq!(decoded.rows[0].get(RowField::From), Some("X"));
        assert_eq!(decoded.rows[0].get(RowField::To), Some("A"));
    }

    #[test]
    fn test_numbered_rows_need_a_first_row() {
        let decoded = decode(&params(&[("from2", "Y")]));
        assert!(decoded.rows.is_empty());
    }

    #[test]
    fn test_flags_and_unknown_params() {
        let decoded = decode(&params(&[
            ("collapse", "yes"),
            ("small", "   "),
            ("url", "http://example.org"),
            ("to", "B"),
        ]));
        assert!(decoded.collapsed);
        assert!(!decoded.small);
        assert_eq!(decoded.rows.len(), 1);
        assert_eq!(decoded.rows[0].iter().count(), 1);
    }

    #[test]
    fn test_encode_numbering() {
        let rows = vec![
            RowFields::new().with(RowField::From, "A"),
            RowFields::new().with(RowField::From, "B").with(RowField::To, "C"),
            RowFields::new().with(RowField::Date, "2021-02-03"),
        ];
        let encoded = encode(true, false, &rows);
        let keys: Vec<&str> = encoded.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["collapse", "from", "from2", "to2", "date3"]);
        assert_eq!(decode(&encoded).rows, rows);
    }

    #[test]
    fn test_encode_single_row_is_unnumbered() {
        let rows = vec![RowFields::new().with(RowField::To, "T")];
        let encoded = encode(false, true, &rows);
        let keys: Vec<&str> = encoded.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["small", "to"]);
    }
}
