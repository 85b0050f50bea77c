use chrono::{NaiveDate, NaiveDateTime};

/// A single cell of a [`crate::table::TableModel`] column.
///
/// Missing values are represented as `None` at the column level, so the
/// variants here are always concrete.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl CellValue {
    pub fn as_display(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    (*n as i64).to_string()
                } else {
                    n.to_string()
                }
            }
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

/// Standard decimal coercion. Non-finite parses (`NaN`, `inf`) count as
/// failures so downstream arithmetic stays total over finite floats.
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

// Day-first ordering: ambiguous numeric dates resolve day-before-month.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%m/%d/%Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parses a date with day-first preference, accepting bare dates and
/// datetimes (truncated to their date part).
pub fn parse_day_first_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(parsed);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(parsed.date());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn parse_number_accepts_standard_decimals() {
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number(" 3.5 "), Some(3.5));
        assert_eq!(parse_number("-0.25"), Some(-0.25));
    }

    #[test]
    fn parse_number_rejects_text_and_non_finite() {
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn parse_day_first_date_supports_multiple_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        assert_eq!(parse_day_first_date("2024-05-06"), Some(expected));
        assert_eq!(parse_day_first_date("06/05/2024"), Some(expected));
        assert_eq!(parse_day_first_date("06-05-2024"), Some(expected));
        assert_eq!(parse_day_first_date("06.05.2024"), Some(expected));
        assert_eq!(parse_day_first_date("2024-05-06 14:30:00"), Some(expected));
    }

    #[test]
    fn ambiguous_dates_resolve_day_before_month() {
        // 03/04 could be March 4 or April 3; day-first wins.
        let parsed = parse_day_first_date("03/04/2024").unwrap();
        assert_eq!(parsed, NaiveDate::from_ymd_opt(2024, 4, 3).unwrap());
    }

    #[test]
    fn unambiguous_us_style_still_parses() {
        // Day slot exceeds 12, so only month-first interpretation fits.
        let parsed = parse_day_first_date("12/25/2024").unwrap();
        assert_eq!(parsed, NaiveDate::from_ymd_opt(2024, 12, 25).unwrap());
    }

    #[test]
    fn garbage_dates_return_none() {
        assert_eq!(parse_day_first_date("not a date"), None);
        assert_eq!(parse_day_first_date("2024-13-40"), None);
    }

    #[test]
    fn display_formats_whole_numbers_without_fraction() {
        assert_eq!(CellValue::Number(10.0).as_display(), "10");
        assert_eq!(CellValue::Number(10.5).as_display(), "10.5");
    }
}
