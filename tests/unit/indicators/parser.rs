//! Unit tests for cell parsing

use report_card::indicators::parser::{parse_iso3, parse_value, parse_year};

#[test]
fn missing_markers_are_absent_not_zero() {
    for cell in ["", "  ", "..", "NA", "N/A", "null", "-", "nan"] {
        assert_eq!(parse_value(cell), None, "{:?} should be absent", cell);
    }
}

#[test]
fn numeric_cells_parse_with_thousands_separators() {
    assert_eq!(parse_value("42"), Some(42.0));
    assert_eq!(parse_value(" 3.5 "), Some(3.5));
    assert_eq!(parse_value("1,234.5"), Some(1234.5));
    assert_eq!(parse_value("-0.25"), Some(-0.25));
    assert_eq!(parse_value("0"), Some(0.0));
}

#[test]
fn misplaced_commas_are_not_stripped() {
    assert_eq!(parse_value("1,5"), None);
    assert_eq!(parse_value("0,25"), None);
    assert_eq!(parse_value("12,34,567"), None);
    assert_eq!(parse_value("1,234.5,6"), None);
    assert_eq!(parse_value("-12,345,678"), Some(-12_345_678.0));
}

#[test]
fn non_numeric_and_non_finite_cells_are_rejected() {
    assert_eq!(parse_value("abc"), None);
    assert_eq!(parse_value("inf"), None);
    assert_eq!(parse_value("1e400"), None);
}

#[test]
fn years_must_have_four_digits() {
    assert_eq!(parse_year("2020"), Some(2020));
    assert_eq!(parse_year("\"1999\""), Some(1999));
    assert_eq!(parse_year("20"), None);
    assert_eq!(parse_year("2020-01"), None);
    assert_eq!(parse_year("YR2020"), None);
}

#[test]
fn iso3_codes_are_uppercased_and_aggregates_rejected() {
    assert_eq!(parse_iso3("deu"), Some("DEU".to_string()));
    assert_eq!(parse_iso3(" FRA "), Some("FRA".to_string()));
    assert_eq!(parse_iso3("OWID_WRL"), None);
    assert_eq!(parse_iso3("1A2"), None);
    assert_eq!(parse_iso3(""), None);
}
