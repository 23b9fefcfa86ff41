//! Unit tests for CSV document layouts

use std::collections::BTreeSet;
use std::sync::Arc;

use report_card::error::SourceError;
use report_card::models::{SourceRecord, YearRange};
use report_card::services::csv::{parse_document, CsvFormat};
use report_card::services::FetchRequest;

fn request(countries: &[&str], start: i32, end: i32) -> FetchRequest {
    let countries: BTreeSet<String> = countries.iter().map(|c| c.to_string()).collect();
    FetchRequest::new("test.indicator", Arc::new(countries), YearRange::new(start, end))
}

#[test]
fn quoted_fields_may_contain_the_delimiter_and_escaped_quotes() {
    let text = "iso_code,name,year,v\r\nDEU,\"Germany, \"\"Federal\"\" Republic\",2020,\"1,234.5\"\r\n";

    let records = parse_document(text, &CsvFormat::long("iso_code", "year", "v"), &request(&[], 2000, 2030))
        .expect("valid document");

    assert_eq!(records, vec![SourceRecord::new("DEU", 2020, 1234.5)]);
}

#[test]
fn quoted_field_spanning_lines_keeps_its_record() {
    let text = "Country Name,Country Code,2020\n\"Korea,\nRep.\",KOR,5\nGermany,DEU,7\n";

    let records = parse_document(text, &CsvFormat::wide("Country Code"), &request(&[], 2000, 2030))
        .expect("valid document");

    assert_eq!(
        records,
        vec![
            SourceRecord::new("KOR", 2020, 5.0),
            SourceRecord::new("DEU", 2020, 7.0),
        ]
    );
}

#[test]
fn empty_document_has_no_header() {
    let err = parse_document("", &CsvFormat::owid("co2"), &request(&[], 2000, 2030))
        .expect_err("nothing to read");

    assert!(matches!(err, SourceError::Parse(_)));
}

#[test]
fn long_layout_resolves_columns_from_header() {
    let text = "\
year,country,iso_code,co2_per_capita,co2
2019,Germany,DEU,8.5,700
2020,Germany,DEU,7.7,640
2020,World,OWID_WRL,4.5,35000
2020,France,FRA,,300
";
    let records = parse_document(text, &CsvFormat::owid("co2_per_capita"), &request(&[], 2000, 2030))
        .expect("valid document");

    assert_eq!(
        records,
        vec![
            SourceRecord::new("DEU", 2019, 8.5),
            SourceRecord::new("DEU", 2020, 7.7),
        ]
    );
}

#[test]
fn long_layout_applies_country_and_year_filters() {
    let text = "iso_code,year,v\nDEU,2019,1\nDEU,2021,2\nFRA,2019,3\n";

    let records = parse_document(
        text,
        &CsvFormat::long("iso_code", "year", "v"),
        &request(&["DEU"], 2015, 2020),
    )
    .expect("valid document");

    assert_eq!(records, vec![SourceRecord::new("DEU", 2019, 1.0)]);
}

#[test]
fn missing_column_is_a_parse_error() {
    let text = "iso_code,year,other\nDEU,2020,1\n";

    let err = parse_document(text, &CsvFormat::owid("co2"), &request(&[], 2000, 2030))
        .expect_err("column is missing");

    assert!(matches!(err, SourceError::Parse(_)));
}

#[test]
fn wide_layout_with_preamble_reads_year_columns() {
    let text = "\
\"Data Source\",\"World Development Indicators\",

\"Last Updated Date\",\"2024-01-01\",

\"Country Name\",\"Country Code\",\"Indicator Name\",\"Indicator Code\",\"2019\",\"2020\",\"2021\",
\"Germany\",\"DEU\",\"Forest area\",\"AG.LND.FRST.ZS\",\"32.7\",\"32.7\",\"\",
\"Euro area\",\"EMU\",\"Forest area\",\"AG.LND.FRST.ZS\",\"35.1\",\"35.2\",\"35.3\",
\"Chad\",\"TCD\",\"Forest area\",\"AG.LND.FRST.ZS\",\"..\",\"3.4\",\"3.3\",
";
    let format = CsvFormat::wide("Country Code").with_skip_lines(4);

    let records = parse_document(text, &format, &request(&["DEU", "TCD"], 2019, 2020))
        .expect("valid document");

    assert_eq!(
        records,
        vec![
            SourceRecord::new("DEU", 2019, 32.7),
            SourceRecord::new("DEU", 2020, 32.7),
            SourceRecord::new("TCD", 2020, 3.4),
        ]
    );
}

#[test]
fn short_rows_are_skipped() {
    let text = "iso_code,year,v\nDEU,2020\nFRA,2020,5\n";

    let records = parse_document(text, &CsvFormat::long("iso_code", "year", "v"), &request(&[], 2000, 2030))
        .expect("valid document");

    assert_eq!(records, vec![SourceRecord::new("FRA", 2020, 5.0)]);
}

#[test]
fn semicolon_delimiter_is_supported() {
    let text = "code;year;value\nDEU;2020;\"1,234\"\nFRA;2020;\"1,5\"\n";
    let format = CsvFormat::long("code", "year", "value").with_delimiter(';');

    let records = parse_document(text, &format, &request(&[], 2000, 2030)).expect("valid document");

    // A decimal comma is not a thousands separator; the cell is dropped.
    assert_eq!(records, vec![SourceRecord::new("DEU", 2020, 1234.0)]);
}
