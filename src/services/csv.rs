//! CSV parsing for remote and local exports.
//!
//! Column positions are resolved once from the header. Quoting, escaped
//! quotes and embedded newlines are handled by the `csv` reader.

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::SourceError;
use crate::indicators::parser::{parse_iso3, parse_value, parse_year};
use crate::models::SourceRecord;
use crate::services::source::FetchRequest;

/// How observations are laid out in the file.
#[derive(Debug, Clone, PartialEq)]
pub enum CsvShape {
    /// One row per observation with named country, year and value columns.
    Long {
        country: String,
        year: String,
        value: String,
    },
    /// One row per country; every four-digit header column is a year.
    Wide { country: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CsvFormat {
    pub delimiter: char,
    /// Preamble lines before the header.
    pub skip_lines: usize,
    pub shape: CsvShape,
}

impl CsvFormat {
    pub fn long(country: &str, year: &str, value: &str) -> Self {
        Self {
            delimiter: ',',
            skip_lines: 0,
            shape: CsvShape::Long {
                country: country.to_string(),
                year: year.to_string(),
                value: value.to_string(),
            },
        }
    }

    pub fn wide(country: &str) -> Self {
        Self {
            delimiter: ',',
            skip_lines: 0,
            shape: CsvShape::Wide {
                country: country.to_string(),
            },
        }
    }

    /// OWID datasets: `iso_code`, `year` and one column per metric.
    pub fn owid(metric: &str) -> Self {
        Self::long("iso_code", "year", metric)
    }

    pub fn with_skip_lines(mut self, skip_lines: usize) -> Self {
        self.skip_lines = skip_lines;
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// Resolved column positions.
#[derive(Debug, Clone, PartialEq)]
enum Layout {
    Long {
        country: usize,
        year: usize,
        value: usize,
    },
    Wide {
        country: usize,
        years: Vec<(usize, i32)>,
    },
}

impl Layout {
    fn resolve(header: &StringRecord, shape: &CsvShape) -> Result<Self, SourceError> {
        match shape {
            CsvShape::Long {
                country,
                year,
                value,
            } => Ok(Layout::Long {
                country: column_index(header, country)?,
                year: column_index(header, year)?,
                value: column_index(header, value)?,
            }),
            CsvShape::Wide { country } => {
                let years: Vec<(usize, i32)> = header
                    .iter()
                    .enumerate()
                    .filter_map(|(idx, name)| parse_year(name).map(|y| (idx, y)))
                    .collect();
                if years.is_empty() {
                    return Err(SourceError::Parse(
                        "wide CSV header has no year columns".to_string(),
                    ));
                }
                Ok(Layout::Wide {
                    country: column_index(header, country)?,
                    years,
                })
            }
        }
    }
}

fn column_index(header: &StringRecord, wanted: &str) -> Result<usize, SourceError> {
    header
        .iter()
        .position(|name| {
            name.trim()
                .trim_start_matches('\u{feff}')
                .eq_ignore_ascii_case(wanted.trim())
        })
        .ok_or_else(|| SourceError::Parse(format!("CSV header is missing column '{}'", wanted)))
}

/// Drop the first `n` physical lines.
fn skip_preamble(text: &str, n: usize) -> &str {
    let mut rest = text;
    for _ in 0..n {
        match rest.find('\n') {
            Some(idx) => rest = &rest[idx + 1..],
            None => return "",
        }
    }
    rest
}

/// Parse a whole CSV document into records accepted by `request`.
pub fn parse_document(
    text: &str,
    format: &CsvFormat,
    request: &FetchRequest,
) -> Result<Vec<SourceRecord>, SourceError> {
    let delimiter = u8::try_from(format.delimiter)
        .map_err(|_| SourceError::Parse(format!("unsupported CSV delimiter {:?}", format.delimiter)))?;

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(true)
        .from_reader(skip_preamble(text, format.skip_lines).as_bytes());

    let header = reader
        .headers()
        .map_err(|e| SourceError::Parse(format!("unreadable CSV header: {}", e)))?
        .clone();
    if header.iter().all(|name| name.trim().is_empty()) {
        return Err(SourceError::Parse("CSV document has no header".to_string()));
    }
    let layout = Layout::resolve(&header, &format.shape)?;

    let mut records = Vec::new();
    let mut short_rows = 0usize;

    for row in reader.records() {
        let fields = row.map_err(|e| SourceError::Parse(format!("malformed CSV record: {}", e)))?;

        match &layout {
            Layout::Long {
                country,
                year,
                value,
            } => {
                let needed = (*country).max(*year).max(*value);
                if fields.len() <= needed {
                    short_rows += 1;
                    continue;
                }
                let (Some(iso3), Some(year)) = (parse_iso3(&fields[*country]), parse_year(&fields[*year])) else {
                    continue;
                };
                if !request.accepts(&iso3, year) {
                    continue;
                }
                if let Some(value) = parse_value(&fields[*value]) {
                    records.push(SourceRecord::new(iso3, year, value));
                }
            }
            Layout::Wide { country, years } => {
                let Some(iso3) = fields.get(*country).and_then(parse_iso3) else {
                    short_rows += usize::from(fields.len() <= *country);
                    continue;
                };
                for (idx, year) in years {
                    if !request.accepts(&iso3, *year) {
                        continue;
                    }
                    if let Some(value) = fields.get(*idx).and_then(parse_value) {
                        records.push(SourceRecord::new(iso3.clone(), *year, value));
                    }
                }
            }
        }
    }

    if short_rows > 0 {
        debug!(
            indicator = %request.indicator_code,
            short_rows = short_rows,
            "Skipped {} CSV rows with too few fields",
            short_rows
        );
    }

    Ok(records)
}
