//! Letter grades for total scores.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    /// Inclusive lower bound of the total score.
    pub min_score: f64,
    pub letter: String,
    /// Stored in place of the letter.
    pub numeric: u8,
}

impl Grade {
    pub fn new(min_score: f64, letter: &str, numeric: u8) -> Self {
        Self {
            min_score,
            letter: letter.to_string(),
            numeric,
        }
    }
}

/// Thresholds kept sorted from highest minimum to lowest.
///
/// (De)serialized as a plain list of grades; deserializing goes through
/// [`GradeTable::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Grade>", into = "Vec<Grade>")]
pub struct GradeTable {
    grades: Vec<Grade>,
}

impl TryFrom<Vec<Grade>> for GradeTable {
    type Error = String;

    fn try_from(grades: Vec<Grade>) -> Result<Self, Self::Error> {
        Self::new(grades)
    }
}

impl From<GradeTable> for Vec<Grade> {
    fn from(table: GradeTable) -> Self {
        table.grades
    }
}

impl GradeTable {
    pub fn new(mut grades: Vec<Grade>) -> Result<Self, String> {
        if grades.is_empty() {
            return Err("Grade table must not be empty".to_string());
        }
        grades.sort_by(|a, b| b.min_score.total_cmp(&a.min_score));
        Ok(Self { grades })
    }

    pub fn grades(&self) -> &[Grade] {
        &self.grades
    }

    /// First threshold the score meets or exceeds, scanning from the top.
    /// Scores below every threshold get the lowest grade.
    pub fn grade_for(&self, score: f64) -> &Grade {
        self.grades
            .iter()
            .find(|g| score >= g.min_score)
            .unwrap_or_else(|| &self.grades[self.grades.len() - 1])
    }

    /// Map a stored numeric grade back to its letter.
    pub fn letter_for(&self, numeric: u8) -> Option<&str> {
        self.grades
            .iter()
            .find(|g| g.numeric == numeric)
            .map(|g| g.letter.as_str())
    }
}

impl Default for GradeTable {
    fn default() -> Self {
        Self {
            grades: vec![
                Grade::new(90.0, "A+", 8),
                Grade::new(80.0, "A", 7),
                Grade::new(70.0, "B+", 6),
                Grade::new(60.0, "B", 5),
                Grade::new(50.0, "C+", 4),
                Grade::new(40.0, "C", 3),
                Grade::new(30.0, "D", 2),
                Grade::new(0.0, "F", 1),
            ],
        }
    }
}
