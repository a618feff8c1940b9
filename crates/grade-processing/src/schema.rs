//! Column layout of the student performance survey tables.
//!
//! The raw files carry 32 descriptive attributes followed by the final grade.
//! Only a hand-picked subset survives into the model; see
//! [`DEFAULT_NUMERIC_COLUMNS`] and [`DEFAULT_NOMINAL_COLUMNS`].

use serde::{Deserialize, Serialize};

/// Name of the final-grade column.
pub const LABEL_COLUMN: &str = "G3";

/// Name of the positional index column written in front of the output tables.
pub const INDEX_COLUMN: &str = "row_index";

/// Descriptive columns of a raw record, in file order.
pub const FEATURE_COLUMNS: [&str; 32] = [
    "school",
    "sex",
    "age",
    "address",
    "famsize",
    "Pstatus",
    "Medu",
    "Fedu",
    "Mjob",
    "Fjob",
    "reason",
    "guardian",
    "traveltime",
    "studytime",
    "failures",
    "schoolsup",
    "famsup",
    "paid",
    "activities",
    "nursery",
    "higher",
    "internet",
    "romantic",
    "famrel",
    "freetime",
    "goout",
    "Dalc",
    "Walc",
    "health",
    "absences",
    "G1",
    "G2",
];

/// Integer-coded ordinal or count columns that are min-max scaled.
pub const DEFAULT_NUMERIC_COLUMNS: [&str; 8] = [
    "age",
    "Medu",
    "traveltime",
    "studytime",
    "failures",
    "goout",
    "Dalc",
    "absences",
];

/// Unordered categorical columns that are one-hot expanded.
pub const DEFAULT_NOMINAL_COLUMNS: [&str; 6] = [
    "address", "Fjob", "guardian", "higher", "internet", "romantic",
];

/// Names of the raw descriptive columns plus the label column.
///
/// Served requests carry no header, so the handler uses this to name the
/// fields of each incoming row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSchema {
    /// Descriptive columns in raw file order (label excluded).
    pub feature_columns: Vec<String>,
    /// The label column, expected after the descriptive columns when present.
    pub label_column: String,
}

impl RawSchema {
    pub fn new(feature_columns: Vec<String>, label_column: impl Into<String>) -> Self {
        Self {
            feature_columns,
            label_column: label_column.into(),
        }
    }

    /// The 33-column layout of the math and Portuguese course files.
    pub fn student_performance() -> Self {
        Self::new(
            FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            LABEL_COLUMN,
        )
    }

    /// Number of descriptive columns in an unlabelled row.
    pub fn width(&self) -> usize {
        self.feature_columns.len()
    }

    /// Column names of a labelled row: descriptive columns, then the label.
    pub fn labelled_columns(&self) -> Vec<String> {
        let mut columns = self.feature_columns.clone();
        columns.push(self.label_column.clone());
        columns
    }
}

impl Default for RawSchema {
    fn default() -> Self {
        Self::student_performance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_performance_schema() {
        let schema = RawSchema::student_performance();
        assert_eq!(schema.width(), 32);
        assert_eq!(schema.labelled_columns().len(), 33);
        assert_eq!(schema.labelled_columns().last().unwrap(), "G3");
    }

    #[test]
    fn test_default_selection_is_part_of_schema() {
        for column in DEFAULT_NUMERIC_COLUMNS
            .iter()
            .chain(DEFAULT_NOMINAL_COLUMNS.iter())
        {
            assert!(FEATURE_COLUMNS.contains(column), "{column} missing");
        }
        assert!(!FEATURE_COLUMNS.contains(&LABEL_COLUMN));
    }
}
