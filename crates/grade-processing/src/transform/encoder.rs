use super::{FittedTransformer, Transformer};
use crate::error::{PreprocessingError, Result};
use crate::utils::string_values;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// One-hot encoder over a fixed list of nominal columns.
#[derive(Debug, Clone, Default)]
pub struct OneHotEncoder {
    columns: Vec<String>,
}

impl OneHotEncoder {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// Categories observed in one nominal column during fit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEncoding {
    pub column: String,
    /// Distinct values, sorted lexicographically.
    pub categories: Vec<String>,
    /// Set for two-valued columns: the first category gets no indicator.
    pub drop_first: bool,
}

impl CategoryEncoding {
    pub fn from_values<'a>(column: &str, values: impl IntoIterator<Item = &'a str>) -> Self {
        let categories: Vec<String> = values
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();
        let drop_first = categories.len() == 2;

        Self {
            column: column.to_string(),
            categories,
            drop_first,
        }
    }

    /// Categories that own an indicator column.
    pub fn indicator_categories(&self) -> &[String] {
        if self.drop_first {
            &self.categories[1..]
        } else {
            &self.categories
        }
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.indicator_categories()
            .iter()
            .map(|category| format!("{}_{}", self.column, category))
            .collect()
    }

    /// Position of `value` among the fitted categories.
    pub fn position(&self, value: &str) -> Result<usize> {
        self.categories
            .binary_search_by(|c| c.as_str().cmp(value))
            .map_err(|_| PreprocessingError::UnknownCategory {
                column: self.column.clone(),
                value: value.to_string(),
            })
    }

    /// Indicator vector for a single value.
    pub fn encode(&self, value: &str) -> Result<Vec<f64>> {
        let position = self.position(value)?;
        let offset = usize::from(self.drop_first);
        Ok((offset..self.categories.len())
            .map(|k| if k == position { 1.0 } else { 0.0 })
            .collect())
    }
}

/// Fitted categories for every encoded column.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FittedOneHotEncoder {
    encodings: Vec<CategoryEncoding>,
}

impl FittedOneHotEncoder {
    pub fn from_encodings(encodings: Vec<CategoryEncoding>) -> Self {
        Self { encodings }
    }

    pub fn encodings(&self) -> &[CategoryEncoding] {
        &self.encodings
    }

    pub fn encoding(&self, column: &str) -> Option<&CategoryEncoding> {
        self.encodings.iter().find(|e| e.column == column)
    }
}

impl Transformer for OneHotEncoder {
    type Fitted = FittedOneHotEncoder;

    fn fit(&self, frame: &DataFrame) -> Result<FittedOneHotEncoder> {
        let encodings = self
            .columns
            .iter()
            .map(|column| {
                let values = string_values(frame, column)?;
                if values.is_empty() {
                    return Err(PreprocessingError::EmptyDataset(format!(
                        "cannot collect categories of '{}' from zero rows",
                        column
                    )));
                }

                let encoding = CategoryEncoding::from_values(column, values.iter().map(String::as_str));
                debug!("Categories of '{}': {:?}", column, encoding.categories);
                Ok(encoding)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(FittedOneHotEncoder { encodings })
    }
}

impl FittedTransformer for FittedOneHotEncoder {
    fn feature_names(&self) -> Vec<String> {
        self.encodings
            .iter()
            .flat_map(CategoryEncoding::feature_names)
            .collect()
    }

    fn apply(&self, frame: &DataFrame) -> Result<Vec<Column>> {
        let mut columns = Vec::with_capacity(self.n_features_out());

        for encoding in &self.encodings {
            let positions = string_values(frame, &encoding.column)?
                .iter()
                .map(|value| encoding.position(value))
                .collect::<Result<Vec<_>>>()?;

            let offset = usize::from(encoding.drop_first);
            for (k, name) in encoding.feature_names().into_iter().enumerate() {
                let target = k + offset;
                let indicator: Vec<f64> = positions
                    .iter()
                    .map(|&p| if p == target { 1.0 } else { 0.0 })
                    .collect();
                columns.push(Column::new(name.into(), indicator));
            }
        }

        Ok(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fit(frame: &DataFrame, columns: &[&str]) -> FittedOneHotEncoder {
        OneHotEncoder::new(columns.iter().map(|c| c.to_string()).collect())
            .fit(frame)
            .unwrap()
    }

    #[test]
    fn test_categories_are_sorted() {
        let frame = df!["Fjob" => ["teacher", "other", "health", "services", "at_home", "other"]]
            .unwrap();
        let fitted = fit(&frame, &["Fjob"]);

        let encoding = fitted.encoding("Fjob").unwrap();
        assert_eq!(
            encoding.categories,
            vec!["at_home", "health", "other", "services", "teacher"]
        );
        assert!(!encoding.drop_first);
        assert_eq!(encoding.feature_names().len(), 5);
    }

    #[test]
    fn test_binary_column_keeps_single_indicator() {
        let frame = df!["higher" => ["yes", "no", "yes"]].unwrap();
        let fitted = fit(&frame, &["higher"]);

        assert_eq!(fitted.feature_names(), vec!["higher_yes"]);

        let out = fitted.apply(&frame).unwrap();
        assert_eq!(out.len(), 1);
        let values: Vec<f64> = out[0].f64().unwrap().into_no_null_iter().collect();
        assert_eq!(values, vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_exactly_one_indicator_per_multi_valued_column() {
        let frame = df!["guardian" => ["mother", "father", "other", "mother"]].unwrap();
        let fitted = fit(&frame, &["guardian"]);
        let out = fitted.apply(&frame).unwrap();

        assert_eq!(out.len(), 3);
        for row in 0..frame.height() {
            let total: f64 = out
                .iter()
                .map(|c| c.f64().unwrap().get(row).unwrap())
                .sum();
            assert_eq!(total, 1.0);
        }
    }

    #[test]
    fn test_single_valued_column_keeps_its_indicator() {
        let frame = df!["internet" => ["yes", "yes"]].unwrap();
        let fitted = fit(&frame, &["internet"]);
        assert_eq!(fitted.feature_names(), vec!["internet_yes"]);
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let train = df!["Fjob" => ["teacher", "other"]].unwrap();
        let fitted = fit(&train, &["Fjob"]);

        let incoming = df!["Fjob" => ["astronaut"]].unwrap();
        let err = fitted.apply(&incoming).unwrap_err();
        assert!(matches!(
            err,
            PreprocessingError::UnknownCategory { ref column, ref value }
                if column == "Fjob" && value == "astronaut"
        ));
    }

    #[test]
    fn test_encode_single_value() {
        let encoding = CategoryEncoding::from_values("address", ["U", "R", "U"]);
        assert!(encoding.drop_first);
        assert_eq!(encoding.encode("U").unwrap(), vec![1.0]);
        assert_eq!(encoding.encode("R").unwrap(), vec![0.0]);
        assert!(encoding.encode("X").is_err());
    }
}
