use crate::error::{PreprocessingError, Result};
use crate::ingest::separate_target;
use crate::schema::RawSchema;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::io::Cursor;

/// A parsed inference request.
///
/// Whether the rows carry a label is decided once, from the record width,
/// when the body is parsed.
#[derive(Debug, Clone)]
pub enum InferenceRequest {
    /// Rows with the label as their last field. The label is held apart
    /// from the descriptive columns.
    Labelled { features: DataFrame, labels: Column },
    /// Rows with only the descriptive columns.
    Unlabelled { features: DataFrame },
}

impl InferenceRequest {
    /// Parse a header-less CSV body against `schema`.
    ///
    /// A record of `schema.width()` fields is unlabelled, one of
    /// `schema.width() + 1` fields is labelled; any other width fails with
    /// [`PreprocessingError::InvalidRowWidth`]. Every record must have the
    /// width of the first one, otherwise the request fails with
    /// [`PreprocessingError::RaggedRows`].
    pub fn from_csv(body: &str, schema: &RawSchema) -> Result<Self> {
        if body.trim().is_empty() {
            return Err(PreprocessingError::MalformedRequest(
                "request body is empty".to_string(),
            ));
        }

        let width = record_width(body)?;
        if width != schema.width() && width != schema.width() + 1 {
            return Err(PreprocessingError::InvalidRowWidth {
                expected: schema.width(),
                found: width,
            });
        }

        let mut frame = CsvReadOptions::default()
            .with_has_header(false)
            .with_infer_schema_length(None)
            .with_parse_options(CsvParseOptions::default().with_separator(b','))
            .into_reader_with_file_handle(Cursor::new(body.as_bytes().to_vec()))
            .finish()
            .map_err(|e| PreprocessingError::MalformedRequest(e.to_string()))?;

        if width == schema.width() {
            rename_columns(&mut frame, &schema.feature_columns)?;
            Ok(Self::Unlabelled { features: frame })
        } else {
            rename_columns(&mut frame, &schema.labelled_columns())?;
            let (features, labels) = separate_target(&frame, &schema.label_column)?;
            let labels = labels.column(&schema.label_column)?.clone();
            Ok(Self::Labelled { features, labels })
        }
    }

    pub fn features(&self) -> &DataFrame {
        match self {
            Self::Labelled { features, .. } | Self::Unlabelled { features } => features,
        }
    }

    pub fn labels(&self) -> Option<&Column> {
        match self {
            Self::Labelled { labels, .. } => Some(labels),
            Self::Unlabelled { .. } => None,
        }
    }

    pub fn is_labelled(&self) -> bool {
        matches!(self, Self::Labelled { .. })
    }

    pub fn n_rows(&self) -> usize {
        self.features().height()
    }
}

/// Field count shared by every record of `body`.
///
/// The frame reader pads short records with nulls, so widths are checked
/// record by record before the body reaches it.
fn record_width(body: &str) -> Result<usize> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut record = csv::ByteRecord::new();
    let mut width = None;
    let mut n_records = 0;
    while reader
        .read_byte_record(&mut record)
        .map_err(|e| PreprocessingError::MalformedRequest(e.to_string()))?
    {
        n_records += 1;
        match width {
            None => width = Some(record.len()),
            Some(expected) if record.len() != expected => {
                return Err(PreprocessingError::RaggedRows {
                    record: n_records,
                    expected,
                    found: record.len(),
                });
            }
            Some(_) => {}
        }
    }

    width.ok_or_else(|| PreprocessingError::MalformedRequest("request has no records".to_string()))
}

/// Give the positional columns of a header-less body their schema names.
fn rename_columns(frame: &mut DataFrame, names: &[String]) -> Result<()> {
    let positional: Vec<String> = frame
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    for (old, new) in positional.iter().zip(names) {
        frame.rename(old, new.as_str().into())?;
    }
    Ok(())
}
