use crate::error::{PreprocessingError, Result};

pub const CSV_CONTENT_TYPE: &str = "text/csv";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Body encodings understood by the served adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Csv,
    Json,
}

impl Encoding {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Csv => CSV_CONTENT_TYPE,
            Self::Json => JSON_CONTENT_TYPE,
        }
    }

    /// Encoding of a request body. Only CSV is accepted.
    pub fn from_content_type(content_type: &str) -> Result<Self> {
        match essence(content_type).as_str() {
            CSV_CONTENT_TYPE => Ok(Self::Csv),
            _ => Err(PreprocessingError::UnsupportedContentType(
                content_type.to_string(),
            )),
        }
    }

    /// Encoding requested for the response body.
    pub fn from_accept(accept: &str) -> Result<Self> {
        match essence(accept).as_str() {
            JSON_CONTENT_TYPE => Ok(Self::Json),
            CSV_CONTENT_TYPE => Ok(Self::Csv),
            _ => Err(PreprocessingError::UnsupportedAccept(accept.to_string())),
        }
    }
}

/// Media type without parameters, e.g. `text/csv; charset=utf-8` -> `text/csv`.
fn essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type() {
        assert_eq!(Encoding::from_content_type("text/csv").unwrap(), Encoding::Csv);
        assert_eq!(
            Encoding::from_content_type("text/csv; charset=utf-8").unwrap(),
            Encoding::Csv
        );

        let err = Encoding::from_content_type("application/json").unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_CONTENT_TYPE");
        assert!(err.to_string().contains("application/json"));
    }

    #[test]
    fn test_accept() {
        assert_eq!(Encoding::from_accept("application/json").unwrap(), Encoding::Json);
        assert_eq!(Encoding::from_accept("TEXT/CSV").unwrap(), Encoding::Csv);

        for unsupported in ["text/html", "*/*", ""] {
            let err = Encoding::from_accept(unsupported).unwrap_err();
            assert_eq!(err.error_code(), "UNSUPPORTED_ACCEPT");
        }
    }
}
