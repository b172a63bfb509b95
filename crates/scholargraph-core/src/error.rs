//! Common error type for table loading and graph derivation

use std::path::{Path, PathBuf};

/// Error from loading a source table or deriving a node/edge set from it.
///
/// Every variant aborts the run: the pipeline is a batch job that is rerun
/// from scratch, so nothing here is retried.
#[derive(Debug)]
pub enum Error {
    /// A source row does not fit the file's header, or a line is not valid
    /// JSON / CSV.
    MalformedRecord {
        path: PathBuf,
        line: u64,
        message: String,
    },
    /// A declared column is missing from a table's header.
    MissingColumn { table: String, column: String },
    /// A value could not be cast to the declared type and the column has
    /// no sentinel.
    Coercion {
        column: String,
        value: Option<String>,
        target: &'static str,
    },
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedRecord {
                path,
                line,
                message,
            } => write!(f, "malformed record at {}:{line}: {message}", path.display()),
            Self::MissingColumn { table, column } => {
                write!(f, "table '{table}' has no column '{column}'")
            }
            Self::Coercion {
                column,
                value: Some(value),
                target,
            } => write!(f, "cannot coerce '{value}' in column '{column}' to {target}"),
            Self::Coercion {
                column,
                value: None,
                target,
            } => write!(f, "missing value in column '{column}' (expected {target})"),
            Self::Io(e) => write!(f, "IO: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl Error {
    pub fn malformed(path: &Path, line: u64, message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            path: path.to_path_buf(),
            line,
            message: message.into(),
        }
    }

    /// Map a `csv` reader error onto the record taxonomy.
    ///
    /// I/O failures stay I/O; everything else (unequal lengths, bad UTF-8)
    /// is a malformed record at the reported line.
    pub fn from_csv(path: &Path, e: csv::Error) -> Self {
        let line = e.position().map(|p| p.line()).unwrap_or(0);
        match e.into_kind() {
            csv::ErrorKind::Io(io) => Self::Io(io),
            csv::ErrorKind::UnequalLengths {
                expected_len, len, ..
            } => Self::malformed(
                path,
                line,
                format!("expected {expected_len} fields, found {len}"),
            ),
            other => Self::malformed(path, line, format!("{other:?}")),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    #[test]
    fn display_malformed_includes_location() {
        let err = Error::malformed(Path::new("authors.csv"), 7, "expected 4 fields, found 3");
        let msg = err.to_string();
        assert!(msg.contains("authors.csv:7"));
        assert!(msg.contains("expected 4 fields"));
    }

    #[test]
    fn display_coercion_missing_value() {
        let err = Error::Coercion {
            column: "year".into(),
            value: None,
            target: "date (YYYY-MM-DD)",
        };
        assert_eq!(
            err.to_string(),
            "missing value in column 'year' (expected date (YYYY-MM-DD))"
        );
    }

    #[test]
    fn display_coercion_with_value() {
        let err = Error::Coercion {
            column: "h_index".into(),
            value: Some("abc".into()),
            target: "int",
        };
        assert!(err.to_string().contains("'abc'"));
    }

    #[test]
    fn io_error_has_source() {
        let err = Error::from(std::io::Error::new(ErrorKind::NotFound, "gone"));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("IO:"));
    }
}
