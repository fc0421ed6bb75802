//! The output-parsing contract.
//!
//! The runner hands the final text to an [`OutputParser`]. A parser
//! failure is returned to the caller unchanged as
//! [`RunError::OutputParsing`](crate::RunError::OutputParsing).

/// A parser rejected the model's final text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{parser} failed to parse output for query made by {query_source} with model {model}: {reason}")]
pub struct OutputParseError {
    /// Name of the parser.
    pub parser: String,
    /// Caller-supplied label of the query.
    pub query_source: String,
    /// The model that produced the text.
    pub model: String,
    /// Why the text was rejected.
    pub reason: String,
}

impl OutputParseError {
    /// Creates a parse error.
    pub fn new(
        parser: impl Into<String>,
        query_source: impl Into<String>,
        model: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            parser: parser.into(),
            query_source: query_source.into(),
            model: model.into(),
            reason: reason.into(),
        }
    }
}

/// Turns the model's final text into a `T`.
pub trait OutputParser<T>: Send + Sync {
    /// Parses `raw`. `query_source` and `model` are for error reporting.
    fn parse(&self, raw: &str, query_source: &str, model: &str) -> Result<T, OutputParseError>;
}

impl<T, F> OutputParser<T> for F
where
    F: Fn(&str, &str, &str) -> Result<T, OutputParseError> + Send + Sync,
{
    fn parse(&self, raw: &str, query_source: &str, model: &str) -> Result<T, OutputParseError> {
        self(raw, query_source, model)
    }
}

/// Returns the text as-is.
pub fn parse_text(raw: &str, _query_source: &str, _model: &str) -> Result<String, OutputParseError> {
    Ok(raw.to_owned())
}
