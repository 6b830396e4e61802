//! Error types for HTML parsing.

/// Error while parsing an HTML document.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DomError {
    /// XML parsing error.
    #[error("HTML parse error: {0}")]
    Parse(#[from] quick_xml::Error),

    /// Encoding error while decoding tag names or text.
    #[error("encoding error: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),
}
