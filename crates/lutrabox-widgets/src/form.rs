//! Form field vocabulary and the serialized transfer payload.

use std::fmt;
use std::str::FromStr;

use crate::error::WidgetError;

/// Extra key injected into every payload with the page-wide prefixes.
pub const PREFIXES_KEY: &str = "prefixes";

/// Names a region's fields may carry; the name is the payload key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldName {
    Input,
    Library,
    InputFormat,
    LibraryFormat,
    OutputFormat,
    Mode,
}

impl FieldName {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Library => "library",
            Self::InputFormat => "inputFormat",
            Self::LibraryFormat => "libraryFormat",
            Self::OutputFormat => "outputFormat",
            Self::Mode => "mode",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "input" => Ok(Self::Input),
            "library" => Ok(Self::Library),
            "inputFormat" => Ok(Self::InputFormat),
            "libraryFormat" => Ok(Self::LibraryFormat),
            "outputFormat" => Ok(Self::OutputFormat),
            "mode" => Ok(Self::Mode),
            other => Err(WidgetError::UnknownField(other.to_owned())),
        }
    }
}

/// Ordered name/value pairs sent as one multipart request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPayload {
    fields: Vec<(String, String)>,
}

impl FormPayload {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. Repeated names are kept, as a browser form would.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// First value sent under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
