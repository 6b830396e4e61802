//! `multipart/form-data` encoding of a form payload.

use lutrabox_widgets::FormPayload;
use rand::RngExt;

/// An encoded multipart body and the boundary separating its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartForm {
    /// Encode `payload` with a random boundary.
    #[must_use]
    pub fn encode(payload: &FormPayload) -> Self {
        let boundary = format!(
            "----LutraboxFormBoundary{:016x}",
            rand::rng().random::<u64>()
        );
        Self::encode_with_boundary(payload, boundary)
    }

    /// Encode `payload` with the given boundary.
    #[must_use]
    pub fn encode_with_boundary(payload: &FormPayload, boundary: impl Into<String>) -> Self {
        let boundary = boundary.into();
        let mut body = Vec::new();

        for (name, value) in payload.iter() {
            body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    escape_name(name)
                )
                .as_bytes(),
            );
            body.extend_from_slice(value.as_bytes());
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        Self { boundary, body }
    }

    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the request's `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// Percent-encode the characters that would break a quoted field name.
fn escape_name(name: &str) -> String {
    name.replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
