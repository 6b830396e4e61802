//! Transport seam between the submission state machine and the network.

use std::cell::RefCell;

use crate::form::FormPayload;

/// Fallback description when a failure carries no message of its own.
const UNKNOWN_FAILURE: &str = "Request failed";

/// A failed transfer: network error or non-success status.
///
/// Network errors that never produced a response use status `0`.
/// The display form is exactly what the output panel shows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Error: {status}\n{message}")]
pub struct TransferError {
    pub status: u16,
    pub message: String,
}

impl TransferError {
    /// Create a transfer error; an empty message is replaced with a generic one.
    #[must_use]
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            UNKNOWN_FAILURE.to_owned()
        } else {
            message
        };
        Self { status, message }
    }
}

/// Result of one transfer: the response body or the failure.
pub type TransferOutcome = Result<String, TransferError>;

/// Sends a payload to the processing endpoint.
pub trait Transport {
    /// Perform one request. Blocking until the response has been read.
    fn submit(&self, payload: &FormPayload) -> TransferOutcome;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn submit(&self, payload: &FormPayload) -> TransferOutcome {
        (**self).submit(payload)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn submit(&self, payload: &FormPayload) -> TransferOutcome {
        (**self).submit(payload)
    }
}

/// Transport returning a fixed outcome and recording every payload.
///
/// Useful for tests and for previewing a page without a processing service.
#[derive(Debug)]
pub struct MockTransport {
    outcome: TransferOutcome,
    calls: RefCell<Vec<FormPayload>>,
}

impl MockTransport {
    /// Always answer with `body`.
    #[must_use]
    pub fn succeeding(body: impl Into<String>) -> Self {
        Self {
            outcome: Ok(body.into()),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Always fail with `status` and `message`.
    #[must_use]
    pub fn failing(status: u16, message: impl Into<String>) -> Self {
        Self {
            outcome: Err(TransferError::new(status, message)),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Payloads received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<FormPayload> {
        self.calls.borrow().clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Transport for MockTransport {
    fn submit(&self, payload: &FormPayload) -> TransferOutcome {
        self.calls.borrow_mut().push(payload.clone());
        self.outcome.clone()
    }
}
