//! CLI error types.

use lutrabox_client::ClientError;
use lutrabox_config::ConfigError;
use lutrabox_dom::DomError;
use lutrabox_widgets::{TransferError, WidgetError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse page: {0}")]
    Dom(#[from] DomError),

    #[error("{0}")]
    Widget(#[from] WidgetError),

    #[error("{0}")]
    Client(#[from] ClientError),

    #[error("submission failed with status {}", .0.status)]
    Transfer(TransferError),

    #[error("{0}")]
    Validation(String),
}
