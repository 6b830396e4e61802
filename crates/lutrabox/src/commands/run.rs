//! `lutrabox run` command implementation.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use lutrabox_client::HttpTransport;
use lutrabox_config::{CliSettings, Config};
use lutrabox_widgets::{Driver, FieldName, PageEvent, SubmissionResult, Transport};
use tracing::info;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the run command.
#[derive(Args)]
pub(crate) struct RunArgs {
    /// HTML page holding the region.
    page: PathBuf,

    /// Index of the region to submit, in document order.
    #[arg(short, long, default_value_t = 0)]
    region: usize,

    /// Choose a selector value before submitting (repeatable).
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    selections: Vec<String>,

    /// Replace the input text with the contents of FILE.
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Replace the library text with the contents of FILE.
    #[arg(long, value_name = "FILE")]
    library: Option<PathBuf>,

    /// Processing endpoint URL (overrides config).
    #[arg(long, env = "LUTRABOX_ENDPOINT")]
    endpoint: Option<String>,

    /// Request timeout in seconds (overrides config).
    #[arg(long)]
    timeout: Option<u64>,

    /// Path to configuration file (default: auto-discover lutrabox.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Changes applied to a region before it is submitted.
#[derive(Debug, Default)]
struct RegionChanges {
    selections: Vec<(FieldName, String)>,
    edits: Vec<(FieldName, String)>,
}

impl RunArgs {
    /// Execute the run command.
    ///
    /// # Errors
    ///
    /// Returns an error if the page or config cannot be loaded, the region or
    /// a selection is invalid, or the submission fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            endpoint_url: self.endpoint.clone(),
            timeout_secs: self.timeout,
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let changes = self.changes()?;

        let html = std::fs::read_to_string(&self.page)?;
        let transport = HttpTransport::new(&config.endpoint.url, config.timeout())?;
        let (mut driver, _) = Driver::load(&html, config.cooldown(), transport)?;

        output.info(&format!("Submitting to {}...", config.endpoint.url));
        match submit(&mut driver, self.region, &changes)? {
            SubmissionResult::Succeeded(body) => {
                output.result(&body)?;
                Ok(())
            }
            SubmissionResult::Failed(err) => {
                output.result(&err.to_string())?;
                Err(CliError::Transfer(err))
            }
            SubmissionResult::Pending => Err(CliError::Validation(
                "submission did not complete".to_owned(),
            )),
        }
    }

    fn changes(&self) -> Result<RegionChanges, CliError> {
        let selections = self
            .selections
            .iter()
            .map(|s| parse_selection(s))
            .collect::<Result<_, _>>()?;

        let mut edits = Vec::new();
        if let Some(path) = &self.input {
            edits.push((FieldName::Input, std::fs::read_to_string(path)?));
        }
        if let Some(path) = &self.library {
            edits.push((FieldName::Library, std::fs::read_to_string(path)?));
        }

        Ok(RegionChanges { selections, edits })
    }
}

/// Parse a `FIELD=VALUE` selection.
fn parse_selection(arg: &str) -> Result<(FieldName, String), CliError> {
    let (field, value) = arg
        .split_once('=')
        .ok_or_else(|| CliError::Validation(format!("expected FIELD=VALUE, got '{arg}'")))?;
    Ok((field.trim().parse()?, value.trim().to_owned()))
}

/// Apply `changes` to the region at `index`, press its run control and
/// return the result shown in its output panel.
fn submit<T: Transport>(
    driver: &mut Driver<T>,
    index: usize,
    changes: &RegionChanges,
) -> Result<SubmissionResult, CliError> {
    let (region_id, events) = {
        let regions = driver.page().regions();
        let region = regions.get(index).ok_or_else(|| {
            CliError::Validation(format!(
                "no region {index}: page has {} region(s)",
                regions.len()
            ))
        })?;

        let mut events = Vec::new();
        for (field, value) in &changes.selections {
            let popup = region.popup(*field).ok_or_else(|| {
                CliError::Validation(format!("region {} has no {field} selector", region.id()))
            })?;
            if !popup.candidates().contains(value) {
                return Err(CliError::Validation(format!(
                    "'{value}' is not a valid {field}; expected one of: {}",
                    popup.candidates().join(", ")
                )));
            }
            events.push(PageEvent::PopupOpened {
                id: popup.id().to_owned(),
            });
            events.push(PageEvent::CandidateClicked {
                id: popup.id().to_owned(),
                candidate: value.clone(),
            });
        }
        for (field, text) in &changes.edits {
            let field_text = region.text(*field).ok_or_else(|| {
                CliError::Validation(format!("region {} has no {field} text", region.id()))
            })?;
            events.push(PageEvent::TextEdited {
                id: field_text.id.clone(),
                value: text.clone(),
            });
        }
        events.push(PageEvent::RunClicked {
            id: region.submission().run_id().to_owned(),
        });
        (region.id().to_owned(), events)
    };

    let now = Instant::now();
    for event in events {
        driver.dispatch(event, now);
    }
    info!(region = %region_id, "Submission finished");

    driver
        .page()
        .region(&region_id)
        .and_then(|region| region.submission().current())
        .map(|submission| submission.result.clone())
        .ok_or_else(|| CliError::Validation(format!("region {region_id} did not submit")))
}
