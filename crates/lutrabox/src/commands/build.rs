//! `lutrabox build` command implementation.

use std::path::PathBuf;

use clap::Args;
use lutrabox_dom::Document;
use lutrabox_widgets::{BuildReport, WidgetBuilder};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// HTML page to transform.
    page: PathBuf,

    /// Write the built page here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be read, parsed or written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let html = std::fs::read_to_string(&self.page)?;
        let (built, report) = build_page(&html)?;

        match &self.output {
            Some(path) => {
                std::fs::write(path, &built)?;
                output.success(&format!(
                    "Built {} region(s) into {}",
                    report.regions.len(),
                    path.display()
                ));
            }
            None => output.result(&built)?,
        }

        if report.skipped > 0 {
            output.warning(&format!(
                "Skipped {} region(s) that were already built",
                report.skipped
            ));
        }
        if report.regions.is_empty() && report.skipped == 0 {
            output.warning(&format!(
                "No div.weblutra regions found in {}",
                self.page.display()
            ));
        }

        Ok(())
    }
}

/// Parse `html`, build its widgets and serialize the result.
pub(crate) fn build_page(html: &str) -> Result<(String, BuildReport), CliError> {
    let mut document = Document::parse(html)?;
    let report = WidgetBuilder::new().build(&mut document);
    Ok((document.to_html(), report))
}
