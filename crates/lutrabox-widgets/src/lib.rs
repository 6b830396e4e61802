//! Interactive "try it" widgets for static documentation pages.
//!
//! A page is processed in two phases:
//!
//! 1. [`WidgetBuilder::build`] turns every `div.weblutra` region into a
//!    multipart form with toggles, format selectors and a run control.
//! 2. [`Page::bind`] recovers the widget state from that markup. Events
//!    passed to [`Page::handle`] then yield [`Effect`]s: markup patches,
//!    transfers to the processing endpoint and cooldown timers.
//!
//! [`Driver`] runs both phases and carries out the effects against a
//! [`Transport`].
//!
//! # Example
//!
//! ```
//! use std::time::{Duration, Instant};
//! use lutrabox_widgets::{Driver, MockTransport, PageEvent};
//!
//! let html = r#"<div class="weblutra"><div class="input"><textarea>ex:T(ex:a) .</textarea></div></div>"#;
//! let transport = MockTransport::succeeding("ex:a a ex:T .");
//! let (mut driver, _) = Driver::load(html, Duration::from_millis(3000), transport).unwrap();
//!
//! driver.dispatch(PageEvent::RunClicked { id: "lutra-1-run".to_owned() }, Instant::now());
//! assert_eq!(driver.output_text("lutra-1").as_deref(), Some("ex:a a ex:T ."));
//! ```

mod builder;
mod driver;
mod error;
mod event;
mod form;
mod ids;
pub mod markup;
mod page;
mod patch;
mod popup;
mod prefixes;
mod submission;
mod timers;
mod toggle;
mod transport;

pub use builder::{BuildReport, BuiltRegion, FORM_ENCTYPE, RegionLayout, WidgetBuilder};
pub use driver::Driver;
pub use error::WidgetError;
pub use event::{Effect, PageEvent};
pub use form::{FieldName, FormPayload, PREFIXES_KEY};
pub use ids::{ID_PREFIX, IdGenerator};
pub use page::{Page, Region, TextField};
pub use patch::{Patch, apply_patches};
pub use popup::Popup;
pub use prefixes::{PREFIXES_CONTAINER_ID, harvest_prefixes};
pub use submission::{
    DEFAULT_COOLDOWN, Submission, SubmissionController, SubmissionResult, SubmissionState,
};
pub use timers::CooldownTimers;
pub use toggle::Toggle;
pub use transport::{MockTransport, TransferError, TransferOutcome, Transport};
