//! Synchronous host loop tying a page, its document and a transport together.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use lutrabox_dom::{Document, DomError};
use tracing::debug;

use crate::builder::{BuildReport, WidgetBuilder};
use crate::event::{Effect, PageEvent};
use crate::page::Page;
use crate::patch::apply_patches;
use crate::timers::CooldownTimers;
use crate::transport::Transport;

/// Owns a built page and carries out the effects of its events.
///
/// Transfers run inline on the transport. Their completion is stamped with
/// the dispatch instant plus the time the transfer took, so the cooldown
/// starts when the result is shown.
pub struct Driver<T: Transport> {
    document: Document,
    page: Page,
    transport: T,
    timers: CooldownTimers,
    queue: VecDeque<(PageEvent, Instant)>,
}

impl<T: Transport> Driver<T> {
    /// Wrap an already built and bound page.
    pub fn new(document: Document, page: Page, transport: T) -> Self {
        Self {
            document,
            page,
            transport,
            timers: CooldownTimers::new(),
            queue: VecDeque::new(),
        }
    }

    /// Parse `html`, build its widgets and bind them.
    ///
    /// # Errors
    ///
    /// Returns [`DomError`] if the page cannot be parsed.
    pub fn load(
        html: &str,
        cooldown: Duration,
        transport: T,
    ) -> Result<(Self, BuildReport), DomError> {
        let mut document = Document::parse(html)?;
        let report = WidgetBuilder::new().build(&mut document);
        let page = Page::bind(&mut document, cooldown);
        Ok((Self::new(document, page, transport), report))
    }

    /// Handle `event` and everything it causes, returning the number of
    /// transfers issued.
    pub fn dispatch(&mut self, event: PageEvent, now: Instant) -> usize {
        self.queue.push_back((event, now));
        let mut transfers = 0;

        while let Some((event, at)) = self.queue.pop_front() {
            for effect in self.page.handle(event, at) {
                match effect {
                    Effect::Patch(patch) => {
                        apply_patches(&mut self.document, [&patch]);
                    }
                    Effect::Transfer { region, payload } => {
                        transfers += 1;
                        let started = Instant::now();
                        let outcome = self.transport.submit(&payload);
                        let completed = at + started.elapsed();
                        debug!(%region, ok = outcome.is_ok(), "Transfer finished");
                        self.queue
                            .push_back((PageEvent::TransferCompleted { region, outcome }, completed));
                    }
                    Effect::ScheduleCooldown { region, deadline } => {
                        self.timers.schedule(region, deadline);
                    }
                }
            }
        }
        transfers
    }

    /// Fire every cooldown due at `now`. Returns how many elapsed.
    pub fn tick(&mut self, now: Instant) -> usize {
        let ready = self.timers.drain_ready(now);
        let count = ready.len();
        for region in ready {
            self.dispatch(PageEvent::CooldownElapsed { region }, now);
        }
        count
    }

    /// Earliest instant at which [`tick`](Self::tick) has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Text currently shown in the output panel of `region`.
    #[must_use]
    pub fn output_text(&self, region: &str) -> Option<String> {
        self.document
            .root()
            .find_by_id(region)
            .map(lutrabox_dom::Element::text_content)
    }

    pub fn into_document(self) -> Document {
        self.document
    }
}
