//! Identifier generation for synthesized elements.

/// Prefix keeping generated ids apart from author-supplied ones.
pub const ID_PREFIX: &str = "lutra-";

/// Issues `lutra-0`, `lutra-1`, ... for one page build.
///
/// Owned by the builder; a fresh generator starts at zero, so ids are only
/// unique within the page they were generated for.
#[derive(Debug, Default)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a fresh identifier.
    pub fn next_id(&mut self) -> String {
        let id = format!("{ID_PREFIX}{}", self.next);
        self.next += 1;
        id
    }

    /// Number of identifiers issued so far.
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.next
    }

    /// Make sure the next id is past any `lutra-N` already present in `ids`.
    ///
    /// Derived ids such as `lutra-3-toggle` count as `lutra-3`.
    pub fn skip_existing<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        let highest = ids.into_iter().filter_map(sequence_number).max();
        if let Some(highest) = highest {
            self.next = self.next.max(highest + 1);
        }
    }
}

fn sequence_number(id: &str) -> Option<u64> {
    let rest = id.strip_prefix(ID_PREFIX)?;
    let digits = rest.split('-').next()?;
    digits.parse().ok()
}
