//! Page-wide prefix declarations sent with every submission.

use lutrabox_dom::Element;
use tracing::debug;

/// Id of the container holding the prefix declarations.
pub const PREFIXES_CONTAINER_ID: &str = "text-prefixes";

/// Read the prefixes text from `div#text-prefixes`.
///
/// Takes the child `pre.example`, or failing that the `pre.src` inside a
/// child `div.org-src-container`. Returns an empty string when the page
/// declares no prefixes.
#[must_use]
pub fn harvest_prefixes(root: &Element) -> String {
    let Some(container) =
        root.find(|e| e.tag == "div" && e.id() == Some(PREFIXES_CONTAINER_ID))
    else {
        debug!("No prefix declarations on page");
        return String::new();
    };

    let direct = container.children_matching("pre", "example").next();
    let listing = || {
        container
            .children_matching("div", "org-src-container")
            .flat_map(|wrapper| wrapper.children_matching("pre", "src"))
            .next()
    };

    direct
        .or_else(listing)
        .map(Element::text_content)
        .unwrap_or_default()
}
