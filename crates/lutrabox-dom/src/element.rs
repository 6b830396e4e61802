//! Element tree node.
//!
//! Text follows the `text`/`tail` layout: `text` is the content before the
//! first child, `tail` is the content after the element's closing tag and
//! before its next sibling.

/// Node in a parsed HTML tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Element tag name, lowercase.
    pub tag: String,
    /// Direct text content.
    pub text: String,
    /// Text after element.
    pub tail: String,
    /// Element attributes in source order.
    pub attrs: Vec<(String, String)>,
    /// Child nodes.
    pub children: Vec<Element>,
}

impl Element {
    /// Create a new element with the given tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Set text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set tail content.
    #[must_use]
    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = tail.into();
        self
    }

    /// Set a single attribute.
    #[must_use]
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Append a child.
    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Set children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Element>) -> Self {
        self.children = children;
        self
    }

    /// Get an attribute value.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Check whether an attribute is present, whatever its value.
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(key, _)| key == name)
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(slot) = self.attrs.iter_mut().find(|(key, _)| key == name) {
            slot.1 = value;
        } else {
            self.attrs.push((name.to_owned(), value));
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attrs.iter().position(|(key, _)| key == name)?;
        Some(self.attrs.remove(pos).1)
    }

    /// Element `id` attribute.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Iterate over the element's class names.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Check tag and class together (`div.menu` style matching).
    #[must_use]
    pub fn is(&self, tag: &str, class: &str) -> bool {
        self.tag == tag && self.has_class(class)
    }

    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let joined = match self.attr("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_owned(),
        };
        self.set_attr("class", joined);
    }

    pub fn remove_class(&mut self, class: &str) {
        if !self.has_class(class) {
            return;
        }
        let remaining: Vec<&str> = self.classes().filter(|c| *c != class).collect();
        let joined = remaining.join(" ");
        if joined.is_empty() {
            self.remove_attr("class");
        } else {
            self.set_attr("class", joined);
        }
    }

    /// Look up a declaration in the inline `style` attribute.
    #[must_use]
    pub fn style_property(&self, name: &str) -> Option<&str> {
        parse_style(self.attr("style").unwrap_or(""))
            .into_iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    /// Set a declaration in the inline `style` attribute.
    pub fn set_style_property(&mut self, name: &str, value: &str) {
        let style = self.attr("style").unwrap_or("").to_owned();
        let mut decls: Vec<(&str, &str)> = parse_style(&style)
            .into_iter()
            .filter(|(key, _)| *key != name)
            .collect();
        decls.push((name, value));
        self.set_attr("style", format_style(&decls));
    }

    /// Remove a declaration from the inline `style` attribute.
    pub fn remove_style_property(&mut self, name: &str) {
        let Some(style) = self.attr("style").map(str::to_owned) else {
            return;
        };
        let decls: Vec<(&str, &str)> = parse_style(&style)
            .into_iter()
            .filter(|(key, _)| *key != name)
            .collect();
        if decls.is_empty() {
            self.remove_attr("style");
        } else {
            self.set_attr("style", format_style(&decls));
        }
    }

    /// Whether the element is hidden with `display:none`.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.style_property("display") == Some("none")
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        if hidden {
            self.set_style_property("display", "none");
        } else {
            self.remove_style_property("display");
        }
    }

    /// Concatenated text of this element and all descendants (tail excluded).
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = self.text.clone();
        for child in &self.children {
            out.push_str(&child.text_content());
            out.push_str(&child.tail);
        }
        out
    }

    /// Replace all content with plain text.
    pub fn set_text_content(&mut self, text: impl Into<String>) {
        self.children.clear();
        self.text = text.into();
    }

    /// Pre-order iterator over this element and all descendants.
    #[must_use]
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// First element in pre-order matching the predicate.
    pub fn find(&self, pred: impl Fn(&Element) -> bool) -> Option<&Element> {
        self.descendants().find(|e| pred(e))
    }

    /// All elements in pre-order matching the predicate.
    pub fn find_all(&self, pred: impl Fn(&Element) -> bool) -> Vec<&Element> {
        self.descendants().filter(|e| pred(e)).collect()
    }

    /// Mutable access to the first element in pre-order matching the predicate.
    pub fn find_mut(&mut self, pred: &impl Fn(&Element) -> bool) -> Option<&mut Element> {
        if pred(self) {
            return Some(self);
        }
        for child in &mut self.children {
            if let Some(found) = child.find_mut(pred) {
                return Some(found);
            }
        }
        None
    }

    /// Call `f` on this element and every descendant, in pre-order.
    pub fn visit_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        f(self);
        for child in &mut self.children {
            child.visit_mut(f);
        }
    }

    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.find(|e| e.id() == Some(id))
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.find_mut(&|e: &Element| e.id() == Some(id))
    }

    /// Whether the element with `id` is hidden by itself or by any ancestor
    /// up to and including `self`. `None` if no such element exists.
    #[must_use]
    pub fn is_hidden_by_id(&self, id: &str) -> Option<bool> {
        let hidden = self.is_hidden();
        if self.id() == Some(id) {
            return Some(hidden);
        }
        self.children
            .iter()
            .find_map(|child| child.is_hidden_by_id(id))
            .map(|found| hidden || found)
    }

    /// Direct children matching `tag.class`.
    pub fn children_matching<'a>(
        &'a self,
        tag: &'a str,
        class: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.is(tag, class))
    }

    /// Insert a node directly before the child at `index`.
    pub fn insert_child(&mut self, index: usize, node: Element) {
        let index = index.min(self.children.len());
        self.children.insert(index, node);
    }

    /// Replace the child at `index` with `wrapper` containing it.
    ///
    /// The child's tail moves to the wrapper so surrounding text keeps its
    /// position. Out-of-range indices are ignored.
    pub fn wrap_child(&mut self, index: usize, mut wrapper: Element) {
        let Some(slot) = self.children.get_mut(index) else {
            return;
        };
        let mut child = std::mem::take(slot);
        wrapper.tail = std::mem::take(&mut child.tail);
        wrapper.children.push(child);
        *slot = wrapper;
    }
}

/// Pre-order element iterator.
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

fn parse_style(style: &str) -> Vec<(&str, &str)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (key, value) = decl.split_once(':')?;
            let key = key.trim();
            (!key.is_empty()).then(|| (key, value.trim()))
        })
        .collect()
}

fn format_style(decls: &[(&str, &str)]) -> String {
    decls
        .iter()
        .map(|(key, value)| format!("{key}:{value};"))
        .collect()
}
