//! HTML fragment parser built on the quick-xml reader.
//!
//! Documentation pages are mostly well-formed XHTML. The parser smooths
//! over the common HTML-only constructs before handing the text to the XML
//! reader: named entities, void elements without a closing slash, raw text
//! in `<script>`/`<style>` and unescaped `<` inside `<textarea>`.

use std::io::BufRead;
use std::sync::LazyLock;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use regex::Regex;

use crate::element::Element;
use crate::entities::convert_html_entities;
use crate::error::DomError;

/// Elements that never have content or a closing tag.
pub(crate) const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose content is written unescaped.
pub(crate) const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

static DOCTYPE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(<!DOCTYPE[^>]*>)").expect("invalid doctype regex"));

static SCRIPT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(<script\b[^>]*>)(.*?)(</script\s*>)").expect("invalid script regex")
});

static STYLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(<style\b[^>]*>)(.*?)(</style\s*>)").expect("invalid style regex")
});

static TEXTAREA_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(<textarea\b[^>]*>)(.*?)(</textarea\s*>)").expect("invalid textarea regex")
});

/// Name of the synthetic wrapper element holding the fragment.
pub(crate) const ROOT_TAG: &str = "root";

/// Result of parsing: the optional doctype line and the wrapped tree.
pub(crate) struct Parsed {
    pub doctype: Option<String>,
    pub root: Element,
}

/// Parse an HTML document or fragment into an element tree rooted at a
/// synthetic `root` element.
pub(crate) fn parse_html(html: &str) -> Result<Parsed, DomError> {
    let (doctype, body) = match DOCTYPE_PATTERN.captures(html) {
        Some(caps) => {
            let whole = caps.get(0).map_or(0, |m| m.end());
            (Some(caps[1].to_owned()), &html[whole..])
        }
        None => (None, html),
    };

    let body = convert_html_entities(body);
    let body = protect_raw_text(&body);
    let wrapped = format!("<{ROOT_TAG}>{body}</{ROOT_TAG}>");

    let mut reader = Reader::from_str(&wrapped);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    config.allow_dangling_amp = true;

    let mut root = Element::new(ROOT_TAG);
    let mut buf = Vec::new();
    // Skip to the opening wrapper tag.
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(_) => break,
            Event::Eof => return Ok(Parsed { doctype, root }),
            _ => {}
        }
        buf.clear();
    }
    parse_children(&mut reader, &mut root)?;

    Ok(Parsed { doctype, root })
}

/// Wrap script/style bodies in CDATA and escape `<` inside text areas.
fn protect_raw_text(html: &str) -> String {
    let wrap_cdata = |caps: &regex::Captures| {
        let content = &caps[2];
        if content.is_empty() || content.contains("]]>") {
            caps[0].to_owned()
        } else {
            format!("{}<![CDATA[{content}]]>{}", &caps[1], &caps[3])
        }
    };
    let html = SCRIPT_PATTERN.replace_all(html, wrap_cdata);
    let html = STYLE_PATTERN.replace_all(&html, wrap_cdata);
    TEXTAREA_PATTERN
        .replace_all(&html, |caps: &regex::Captures| {
            format!("{}{}{}", &caps[1], caps[2].replace('<', "&lt;"), &caps[3])
        })
        .into_owned()
}

fn parse_children<R: BufRead>(reader: &mut Reader<R>, node: &mut Element) -> Result<(), DomError> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let mut child = start_element(reader, &e)?;
                if !VOID_ELEMENTS.contains(&child.tag.as_str()) {
                    parse_children(reader, &mut child)?;
                }
                node.children.push(child);
            }
            Event::Empty(e) => {
                let child = start_element(reader, &e)?;
                node.children.push(child);
            }
            Event::Text(e) => {
                let text = reader.decoder().decode(&e)?.into_owned();
                append_text(node, &text);
            }
            Event::GeneralRef(e) => {
                let entity = reader.decoder().decode(&e)?.into_owned();
                append_text(node, &decode_entity(&entity));
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                append_text(node, &text);
            }
            Event::End(e) => {
                let end_tag = decode_name(reader, e.name().as_ref());
                if end_tag == node.tag {
                    return Ok(());
                }
                tracing::debug!(
                    expected = %node.tag,
                    found = %end_tag,
                    "Ignoring mismatched end tag"
                );
            }
            Event::Eof => return Ok(()),
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
        buf.clear();
    }
}

fn start_element<R: BufRead>(reader: &Reader<R>, e: &BytesStart) -> Result<Element, DomError> {
    let mut element = Element::new(decode_name(reader, e.name().as_ref()));
    for attr in e.html_attributes().flatten() {
        let key = decode_name(reader, attr.key.as_ref());
        let value = attr.unescape_value().map_or_else(
            |_| String::from_utf8_lossy(&attr.value).into_owned(),
            std::borrow::Cow::into_owned,
        );
        element.set_attr(&key, value);
    }
    Ok(element)
}

fn decode_name<R: BufRead>(reader: &Reader<R>, name: &[u8]) -> String {
    reader
        .decoder()
        .decode(name)
        .map_or_else(
            |_| String::from_utf8_lossy(name).into_owned(),
            std::borrow::Cow::into_owned,
        )
        .to_ascii_lowercase()
}

/// Append text to node's text or last child's tail.
fn append_text(node: &mut Element, text: &str) {
    if let Some(last_child) = node.children.last_mut() {
        last_child.tail.push_str(text);
    } else {
        node.text.push_str(text);
    }
}

/// Decode an XML entity reference to its character value.
fn decode_entity(entity: &str) -> String {
    match entity {
        "lt" => "<".to_owned(),
        "gt" => ">".to_owned(),
        "amp" => "&".to_owned(),
        "apos" => "'".to_owned(),
        "quot" => "\"".to_owned(),
        s if s.starts_with('#') => {
            let code = if s.starts_with("#x") || s.starts_with("#X") {
                u32::from_str_radix(&s[2..], 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{entity};"), |c| c.to_string())
        }
        _ => format!("&{entity};"),
    }
}
