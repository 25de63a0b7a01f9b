//! Lightweight HTML queries for past-paper pages.
//!
//! Past-paper sites are semi-structured at best, so this module does not
//! build a DOM. It pulls out anchors, the page title, and text blocks that
//! look like questions with a handful of tolerant patterns.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static ANCHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))[^>]*>(.*?)</a\s*>"#)
        .expect("anchor pattern")
});
static TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title\s*>").expect("title pattern"));
static OL_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<(/?)ol\b[^>]*>").expect("ol tag pattern"));
static LIST_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<li\b[^>]*>(.*?)</li\s*>").expect("li pattern"));
static QUESTION_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)<(?:div|li|p|span|section|article)\b[^>]*\bclass\s*=\s*["'](?:[^"']*\s)?(?:question|q)(?:\s[^"']*)?["'][^>]*>(.*?)</(?:div|li|p|span|section|article)\s*>"#,
    )
    .expect("question class pattern")
});
static PARAGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<p\b[^>]*>(.*?)</p\s*>").expect("p pattern"));
static SCRIPT_OR_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(?:script|style|noscript)\b[^>]*>.*?</(?:script|style|noscript)\s*>")
        .expect("script pattern")
});
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern"));
static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("entity pattern"));

/// An anchor element: its raw `href` and visible text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub text: String,
}

/// Every `<a href>` in document order.
pub fn extract_links(html: &str) -> Vec<Link> {
    ANCHOR
        .captures_iter(html)
        .filter_map(|caps| {
            let href = caps
                .get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))?
                .as_str()
                .trim();
            if href.is_empty() {
                return None;
            }
            Some(Link {
                href: decode_entities(href),
                text: text_content(caps.get(4).map_or("", |m| m.as_str())),
            })
        })
        .collect()
}

/// Text of the `<title>` element, if any.
pub fn extract_title(html: &str) -> Option<String> {
    TITLE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| text_content(m.as_str()))
        .filter(|t| !t.is_empty())
}

/// Text blocks that look like questions.
///
/// Tries, in order, ordered-list items, elements classed `question`/`q`, and
/// paragraphs; the first group that yields anything wins. A block qualifies
/// if it is at least `min_len` characters long and contains a letter.
pub fn question_blocks(html: &str, min_len: usize) -> Vec<String> {
    let html = SCRIPT_OR_STYLE.replace_all(html, " ");

    let list_items: Vec<String> = outer_ordered_lists(&html)
        .into_iter()
        .flat_map(|ol| {
            LIST_ITEM
                .captures_iter(ol)
                .filter_map(|c| c.get(1).map(|m| text_content(m.as_str())))
                .collect::<Vec<_>>()
        })
        .collect();

    let strategies: [Box<dyn Fn() -> Vec<String>>; 3] = [
        Box::new(|| list_items.clone()),
        Box::new(|| capture_texts(&QUESTION_CLASS, &html)),
        Box::new(|| capture_texts(&PARAGRAPH, &html)),
    ];

    for strategy in strategies {
        let blocks: Vec<String> = strategy()
            .into_iter()
            .filter(|b| looks_like_question(b, min_len))
            .collect();
        if !blocks.is_empty() {
            return dedupe(blocks);
        }
    }
    Vec::new()
}

fn capture_texts(re: &Regex, html: &str) -> Vec<String> {
    re.captures_iter(html)
        .filter_map(|c| c.get(1).map(|m| text_content(m.as_str())))
        .collect()
}

fn looks_like_question(text: &str, min_len: usize) -> bool {
    text.chars().count() >= min_len && text.chars().any(char::is_alphabetic)
}

/// Drop duplicates while keeping first occurrences in order.
pub fn dedupe(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Visible text of an HTML fragment: tags removed, entities decoded,
/// whitespace collapsed.
pub fn text_content(fragment: &str) -> String {
    let without_tags = TAG.replace_all(fragment, " ");
    let decoded = decode_entities(&without_tags);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode the common named entities and numeric character references.
pub fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            let decoded = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match name {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some(' '),
                    "ndash" => Some('–'),
                    "mdash" => Some('—'),
                    "times" => Some('×'),
                    "divide" => Some('÷'),
                    _ => None,
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

/// Bodies of the outermost `<ol>` elements. A nested list stays inside its
/// parent's body; an unclosed list is dropped.
fn outer_ordered_lists(html: &str) -> Vec<&str> {
    let mut bodies = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for caps in OL_TAG.captures_iter(html) {
        let Some(tag) = caps.get(0) else { continue };
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        if !closing {
            if depth == 0 {
                start = tag.end();
            }
            depth += 1;
        } else if depth > 0 {
            depth -= 1;
            if depth == 0 {
                bodies.push(&html[start..tag.start()]);
            }
        }
    }
    bodies
}
