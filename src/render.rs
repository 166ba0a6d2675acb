//! HTML rendering for schema documentation.
//!
//! Markdown goes through `pulldown-cmark` with fenced code blocks handed to
//! a [`Highlighter`]. Schemas are printed as highlighted JSON whose
//! `#/definitions/<name>` strings link to the matching `#definition-<name>`
//! anchor on the page.

use std::sync::OnceLock;

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use regex::{Captures, Regex};
use serde_json::{Map, Value};

/// Turns source code into highlighted HTML.
///
/// The output must be safe to embed in `<code>`, i.e. already escaped.
pub trait Highlighter {
    fn highlight(&self, code: &str, lang: Option<&str>) -> String;
}

/// Highlights JSON with `hljs-*` classes; other languages are only escaped.
///
/// A fence without a language is escaped as well. The language is never
/// guessed from the code.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonHighlighter;

impl Highlighter for JsonHighlighter {
    fn highlight(&self, code: &str, lang: Option<&str>) -> String {
        match lang {
            Some(lang) if lang.eq_ignore_ascii_case("json") => highlight_json(code),
            _ => escape_html(code),
        }
    }
}

/// Escape text for use in HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Render Markdown as HTML using [`JsonHighlighter`] for code blocks.
///
/// With `strip_paragraph`, output consisting of a single paragraph loses
/// its surrounding `<p>` tag. Empty input renders as an empty string.
pub fn markdown(text: &str, strip_paragraph: bool) -> String {
    markdown_with(text, strip_paragraph, &JsonHighlighter)
}

/// Render Markdown as HTML with a custom highlighter.
pub fn markdown_with(text: &str, strip_paragraph: bool, highlighter: &dyn Highlighter) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut events: Vec<Event<'_>> = Vec::new();
    let mut code: Option<(Option<String>, String)> = None;

    for event in Parser::new_ext(text, Options::ENABLE_TABLES) {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().map(String::from)
                    }
                    CodeBlockKind::Indented => None,
                };
                code = Some((lang, String::new()));
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((lang, source)) = code.take() {
                    let block = code_block(&source, lang.as_deref(), highlighter);
                    events.push(Event::Html(CowStr::from(block)));
                }
            }
            Event::Text(text) => match code.as_mut() {
                Some((_, source)) => source.push_str(&text),
                None => events.push(Event::Text(text)),
            },
            other => events.push(other),
        }
    }

    if strip_paragraph && is_single_paragraph(&events) {
        events.pop();
        events.remove(0);
    }

    let mut output = String::new();
    html::push_html(&mut output, events.into_iter());
    output
}

fn code_block(source: &str, lang: Option<&str>, highlighter: &dyn Highlighter) -> String {
    let source = source.trim_end_matches(&['\n', '\r'][..]);
    let class = match lang {
        Some(lang) => format!("hljs lang-{}", escape_html(lang)),
        None => "hljs".to_string(),
    };
    format!(
        "<pre><code class=\"{}\">{}</code></pre>\n",
        class,
        highlighter.highlight(source, lang)
    )
}

/// True when the only top-level block is a paragraph.
fn is_single_paragraph(events: &[Event<'_>]) -> bool {
    let mut depth = 0usize;
    let mut blocks = 0usize;
    for event in events {
        match event {
            Event::Start(_) => {
                if depth == 0 {
                    blocks += 1;
                }
                depth += 1;
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            _ if depth == 0 => blocks += 1,
            _ => {}
        }
    }
    blocks == 1
        && matches!(events.first(), Some(Event::Start(Tag::Paragraph)))
        && matches!(events.last(), Some(Event::End(TagEnd::Paragraph)))
}

/// Render a schema projection as a highlighted, cross-linked JSON block.
///
/// Keys are sorted so the output is stable. `null` renders as an empty
/// string; it is the only value treated as absent, so `false`, `0` and `""`
/// still render as a code block.
pub fn print_schema(value: &Value) -> String {
    if value.is_null() {
        return String::new();
    }

    let json = serde_json::to_string_pretty(&sorted(value)).unwrap_or_default();
    let fence = "`".repeat(longest_backtick_run(&json).max(2) + 1);
    let html = markdown(&format!("{fence}json\n{json}\n{fence}"), false);
    link_definitions(&html)
}

/// Wrap the text of every leaf `<span>` mentioning `#/definitions/` in a
/// link to the `#definition-<name>` anchor.
///
/// Only spans without nested markup are touched. The link target is the
/// span text without `&quot;` entities and with the first `#/definitions/`
/// replaced.
pub fn link_definitions(html: &str) -> String {
    static DEFINITION_SPAN: OnceLock<Regex> = OnceLock::new();
    let pattern = DEFINITION_SPAN.get_or_init(|| {
        Regex::new(r"<span([^>]*)>([^<]*#/definitions/[^<]*)</span>").unwrap()
    });

    pattern
        .replace_all(html, |caps: &Captures<'_>| {
            let text = &caps[2];
            let href = text
                .replace("&quot;", "")
                .replacen("#/definitions/", "#definition-", 1);
            format!("<span{}><a href=\"{}\">{}</a></span>", &caps[1], href, text)
        })
        .into_owned()
}

/// Copy of `value` with every object's keys in sorted order.
fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Map::new();
            for key in keys {
                out.insert(key.clone(), sorted(&map[key.as_str()]));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}

fn longest_backtick_run(text: &str) -> usize {
    text.split(|c: char| c != '`').map(str::len).max().unwrap_or(0)
}

// --- JSON highlighting ---

fn highlight_json(code: &str) -> String {
    let chars: Vec<char> = code.chars().collect();
    let mut out = String::with_capacity(code.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '"' {
            let end = string_end(&chars, i);
            let token: String = chars[i..end].iter().collect();
            let class = if next_non_space(&chars, end) == Some(':') {
                "hljs-attr"
            } else {
                "hljs-string"
            };
            push_span(&mut out, class, &token);
            i = end;
        } else if c == '-' || c.is_ascii_digit() {
            let end = scan(&chars, i, |c| {
                c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E')
            });
            let token: String = chars[i..end].iter().collect();
            push_span(&mut out, "hljs-number", &token);
            i = end;
        } else if c.is_ascii_alphabetic() {
            let end = scan(&chars, i, |c| c.is_ascii_alphabetic());
            let token: String = chars[i..end].iter().collect();
            match token.as_str() {
                "true" | "false" | "null" => push_span(&mut out, "hljs-literal", &token),
                _ => out.push_str(&escape_html(&token)),
            }
            i = end;
        } else {
            out.push_str(&escape_html(&c.to_string()));
            i += 1;
        }
    }
    out
}

fn push_span(out: &mut String, class: &str, token: &str) {
    out.push_str("<span class=\"");
    out.push_str(class);
    out.push_str("\">");
    out.push_str(&escape_html(token));
    out.push_str("</span>");
}

/// Index just past the string literal starting at `start`.
fn string_end(chars: &[char], start: usize) -> usize {
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '"' => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

fn scan(chars: &[char], start: usize, accept: impl Fn(char) -> bool) -> usize {
    let mut i = start;
    while i < chars.len() && accept(chars[i]) {
        i += 1;
    }
    i
}

fn next_non_space(chars: &[char], from: usize) -> Option<char> {
    chars[from.min(chars.len())..]
        .iter()
        .copied()
        .find(|c| !c.is_whitespace())
}
