use once_cell::sync::Lazy;
use roxmltree::{Document, Node};
use scraper::{Html, Selector};

use super::{child_text, children, parse_entries, FormatParser, TimeDescriptor};
use crate::Event;

macro_rules! selector {
    ($query:expr) => {{
        static SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse($query).unwrap());
        &SELECTOR
    }};
}

const LOCATION_MARKER: &str = "Where: ";
const DESCRIPTION_MARKER: &str = "Event Description:";

/// Atom feed of a shared calendar. Everything but the title is packed into
/// the escaped-HTML `summary` and `content` blobs, one `Label: value` per line.
pub struct GoogleParser;

impl FormatParser for GoogleParser {
    fn name(&self) -> &'static str {
        "google"
    }

    fn try_parse(&self, doc: &Document<'_>) -> Vec<Event> {
        parse_entries(self.name(), doc, "feed", "entry", parse_entry)
    }
}

fn parse_entry(node: Node) -> Option<Event> {
    let title = child_text(node, "title")?;
    let content = text_lines(&child_text(node, "content")?);
    let (start, end) = TimeDescriptor::classify(&content)?.span()?;

    let location = child_text(node, "summary")
        .map(|summary| text_lines(&summary))
        .and_then(|lines| {
            lines.iter().find_map(|line| {
                let (_, rest) = line.split_once(LOCATION_MARKER)?;
                Some(rest.trim().to_string())
            })
        })
        .unwrap_or_default();

    // A later description line overrides an earlier one.
    let description = content
        .iter()
        .rev()
        .filter(|line| line.contains(DESCRIPTION_MARKER))
        .find_map(|line| line.split_once(": "))
        .map(|(_, rest)| rest.trim().to_string())
        .unwrap_or_default();

    let mut builder = Event::builder(title, start, end)
        .location(location)
        .description(description);

    let link = children(node, "link")
        .find(|link| link.attribute("rel") == Some("alternate"))
        .and_then(|link| link.attribute("href"));

    if let Some(href) = link {
        builder = builder.property("link", href);
    }

    builder.build()
}

/// Flattens an HTML blob into its trimmed, non-empty text lines. Both raw
/// line breaks and `<br>`/block elements end a line.
fn text_lines(html: &str) -> Vec<String> {
    let fragment = Html::parse_fragment(html);

    let mut breaks = Vec::new();
    for element in fragment.select(selector!("br, p, div")) {
        breaks.push(element.id());
    }

    let mut text = String::new();
    for node in fragment.tree.root().descendants() {
        match node.value() {
            scraper::Node::Text(chunk) => text.push_str(chunk),
            scraper::Node::Element(_) if breaks.contains(&node.id()) => text.push('\n'),
            _ => {}
        }
    }

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
