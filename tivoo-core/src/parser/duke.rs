use roxmltree::{Document, Node};

use super::{child, child_text, children, naive_utc, path_text, parse_entries, FormatParser};
use crate::Event;

const UTC_DATE: &str = "%Y%m%dT%H%M%SZ";

/// University calendar export: `<events><event>` records with nested
/// `start/utcdate`, `end/utcdate` and `location/address` elements.
pub struct DukeParser;

impl FormatParser for DukeParser {
    fn name(&self) -> &'static str {
        "duke"
    }

    fn try_parse(&self, doc: &Document<'_>) -> Vec<Event> {
        parse_entries(self.name(), doc, "events", "event", parse_event)
    }
}

fn parse_event(node: Node) -> Option<Event> {
    let title = child_text(node, "summary")?;
    let start = naive_utc(&path_text(node, &["start", "utcdate"])?, UTC_DATE)?;
    let end = naive_utc(&path_text(node, &["end", "utcdate"])?, UTC_DATE)?;

    let mut builder = Event::builder(title, start, end)
        .location(path_text(node, &["location", "address"]).unwrap_or_default())
        .description(child_text(node, "description").unwrap_or_default());

    if let Some(categories) = child(node, "categories") {
        for category in children(categories, "category") {
            if let Some(value) = child_text(category, "value").filter(|v| !v.is_empty()) {
                builder = builder.property("category", value);
            }
        }
    }

    if let Some(link) = child_text(node, "link").filter(|link| !link.is_empty()) {
        builder = builder.property("link", link);
    }

    builder.build()
}
