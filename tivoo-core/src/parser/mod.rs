mod basketball;
mod duke;
mod google;
mod nfl;
mod time;
mod tv;

use chrono::{DateTime, NaiveDateTime, Utc};
use log::{debug, warn};
use roxmltree::{Document, Node};

use crate::Event;

pub use basketball::BasketballParser;
pub use duke::DukeParser;
pub use google::GoogleParser;
pub use nfl::NflParser;
pub use time::{parse_one_time, parse_recurring_start, TimeDescriptor};
pub use tv::TvParser;

/// One feed dialect. A parser handed a document of another dialect returns
/// no events rather than failing, so the dispatcher can move on.
pub trait FormatParser {
    fn name(&self) -> &'static str;

    fn try_parse(&self, doc: &Document<'_>) -> Vec<Event>;
}

/// Runs `parse_entry` over every `entry` child of the document element,
/// provided that element is named `root`. Entries that fail to parse are
/// logged and skipped.
fn parse_entries<'a, 'input, F>(
    dialect: &str,
    doc: &'a Document<'input>,
    root: &str,
    entry: &'static str,
    mut parse_entry: F,
) -> Vec<Event>
where
    F: FnMut(Node<'a, 'input>) -> Option<Event>,
{
    let root_element = doc.root_element();
    if !root_element.has_tag_name(root) {
        debug!(
            "{dialect}: document element is <{}>, not <{root}>",
            root_element.tag_name().name()
        );
        return Vec::new();
    }

    let mut events = Vec::new();
    for (position, node) in children(root_element, entry).enumerate() {
        match parse_entry(node) {
            Some(event) => events.push(event),
            None => warn!("{dialect}: skipping malformed <{entry}> #{}", position + 1),
        }
    }

    events
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| child.has_tag_name(name))
}

fn children<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |child| child.has_tag_name(name))
}

/// Trimmed text of the first `name` child, CDATA and nested markup included.
fn child_text(node: Node, name: &str) -> Option<String> {
    child(node, name).map(text)
}

/// Like [`child_text`], descending through `path` one element at a time.
fn path_text(node: Node, path: &[&str]) -> Option<String> {
    path.iter()
        .try_fold(node, |current, name| child(current, name))
        .map(text)
}

fn text(node: Node) -> String {
    node.descendants()
        .filter(Node::is_text)
        .filter_map(|text| text.text())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Parses a zone-less timestamp and takes it as UTC.
fn naive_utc(text: &str, format: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text.trim(), format)
        .ok()
        .map(|naive| naive.and_utc())
}
