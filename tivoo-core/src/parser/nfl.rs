use roxmltree::{Document, Node};

use super::{child_text, naive_utc, parse_entries, FormatParser};
use crate::Event;

const GAME_TIME: &str = "%Y-%m-%d %H:%M:%S";

/// Spreadsheet-style schedule where every game is a `<row>` of numbered
/// `<ColN>` cells: 1 is the matchup, 2 the link, 8 and 9 the start and end,
/// 15 the venue.
pub struct NflParser;

impl FormatParser for NflParser {
    fn name(&self) -> &'static str {
        "nfl"
    }

    fn try_parse(&self, doc: &Document<'_>) -> Vec<Event> {
        parse_entries(self.name(), doc, "document", "row", parse_game)
    }
}

fn parse_game(node: Node) -> Option<Event> {
    let title = child_text(node, "Col1")?;
    let start = naive_utc(&child_text(node, "Col8")?, GAME_TIME)?;
    let end = naive_utc(&child_text(node, "Col9")?, GAME_TIME)?;

    let mut builder = Event::builder(title.as_str(), start, end)
        .location(child_text(node, "Col15").unwrap_or_default());

    if let Some(link) = child_text(node, "Col2").filter(|link| !link.is_empty()) {
        builder = builder.property("link", link);
    }

    if let Some((away, home)) = title.split_once(" at ") {
        builder = builder.property("team", away.trim()).property("team", home.trim());
    }

    builder.build()
}
