use chrono::{DateTime, Utc};
use roxmltree::{Document, Node};

use super::{child_text, naive_utc, parse_entries, FormatParser};
use crate::Event;

/// Access-style export of a basketball schedule:
/// `<dataroot><Calendar><Subject/><StartDate/><StartTime/>...</Calendar></dataroot>`.
pub struct BasketballParser;

impl FormatParser for BasketballParser {
    fn name(&self) -> &'static str {
        "basketball"
    }

    fn try_parse(&self, doc: &Document<'_>) -> Vec<Event> {
        parse_entries(self.name(), doc, "dataroot", "Calendar", parse_game)
    }
}

fn parse_game(node: Node) -> Option<Event> {
    let title = child_text(node, "Subject")?;
    let start = game_time(node, "StartDate", "StartTime")?;
    let end = game_time(node, "EndDate", "EndTime")?;

    Event::builder(title, start, end)
        .location(child_text(node, "Location").unwrap_or_default())
        .description(child_text(node, "Description").unwrap_or_default())
        .build()
}

/// `11/11/2011` and `7:00:00 PM`.
fn game_time(node: Node, date: &str, time: &str) -> Option<DateTime<Utc>> {
    let date = child_text(node, date)?;
    let time = child_text(node, time)?;
    naive_utc(&format!("{date} {time}"), "%m/%d/%Y %I:%M:%S %p")
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const SCHEDULE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<dataroot xmlns:od="urn:schemas-microsoft-com:officedata" generated="2011-08-30T10:36:58">
  <Calendar>
    <Subject>Duke vs Belmont</Subject>
    <StartDate>11/11/2011</StartDate>
    <StartTime>7:00:00 PM</StartTime>
    <EndDate>11/11/2011</EndDate>
    <EndTime>9:00:00 PM</EndTime>
    <Location>Cameron Indoor Stadium</Location>
    <Description>Season opener</Description>
  </Calendar>
  <Calendar>
    <Subject>Duke vs TBA</Subject>
    <StartDate>TBA</StartDate>
    <StartTime>7:00:00 PM</StartTime>
    <EndDate>11/12/2011</EndDate>
    <EndTime>9:00:00 PM</EndTime>
  </Calendar>
  <Calendar>
    <Subject>Duke at Michigan State</Subject>
    <StartDate>11/15/2011</StartDate>
    <StartTime>9:30:00 PM</StartTime>
    <EndDate>11/15/2011</EndDate>
    <EndTime>11:30:00 PM</EndTime>
  </Calendar>
</dataroot>"#;

    #[test]
    fn parses_games_and_skips_malformed_ones() {
        let doc = Document::parse(SCHEDULE).unwrap();
        let events = BasketballParser.try_parse(&doc);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].title(), "Duke vs Belmont");
        assert_eq!(
            events[0].start(),
            Utc.with_ymd_and_hms(2011, 11, 11, 19, 0, 0).unwrap()
        );
        assert_eq!(
            events[0].end(),
            Utc.with_ymd_and_hms(2011, 11, 11, 21, 0, 0).unwrap()
        );
        assert_eq!(events[0].location(), "Cameron Indoor Stadium");
        assert_eq!(events[0].description(), "Season opener");
        assert_eq!(events[1].title(), "Duke at Michigan State");
        assert_eq!(events[1].location(), "");
    }

    #[test]
    fn other_dialects_yield_nothing() {
        let doc = Document::parse("<events><event/></events>").unwrap();
        assert!(BasketballParser.try_parse(&doc).is_empty());
    }
}
