use std::collections::HashMap;

use chrono::{DateTime, Utc};
use roxmltree::{Document, Node};

use super::{child, child_text, children, parse_entries, text, FormatParser};
use crate::Event;

const XMLTV_TIME: &str = "%Y%m%d%H%M%S %z";

/// XMLTV listings: `<programme start=".." stop=".." channel="..">` entries
/// next to the `<channel>` definitions they reference. Unlike the other
/// dialects the timestamps carry an offset, which is honoured.
pub struct TvParser;

impl FormatParser for TvParser {
    fn name(&self) -> &'static str {
        "tv"
    }

    fn try_parse(&self, doc: &Document<'_>) -> Vec<Event> {
        let channels = doc
            .root_element()
            .children()
            .filter(|node| node.has_tag_name("channel"))
            .filter_map(|channel| {
                let id = channel.attribute("id")?;
                let name = child_text(channel, "display-name")?;
                Some((id, name))
            })
            .collect::<HashMap<_, _>>();

        parse_entries(self.name(), doc, "tv", "programme", |node| {
            parse_programme(node, &channels)
        })
    }
}

fn parse_programme(node: Node, channels: &HashMap<&str, String>) -> Option<Event> {
    let title = child_text(node, "title")?;
    let start = xmltv_time(node.attribute("start")?)?;
    let end = match node.attribute("stop") {
        Some(stop) => xmltv_time(stop)?,
        None => start,
    };

    let channel = node.attribute("channel").unwrap_or_default();
    let location = channels
        .get(channel)
        .cloned()
        .unwrap_or_else(|| channel.to_string());

    let mut builder = Event::builder(title, start, end)
        .location(location)
        .description(child_text(node, "desc").unwrap_or_default());

    if let Some(credits) = child(node, "credits") {
        for role in ["actor", "director"] {
            for person in children(credits, role) {
                builder = builder.property(role, text(person));
            }
        }
    }

    for category in children(node, "category") {
        builder = builder.property("category", text(category));
    }

    if !channel.is_empty() {
        builder = builder.property("channel", channel);
    }

    builder.build()
}

fn xmltv_time(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(value.trim(), XMLTV_TIME)
        .ok()
        .map(|time| time.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const LISTING: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<tv source-info-name="Tribune Media Services" generator-info-name="XMLTV">
  <channel id="I10436.labs.zap2it.com">
    <display-name>WRAL</display-name>
    <display-name>5 WRAL</display-name>
  </channel>
  <programme start="20111204200000 -0500" stop="20111204210000 -0500" channel="I10436.labs.zap2it.com">
    <title lang="en">House</title>
    <desc lang="en">A patient collapses mid-wedding.</desc>
    <credits>
      <director>Greg Yaitanes</director>
      <actor>Hugh Laurie</actor>
      <actor>Lisa Edelstein</actor>
    </credits>
    <category lang="en">Drama</category>
    <category lang="en">Series</category>
  </programme>
  <programme start="20111204210000 -0500" channel="I99999.labs.zap2it.com">
    <title lang="en">Late News</title>
  </programme>
  <programme stop="20111204210000 -0500" channel="I10436.labs.zap2it.com">
    <title lang="en">No Start</title>
  </programme>
</tv>"#;

    #[test]
    fn converts_offsets_and_collects_credits() {
        let doc = Document::parse(LISTING).unwrap();
        let events = TvParser.try_parse(&doc);

        assert_eq!(events.len(), 2);

        let house = &events[0];
        assert_eq!(
            house.start(),
            Utc.with_ymd_and_hms(2011, 12, 5, 1, 0, 0).unwrap()
        );
        assert_eq!(
            house.end(),
            Utc.with_ymd_and_hms(2011, 12, 5, 2, 0, 0).unwrap()
        );
        assert_eq!(house.location(), "WRAL");
        assert_eq!(
            house.property("actor").unwrap(),
            ["Hugh Laurie", "Lisa Edelstein"]
        );
        assert_eq!(house.property("director").unwrap(), ["Greg Yaitanes"]);
        assert_eq!(house.property("category").unwrap(), ["Drama", "Series"]);

        let names: Vec<_> = house.properties().iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["actor", "director", "category", "channel"]);

        let news = &events[1];
        assert_eq!(news.start(), news.end());
        assert_eq!(news.location(), "I99999.labs.zap2it.com");
    }
}
