use chrono::{DateTime, NaiveDate, Utc};

use crate::Event;

/// A predicate that narrows a working set of events.
///
/// Filters never touch their input, so chaining them yields the intersection
/// of their predicates regardless of order.
pub trait EventFilter {
    fn retains(&self, event: &Event) -> bool;

    fn filter(&self, events: &[Event]) -> Vec<Event> {
        events
            .iter()
            .filter(|event| self.retains(event))
            .cloned()
            .collect()
    }
}

/// Case-sensitive substring of the title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordFilter(pub String);

impl EventFilter for KeywordFilter {
    fn retains(&self, event: &Event) -> bool {
        event.title().contains(self.0.as_str())
    }
}

/// Case-sensitive substring of the location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationFilter(pub String);

impl EventFilter for LocationFilter {
    fn retains(&self, event: &Event) -> bool {
        event.location().contains(self.0.as_str())
    }
}

/// Start time between midnight (UTC) of `start` and midnight of `end`,
/// both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRangeFilter {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl EventFilter for TimeRangeFilter {
    fn retains(&self, event: &Event) -> bool {
        let start = event.start();
        midnight(self.start).is_some_and(|lower| lower <= start)
            && midnight(self.end).is_some_and(|upper| start <= upper)
    }
}

fn midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc())
}

/// One of the values of the `actor` property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorFilter(pub String);

pub const ACTOR_PROPERTY: &str = "actor";

impl EventFilter for ActorFilter {
    fn retains(&self, event: &Event) -> bool {
        event
            .property(ACTOR_PROPERTY)
            .is_some_and(|actors| actors.contains(&self.0))
    }
}

/// Everything a user asked to narrow by. Unset criteria don't filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub keyword: Option<String>,
    pub location: Option<String>,
    pub time_range: Option<(NaiveDate, NaiveDate)>,
    pub actor: Option<String>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.filters().is_empty()
    }

    pub fn keyword_filter(&self) -> Option<KeywordFilter> {
        self.keyword.clone().map(KeywordFilter)
    }

    pub fn location_filter(&self) -> Option<LocationFilter> {
        self.location.clone().map(LocationFilter)
    }

    pub fn time_filter(&self) -> Option<TimeRangeFilter> {
        self.time_range.map(|(start, end)| TimeRangeFilter { start, end })
    }

    pub fn actor_filter(&self) -> Option<ActorFilter> {
        self.actor.clone().map(ActorFilter)
    }

    /// Filters for every set criterion: keyword, location, time, actor.
    pub fn filters(&self) -> Vec<Box<dyn EventFilter>> {
        let mut filters: Vec<Box<dyn EventFilter>> = Vec::new();

        if let Some(filter) = self.keyword_filter() {
            filters.push(Box::new(filter));
        }
        if let Some(filter) = self.location_filter() {
            filters.push(Box::new(filter));
        }
        if let Some(filter) = self.time_filter() {
            filters.push(Box::new(filter));
        }
        if let Some(filter) = self.actor_filter() {
            filters.push(Box::new(filter));
        }

        filters
    }

    pub fn apply(&self, events: &[Event]) -> Vec<Event> {
        self.filters()
            .iter()
            .fold(events.to_vec(), |remaining, filter| filter.filter(&remaining))
    }
}

/// Reads a filter date given as `MM dd YYYY` or `YYYY-MM-DD`.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%m %d %Y"))
        .ok()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn event(title: &str, location: &str, day: u32, hour: u32, actors: &[&str]) -> Event {
        let start = Utc.with_ymd_and_hms(2011, 12, day, hour, 0, 0).unwrap();
        let mut builder = Event::builder(title, start, start).location(location);
        for actor in actors {
            builder = builder.property(ACTOR_PROPERTY, *actor);
        }
        builder.build().unwrap()
    }

    fn sample() -> Vec<Event> {
        vec![
            event("House", "WRAL", 4, 20, &["Hugh Laurie", "Lisa Edelstein"]),
            event("Duke vs UNC", "Cameron Indoor Stadium", 5, 19, &[]),
            event("Duke Chapel Tour", "Duke Chapel", 6, 0, &[]),
            event("Late House rerun", "WRAL", 7, 1, &["Hugh Laurie"]),
        ]
    }

    fn titles(events: &[Event]) -> Vec<&str> {
        events.iter().map(Event::title).collect()
    }

    #[test]
    fn keyword_is_case_sensitive() {
        let events = sample();
        assert_eq!(
            titles(&KeywordFilter("House".into()).filter(&events)),
            ["House", "Late House rerun"]
        );
        assert!(KeywordFilter("house".into()).filter(&events).is_empty());
    }

    #[test]
    fn location_matches_substring() {
        let events = sample();
        assert_eq!(
            titles(&LocationFilter("Duke".into()).filter(&events)),
            ["Duke Chapel Tour"]
        );
    }

    #[test]
    fn time_range_is_inclusive_at_midnight() {
        let events = sample();
        let filter = TimeRangeFilter {
            start: NaiveDate::from_ymd_opt(2011, 12, 5).unwrap(),
            end: NaiveDate::from_ymd_opt(2011, 12, 6).unwrap(),
        };
        // The chapel tour starts exactly at the upper bound.
        assert_eq!(
            titles(&filter.filter(&events)),
            ["Duke vs UNC", "Duke Chapel Tour"]
        );
    }

    #[test]
    fn actor_matches_whole_values() {
        let events = sample();
        assert_eq!(
            titles(&ActorFilter("Hugh Laurie".into()).filter(&events)),
            ["House", "Late House rerun"]
        );
        assert!(ActorFilter("Hugh".into()).filter(&events).is_empty());
    }

    #[test]
    fn filters_are_idempotent_and_commute() {
        let events = sample();
        let keyword = KeywordFilter("Duke".into());
        let location = LocationFilter("Chapel".into());

        let once = keyword.filter(&events);
        assert_eq!(keyword.filter(&once), once);

        assert_eq!(
            location.filter(&keyword.filter(&events)),
            keyword.filter(&location.filter(&events))
        );
    }

    #[test]
    fn criteria_apply_every_set_filter() {
        let events = sample();
        assert_eq!(FilterCriteria::default().apply(&events), events);
        assert!(FilterCriteria::default().is_empty());

        let criteria = FilterCriteria {
            keyword: Some("House".into()),
            time_range: Some((
                NaiveDate::from_ymd_opt(2011, 12, 1).unwrap(),
                NaiveDate::from_ymd_opt(2011, 12, 5).unwrap(),
            )),
            ..Default::default()
        };
        assert_eq!(titles(&criteria.apply(&events)), ["House"]);
        assert_eq!(criteria.filters().len(), 2);
    }

    #[test]
    fn parses_both_date_forms() {
        let expected = NaiveDate::from_ymd_opt(2011, 12, 4);
        assert_eq!(parse_date("12 04 2011"), expected);
        assert_eq!(parse_date(" 2011-12-04 "), expected);
        assert_eq!(parse_date("04.12.2011"), None);
    }
}
