use std::fmt::Write;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

#[cfg(feature = "serde")]
use serde::{ser::SerializeMap, Serialize, Serializer};

/// Dialect-specific extras that don't fit the core fields, e.g. the actors of
/// a TV programme. Names are unique and keep their insertion order, as do the
/// values under each name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties(Vec<(String, Vec<String>)>);

impl Properties {
    /// Appends `value` under `name`, creating the entry on first use.
    pub fn push<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) {
        let name = name.into();
        let value = value.into();

        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, values)) => values.push(value),
            None => self.0.push((name, vec![value])),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, values)| values.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[cfg(feature = "serde")]
impl Serialize for Properties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, values) in &self.0 {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

/// A normalized calendar entry. Built once by a parser through
/// [`EventBuilder`] and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Event {
    id: String,
    title: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    location: String,
    description: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Properties::is_empty"))]
    properties: Properties,
}

impl Event {
    pub fn builder<S: Into<String>>(
        title: S,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> EventBuilder {
        EventBuilder {
            title: title.into(),
            start,
            end,
            location: String::new(),
            description: String::new(),
            properties: Properties::default(),
        }
    }

    /// Stable identifier derived from the title and start time.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&[String]> {
        self.properties.get(name)
    }
}

#[derive(Debug, Clone)]
pub struct EventBuilder {
    title: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    location: String,
    description: String,
    properties: Properties,
}

impl EventBuilder {
    pub fn location<S: Into<String>>(mut self, location: S) -> Self {
        self.location = location.into();
        self
    }

    pub fn description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    pub fn property<N: Into<String>, V: Into<String>>(mut self, name: N, value: V) -> Self {
        self.properties.push(name, value);
        self
    }

    /// Returns `None` when the end lies before the start.
    #[must_use]
    pub fn build(self) -> Option<Event> {
        if self.end < self.start {
            return None;
        }

        Some(Event {
            id: event_id(&self.title, self.start),
            title: self.title,
            start: self.start,
            end: self.end,
            location: self.location,
            description: self.description,
            properties: self.properties,
        })
    }
}

fn event_id(title: &str, start: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(start.to_rfc3339().as_bytes());
    let digest = hasher.finalize();

    digest[..8].iter().fold(String::with_capacity(16), |mut id, byte| {
        let _ = write!(id, "{byte:02x}");
        id
    })
}
