use log::{debug, info};
use roxmltree::Document as XmlDocument;

use crate::parser::{
    BasketballParser, DukeParser, FormatParser, GoogleParser, NflParser, TvParser,
};
use crate::{Error, Event, Result};

/// A raw feed together with where it came from. The origin is only used in
/// diagnostics; the dialect is always detected from the content.
#[derive(Debug, Clone)]
pub struct Document {
    pub source: String,
    pub text: String,
}

impl Document {
    pub fn new<S: Into<String>, T: Into<String>>(source: S, text: T) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dispatched {
    /// Name of the parser that recognized the document.
    pub dialect: &'static str,
    pub events: Vec<Event>,
}

/// Tries its parsers in a fixed order and keeps the first non-empty result.
pub struct Dispatcher {
    parsers: Vec<Box<dyn FormatParser + Send + Sync>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(vec![
            Box::new(BasketballParser),
            Box::new(DukeParser),
            Box::new(GoogleParser),
            Box::new(NflParser),
            Box::new(TvParser),
        ])
    }
}

impl Dispatcher {
    pub fn new(parsers: Vec<Box<dyn FormatParser + Send + Sync>>) -> Self {
        Self { parsers }
    }

    pub fn dispatch(&self, document: &Document) -> Result<Dispatched> {
        let no_match = || Error::NoMatchingFormat {
            document: document.source.clone(),
        };

        let xml = XmlDocument::parse(&document.text).map_err(|err| {
            debug!("{}: not well-formed XML: {err}", document.source);
            no_match()
        })?;

        for parser in &self.parsers {
            let events = parser.try_parse(&xml);
            if !events.is_empty() {
                info!(
                    "{}: {} events in {} format",
                    document.source,
                    events.len(),
                    parser.name()
                );
                return Ok(Dispatched {
                    dialect: parser.name(),
                    events,
                });
            }
        }

        Err(no_match())
    }
}
