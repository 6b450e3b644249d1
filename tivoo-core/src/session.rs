use std::mem;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::{debug, info};

use crate::filter::{EventFilter, FilterCriteria};
use crate::render::{CalendarRenderer, MonthGrid};
use crate::{Dispatcher, Document, Event, Result};

/// Holds every loaded event, the view narrowed by the filters applied so far
/// and the criteria those filters are built from.
///
/// Filters only ever narrow the working set. Rendering consumes it and then
/// restores it from the full set, so each round of filtering starts over.
pub struct Session {
    dispatcher: Dispatcher,
    renderer: Box<dyn CalendarRenderer + Send + Sync>,
    output_dir: PathBuf,
    events: Vec<Event>,
    working: Vec<Event>,
    criteria: FilterCriteria,
}

impl Session {
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self::with_renderer(output_dir, MonthGrid)
    }

    pub fn with_renderer<P, R>(output_dir: P, renderer: R) -> Self
    where
        P: Into<PathBuf>,
        R: CalendarRenderer + Send + Sync + 'static,
    {
        Self {
            dispatcher: Dispatcher::default(),
            renderer: Box::new(renderer),
            output_dir: output_dir.into(),
            events: Vec::new(),
            working: Vec::new(),
            criteria: FilterCriteria::default(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Every event loaded since the last reset.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// The current filtered view.
    pub fn working(&self) -> &[Event] {
        &self.working
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Parses `document` and appends its events. A document no parser
    /// recognizes leaves the session untouched.
    pub fn load(&mut self, document: &Document) -> Result<usize> {
        let dispatched = self.dispatcher.dispatch(document)?;
        let count = dispatched.events.len();

        self.working.extend(dispatched.events.iter().cloned());
        self.events.extend(dispatched.events);

        Ok(count)
    }

    pub fn reset(&mut self) {
        debug!("dropping {} events", self.events.len());
        self.events.clear();
        self.working.clear();
    }

    pub fn set_keyword<S: Into<String>>(&mut self, keyword: S) {
        self.criteria.keyword = Some(keyword.into());
    }

    pub fn set_location<S: Into<String>>(&mut self, location: S) {
        self.criteria.location = Some(location.into());
    }

    pub fn set_actor<S: Into<String>>(&mut self, actor: S) {
        self.criteria.actor = Some(actor.into());
    }

    pub fn set_time_range(&mut self, start: NaiveDate, end: NaiveDate) {
        self.criteria.time_range = Some((start, end));
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
    }

    pub fn apply_keyword_filter(&mut self) {
        let filter = self.criteria.keyword_filter();
        self.narrow(filter);
    }

    pub fn apply_location_filter(&mut self) {
        let filter = self.criteria.location_filter();
        self.narrow(filter);
    }

    pub fn apply_time_filter(&mut self) {
        let filter = self.criteria.time_filter();
        self.narrow(filter);
    }

    pub fn apply_actor_filter(&mut self) {
        let filter = self.criteria.actor_filter();
        self.narrow(filter);
    }

    /// Narrows the working set by every criterion set in `criteria`.
    pub fn apply(&mut self, criteria: &FilterCriteria) {
        self.working = criteria.apply(&self.working);
    }

    fn narrow<F: EventFilter>(&mut self, filter: Option<F>) {
        if let Some(filter) = filter {
            self.working = filter.filter(&self.working);
        }
    }

    /// Renders the working set into the output directory and returns the
    /// calendar page. Afterwards, successful or not, the working set holds
    /// every loaded event again.
    pub fn render(&mut self) -> Result<PathBuf> {
        let working = mem::replace(&mut self.working, self.events.clone());

        info!(
            "rendering {} of {} events into {}",
            working.len(),
            self.events.len(),
            self.output_dir.display()
        );

        self.renderer.render(&working).write_to(&self.output_dir)
    }
}
