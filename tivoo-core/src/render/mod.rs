mod html;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write as _};
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use log::{debug, info, warn};

use crate::{Error, Event, Result};

pub use html::escape;

/// File name of the calendar page every render produces.
pub const ROOT_PAGE: &str = "calendar.html";

const DETAIL_PREFIX: &str = "event-";
const STAGING_PREFIX: &str = ".staging-";

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub file_name: String,
    pub html: String,
}

/// A calendar page plus one detail page per event, linked by relative
/// file names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub root: Page,
    pub details: Vec<Page>,
}

/// Lays out a list of events as an [`Artifact`].
pub trait CalendarRenderer {
    fn render(&self, events: &[Event]) -> Artifact;
}

/// One table per month with a weekday header row. Days without events are
/// left as empty cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonthGrid;

/// Only the days that have events, oldest first.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortedList;

impl CalendarRenderer for MonthGrid {
    fn render(&self, events: &[Event]) -> Artifact {
        let layout = Layout::new(events);

        let months: BTreeSet<(i32, u32)> = layout
            .days
            .keys()
            .map(|date| (date.year(), date.month()))
            .collect();

        let mut body = String::new();
        for (year, month) in months {
            let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
                continue;
            };

            let _ = writeln!(body, "<h2>{}</h2>", first.format("%B %Y"));
            let _ = writeln!(body, "<table class=\"month\">");
            let _ = write!(body, "<tr>");
            for weekday in WEEKDAYS {
                let _ = write!(body, "<th>{weekday}</th>");
            }
            let _ = writeln!(body, "</tr>");

            let _ = write!(body, "<tr>");
            let leading = first.weekday().num_days_from_sunday();
            for _ in 0..leading {
                body.push_str("<td></td>");
            }

            let mut column = leading;
            for date in first.iter_days().take_while(|date| date.month() == month) {
                if column == 7 {
                    let _ = write!(body, "</tr>\n<tr>");
                    column = 0;
                }
                layout.write_cell(&mut body, date);
                column += 1;
            }
            for _ in column..7 {
                body.push_str("<td></td>");
            }
            let _ = writeln!(body, "</tr>");
            let _ = writeln!(body, "</table>");
        }

        layout.finish(&body)
    }
}

impl CalendarRenderer for SortedList {
    fn render(&self, events: &[Event]) -> Artifact {
        let layout = Layout::new(events);

        let mut body = String::new();
        let _ = writeln!(body, "<table class=\"list\">");
        for date in layout.days.keys() {
            let _ = write!(body, "<tr>");
            layout.write_cell(&mut body, *date);
            let _ = writeln!(body, "</tr>");
        }
        let _ = writeln!(body, "</table>");

        layout.finish(&body)
    }
}

/// Hands out detail page names. The name is derived from the event id; an id
/// seen before in the same render gets a counter suffix.
#[derive(Debug, Default)]
struct DetailNames {
    seen: HashMap<String, usize>,
}

impl DetailNames {
    fn next(&mut self, event: &Event) -> String {
        let count = self.seen.entry(event.id().to_string()).or_insert(0);
        *count += 1;

        match *count {
            1 => format!("{DETAIL_PREFIX}{}.html", event.id()),
            n => format!("{DETAIL_PREFIX}{}-{n}.html", event.id()),
        }
    }
}

/// What both layouts share: the events bucketed by start date and the detail
/// page name of every event.
struct Layout<'a> {
    events: &'a [Event],
    names: Vec<String>,
    days: BTreeMap<NaiveDate, Vec<usize>>,
}

impl<'a> Layout<'a> {
    fn new(events: &'a [Event]) -> Self {
        let mut detail_names = DetailNames::default();
        let names = events.iter().map(|event| detail_names.next(event)).collect();

        let mut days: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
        for (idx, event) in events.iter().enumerate() {
            days.entry(event.start().date_naive()).or_default().push(idx);
        }

        Self {
            events,
            names,
            days,
        }
    }

    /// A populated cell for `date` if any event starts on it, an empty one
    /// otherwise.
    fn write_cell(&self, out: &mut String, date: NaiveDate) {
        let Some(indices) = self.days.get(&date) else {
            out.push_str("<td></td>");
            return;
        };

        let _ = write!(out, "<td class=\"day\"><b>{}</b><br/>", date.format("%m/%d"));
        for &idx in indices {
            let event = &self.events[idx];
            let _ = write!(
                out,
                "<a href=\"{}\">{}</a> {}<br/>",
                escape(&self.names[idx]),
                escape(event.title()),
                time_range(event)
            );
        }
        out.push_str("</td>");
    }

    fn finish(self, body: &str) -> Artifact {
        if self.events.is_empty() {
            info!("rendering an empty calendar");
        }

        let mut page = String::new();
        let _ = writeln!(page, "<h1>Calendar</h1>");
        if self.events.is_empty() {
            let _ = writeln!(page, "<p>No events.</p>");
        }
        page.push_str(body);

        let details = self
            .events
            .iter()
            .zip(self.names)
            .map(|(event, file_name)| Page {
                html: detail_page(event),
                file_name,
            })
            .collect();

        Artifact {
            root: Page {
                file_name: ROOT_PAGE.to_string(),
                html: html::document("Calendar", &page),
            },
            details,
        }
    }
}

/// `20:00 - 21:00`, with the end date spelled out when the event runs past
/// its start date.
fn time_range(event: &Event) -> String {
    let (start, end) = (event.start(), event.end());
    if start.date_naive() == end.date_naive() {
        format!("{} - {}", start.format("%H:%M"), end.format("%H:%M"))
    } else {
        format!("{} - {}", start.format("%H:%M"), end.format("%m/%d %H:%M"))
    }
}

fn detail_page(event: &Event) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<p><b>{}</b><br/>", escape(event.title()));
    let _ = writeln!(
        body,
        "Start: {}<br/>",
        event.start().format("%a %b %-d %Y %H:%M UTC")
    );
    let _ = writeln!(
        body,
        "End: {}<br/>",
        event.end().format("%a %b %-d %Y %H:%M UTC")
    );
    let _ = writeln!(body, "Location: {}<br/>", escape(event.location()));
    let _ = writeln!(body, "Description: {}<br/>", escape(event.description()));

    for (name, values) in event.properties().iter() {
        let _ = writeln!(
            body,
            "{}: {}<br/>",
            escape(name),
            escape(&values.join(", "))
        );
    }
    let _ = writeln!(body, "</p>");
    let _ = writeln!(body, "<p><a href=\"{ROOT_PAGE}\">Back to calendar</a></p>");

    html::document(event.title(), &body)
}

impl Artifact {
    fn pages(&self) -> impl Iterator<Item = &Page> {
        self.details.iter().chain([&self.root])
    }

    /// Writes every page into `dir` and returns the path of the calendar page.
    ///
    /// The pages are staged in a scratch directory inside `dir`, so a failed
    /// write leaves the previous render as it was. They are then moved into
    /// place with the calendar page last, and detail pages of earlier renders
    /// are removed.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir).map_err(output_write(dir))?;

        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(dir)
            .map_err(output_write(dir))?;

        for page in self.pages() {
            let path = staging.path().join(&page.file_name);
            write_page(&path, &page.html).map_err(output_write(&path))?;
        }

        for page in self.pages() {
            let target = dir.join(&page.file_name);
            fs::rename(staging.path().join(&page.file_name), &target)
                .map_err(output_write(&target))?;
        }

        self.remove_stale(dir);

        debug!(
            "wrote {} detail pages to {}",
            self.details.len(),
            dir.display()
        );
        Ok(dir.join(&self.root.file_name))
    }

    fn remove_stale(&self, dir: &Path) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("failed to list {}: {err}", dir.display());
                return;
            }
        };

        for entry in entries.filter_map(|entry| entry.ok()) {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if !is_detail_page(name) || self.details.iter().any(|page| page.file_name == name) {
                continue;
            }

            let path = entry.path();
            match fs::remove_file(&path) {
                Ok(()) => debug!("removed stale {}", path.display()),
                Err(err) => warn!("failed to remove stale {}: {err}", path.display()),
            }
        }
    }
}

/// Whether `file_name` is shaped like a detail page name.
pub fn is_detail_page(file_name: &str) -> bool {
    file_name.starts_with(DETAIL_PREFIX)
        && file_name.ends_with(".html")
        && !file_name.contains(['/', '\\'])
}

fn output_write(path: &Path) -> impl FnOnce(io::Error) -> Error + '_ {
    move |source| Error::OutputWrite {
        path: path.to_path_buf(),
        source,
    }
}

fn write_page(path: &Path, html: &str) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    file.write_all(html.as_bytes())?;
    file.flush()
}
