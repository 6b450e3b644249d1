mod dispatch;
mod error;
mod event;
pub mod filter;
pub mod parser;
pub mod render;
mod session;

pub use dispatch::{Dispatched, Dispatcher, Document};
pub use error::{Error, Result};
pub use event::{Event, EventBuilder, Properties};
pub use filter::{EventFilter, FilterCriteria};
pub use render::{Artifact, CalendarRenderer, MonthGrid, SortedList};
pub use session::Session;
