use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use log::{error, info};
use serde::Deserialize;
use tokio::{net::TcpListener, signal, sync::Mutex};

use tivoo_core::filter::parse_date;
use tivoo_core::render::{is_detail_page, ROOT_PAGE};
use tivoo_core::{FilterCriteria, Session};

const CALENDAR_PATH: &str = "/calendar";

struct Viewer {
    session: Mutex<Session>,
    output: PathBuf,
}

type SharedViewer = Arc<Viewer>;

pub async fn serve(session: Session, addr: SocketAddr) -> io::Result<()> {
    let viewer = Viewer {
        output: session.output_dir().to_path_buf(),
        session: Mutex::new(session),
    };

    let router = Router::new()
        .route(CALENDAR_PATH, get(handle_calendar))
        .route("/:file", get(handle_page))
        .fallback(|| async { Redirect::temporary(CALENDAR_PATH) })
        .with_state(Arc::new(viewer));

    let listener = TcpListener::bind(addr).await?;
    info!("Listening at http://{addr}{CALENDAR_PATH}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown())
        .await
}

async fn shutdown() {
    if let Err(err) = signal::ctrl_c().await {
        error!("Failed to listen for ctrl-c: {err}");
    }
}

#[derive(Deserialize)]
struct CalendarQuery {
    keyword: Option<String>,
    location: Option<String>,
    actor: Option<String>,
    from: Option<String>,
    to: Option<String>,
    #[serde(default)]
    json: bool,
}

impl CalendarQuery {
    fn criteria(&self) -> Result<FilterCriteria, String> {
        let date = |text: &Option<String>| match text.as_deref() {
            None => Ok(None),
            Some(text) => parse_date(text)
                .map(Some)
                .ok_or_else(|| format!("Invalid date `{text}`")),
        };

        let time_range = match (date(&self.from)?, date(&self.to)?) {
            (Some(from), Some(to)) => Some((from, to)),
            (None, None) => None,
            _ => return Err("`from` and `to` must be given together".into()),
        };

        Ok(FilterCriteria {
            keyword: self.keyword.clone().filter(|keyword| !keyword.is_empty()),
            location: self.location.clone().filter(|location| !location.is_empty()),
            time_range,
            actor: self.actor.clone().filter(|actor| !actor.is_empty()),
        })
    }
}

async fn handle_calendar(
    State(viewer): State<SharedViewer>,
    Query(query): Query<CalendarQuery>,
) -> Response {
    let criteria = match query.criteria() {
        Ok(criteria) => criteria,
        Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
    };

    let mut session = viewer.session.lock().await;

    if query.json {
        return Json(criteria.apply(session.events())).into_response();
    }

    session.apply(&criteria);
    let root = match session.render() {
        Ok(root) => root,
        Err(err) => {
            error!("{err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render calendar").into_response();
        }
    };

    // Read while still locked so a concurrent render can't replace the page.
    let response = serve_file(root).await;
    drop(session);
    response
}

async fn handle_page(State(viewer): State<SharedViewer>, Path(file): Path<String>) -> Response {
    if !is_page(&file) {
        return Redirect::temporary(CALENDAR_PATH).into_response();
    }

    // Pages of the last render only; hold the lock so a render can't swap them mid-read.
    let _session = viewer.session.lock().await;
    serve_file(viewer.output.join(file)).await
}

async fn serve_file(path: PathBuf) -> Response {
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => ([("content-type", "text/html; charset=utf-8")], html).into_response(),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            (StatusCode::NOT_FOUND, "No such page").into_response()
        }
        Err(err) => {
            error!("Failed to read {}: {err}", path.display());
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Only the calendar page and detail pages are served out of the output
/// directory.
fn is_page(file: &str) -> bool {
    if file.contains("..") {
        return false;
    }

    file == ROOT_PAGE || is_detail_page(file)
}

#[cfg(test)]
mod tests {
    use tivoo_core::Document;

    use super::*;

    const GAMES: &str = "<document>\
        <row><Col1>New Orleans Saints at Green Bay Packers</Col1>\
        <Col8>2011-09-08 20:30:00</Col8><Col9>2011-09-08 23:30:00</Col9></row>\
        <row><Col1>Pittsburgh Steelers at Baltimore Ravens</Col1>\
        <Col8>2011-09-11 13:00:00</Col8><Col9>2011-09-11 16:00:00</Col9></row>\
        </document>";

    fn query(keyword: &str) -> CalendarQuery {
        CalendarQuery {
            keyword: Some(keyword.into()),
            location: None,
            actor: None,
            from: None,
            to: None,
            json: false,
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_requests_get_their_own_calendar() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(dir.path());
        session.load(&Document::new("nfl.xml", GAMES)).unwrap();

        let viewer = Arc::new(Viewer {
            output: dir.path().to_path_buf(),
            session: Mutex::new(session),
        });

        let mut requests = Vec::new();
        for round in 0..16 {
            let (wanted, other) = if round % 2 == 0 {
                ("Saints", "Steelers")
            } else {
                ("Steelers", "Saints")
            };
            let viewer = Arc::clone(&viewer);

            requests.push(tokio::spawn(async move {
                let response = handle_calendar(State(viewer), Query(query(wanted))).await;
                assert_eq!(response.status(), StatusCode::OK);

                let body = axum::body::to_bytes(response.into_body(), usize::MAX)
                    .await
                    .unwrap();
                let html = String::from_utf8(body.to_vec()).unwrap();
                assert!(html.contains(wanted));
                assert!(!html.contains(other));
            }));
        }

        for request in requests {
            request.await.unwrap();
        }
    }

    #[test]
    fn serves_only_rendered_pages() {
        assert!(is_page("calendar.html"));
        assert!(is_page("event-3f2a9c01d4e5b6a7.html"));
        assert!(is_page("event-3f2a9c01d4e5b6a7-2.html"));

        assert!(!is_page("event-..html"));
        assert!(!is_page("event-x.html/../../etc/passwd"));
        assert!(!is_page("Cargo.toml"));
        assert!(!is_page("event-notes.txt"));
    }

    #[test]
    fn query_builds_criteria() {
        let query = CalendarQuery {
            keyword: Some("Duke".into()),
            location: Some(String::new()),
            actor: None,
            from: Some("2011-11-01".into()),
            to: Some("11 30 2011".into()),
            json: false,
        };

        let criteria = query.criteria().unwrap();
        assert_eq!(criteria.keyword.as_deref(), Some("Duke"));
        assert_eq!(criteria.location, None);
        assert!(criteria.time_range.is_some());
    }

    #[test]
    fn query_rejects_half_a_range() {
        let query = CalendarQuery {
            keyword: None,
            location: None,
            actor: None,
            from: Some("2011-11-01".into()),
            to: None,
            json: false,
        };

        assert!(query.criteria().is_err());
    }
}
