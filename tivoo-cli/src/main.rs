use std::env;

use anyhow::Result;
use log::{error, info, warn};
use tivoo_core::{Session, SortedList};

use crate::cli::{Args, Layout};

mod cli;
mod fetch;
mod serve;

fn setup_logging() {
    if env::var("TIVOO_LOG").is_err() {
        env::set_var("TIVOO_LOG", "tivoo=info");
    }

    pretty_env_logger::init_custom_env("TIVOO_LOG");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::parse(env::args().skip(1).collect());

    setup_logging();

    let mut session = match args.layout {
        Layout::Month => Session::new(&args.output),
        Layout::List => Session::with_renderer(&args.output, SortedList),
    };

    load_all(&mut session, &args.sources).await;
    if session.events().is_empty() {
        error!("None of the given feeds yielded any events");
    }

    if let Some(addr) = args.serve {
        serve::serve(session, addr).await?;
        return Ok(());
    }

    run_once(session, &args)
}

async fn load_all(session: &mut Session, sources: &[String]) {
    for source in sources {
        let document = match fetch::fetch(source).await {
            Ok(document) => document,
            Err(err) => {
                warn!("Skipping {source}: {err:#}");
                continue;
            }
        };

        match session.load(&document) {
            Ok(count) => info!("Loaded {count} events from {source}"),
            Err(err) => warn!("Skipping {source}: {err}"),
        }
    }
}

fn run_once(mut session: Session, args: &Args) -> Result<()> {
    if args.json {
        let events = args.criteria.apply(session.events());
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    session.set_criteria(args.criteria.clone());
    session.apply_keyword_filter();
    session.apply_location_filter();
    session.apply_time_filter();
    session.apply_actor_filter();

    let root = session.render()?;
    println!("{}", root.display());
    Ok(())
}
