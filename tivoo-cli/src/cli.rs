use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;

use getopts::{Matches, Options};
use tivoo_core::filter::parse_date;
use tivoo_core::FilterCriteria;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Month,
    List,
}

pub struct Args {
    pub sources: Vec<String>,
    pub output: PathBuf,
    pub criteria: FilterCriteria,
    pub layout: Layout,
    pub json: bool,
    pub serve: Option<SocketAddr>,
}

fn opts() -> Options {
    let mut opts = Options::new();
    opts.optflag(
        "h",
        "help",
        concat!("Print the help output of ", env!("CARGO_PKG_NAME")),
    );
    opts.optopt(
        "o",
        "output",
        "Directory to write the calendar pages to [Default: calendar]",
        "DIRECTORY",
    );
    opts.optopt("k", "keyword", "Only keep events whose title contains KEYWORD", "KEYWORD");
    opts.optopt(
        "l",
        "location",
        "Only keep events whose location contains LOCATION",
        "LOCATION",
    );
    opts.optopt("a", "actor", "Only keep events featuring ACTOR", "ACTOR");
    opts.optopt(
        "f",
        "from",
        "Only keep events starting on or after DATE (YYYY-MM-DD or \"MM DD YYYY\")",
        "DATE",
    );
    opts.optopt(
        "t",
        "to",
        "Only keep events starting no later than midnight of DATE",
        "DATE",
    );
    opts.optopt("", "layout", "Calendar layout, month or list [Default: month]", "LAYOUT");
    opts.optflag("j", "json", "Print the filtered events as JSON instead of rendering");
    opts.optflagopt(
        "s",
        "serve",
        "Serve the calendar over HTTP [Default: 127.0.0.1:8080]",
        "SOCKET_ADDRESS",
    );
    opts
}

fn usage(opts: &Options) -> String {
    let brief = format!("{} [options] FEED...", opts.short_usage(env!("CARGO_PKG_NAME")));
    opts.usage(&brief)
}

pub fn parse(args: Vec<String>) -> Args {
    let opts = opts();

    let matches = match opts.parse(args) {
        Ok(matches) => matches,
        Err(fail) => {
            eprintln!("{fail}");
            process::exit(1);
        }
    };

    if matches.opt_present("help") {
        println!("{}", usage(&opts));
        process::exit(0);
    }

    if matches.free.is_empty() {
        eprintln!("No feeds given\n\n{}", usage(&opts));
        process::exit(1);
    }

    let output = matches
        .opt_str("output")
        .map_or_else(|| PathBuf::from("calendar"), PathBuf::from);

    let layout = match matches.opt_str("layout").as_deref() {
        None | Some("month") => Layout::Month,
        Some("list") => Layout::List,
        Some(other) => {
            eprintln!("Provided value for option 'layout' is invalid: {other}");
            process::exit(1);
        }
    };

    let serve = if matches.opt_present("serve") {
        match matches.opt_get_default("serve", SocketAddr::from(([127, 0, 0, 1], 8080))) {
            Ok(address) => Some(address),
            Err(err) => {
                eprintln!("Provided value for option 'serve' is invalid: {err}");
                process::exit(1);
            }
        }
    } else {
        None
    };

    let criteria = criteria(&matches);
    let json = matches.opt_present("json");

    Args {
        sources: matches.free,
        output,
        criteria,
        layout,
        json,
        serve,
    }
}

fn criteria(matches: &Matches) -> FilterCriteria {
    let date = |name: &str| {
        matches.opt_str(name).map(|text| match parse_date(&text) {
            Some(date) => date,
            None => {
                eprintln!("Provided value for option '{name}' is invalid: {text}");
                process::exit(1);
            }
        })
    };

    let time_range = match (date("from"), date("to")) {
        (Some(from), Some(to)) => Some((from, to)),
        (None, None) => None,
        _ => {
            eprintln!("Options 'from' and 'to' must be given together");
            process::exit(1);
        }
    };

    FilterCriteria {
        keyword: matches.opt_str("keyword"),
        location: matches.opt_str("location"),
        time_range,
        actor: matches.opt_str("actor"),
    }
}
