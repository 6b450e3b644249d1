//! The two free-text time grammars found in aggregator feeds.
//!
//! One-time entries read like `When: Wed Sep 14, 2011 4:30pm to 6pm EDT`,
//! recurring ones carry a `First start: 2011-09-07 12:00:00 EDT` line and an
//! optional `Duration: 3600` line. Both are tokenized with the same split
//! pattern. Zone names in the text are ignored and every time is taken as UTC.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeDescriptor<'a> {
    OneTime(&'a str),
    Recurring {
        start: &'a str,
        duration: Option<&'a str>,
    },
}

impl<'a> TimeDescriptor<'a> {
    /// Picks the grammar from the text lines of an entry's content block.
    pub fn classify<S: AsRef<str>>(lines: &'a [S]) -> Option<Self> {
        let first = lines.first()?.as_ref();
        if first.starts_with("When") {
            return Some(Self::OneTime(first));
        }

        let start = lines
            .iter()
            .map(AsRef::<str>::as_ref)
            .find(|line| line.starts_with("First start"))
            .or_else(|| lines.get(1).map(AsRef::<str>::as_ref))?;

        let duration = lines
            .iter()
            .map(AsRef::<str>::as_ref)
            .find(|line| line.starts_with("Duration"));

        Some(Self::Recurring { start, duration })
    }

    /// Start and end of the described occurrence.
    pub fn span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match *self {
            Self::OneTime(text) => parse_one_time(text),
            Self::Recurring { start, duration } => {
                let start = parse_recurring_start(start)?;
                let end = match duration {
                    Some(line) => {
                        let seconds = tokens(line).get(1)?.parse::<i64>().ok()?;
                        start.checked_add_signed(Duration::try_seconds(seconds)?)?
                    }
                    None => start,
                };
                Some((start, end))
            }
        }
    }
}

/// Splits on whitespace (NBSP included), `:`, `,`, `-` and `<`.
pub(crate) fn tokens(text: &str) -> Vec<&str> {
    text.split(|c: char| c.is_whitespace() || matches!(c, ':' | ',' | '-' | '<'))
        .filter(|token| !token.is_empty())
        .collect()
}

/// Year, month, day, hour and minute follow the leading label positionally.
pub fn parse_recurring_start(text: &str) -> Option<DateTime<Utc>> {
    let tokens = tokens(text);
    let fields = tokens
        .iter()
        .skip_while(|token| !is_numeric(token))
        .map(|token| token.parse::<u32>().ok())
        .collect::<Vec<_>>();

    let year = i32::try_from((*fields.first()?)?).ok()?;
    let month = (*fields.get(1)?)?;
    let day = (*fields.get(2)?)?;
    let hour = fields.get(3).copied().flatten().unwrap_or(0);
    let minute = fields.get(4).copied().flatten().unwrap_or(0);

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
    Some(date.and_time(time).and_utc())
}

/// Parses `Mon D YYYY [time] [to [Mon D YYYY] [time]]`, ignoring anything
/// before the month and after the end time. An end before the start is
/// rejected.
pub fn parse_one_time(text: &str) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let tokens = tokens(text);
    let month_idx = tokens.iter().position(|token| month_number(token).is_some())?;

    let (date, idx) = parse_date(&tokens, month_idx)?;
    let (start, idx) = at_clock(date, &tokens, idx)?;

    if tokens.get(idx) != Some(&"to") {
        return Some((start, start));
    }

    // The end date may be preceded by its weekday name.
    let (end_date, idx) = parse_date(&tokens, idx + 1)
        .or_else(|| parse_date(&tokens, idx + 2))
        .unwrap_or((date, idx + 1));
    let (end, _) = at_clock(end_date, &tokens, idx)?;

    (start <= end).then_some((start, end))
}

/// Combines `date` with the clock time at `idx`, or with midnight when no
/// time follows. A time token that doesn't parse fails the whole descriptor.
fn at_clock(date: NaiveDate, tokens: &[&str], idx: usize) -> Option<(DateTime<Utc>, usize)> {
    let has_time = tokens
        .get(idx)
        .is_some_and(|token| token.starts_with(|c: char| c.is_ascii_digit()));

    if !has_time {
        return Some((date.and_hms_opt(0, 0, 0)?.and_utc(), idx));
    }

    let (time, consumed) = parse_clock(tokens, idx)?;
    Some((date.and_time(time).and_utc(), idx + consumed))
}

fn month_number(token: &str) -> Option<u32> {
    if token.len() != 3 {
        return None;
    }

    let lower = token.to_ascii_lowercase();
    let idx = MONTHS.iter().position(|month| *month == lower)?;
    u32::try_from(idx + 1).ok()
}

fn parse_date(tokens: &[&str], idx: usize) -> Option<(NaiveDate, usize)> {
    let month = month_number(tokens.get(idx)?)?;
    let day = tokens.get(idx + 1)?.parse::<u32>().ok()?;

    let year_token = tokens.get(idx + 2)?;
    let year = year_token
        .get(..4)
        .unwrap_or(year_token)
        .parse::<i32>()
        .ok()?;

    Some((NaiveDate::from_ymd_opt(year, month, day)?, idx + 3))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

/// Splits `11am` into `("11", Some(Am))`. An `am` suffix is cut at the `a`,
/// a `pm` suffix at the `pm`.
fn split_meridiem(token: &str) -> (&str, Option<Meridiem>) {
    if token.contains("am") {
        let cut = token.find('a').unwrap_or(token.len());
        (&token[..cut], Some(Meridiem::Am))
    } else if let Some(cut) = token.find("pm") {
        (&token[..cut], Some(Meridiem::Pm))
    } else {
        (token, None)
    }
}

fn adjust_hour(hour: u32, meridiem: Option<Meridiem>) -> u32 {
    match meridiem {
        Some(Meridiem::Pm) if hour < 12 => hour + 12,
        _ => hour,
    }
}

/// Reads a clock time at `idx`, returning it with the number of tokens used.
///
/// `11am` and `6pm` carry no minutes. `4:30pm` arrives split as `4` `30pm`.
/// Without a suffix the hour is 24-hour and the minutes are the first two
/// characters of the following token.
fn parse_clock(tokens: &[&str], idx: usize) -> Option<(NaiveTime, usize)> {
    let token = *tokens.get(idx)?;
    let (hour, meridiem) = split_meridiem(token);
    if meridiem.is_some() {
        let hour = adjust_hour(hour.parse().ok()?, meridiem);
        return Some((NaiveTime::from_hms_opt(hour, 0, 0)?, 1));
    }

    let hour = hour.parse::<u32>().ok()?;
    let next = *tokens.get(idx + 1)?;

    let (minute, meridiem) = split_meridiem(next);
    if meridiem.is_some() && is_numeric(minute) {
        let hour = adjust_hour(hour, meridiem);
        let minute = minute.parse().ok()?;
        return Some((NaiveTime::from_hms_opt(hour, minute, 0)?, 2));
    }

    let minute = next.get(..2).unwrap_or(next).parse().ok()?;
    Some((NaiveTime::from_hms_opt(hour, minute, 0)?, 2))
}

fn is_numeric(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}
