//! Date helpers for gallery pages. Galleries are dated either with a plain
//! `YYYY-MM-DD` date or with a photo-stream id, `YYYY/DDD`, where `DDD` is the
//! 1-based day of the year.

use chrono::NaiveDate;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")?)
}

/// Parses the date out of a photo-stream id such as `2024/123`.
pub fn parse_date_from_id(id: &str) -> Result<NaiveDate> {
    id.parse::<StreamId>()?.date()
}

/// Parses either a `YYYY-MM-DD` date or a stream id.
pub fn parse_any(s: &str) -> Result<NaiveDate> {
    if s.contains('/') {
        parse_date_from_id(s)
    } else {
        parse_date(s)
    }
}

/// Formats a date the long British way, e.g. `2 May 2024`.
pub fn format_long(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

/// Orders dates (either form accepted by [`parse_any`]) most recent first.
/// Dates that don't parse sort after all valid ones, in plain string order.
pub fn newest_first(a: &str, b: &str) -> Ordering {
    match (parse_any(a), parse_any(b)) {
        (Ok(a), Ok(b)) => b.cmp(&a),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// The identifier of a photo-a-day stream entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StreamId {
    pub year: i32,

    /// 1-based day of the year.
    pub day: u32,
}

impl StreamId {
    pub fn date(self) -> Result<NaiveDate> {
        NaiveDate::from_yo_opt(self.year, self.day).ok_or(Error::DayOutOfRange {
            year: self.year,
            day: self.day,
        })
    }
}

impl FromStr for StreamId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidStreamId(s.to_owned());
        let parts: Vec<&str> = s.split('/').collect();
        match parts.as_slice() {
            [year, day] => Ok(StreamId {
                year: year.parse().map_err(|_| invalid())?,
                day: day.parse().map_err(|_| invalid())?,
            }),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.year, self.day)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents a date that can't be parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Returned when a `YYYY-MM-DD` date doesn't parse.
    Parse(chrono::ParseError),

    /// Returned when a stream id isn't of the form `YYYY/DDD`.
    InvalidStreamId(String),

    /// Returned when a stream id names a day its year doesn't have.
    DayOutOfRange { year: i32, day: u32 },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => err.fmt(f),
            Error::InvalidStreamId(id) => write!(f, "invalid stream id `{}`", id),
            Error::DayOutOfRange { year, day } => {
                write!(f, "{} has no day {}", year, day)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<chrono::ParseError> for Error {
    /// Converts [`chrono::ParseError`]s into [`Error`]. This allows us to use
    /// the `?` operator when parsing dates.
    fn from(err: chrono::ParseError) -> Error {
        Error::Parse(err)
    }
}
