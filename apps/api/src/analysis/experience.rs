//! Experience Estimator: total years of experience from date ranges and
//! "N years of experience" phrases, plus the derived seniority level.
//!
//! Range boundaries:
//! - a start without a month begins in January,
//! - an end with a month includes that whole month,
//! - a year-only end marks the start of that year (2018–2021 = 3 years); a
//!   same-year range ("2020 - 2020") covers that one year,
//! - "present" / "current" / "now" / "today" resolve to the run date.
//!
//! Ranges are merged into an interval union before summing, so concurrent
//! roles are counted once.

use std::fmt;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::analysis::normalizer::NormalizedDocument;

const DAYS_PER_YEAR: f64 = 365.25;
/// Stated durations above this are treated as noise.
const MAX_STATED_YEARS: f64 = 50.0;

const MONTH: &str = r"jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

static DATE_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b(?:(?P<sm>{MONTH})\.?,?\s+|(?P<smn>\d{{1,2}})\s*/\s*)?(?P<sy>(?:19|20)\d{{2}})\s*(?:-|–|—|to|until|till|through)\s*(?:(?:(?P<em>{MONTH})\.?,?\s+|(?P<emn>\d{{1,2}})\s*/\s*)?(?P<ey>(?:19|20)\d{{2}})|(?P<present>present|current|now|today|date))\b"
    ))
    .unwrap()
});

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?P<years>\d{1,2}(?:\.\d)?)\s*\+?\s*(?:years?|yrs?)\.?(?:\s+of)?\s+(?:(?:professional|industry|work|hands-on|relevant)\s+)?experience\b",
    )
    .unwrap()
});

/// Seniority buckets: <1 Entry, [1,3) Junior, [3,6) Mid, [6,10) Senior, ≥10 Lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExperienceLevel {
    Entry,
    Junior,
    Mid,
    Senior,
    Lead,
}

impl ExperienceLevel {
    pub fn from_years(years: f64) -> Self {
        match years {
            y if y >= 10.0 => ExperienceLevel::Lead,
            y if y >= 6.0 => ExperienceLevel::Senior,
            y if y >= 3.0 => ExperienceLevel::Mid,
            y if y >= 1.0 => ExperienceLevel::Junior,
            _ => ExperienceLevel::Entry,
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExperienceLevel::Entry => "Entry",
            ExperienceLevel::Junior => "Junior",
            ExperienceLevel::Mid => "Mid",
            ExperienceLevel::Senior => "Senior",
            ExperienceLevel::Lead => "Lead",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExperienceEstimate {
    pub total_years: f64,
    pub level: ExperienceLevel,
}

/// Half-open date interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Interval {
    start: NaiveDate,
    end: NaiveDate,
}

pub fn estimate_experience(doc: &NormalizedDocument, as_of: NaiveDate) -> ExperienceEstimate {
    let intervals: Vec<Interval> = doc
        .lines
        .iter()
        .flat_map(|line| DATE_RANGE_RE.captures_iter(line))
        .filter_map(|caps| parse_range(&caps, as_of))
        .collect();

    let union_years = merged_days(intervals) as f64 / DAYS_PER_YEAR;

    let stated_years = doc
        .lines
        .iter()
        .flat_map(|line| DURATION_RE.captures_iter(line))
        .filter_map(|caps| caps["years"].parse::<f64>().ok())
        .filter(|y| *y <= MAX_STATED_YEARS)
        .fold(None, |acc: Option<f64>, y| Some(acc.map_or(y, |a| a.max(y))));

    let total = match stated_years {
        Some(stated) => stated.max(union_years),
        None => union_years,
    };
    let total_years = (total * 10.0).round() / 10.0;

    ExperienceEstimate {
        total_years,
        level: ExperienceLevel::from_years(total_years),
    }
}

fn parse_range(caps: &Captures<'_>, as_of: NaiveDate) -> Option<Interval> {
    let start_year: i32 = caps["sy"].parse().ok()?;
    let start_month = month_of(group(caps, "sm"), group(caps, "smn")).unwrap_or(1);
    let start = NaiveDate::from_ymd_opt(start_year, start_month, 1)?;

    let end = if caps.name("present").is_some() {
        as_of
    } else {
        let end_year: i32 = caps["ey"].parse().ok()?;
        let end_month = month_of(group(caps, "em"), group(caps, "emn"));
        match end_month {
            Some(month) => first_of_next_month(end_year, month)?,
            None if end_year == start_year => NaiveDate::from_ymd_opt(end_year + 1, 1, 1)?,
            None => NaiveDate::from_ymd_opt(end_year, 1, 1)?,
        }
    };

    let end = end.min(as_of);
    (start < end).then_some(Interval { start, end })
}

fn group<'t>(caps: &Captures<'t>, name: &str) -> Option<&'t str> {
    caps.name(name).map(|m| m.as_str())
}

fn month_of(name: Option<&str>, number: Option<&str>) -> Option<u32> {
    if let Some(name) = name {
        let month = match name.get(..3)? {
            "jan" => 1,
            "feb" => 2,
            "mar" => 3,
            "apr" => 4,
            "may" => 5,
            "jun" => 6,
            "jul" => 7,
            "aug" => 8,
            "sep" => 9,
            "oct" => 10,
            "nov" => 11,
            "dec" => 12,
            _ => return None,
        };
        return Some(month);
    }
    number
        .and_then(|n| n.parse::<u32>().ok())
        .filter(|m| (1..=12).contains(m))
}

fn first_of_next_month(year: i32, month: u32) -> Option<NaiveDate> {
    if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
}

/// Total days covered by the union of `intervals`.
fn merged_days(mut intervals: Vec<Interval>) -> i64 {
    intervals.sort();

    let mut total = 0;
    let mut current: Option<Interval> = None;
    for next in intervals {
        current = match current {
            Some(cur) if next.start <= cur.end => Some(Interval {
                start: cur.start,
                end: cur.end.max(next.end),
            }),
            Some(cur) => {
                total += (cur.end - cur.start).num_days();
                Some(next)
            }
            None => Some(next),
        };
    }
    if let Some(cur) = current {
        total += (cur.end - cur.start).num_days();
    }
    total
}
