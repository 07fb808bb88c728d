// ABOUTME: Date processors: FormatTime, RelativeDateResolve and ToAge.
// ABOUTME: Templates accept any non-digit separators, so "2021年3月4日" and "2021/03/04" both parse.

//! Date parsing for scraped text.
//!
//! `FormatTime` tries, in order: a caller-supplied chrono pattern, RFC 3339
//! and RFC 2822 (which carry their own offset), a descending list of
//! year-month-day-hour-minute-second templates, and finally the generic
//! `dateparser` fallback. Pattern and template matches carry no zone and
//! are tagged UTC, so output does not depend on the host's time zone. Only
//! the `dateparser` fallback and integer timestamps are converted to local
//! time.
//!
//! `RelativeDateResolve` turns phrases like "3天前", "昨天" or "2 hours ago"
//! into an absolute timestamp anchored at the current moment.

use chrono::{
    DateTime, Datelike, Days, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone,
    Timelike, Utc,
};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::Processor;
use crate::value::Value;

/// Date templates from most to least specific.
static TEMPLATES: Lazy<Vec<Regex>> = Lazy::new(|| {
    const Y: &str = r"(?P<y>\d{4})";
    const MO: &str = r"\D(?P<mo>\d{1,2})";
    const D: &str = r"\D(?P<d>\d{1,2})";
    const H: &str = r"\D+(?P<h>\d{1,2})";
    const MI: &str = r"\D(?P<mi>\d{1,2})";
    const S: &str = r"\D(?P<s>\d{1,2})";
    const AP: &str = r"\D(?P<ap>[AaPp][Mm])";
    let bodies = [
        [Y, MO, D, H, MI, S, AP].concat(),
        [Y, MO, D, H, MI, S].concat(),
        [Y, MO, D, H, MI, AP].concat(),
        [Y, MO, D, H, MI].concat(),
        [Y, MO, D, H, AP].concat(),
        [Y, MO, D, H].concat(),
        [Y, MO, D].concat(),
        [Y, MO].concat(),
        Y.to_string(),
    ];
    bodies
        .iter()
        .map(|body| Regex::new(&format!(r"^\D*?{}\D*$", body)).unwrap())
        .collect()
});

static TODAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"今日|刚刚|今天|在线|(?i:today|just now)").unwrap());
static TWO_DAYS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"前日|前天|(?i:(?:the )?day before yesterday)").unwrap());
static ONE_DAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"昨日|昨天|(?i:yesterday)").unwrap());
static DAYS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*(?:[天日]|(?i:days?\b))").unwrap());
static HOURS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*(?:小时|(?i:hours?\b))").unwrap());

fn local_now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

fn as_utc(naive: &NaiveDateTime) -> DateTime<FixedOffset> {
    Utc.from_utc_datetime(naive).fixed_offset()
}

fn group(caps: &Captures<'_>, name: &str, default: u32) -> Option<u32> {
    match caps.name(name) {
        Some(m) => m.as_str().parse().ok(),
        None => Some(default),
    }
}

/// Builds a naive datetime from a template match, honoring an am/pm marker.
fn naive_from_captures(caps: &Captures<'_>) -> Option<NaiveDateTime> {
    let year: i32 = caps.name("y")?.as_str().parse().ok()?;
    let month = group(caps, "mo", 1)?;
    let day = group(caps, "d", 1)?;
    let mut hour = group(caps, "h", 0)?;
    let minute = group(caps, "mi", 0)?;
    let second = group(caps, "s", 0)?;

    if let Some(ap) = caps.name("ap") {
        let pm = ap.as_str().eq_ignore_ascii_case("pm");
        match (pm, hour) {
            (_, h) if h > 12 => return None,
            (true, h) if h < 12 => hour = h + 12,
            (false, 12) => hour = 0,
            _ => {}
        }
    }

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
}

/// Parses dates out of free-form text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatTime {
    pattern: Option<String>,
}

impl FormatTime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tries a chrono format string (e.g. `"%d/%m/%Y %H:%M"`) before the templates.
    pub fn with_pattern(pattern: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern.into()),
        }
    }

    fn parse_with_pattern(&self, s: &str) -> Option<DateTime<FixedOffset>> {
        let pattern = self.pattern.as_deref()?;
        if let Ok(dt) = DateTime::parse_from_str(s, pattern) {
            return Some(dt);
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, pattern) {
            return Some(as_utc(&naive));
        }
        let date = NaiveDate::parse_from_str(s, pattern).ok()?;
        Some(as_utc(&date.and_hms_opt(0, 0, 0)?))
    }

    fn parse_with_templates(s: &str) -> Option<DateTime<FixedOffset>> {
        TEMPLATES
            .iter()
            .filter_map(|re| re.captures(s))
            .find_map(|caps| naive_from_captures(&caps))
            .map(|naive| as_utc(&naive))
    }

    /// Parses `s`, returning `None` when every strategy fails.
    pub fn parse(&self, s: &str) -> Option<DateTime<FixedOffset>> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        self.parse_with_pattern(s)
            .or_else(|| DateTime::parse_from_rfc3339(s).ok())
            .or_else(|| DateTime::parse_from_rfc2822(s).ok())
            .or_else(|| Self::parse_with_templates(s))
            .or_else(|| {
                dateparser::parse(s)
                    .ok()
                    .map(|dt| dt.with_timezone(&Local).fixed_offset())
            })
    }
}

impl Processor for FormatTime {
    fn apply(&self, value: &Value) -> Option<Value> {
        match value {
            Value::Time(t) => Some(Value::Time(*t)),
            Value::Str(s) => self.parse(s).map(Value::Time),
            Value::Int(ts) => DateTime::from_timestamp(*ts, 0)
                .map(|dt| Value::Time(dt.with_timezone(&Local).fixed_offset())),
            _ => None,
        }
    }
}

/// Resolves vernacular relative dates against the current moment.
///
/// Day-granularity phrases resolve to noon of the target day; hour
/// offsets resolve to the current hour (minutes and seconds zeroed) minus
/// the offset. Unrecognized input yields `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelativeDateResolve {
    anchor: Option<DateTime<FixedOffset>>,
}

impl RelativeDateResolve {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves against a fixed moment instead of the wall clock.
    pub fn anchored(now: DateTime<FixedOffset>) -> Self {
        Self { anchor: Some(now) }
    }

    fn now(&self) -> DateTime<FixedOffset> {
        self.anchor.unwrap_or_else(local_now)
    }

    /// Noon `days` before today. Anchored runs keep the anchor's offset;
    /// otherwise noon is resolved in the local zone, so a DST change between
    /// today and the target day is honored.
    fn noon_days_back(
        &self,
        now: &DateTime<FixedOffset>,
        days: u64,
    ) -> Option<DateTime<FixedOffset>> {
        let date = now.date_naive().checked_sub_days(Days::new(days))?;
        let noon = date.and_hms_opt(12, 0, 0)?;
        match self.anchor {
            Some(anchor) => anchor.offset().from_local_datetime(&noon).single(),
            None => Local
                .from_local_datetime(&noon)
                .earliest()
                .map(|dt| dt.fixed_offset()),
        }
    }

    pub fn resolve(&self, phrase: &str) -> Option<DateTime<FixedOffset>> {
        let now = self.now();
        let phrase = TWO_DAYS.replace_all(phrase, "2天");
        let phrase = ONE_DAY.replace_all(&phrase, "1天");

        if TODAY.is_match(&phrase) {
            return self.noon_days_back(&now, 0);
        }
        if let Some(caps) = DAYS.captures(&phrase) {
            let days: u64 = caps[1].parse().ok()?;
            return self.noon_days_back(&now, days);
        }
        if let Some(caps) = HOURS.captures(&phrase) {
            let hours: i64 = caps[1].parse().ok()?;
            let top_of_hour = now.with_minute(0)?.with_second(0)?.with_nanosecond(0)?;
            return top_of_hour.checked_sub_signed(Duration::try_hours(hours)?);
        }
        None
    }
}

impl Processor for RelativeDateResolve {
    fn apply(&self, value: &Value) -> Option<Value> {
        value.as_str().and_then(|s| self.resolve(s)).map(Value::Time)
    }
}

/// Converts a birth date into an age in years (calendar-year difference).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToAge {
    parser: FormatTime,
    anchor: Option<DateTime<FixedOffset>>,
}

impl ToAge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anchored(now: DateTime<FixedOffset>) -> Self {
        Self {
            parser: FormatTime::new(),
            anchor: Some(now),
        }
    }
}

impl Processor for ToAge {
    fn apply(&self, value: &Value) -> Option<Value> {
        let born = match value {
            Value::Time(t) => *t,
            Value::Str(s) => self.parser.parse(s)?,
            _ => return None,
        };
        let now = self.anchor.unwrap_or_else(local_now);
        Some(Value::Int(i64::from(now.year() - born.year())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 10, 15, 42, 7)
            .unwrap()
    }

    fn naive(t: Option<DateTime<FixedOffset>>) -> NaiveDateTime {
        t.expect("parsed").naive_local()
    }

    fn ymd_hms(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_format_time_chinese_date() {
        let t = FormatTime::new().parse("2021年3月4日 10:20");
        assert_eq!(naive(t), ymd_hms(2021, 3, 4, 10, 20, 0));
    }

    #[test]
    fn test_format_time_full_with_pm() {
        let t = FormatTime::new().parse("2021-03-04 10:20:30 PM");
        assert_eq!(naive(t), ymd_hms(2021, 3, 4, 22, 20, 30));
    }

    #[test]
    fn test_format_time_twelve_am_is_midnight() {
        let t = FormatTime::new().parse("2021/03/04 12:05 am");
        assert_eq!(naive(t), ymd_hms(2021, 3, 4, 0, 5, 0));
    }

    #[test]
    fn test_format_time_prefix_and_year_month_only() {
        let t = FormatTime::new().parse("发布于 2020.07");
        assert_eq!(naive(t), ymd_hms(2020, 7, 1, 0, 0, 0));
    }

    #[test]
    fn test_format_time_invalid_calendar_date_falls_through() {
        assert!(FormatTime::new().parse("2021-02-30").is_none());
    }

    #[test]
    fn test_format_time_rfc3339_uses_fallback() {
        let t = FormatTime::new().parse("2023-06-15T14:30:00Z").expect("parsed");
        assert_eq!(t.timestamp(), 1_686_839_400);
    }

    #[test]
    fn test_format_time_template_match_is_utc() {
        let t = FormatTime::new().parse("2021-03-04 10:20").expect("parsed");
        assert_eq!(t.offset().local_minus_utc(), 0);
        assert_eq!(t.timestamp(), 1_614_853_200);

        let t = FormatTime::with_pattern("%d/%m/%Y").parse("04/03/2021").expect("parsed");
        assert_eq!(t.offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_format_time_custom_pattern_first() {
        let t = FormatTime::with_pattern("%d/%m/%Y").parse("04/03/2021");
        assert_eq!(naive(t), ymd_hms(2021, 3, 4, 0, 0, 0));
    }

    #[test]
    fn test_format_time_garbage_is_none() {
        assert!(FormatTime::new().parse("not a date").is_none());
        assert!(FormatTime::new().apply(&Value::list(["2021"])).is_none());
    }

    #[test]
    fn test_relative_today_is_noon() {
        let t = RelativeDateResolve::anchored(anchor()).resolve("今日").unwrap();
        assert_eq!(t.day(), 10);
        assert_eq!((t.hour(), t.minute(), t.second()), (12, 0, 0));
    }

    #[test]
    fn test_relative_days_ago_is_noon() {
        let r = RelativeDateResolve::anchored(anchor());
        let t = r.resolve("3天前").unwrap();
        assert_eq!(t.naive_local(), ymd_hms(2024, 3, 7, 12, 0, 0));
        assert_eq!((anchor().date_naive() - t.date_naive()).num_days(), 3);
    }

    #[test]
    fn test_relative_noon_keeps_anchor_offset() {
        let t = RelativeDateResolve::anchored(anchor()).resolve("2 days ago").unwrap();
        assert_eq!(t.offset(), anchor().offset());
        assert_eq!(t.naive_local(), ymd_hms(2024, 3, 8, 12, 0, 0));
    }

    #[test]
    fn test_relative_noon_unanchored_is_local_noon() {
        let t = RelativeDateResolve::new().resolve("30天前").unwrap();
        let local = t.with_timezone(&Local);
        assert_eq!((local.hour(), local.minute(), local.second()), (12, 0, 0));
        assert_eq!(
            (Local::now().date_naive() - local.date_naive()).num_days(),
            30
        );
    }

    #[test]
    fn test_relative_yesterday_variants() {
        let r = RelativeDateResolve::anchored(anchor());
        assert_eq!(r.resolve("昨天").unwrap().day(), 9);
        assert_eq!(r.resolve("前天 发布").unwrap().day(), 8);
        assert_eq!(r.resolve("Yesterday").unwrap().day(), 9);
    }

    #[test]
    fn test_relative_hours_ago() {
        let t = RelativeDateResolve::anchored(anchor())
            .resolve("5小时前")
            .unwrap();
        assert_eq!(t.naive_local(), ymd_hms(2024, 3, 10, 10, 0, 0));
        let t = RelativeDateResolve::anchored(anchor())
            .resolve("2 hours ago")
            .unwrap();
        assert_eq!(t.naive_local(), ymd_hms(2024, 3, 10, 13, 0, 0));
    }

    #[test]
    fn test_relative_unknown_is_none() {
        let r = RelativeDateResolve::anchored(anchor());
        assert!(r.resolve("上个月").is_none());
        assert!(r.apply(&Value::Int(3)).is_none());
    }

    #[test]
    fn test_to_age() {
        let age = ToAge::anchored(anchor()).apply(&Value::from("1990-05-01"));
        assert_eq!(age, Some(Value::Int(34)));
        assert_eq!(ToAge::anchored(anchor()).apply(&Value::from("??")), None);
    }
}
