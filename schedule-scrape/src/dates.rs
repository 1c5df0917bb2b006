//! Date range resolution for schedule pages.
//!
//! Schedule pages announce their week as `dd.mm.yyyy-dd.mm.yyyy`. This
//! module turns that range into one calendar date per teaching day and
//! renders dates the way the site's audience reads them
//! (`1 декабря 2025`). All functions fail soft: malformed input yields an
//! empty map or `None`, never an error.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::types::Weekday;

const DATE_FORMAT: &str = "%d.%m.%Y";

/// Genitive Russian month names, January first.
const MONTHS_GENITIVE: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

/// Parse `dd.mm.yyyy-dd.mm.yyyy` into its start and end dates.
///
/// Whitespace around either date is ignored. Returns `None` if either side
/// is not a valid date or the end precedes the start.
pub fn parse_date_range(text: &str) -> Option<(NaiveDate, NaiveDate)> {
    let (start, end) = text.trim().split_once('-')?;
    let start = NaiveDate::parse_from_str(start.trim(), DATE_FORMAT).ok()?;
    let end = NaiveDate::parse_from_str(end.trim(), DATE_FORMAT).ok()?;
    (start <= end).then_some((start, end))
}

/// Render a date as `D <genitive month> YYYY`.
pub fn format_russian_date(date: NaiveDate) -> String {
    let month = MONTHS_GENITIVE[date.month0() as usize];
    format!("{} {} {}", date.day(), month, date.year())
}

/// Calendar date of every teaching day in the range.
///
/// Walks forward from the start date, skipping Sundays, and hands each
/// visited date to the next unfilled slot from Monday to Saturday. Stops when
/// all six slots are filled or the end date is passed, so the result is in
/// non-decreasing date order and never leaves `[start, end]`.
pub fn week_dates(start: NaiveDate, end: NaiveDate) -> BTreeMap<Weekday, NaiveDate> {
    let mut dates = BTreeMap::new();
    let mut slots = Weekday::ALL.into_iter();
    let mut current = start;

    while current <= end {
        if current.weekday() != chrono::Weekday::Sun {
            match slots.next() {
                Some(slot) => {
                    dates.insert(slot, current);
                }
                None => break,
            }
        }
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }

    dates
}

/// Localized date for each teaching day of a `dd.mm.yyyy-dd.mm.yyyy` range.
///
/// Returns an empty map for malformed input.
pub fn resolve_week_dates(date_range: &str) -> BTreeMap<Weekday, String> {
    let Some((start, end)) = parse_date_range(date_range) else {
        tracing::debug!(date_range, "unparseable date range");
        return BTreeMap::new();
    };
    week_dates(start, end)
        .into_iter()
        .map(|(day, date)| (day, format_russian_date(date)))
        .collect()
}

/// Localized date inside the range that corresponds to `today`'s weekday.
///
/// Uses the same slot assignment as [`week_dates`], so the result always
/// equals the date shown for that weekday. Returns `None` on Sunday, for
/// malformed input, or when the range has no slot for the weekday.
pub fn resolve_current_day_date(date_range: &str, today: NaiveDate) -> Option<String> {
    let day = Weekday::from_chrono(today.weekday())?;
    let (start, end) = parse_date_range(date_range)?;
    week_dates(start, end).get(&day).copied().map(format_russian_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn range_text(start: NaiveDate, end: NaiveDate) -> String {
        format!("{}-{}", start.format(DATE_FORMAT), end.format(DATE_FORMAT))
    }

    #[test]
    fn parses_valid_range() {
        let (start, end) = parse_date_range("01.12.2025-06.12.2025").expect("valid range");
        assert_eq!(start, date(2025, 12, 1));
        assert_eq!(end, date(2025, 12, 6));
    }

    #[test]
    fn parse_tolerates_spaces_around_dash() {
        assert!(parse_date_range(" 01.12.2025 - 06.12.2025 ").is_some());
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert!(parse_date_range("").is_none());
        assert!(parse_date_range("01.12.2025").is_none());
        assert!(parse_date_range("32.12.2025-06.12.2025").is_none());
        assert!(parse_date_range("01.13.2025-06.12.2025").is_none());
        assert!(parse_date_range("на неделю").is_none());
    }

    #[test]
    fn parse_rejects_reversed_range() {
        assert!(parse_date_range("06.12.2025-01.12.2025").is_none());
    }

    #[test]
    fn formats_russian_genitive_dates() {
        assert_eq!(format_russian_date(date(2025, 12, 1)), "1 декабря 2025");
        assert_eq!(format_russian_date(date(2026, 3, 8)), "8 марта 2026");
        assert_eq!(format_russian_date(date(2026, 5, 31)), "31 мая 2026");
    }

    #[test]
    fn monday_to_saturday_week_resolves_each_day() {
        let dates = resolve_week_dates("01.12.2025-06.12.2025");
        assert_eq!(dates.len(), 6);
        assert_eq!(dates[&Weekday::Monday], "1 декабря 2025");
        assert_eq!(dates[&Weekday::Wednesday], "3 декабря 2025");
        assert_eq!(dates[&Weekday::Saturday], "6 декабря 2025");
    }

    #[test]
    fn full_calendar_week_skips_sunday() {
        let dates = week_dates(date(2025, 12, 1), date(2025, 12, 7));
        assert_eq!(dates.len(), 6);
        assert_eq!(dates[&Weekday::Saturday], date(2025, 12, 6));
    }

    #[test]
    fn range_crossing_sunday_assigns_next_free_slot() {
        // Starts on Wednesday: Wednesday fills the Monday slot, Sunday is skipped.
        let dates = week_dates(date(2025, 12, 3), date(2025, 12, 9));
        let assigned: Vec<NaiveDate> = Weekday::ALL.iter().map(|d| dates[d]).collect();
        assert_eq!(
            assigned,
            vec![
                date(2025, 12, 3),
                date(2025, 12, 4),
                date(2025, 12, 5),
                date(2025, 12, 6),
                date(2025, 12, 8),
                date(2025, 12, 9),
            ]
        );
    }

    #[test]
    fn every_seven_day_range_yields_six_ordered_in_range_dates() {
        let mut start = date(2025, 11, 24);
        for _ in 0..60 {
            let end = start + Days::new(6);
            let dates = week_dates(start, end);
            assert_eq!(dates.len(), 6, "range starting {start}");

            let ordered: Vec<NaiveDate> = Weekday::ALL.iter().map(|d| dates[d]).collect();
            assert!(ordered.windows(2).all(|w| w[0] <= w[1]));
            assert!(ordered.iter().all(|d| *d >= start && *d <= end));
            assert!(ordered
                .iter()
                .all(|d| d.weekday() != chrono::Weekday::Sun));

            let rendered = resolve_week_dates(&range_text(start, end));
            assert_eq!(rendered.len(), 6);

            start = start.succ_opt().expect("next day");
        }
    }

    #[test]
    fn short_range_fills_only_available_slots() {
        let dates = resolve_week_dates("01.12.2025-03.12.2025");
        assert_eq!(dates.len(), 3);
        assert!(!dates.contains_key(&Weekday::Thursday));
    }

    #[test]
    fn malformed_range_yields_empty_map() {
        assert!(resolve_week_dates("garbage").is_empty());
        assert!(resolve_week_dates("").is_empty());
    }

    #[test]
    fn current_day_resolves_inside_range() {
        let today = date(2025, 12, 3);
        assert_eq!(
            resolve_current_day_date("01.12.2025-06.12.2025", today).as_deref(),
            Some("3 декабря 2025")
        );
    }

    #[test]
    fn current_day_uses_weekday_even_for_another_week() {
        // Friday of a later week still maps onto the range's Friday.
        let today = date(2025, 12, 19);
        assert_eq!(
            resolve_current_day_date("01.12.2025-06.12.2025", today).as_deref(),
            Some("5 декабря 2025")
        );
    }

    #[test]
    fn current_day_is_none_on_sunday() {
        let mut sunday = date(2025, 12, 7);
        for _ in 0..10 {
            assert_eq!(sunday.weekday(), chrono::Weekday::Sun);
            assert!(resolve_current_day_date("01.12.2025-06.12.2025", sunday).is_none());
            assert!(resolve_current_day_date("01.12.2025-07.12.2025", sunday).is_none());
            sunday = sunday + Days::new(7);
        }
    }

    #[test]
    fn current_day_outside_range_is_none() {
        // A three-day range only fills the Monday to Wednesday slots.
        let saturday = date(2025, 12, 6);
        assert!(resolve_current_day_date("01.12.2025-03.12.2025", saturday).is_none());
    }

    #[test]
    fn current_day_matches_slot_of_range_not_starting_on_monday() {
        // Tuesday start: Sunday 7.12 is skipped, so the Saturday slot is 8.12.
        let range = "02.12.2025-08.12.2025";
        let saturday = date(2025, 12, 6);
        let expected = resolve_week_dates(range).remove(&Weekday::Saturday);
        assert_eq!(expected.as_deref(), Some("8 декабря 2025"));
        assert_eq!(resolve_current_day_date(range, saturday), expected);

        let monday = date(2025, 12, 1);
        assert_eq!(
            resolve_current_day_date(range, monday).as_deref(),
            Some("2 декабря 2025")
        );
    }

    #[test]
    fn current_day_malformed_range_is_none() {
        assert!(resolve_current_day_date("01.12.2025", date(2025, 12, 1)).is_none());
    }
}
