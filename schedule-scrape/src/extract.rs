//! HTML extraction of a weekly schedule page.
//!
//! The page contract is fixed by the college site:
//! - a centred title such as `Расписание занятий на 01.12.2025-06.12.2025`;
//! - one table cell per teaching day, addressed by id (`td#monday` ..
//!   `td#saturday`), holding one `<li>` per lesson.
//!
//! A missing cell means the day is not in the document and leaves no key in
//! [`WeekSchedule::days`]; a cell without lessons yields an empty list.

use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::dates::{resolve_current_day_date, resolve_week_dates};
use crate::error::ScrapeError;
use crate::types::{DaySchedule, WeekSchedule, Weekday};

/// Nodes that may carry the week title, searched in document order.
const TITLE_SELECTOR: &str = "center, [align=center], .text-center, caption, h1, h2, h3";

/// Marker word `на` followed by the date range.
const DATE_RANGE_PATTERN: &str =
    r"(?i)\bна\s+(\d{2}\.\d{2}\.\d{4})\s*-\s*(\d{2}\.\d{2}\.\d{4})";

/// Extract a schedule, resolving "today" with the local clock.
///
/// # Errors
///
/// Returns [`ScrapeError::Parse`] only if a built-in selector or pattern
/// fails to compile. Missing nodes are never errors.
pub fn extract(html: &str) -> Result<WeekSchedule, ScrapeError> {
    extract_at(html, chrono::Local::now().date_naive())
}

/// Extract a schedule with an explicit "today".
pub fn extract_at(html: &str, today: NaiveDate) -> Result<WeekSchedule, ScrapeError> {
    let document = Html::parse_document(html);

    let date_range = find_date_range(&document)?.unwrap_or_default();
    let dates = resolve_week_dates(&date_range);

    let mut schedule = WeekSchedule {
        current_day: resolve_current_day_date(&date_range, today).unwrap_or_default(),
        date_range,
        ..Default::default()
    };

    for day in Weekday::ALL {
        let Some(lessons) = day_lessons(&document, day)? else {
            continue;
        };
        let date = dates.get(&day).cloned().unwrap_or_default();
        schedule.days.insert(day, DaySchedule { lessons, date });
    }

    tracing::trace!(
        date_range = %schedule.date_range,
        days = schedule.days.len(),
        "schedule extracted"
    );

    Ok(schedule)
}

/// Find the first title node announcing the week and return the normalised
/// `dd.mm.yyyy-dd.mm.yyyy` range.
fn find_date_range(document: &Html) -> Result<Option<String>, ScrapeError> {
    let title_sel = parse_selector(TITLE_SELECTOR)?;
    let pattern = Regex::new(DATE_RANGE_PATTERN)
        .map_err(|e| ScrapeError::Parse(format!("invalid date range pattern: {e}")))?;

    for node in document.select(&title_sel) {
        let text = node.text().collect::<String>();
        if let Some(caps) = pattern.captures(&text) {
            return Ok(Some(format!("{}-{}", &caps[1], &caps[2])));
        }
    }
    Ok(None)
}

/// Lessons of one day, or `None` if the document has no cell for it.
fn day_lessons(document: &Html, day: Weekday) -> Result<Option<Vec<String>>, ScrapeError> {
    let cell_sel = parse_selector(&format!("td#{}", day.key()))?;
    let fallback_sel = parse_selector(&format!("#{}", day.key()))?;
    let item_sel = parse_selector("li")?;

    let cell = document
        .select(&cell_sel)
        .next()
        .or_else(|| document.select(&fallback_sel).next());

    Ok(cell.map(|cell| {
        cell.select(&item_sel)
            .map(lesson_text)
            .filter(|text| !text.is_empty())
            .collect()
    }))
}

/// Visible text of a list item with whitespace runs collapsed.
fn lesson_text(item: ElementRef<'_>) -> String {
    item.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::Parse(format!("invalid selector {css}: {e:?}")))
}
