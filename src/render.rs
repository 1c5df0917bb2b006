//! Plain-text rendering of schedules for chat replies.

use schedule_scrape::{WeekSchedule, Weekday};

/// Longest weekly message sent in one piece, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4000;

const TRUNCATION_MARKER: &str = "\n\n... (сообщение слишком длинное)";
const NOT_FOUND: &str = "Данные не найдены";
const SEPARATOR_WIDTH: usize = 30;

/// One day of `group`'s schedule.
pub fn render_day(schedule: &WeekSchedule, day: Weekday, group: &str) -> String {
    let name = day.display_name();
    let Some(day_schedule) = schedule.day(day) else {
        return format!("Группа: {group}\n{name}\n\n{NOT_FOUND}");
    };
    let date = &day_schedule.date;

    if day_schedule.lessons.is_empty() {
        return format!("Группа: {group}\n{date}\n{name}\n\nЗанятий нет 🎉");
    }

    let mut out = format!("Группа: {group}\n");
    if !date.is_empty() {
        out.push_str(date);
        out.push('\n');
    }
    out.push_str(name);
    out.push_str(":\n\n");
    for lesson in &day_schedule.lessons {
        out.push_str(lesson);
        out.push('\n');
    }
    out
}

/// The whole week of `group`'s schedule, truncated to
/// [`MAX_MESSAGE_CHARS`] characters.
pub fn render_week(schedule: &WeekSchedule, group: &str) -> String {
    let mut out = format!("РАСПИСАНИЕ НА НЕДЕЛЮ\nГруппа: {group}\n");
    if schedule.is_empty() && schedule.date_range.is_empty() {
        out.push('\n');
        out.push_str(NOT_FOUND);
        return out;
    }

    if !schedule.date_range.is_empty() {
        out.push_str(&format!("Период: {}\n", schedule.date_range));
    }
    if !schedule.current_day.is_empty() {
        out.push_str(&format!("Сегодня: {}\n", schedule.current_day));
    }
    out.push('\n');
    out.push_str(&"=".repeat(SEPARATOR_WIDTH));
    out.push_str("\n\n");

    for day in Weekday::ALL {
        out.push_str(&format!("▫️ {}\n", day.display_name().to_uppercase()));
        let day_schedule = schedule.day(day);
        if let Some(date) = day_schedule.map(|d| d.date.as_str()).filter(|d| !d.is_empty()) {
            out.push_str(date);
            out.push('\n');
        }
        match day_schedule.filter(|d| !d.lessons.is_empty()) {
            Some(d) => {
                for lesson in &d.lessons {
                    out.push_str(&format!("  {lesson}\n"));
                }
            }
            None => out.push_str("  🎉 Занятий нет\n"),
        }
        out.push('\n');
    }

    truncate_message(out)
}

fn truncate_message(text: String) -> String {
    match text.char_indices().nth(MAX_MESSAGE_CHARS) {
        Some((cut, _)) => {
            let mut truncated = text[..cut].to_owned();
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        }
        None => text,
    }
}
