use chrono::{DateTime, Utc};
use realign_core::ComputedView;

pub struct CalendarEvent {
    pub uid: String,
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
    pub summary: String,
    pub description: String,
}

/// One sleep block and one bright-light block per day. Collapsed light
/// windows have no extent and are skipped.
pub fn view_to_events(view: &ComputedView) -> Vec<CalendarEvent> {
    let mut events = Vec::new();

    for day in &view.days {
        let date = day.date.format("%Y%m%d");
        events.push(CalendarEvent {
            uid: format!("sleep-{date}"),
            start_utc: day.sleep_start,
            end_utc: day.wake,
            summary: "Sleep".to_string(),
            description: format!("Shift vs. previous day: {:+.2}h", day.shift_hours),
        });

        if !day.bright_collapsed {
            events.push(CalendarEvent {
                uid: format!("light-{date}"),
                start_utc: day.bright_start,
                end_utc: day.bright_end,
                summary: "Bright light".to_string(),
                description: "Seek daylight or a light box.".to_string(),
            });
        }
    }

    events
}

/// Emit a minimal ICS calendar containing VEVENT blocks.
///
/// DTSTART/DTEND are UTC.
pub fn events_to_ics(events: &[CalendarEvent]) -> String {
    let mut s = String::new();
    s.push_str("BEGIN:VCALENDAR\nVERSION:2.0\nPRODID:-//Realign//EN\n");

    for e in events {
        let dtstart = e.start_utc.format("%Y%m%dT%H%M%SZ");
        let dtend = e.end_utc.format("%Y%m%dT%H%M%SZ");

        s.push_str("BEGIN:VEVENT\n");
        s.push_str(&format!("UID:{}@realign\n", e.uid));
        s.push_str(&format!("DTSTART:{}\n", dtstart));
        s.push_str(&format!("DTEND:{}\n", dtend));
        s.push_str(&format!("SUMMARY:{}\n", escape_ics(&e.summary)));
        s.push_str(&format!("DESCRIPTION:{}\n", escape_ics(&e.description)));
        s.push_str("END:VEVENT\n");
    }

    s.push_str("END:VCALENDAR\n");
    s
}

fn escape_ics(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace(',', "\\,")
        .replace(';', "\\;")
}
