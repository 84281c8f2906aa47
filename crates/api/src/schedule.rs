//! The motorsport calendar: `!next` replies and start reminders.

use alloc::{boxed::Box, collections::BTreeSet, format, string::String, vec::Vec};
use chrono::{DateTime, Duration, Offset, Utc};
use chrono_tz::Tz;
use model::Event;

/// Zone used for users without a known time zone.
pub const DEFAULT_ZONE: Tz = chrono_tz::Europe::Berlin;

/// How long before its start an event is announced.
pub const LEAD_MINUTES: i64 = 5;

/// One-line summary of `event` in the given zone, with the time left until it starts.
pub fn describe(event: &Event, zone: Tz, now: DateTime<Utc>) -> String {
    let local = event.start.with_timezone(&zone);
    let offset = local.offset().fix().local_minus_utc() / 3600;
    let left = (event.start - now).num_minutes().max(0);
    let (days, hours, minutes) = (left / (24 * 60), left / 60 % 24, left % 60);
    format!(
        "{} \x02{} (UTC{offset:+})\x02 | {} | {days} day(s), {hours} hour(s), {minutes} minute(s)",
        local.format("%A, %-d %B at %H:%M"),
        local.format("%Z"),
        event.title(),
    )
}

/// Remembers which events were already announced so that every start is announced once.
#[derive(Default)]
pub struct Reminder {
    announced: BTreeSet<(DateTime<Utc>, Box<str>)>,
}

impl Reminder {
    /// Events starting within the lead time that were not announced yet. They count as
    /// announced from now on.
    pub fn due<'ev>(&mut self, events: &'ev [Event], now: DateTime<Utc>) -> Vec<&'ev Event> {
        self.announced.retain(|(start, _)| *start >= now);

        let horizon = now + Duration::minutes(LEAD_MINUTES);
        let mut due = Vec::new();
        for event in events.iter().filter(|event| (now..=horizon).contains(&event.start)) {
            if self.announced.insert((event.start, event.title().into())) {
                due.push(event);
            }
        }
        due
    }
}
