//! This builder turns skip locations into an iCalendar feed with one event per skip day.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use sha2::{Digest, Sha256};

use crate::skip::{Coordinate, SkipLocation};

static PROD_ID: &str = "-//WhereMegaSkip//Calendar//EN";
static TIMEZONE: &str = "Europe/London";
static TITLE: &str = "Wandsworth Megaskip";
static DESCRIPTION: &str = "Opens 9am, closes at 12 noon or when full.\nhttps://wheremegaskip.com";
static UID_DOMAIN: &str = "wheremegaskip.com";
static FORMAT: &str = "%Y%m%d";
/// The file name offered to calendar clients.
pub static FILENAME: &str = "wandsworth-megaskip.ics";

const EARTH_RADIUS_KM: f64 = 6371.0;
const MAX_LINE_OCTETS: usize = 75;

/// The Europe/London rules since 1996: BST from the last Sunday of March, GMT from the last Sunday of October.
static VTIMEZONE: [&str; 17] = [
    "BEGIN:VTIMEZONE",
    "TZID:Europe/London",
    "BEGIN:DAYLIGHT",
    "TZOFFSETFROM:+0000",
    "TZOFFSETTO:+0100",
    "TZNAME:BST",
    "DTSTART:19700329T010000",
    "RRULE:FREQ=YEARLY;BYMONTH=3;BYDAY=-1SU",
    "END:DAYLIGHT",
    "BEGIN:STANDARD",
    "TZOFFSETFROM:+0100",
    "TZOFFSETTO:+0000",
    "TZNAME:GMT",
    "DTSTART:19701025T020000",
    "RRULE:FREQ=YEARLY;BYMONTH=10;BYDAY=-1SU",
    "END:STANDARD",
    "END:VTIMEZONE",
];

/// One skip day in the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub date: NaiveDate,
    pub title: String,
    pub description: String,
    /// The nearest site, only known for personalized feeds.
    pub location: Option<String>,
}

impl CalendarEvent {
    fn new(date: NaiveDate, location: Option<String>) -> Self {
        Self {
            date,
            title: String::from(TITLE),
            description: String::from(DESCRIPTION),
            location,
        }
    }
}

/// Build the feed for all skip days.
///
/// With a `user` coordinate every event is located at the nearest site of its day.
pub fn build_feed(locations: &[SkipLocation], user: Option<Coordinate>) -> String {
    let changed = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
    render(&build_events(locations, user), &changed)
}

/// One event per distinct date, ascending.
pub fn build_events(locations: &[SkipLocation], user: Option<Coordinate>) -> Vec<CalendarEvent> {
    group_by_date(locations)
        .into_iter()
        .map(|(date, skips)| {
            let location = user
                .and_then(|user| find_nearest_for_date(skips, date, user))
                .map(|nearest| format!("{}, {}, London, UK", nearest.address, nearest.postcode));
            CalendarEvent::new(date, location)
        })
        .collect()
}

/// Group the locations by day, keeping their order within a day.
pub fn group_by_date(locations: &[SkipLocation]) -> BTreeMap<NaiveDate, Vec<&SkipLocation>> {
    let mut groups: BTreeMap<NaiveDate, Vec<&SkipLocation>> = BTreeMap::new();
    for location in locations {
        groups.entry(location.date).or_default().push(location);
    }
    groups
}

/// Find the geocoded location on `date` closest to `user`. The first one wins a tie.
pub fn find_nearest_for_date<'a>(
    locations: impl IntoIterator<Item = &'a SkipLocation>,
    date: NaiveDate,
    user: Coordinate,
) -> Option<&'a SkipLocation> {
    let mut nearest: Option<(&SkipLocation, f64)> = None;
    for location in locations {
        if location.date != date {
            continue;
        }
        let Some(coordinate) = location.coordinate() else {
            continue;
        };
        let distance = haversine_km(user, coordinate);
        if nearest.map_or(true, |(_, min)| distance < min) {
            nearest = Some((location, distance));
        }
    }
    nearest.map(|(location, _)| location)
}

/// The great-circle distance in kilometres.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Escape a TEXT value (RFC 5545, 3.3.11).
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Get a unique id for the skip day on `date`.
///
/// Changing this function is a breaking change!
pub fn generate_uid(date: NaiveDate) -> String {
    let hash = Sha256::digest(date.format("%Y-%m-%d").to_string().as_bytes());
    let hex: String = hash[..8].iter().map(|byte| format!("{byte:02x}")).collect();
    format!("{hex}@{UID_DOMAIN}")
}

/// Render the events with `changed` as the DTSTAMP of each.
fn render(events: &[CalendarEvent], changed: &str) -> String {
    let mut ics = ContentLines::default();
    ics.push("BEGIN:VCALENDAR");
    ics.push("VERSION:2.0");
    ics.push(format!("PRODID:{PROD_ID}"));
    ics.push("CALSCALE:GREGORIAN");
    ics.push("METHOD:PUBLISH");
    ics.push(format!("X-WR-CALNAME:{TITLE}"));
    ics.push(format!("X-WR-TIMEZONE:{TIMEZONE}"));
    for line in VTIMEZONE {
        ics.push(line);
    }
    for event in events {
        let day = event.date.format(FORMAT);
        ics.push("BEGIN:VEVENT");
        ics.push(format!("UID:{}", generate_uid(event.date)));
        ics.push(format!("DTSTAMP:{changed}"));
        ics.push(format!("DTSTART;TZID={TIMEZONE}:{day}T090000"));
        ics.push(format!("DTEND;TZID={TIMEZONE}:{day}T120000"));
        ics.push(format!("SUMMARY:{}", escape_text(&event.title)));
        ics.push(format!("DESCRIPTION:{}", escape_text(&event.description)));
        if let Some(location) = event.location.as_deref().filter(|l| !l.is_empty()) {
            ics.push(format!("LOCATION:{}", escape_text(location)));
        }
        ics.push("END:VEVENT");
    }
    ics.push("END:VCALENDAR");
    ics.0
}

/// CRLF terminated content lines, folded at 75 octets (RFC 5545, 3.1).
#[derive(Default)]
struct ContentLines(String);

impl ContentLines {
    fn push(&mut self, line: impl AsRef<str>) {
        let mut octets = 0;
        for c in line.as_ref().chars() {
            if octets + c.len_utf8() > MAX_LINE_OCTETS {
                self.0.push_str("\r\n ");
                octets = 1;
            }
            self.0.push(c);
            octets += c.len_utf8();
        }
        self.0.push_str("\r\n");
    }
}
