//! This parser turns the council's mega skip page into skip locations.
//!
//! The page lists one heading per skip day, e.g. `Saturday 22 March`, followed by
//! the sites of that day as `Address, POSTCODE` lines.

use std::{str::FromStr, sync::LazyLock};

use chrono::{Month, NaiveDate};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::{postcode, skip::SkipLocation};

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?xi)
            ^\s*
            (?:monday|tuesday|wednesday|thursday|friday|saturday|sunday) # the day of the week
            \s+
            (?P<day>[0-9]{1,2}) # the day, zero-padded or not
            \s+
            (?P<month>[a-z]+) # the month name
            \s*$
        ",
    )
    .expect("valid date regex")
});

static BULLETS: [char; 3] = ['•', '-', '*'];

/// Parse the mega skip page into locations, dating every heading with `year`.
///
/// Sections that can not be understood yield fewer locations, never an error.
pub fn parse(html: &str, year: i32) -> Vec<SkipLocation> {
    let dom = Html::parse_document(html);
    let heading_selector = Selector::parse("h1, h2, h3, h4, h5, h6").expect("valid selector");
    let mut locations: Vec<SkipLocation> = vec![];
    for heading in dom.select(&heading_selector) {
        let heading_text: String = heading.text().collect();
        let Some(date) = parse_skip_date(&heading_text, year) else {
            continue;
        };
        let Some(level) = heading_level(heading) else {
            continue;
        };
        let date_str = heading_text.trim();
        let mut found = 0;
        for sibling in heading.next_siblings().filter_map(ElementRef::wrap) {
            if sibling.text().collect::<String>().trim().is_empty() {
                break;
            }
            if heading_level(sibling).is_some_and(|sibling_level| sibling_level <= level) {
                break;
            }
            let section = parse_section(sibling, date, date_str);
            found += section.len();
            locations.extend(section);
        }
        debug!(%date, found, "parsed skip day");
    }
    locations
}

/// Parse a heading like `Saturday 22 March` into a date in `year`.
///
/// The weekday is only checked for its shape.
pub fn parse_skip_date(text: &str, year: i32) -> Option<NaiveDate> {
    let captures = DATE_RE.captures(text)?;
    let day: u32 = captures["day"].parse().ok()?;
    let month = Month::from_str(&captures["month"]).ok()?;
    NaiveDate::from_ymd_opt(year, month.number_from_month(), day)
}

/// Parse a line like `Pountney Road, SW11 5TU` into a location.
pub fn parse_location_line(line: &str, date: NaiveDate, date_str: &str) -> Option<SkipLocation> {
    let line = line.trim();
    let line = line.strip_prefix(BULLETS).unwrap_or(line).trim();
    let (address, remainder) = line.split_once(',')?;
    let address = address.trim();
    if address.is_empty() {
        return None;
    }
    let remainder = remainder.trim();
    let postcode = postcode::normalize(remainder).or_else(|| {
        // the postcode may trail some extra description
        let words: Vec<&str> = remainder.split_whitespace().collect();
        if words.len() < 2 {
            return None;
        }
        postcode::normalize(&words[words.len() - 2..].join(" "))
    })?;
    Some(SkipLocation::new(
        address.to_string(),
        postcode,
        date,
        date_str.to_string(),
    ))
}

/// Collect the locations of one element below a date heading.
///
/// List items are preferred; without any, the whole element text is tried as one line.
fn parse_section(element: ElementRef, date: NaiveDate, date_str: &str) -> Vec<SkipLocation> {
    let list_item_selector = Selector::parse("li").expect("valid selector");
    let mut locations: Vec<SkipLocation> = element
        .select(&list_item_selector)
        .filter_map(|item| parse_location_line(&item.text().collect::<String>(), date, date_str))
        .collect();
    if locations.is_empty() {
        locations.extend(parse_location_line(
            &element.text().collect::<String>(),
            date,
            date_str,
        ));
    }
    locations
}

/// The level of a `h1`..`h6` element.
fn heading_level(element: ElementRef) -> Option<u8> {
    match element.value().name() {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::NaiveDate;

    use crate::{
        page_parser::{parse, parse_location_line, parse_skip_date},
        skip::SkipLocation,
    };

    fn location(address: &str, postcode: &str, date: &str, date_str: &str) -> SkipLocation {
        SkipLocation::new(
            String::from(address),
            String::from(postcode),
            NaiveDate::from_str(date).unwrap(),
            String::from(date_str),
        )
    }

    /// Test whether the HTML is parsed correctly.
    ///
    /// This test is offline.
    #[test]
    fn test_parse() {
        let html = include_str!("page_parser/tests/megaskip.html");
        let parsed = parse(html, 2025);
        let expected = vec![
            location("Pountney Road", "SW11 5TU", "2025-03-22", "Saturday 22 March"),
            location("Dorothy Road", "SW11 2JJ", "2025-03-22", "Saturday 22 March"),
            location("Wandsworth Common", "SW17 7EG", "2025-03-22", "Saturday 22 March"),
            location("Ingrave Street", "SW11 2SB", "2025-03-22", "Saturday 22 March"),
            location("Garratt Lane", "SW18 4HR", "2025-04-06", "Sunday 06 April"),
            location("Heathfield Road car park", "SW18 2PJ", "2025-04-12", "Saturday 12 April"),
            location("Aboyne Road", "SW17 0AH", "2025-04-12", "Saturday 12 April"),
        ];
        assert_eq!(parsed, expected)
    }

    #[test]
    fn test_parse_single_line() {
        let date = NaiveDate::from_str("2025-03-22").unwrap();
        let parsed = parse_location_line("Pountney Road, SW11 5TU", date, "Saturday 22 March");
        assert_eq!(
            parsed,
            Some(location("Pountney Road", "SW11 5TU", "2025-03-22", "Saturday 22 March"))
        );
    }

    #[test]
    fn test_parse_location_line_discards() {
        let date = NaiveDate::from_str("2025-03-22").unwrap();
        for line in [
            "",
            "   ",
            "Battersea Park Road",
            ", SW11 3AA",
            "Lavender Hill, opposite the library",
            "Lavender Hill, SW11",
        ] {
            assert_eq!(parse_location_line(line, date, ""), None, "{line:?}");
        }
    }

    #[test]
    fn test_parse_location_line_recovers_trailing_postcode() {
        let date = NaiveDate::from_str("2025-03-22").unwrap();
        let parsed = parse_location_line("* Bellevue Road, by the common SW17 7EG", date, "").unwrap();
        assert_eq!(parsed.address, "Bellevue Road");
        assert_eq!(parsed.postcode, "SW17 7EG");
        let parsed = parse_location_line("- Bellevue Road, sw177eg", date, "").unwrap();
        assert_eq!(parsed.postcode, "SW17 7EG");
    }

    #[test]
    fn test_parse_skip_date() {
        let expected = NaiveDate::from_ymd_opt(2025, 2, 1);
        assert_eq!(parse_skip_date("Saturday 1 February", 2025), expected);
        assert_eq!(parse_skip_date("Saturday 01 February", 2025), expected);
        assert_eq!(parse_skip_date("  saturday 1 february\n", 2025), expected);
        assert_eq!(parse_skip_date("Not A Date", 2025), None);
        assert_eq!(parse_skip_date("Monday 31 February", 2025), None);
        assert_eq!(parse_skip_date("Saturday 1 February 2025", 2025), None);
        assert_eq!(parse_skip_date("Mega skip days", 2025), None);
    }

    #[test]
    fn test_non_date_heading_is_skipped() {
        let html = r#"
            <html><body>
                <h3>Not A Date</h3>
                <ul><li>Pountney Road, SW11 5TU</li></ul>
            </body></html>
        "#;
        assert!(parse(html, 2025).is_empty());
    }

    #[test]
    fn test_section_ends_at_next_heading() {
        let html = r#"
            <html><body>
                <h3>Saturday 22 March</h3>
                <p>Pountney Road, SW11 5TU</p>
                <h4>Afternoon</h4>
                <p>Dorothy Road, SW11 2JJ</p>
                <h3>About mega skips</h3>
                <p>Aboyne Road, SW17 0AH</p>
            </body></html>
        "#;
        let parsed = parse(html, 2025);
        let addresses: Vec<&str> = parsed.iter().map(|l| l.address.as_str()).collect();
        assert_eq!(addresses, vec!["Pountney Road", "Dorothy Road"]);
    }
}
