//! Individual meet page parsing.
//!
//! A meet lives behind two URL flavors, `meetinfo...` (registration details,
//! warmup schedule, event list) and `meetresults...` (finished event links
//! and live-results links), which rewrite into each other by literal
//! substring replacement. Both flavors are loosely formatted label/value
//! tables, so rows are classified by shape: two-cell rows with a trailing
//! colon are detail pairs, single-cell rows are headers or schedule dates,
//! wide rows are event entries.

use ::scraper::{ElementRef, Html, Selector};

use crate::error::{DiveMeetsError, Result};
use crate::model::{
    LiveEventLink, MeetEvent, MeetInfo, MeetPageData, MeetResults, MeetResultsEvent,
};
use crate::scraper::{element_text, resolve_link};

const INFO_LINK_MARKER: &str = "meetinfo";
const RESULTS_LINK_MARKER: &str = "meetresults";

const LIVE_RESULTS_LABEL: &str = "Live Results";
const LIVE_LINK_MARKER: &str = "livestats";

const SCHEDULE_LABELS: [&str; 3] = ["Warmup Starts", "Warmup Ends", "Events Start"];

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Rewrite a results link into its info counterpart.
pub fn info_link_of(results_link: &str) -> String {
    results_link.replace(RESULTS_LINK_MARKER, INFO_LINK_MARKER)
}

/// Rewrite an info link into its results counterpart.
pub fn results_link_of(info_link: &str) -> String {
    info_link.replace(INFO_LINK_MARKER, RESULTS_LINK_MARKER)
}

/// Parse a meet page, routed by which link flavor fetched it.
pub fn parse_meet_page(link: &str, document: &Html) -> Result<MeetPageData> {
    if link.contains(RESULTS_LINK_MARKER) {
        Ok(MeetPageData {
            info: None,
            results: Some(parse_results_page(document)?),
        })
    } else {
        Ok(MeetPageData {
            info: Some(parse_info_page(document)?),
            results: None,
        })
    }
}

fn content_rows<'a>(document: &'a Html) -> Result<Vec<ElementRef<'a>>> {
    let content_sel = Selector::parse("#dm_content")?;
    let tr = Selector::parse("tr")?;
    let content = document
        .select(&content_sel)
        .next()
        .ok_or(DiveMeetsError::ElementNotFound {
            context: "meet page content",
        })?;
    Ok(content.select(&tr).collect())
}

fn is_schedule_date(text: &str) -> bool {
    WEEKDAYS.iter().any(|day| text.starts_with(day))
}

/// Registration-side page: meet header, labeled details, per-date warmup
/// times, and the event schedule.
pub fn parse_info_page(document: &Html) -> Result<MeetInfo> {
    let td = Selector::parse("td")?;
    let anchor = Selector::parse("a[href]")?;

    let mut info = MeetInfo::default();
    let mut current_day: Option<String> = None;

    for row in content_rows(document)? {
        let cells: Vec<ElementRef> = row.select(&td).collect();
        match cells.len() {
            1 => {
                let text = element_text(&cells[0]);
                if is_schedule_date(&text) {
                    info.schedule.entry(text.clone()).or_default();
                    current_day = Some(text);
                } else if text.contains(" to ") && info.date_range.is_empty() {
                    info.date_range = text;
                } else if info.name.is_empty() {
                    info.name = text;
                }
            }
            2 => {
                let label = element_text(&cells[0]);
                let Some(label) = label.strip_suffix(':') else {
                    continue;
                };
                let value = element_text(&cells[1]);
                if SCHEDULE_LABELS.contains(&label) {
                    if let Some(day) = &current_day {
                        info.schedule
                            .entry(day.clone())
                            .or_default()
                            .insert(label.to_string(), value);
                    }
                } else {
                    info.details.insert(label.to_string(), value);
                }
            }
            n if n >= 5 => {
                // Event rows: date, number, name, rule, entry count. The
                // header row fails the numeric parse and is skipped.
                let Ok(number) = element_text(&cells[1]).parse::<u32>() else {
                    continue;
                };
                info.events.push(MeetEvent {
                    date: element_text(&cells[0]),
                    number,
                    name: element_text(&cells[2]),
                    rule: element_text(&cells[3]),
                    entries: element_text(&cells[4]).parse().unwrap_or_default(),
                    entries_link: cells[4]
                        .select(&anchor)
                        .next()
                        .and_then(|a| a.value().attr("href"))
                        .map(resolve_link),
                });
            }
            _ => {}
        }
    }

    if info.name.is_empty() {
        return Err(DiveMeetsError::ElementNotFound {
            context: "meet name",
        });
    }

    Ok(info)
}

/// Results-side page: finished events with result links and entry counts,
/// plus live-results links for events still running.
pub fn parse_results_page(document: &Html) -> Result<MeetResults> {
    let td = Selector::parse("td")?;
    let anchor = Selector::parse("a[href]")?;

    let mut results = MeetResults::default();

    for row in content_rows(document)? {
        let cells: Vec<ElementRef> = row.select(&td).collect();
        match cells.len() {
            1 => {
                let text = element_text(&cells[0]);
                if results.name.is_empty() {
                    results.name = text;
                } else if results.date.is_empty() {
                    results.date = text;
                }
            }
            n if n >= 3 => {
                let name = element_text(&cells[0]);
                let Some(a) = cells[2].select(&anchor).next() else {
                    continue;
                };
                let Some(href) = a.value().attr("href") else {
                    continue;
                };
                let link = resolve_link(href);
                let label = element_text(&a);

                if label == LIVE_RESULTS_LABEL || href.contains(LIVE_LINK_MARKER) {
                    results.live_events.push(LiveEventLink { name, link });
                } else {
                    results.events.push(MeetResultsEvent {
                        name,
                        link,
                        entries: label.parse().unwrap_or_default(),
                        date: element_text(&cells[1]),
                    });
                }
            }
            _ => {}
        }
    }

    if results.name.is_empty() {
        return Err(DiveMeetsError::ElementNotFound {
            context: "meet results name",
        });
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INFO_FIXTURE: &str = "<html><body><div id=\"dm_content\">\
        <table>\
        <tr><td><strong>Spring Invitational</strong></td></tr>\
        <tr><td><strong>May 26, 2023 to May 29, 2023</strong></td></tr>\
        </table>\
        <table>\
        <tr><td><strong>Online Signup Closes at:</strong></td><td>May 20, 2023 11:59 PM</td></tr>\
        <tr><td><strong>Type:</strong></td><td>AAU</td></tr>\
        <tr><td><strong>Pool:</strong></td><td>Mason Community Pool 6050 Mason Montgomery Rd</td></tr>\
        <tr><td><strong>Fee per event:</strong></td><td>25.00</td></tr>\
        <tr><td><strong>Warm up time prior to event:</strong></td><td>60 minutes</td></tr>\
        </table>\
        <table>\
        <tr><td>Friday, May 26, 2023</td></tr>\
        <tr><td><strong>Warmup Starts:</strong></td><td>8:00 AM</td></tr>\
        <tr><td><strong>Warmup Ends:</strong></td><td>9:00 AM</td></tr>\
        <tr><td><strong>Events Start:</strong></td><td>9:15 AM</td></tr>\
        <tr><td>Saturday, May 27, 2023</td></tr>\
        <tr><td><strong>Warmup Starts:</strong></td><td>7:30 AM</td></tr>\
        <tr><td><strong>Events Start:</strong></td><td>9:00 AM</td></tr>\
        </table>\
        <table>\
        <tr><td>Date</td><td>Event #</td><td>Event</td><td>Rule</td><td>Entries</td></tr>\
        <tr><td>Friday, May 26, 2023</td><td>1</td><td>Boys 1M</td><td>AAU C</td>\
        <td><a href=\"evententries.php?event=1\">12</a></td></tr>\
        <tr><td>Saturday, May 27, 2023</td><td>2</td><td>Girls 3M</td><td>AAU B</td>\
        <td><a href=\"evententries.php?event=2\">9</a></td></tr>\
        </table>\
        </div></body></html>";

    const RESULTS_FIXTURE: &str = "<html><body><div id=\"dm_content\">\
        <table>\
        <tr><td><strong>Fall Classic</strong></td></tr>\
        <tr><td><strong>Oct 1, 2022 to Oct 2, 2022</strong></td></tr>\
        <tr><td>Boys 1M</td><td>Oct 1, 2022</td><td><a href=\"eventresults.php?event=44\">24</a></td></tr>\
        <tr><td>Girls 3M</td><td>Oct 1, 2022</td><td><a href=\"eventresults.php?event=45\">18</a></td></tr>\
        <tr><td>Boys 3M</td><td>Oct 2, 2022</td><td><a href=\"livestats.php?event=9999\">Live Results</a></td></tr>\
        </table>\
        </div></body></html>";

    #[test]
    fn test_link_rewriting_is_symmetric() {
        let info = "https://secure.meetcontrol.com/divemeets/system/meetinfo.php?meetnum=8642";
        let results = results_link_of(info);
        assert!(results.contains("meetresults.php"));
        assert_eq!(info_link_of(&results), info);
    }

    #[test]
    fn test_parse_info_page() {
        let document = Html::parse_document(INFO_FIXTURE);
        let info = parse_info_page(&document).unwrap();

        assert_eq!(info.name, "Spring Invitational");
        assert_eq!(info.date_range, "May 26, 2023 to May 29, 2023");
        assert_eq!(
            info.details.get("Online Signup Closes at").map(String::as_str),
            Some("May 20, 2023 11:59 PM")
        );
        assert_eq!(info.details.get("Fee per event").map(String::as_str), Some("25.00"));

        assert_eq!(info.schedule.len(), 2);
        let friday = &info.schedule["Friday, May 26, 2023"];
        assert_eq!(friday.get("Warmup Starts").map(String::as_str), Some("8:00 AM"));
        assert_eq!(friday.get("Events Start").map(String::as_str), Some("9:15 AM"));
        let saturday = &info.schedule["Saturday, May 27, 2023"];
        assert_eq!(saturday.get("Warmup Ends"), None);

        assert_eq!(info.events.len(), 2);
        assert_eq!(info.events[0].number, 1);
        assert_eq!(info.events[0].name, "Boys 1M");
        assert_eq!(info.events[0].entries, 12);
        assert!(info.events[0]
            .entries_link
            .as_ref()
            .is_some_and(|l| l.ends_with("evententries.php?event=1")));
    }

    #[test]
    fn test_parse_results_page() {
        let document = Html::parse_document(RESULTS_FIXTURE);
        let results = parse_results_page(&document).unwrap();

        assert_eq!(results.name, "Fall Classic");
        assert_eq!(results.date, "Oct 1, 2022 to Oct 2, 2022");
        assert_eq!(results.events.len(), 2);
        assert_eq!(results.events[0].name, "Boys 1M");
        assert_eq!(results.events[0].entries, 24);
        assert!(results.events[0].link.ends_with("eventresults.php?event=44"));

        assert_eq!(results.live_events.len(), 1);
        assert_eq!(results.live_events[0].name, "Boys 3M");
        assert!(results.live_events[0].link.ends_with("livestats.php?event=9999"));
    }

    #[test]
    fn test_parse_meet_page_routes_by_link_flavor() {
        let info_doc = Html::parse_document(INFO_FIXTURE);
        let data = parse_meet_page("meetinfo.php?meetnum=1", &info_doc).unwrap();
        assert!(data.info.is_some());
        assert!(data.results.is_none());

        let results_doc = Html::parse_document(RESULTS_FIXTURE);
        let data = parse_meet_page("meetresults.php?meetnum=1", &results_doc).unwrap();
        assert!(data.info.is_none());
        assert!(data.results.is_some());
    }

    #[test]
    fn test_parse_info_page_without_content_fails() {
        let document = Html::parse_document("<html><body><p>down for maintenance</p></body></html>");
        assert!(parse_info_page(&document).is_err());
    }
}
