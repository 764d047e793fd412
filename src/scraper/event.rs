//! Event result page parsing.
//!
//! Three related pages share this module: the finished-event results table
//! (one row per competitor, with doubled fields for synchro pairs), a
//! diver's meet-by-meet event history, and the per-dive score sheet behind a
//! result link.

use ::scraper::{ElementRef, Html, Selector};
use tracing::warn;

use crate::cache::Cache;
use crate::error::{DiveMeetsError, Result};
use crate::model::{EventResultRow, EventSummary, HistoryEvent, MeetEventHistory, SheetDive};
use crate::scraper::{element_text, first_href, resolve_link, select_text};
use crate::text::slice_after;

const SCRATCHED_MARKER: &str = " - - ";
const DIVE_SHEET_MARKER: &str = "Dive Sheet";

/// Parse a finished event page into one row per competitor.
///
/// Rows carry `[place, name, name_link, team, team_link, score, score_link,
/// score_diff, event_name]`, doubled to 13 columns when the name and team
/// cells pair up with `" / "`. Scratched divers keep their first name
/// component tagged `"(Scratched)"`. Disqualified divers (place below 1) are
/// collected separately and re-appended after the field with the next place
/// number, an empty score link, and an `"N/A"` difference.
pub fn parse_event_results(document: &Html) -> Result<Vec<EventResultRow>> {
    let table_sel = Selector::parse("table")?;
    let tr = Selector::parse("tr")?;
    let td = Selector::parse("td")?;
    let anchor = Selector::parse("a[href]")?;

    let table = document
        .select(&table_sel)
        .next()
        .ok_or(DiveMeetsError::ElementNotFound {
            context: "event results table",
        })?;
    let rows: Vec<ElementRef> = table.select(&tr).collect();
    let event_name = rows.get(2).map(|r| element_text(r)).unwrap_or_default();

    let mut records: Vec<EventResultRow> = Vec::new();
    let mut disqualified: Vec<EventResultRow> = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        // The first five rows are the page header; the last row is a footer.
        if i < 5 || i + 1 >= rows.len() {
            continue;
        }
        let line: Vec<ElementRef> = row.select(&td).collect();
        if line.len() < 5 {
            continue;
        }

        let name_text = element_text(&line[0]);
        let name_parts: Vec<&str> = name_text.splitn(2, " / ").collect();
        let mut name = name_parts
            .first()
            .copied()
            .unwrap_or_default()
            .to_string();

        // Scratched divers render with a dash run inside the name.
        let scratched: Vec<&str> = name.split(SCRATCHED_MARKER).collect();
        if scratched.len() > 1 {
            name = format!("{} (Scratched)", scratched[0]);
        }

        let name_links: Vec<String> = line[0]
            .select(&anchor)
            .filter_map(|a| a.value().attr("href"))
            .map(resolve_link)
            .collect();
        let name_link = name_links
            .first()
            .cloned()
            .ok_or(DiveMeetsError::ElementNotFound {
                context: "event result name link",
            })?;

        let team_text = element_text(&line[1]);
        let team_parts: Vec<&str> = team_text.splitn(2, " / ").collect();
        let team = team_parts
            .first()
            .copied()
            .unwrap_or_default()
            .to_string();
        let team_links: Vec<String> = line[1]
            .select(&anchor)
            .filter_map(|a| a.value().attr("href"))
            .map(resolve_link)
            .collect();
        let team_link = team_links
            .first()
            .cloned()
            .ok_or(DiveMeetsError::ElementNotFound {
                context: "event result team link",
            })?;

        let place = element_text(&line[2]);
        let is_disqualified = place.parse::<i32>().is_ok_and(|p| p < 1);

        let score = element_text(&line[3]);
        let (score_link, score_diff) = if is_disqualified {
            (String::new(), "N/A".to_string())
        } else {
            let link = first_href(&line[3], &anchor).ok_or(DiveMeetsError::ElementNotFound {
                context: "event result score link",
            })?;
            (link, element_text(&line[4]))
        };

        let mut items = vec![
            place,
            name,
            name_link,
            team,
            team_link,
            score,
            score_link,
            score_diff,
            event_name.clone(),
        ];
        if let (Some(synchro_name), Some(synchro_link), Some(synchro_team), Some(synchro_team_link)) = (
            name_parts.get(1),
            name_links.get(1),
            team_parts.get(1),
            team_links.get(1),
        ) {
            items.extend([
                synchro_name.to_string(),
                synchro_link.clone(),
                synchro_team.to_string(),
                synchro_team_link.clone(),
            ]);
        }

        if is_disqualified {
            disqualified.push(items);
        } else {
            records.push(items);
        }
    }

    // Disqualified divers all take the place after the last ranked one.
    if !disqualified.is_empty() {
        if let Some(next_place) = records
            .last()
            .and_then(|row| row.first())
            .and_then(|p| p.parse::<u32>().ok())
            .map(|p| (p + 1).to_string())
        {
            records.extend(disqualified.into_iter().map(|mut row| {
                row[0] = next_place.clone();
                row
            }));
        }
    }

    Ok(records)
}

/// Parse a diver's event-history page into meets and their events.
///
/// A row with three or more cells whose text carries a decimal score is an
/// event under the most recent meet header; anything else starts a new meet.
/// The main meet link is derived from the first event link of each meet and
/// memoized per meet name in `meet_links`.
pub fn parse_event_history(
    document: &Html,
    meet_links: &Cache<String, String>,
) -> Result<Vec<MeetEventHistory>> {
    let table_sel = Selector::parse("table")?;
    let tr = Selector::parse("tr")?;
    let td = Selector::parse("td")?;
    let anchor = Selector::parse("a[href]")?;

    let tables: Vec<ElementRef> = document.select(&table_sel).collect();
    if tables.len() < 2 {
        return Ok(Vec::new());
    }

    // Profiles with upcoming meets carry a dive-sheet table before the
    // history table.
    let has_upcoming = tables[1].select(&tr).any(|row| {
        let cells: Vec<ElementRef> = row.select(&td).collect();
        cells.len() >= 3 && element_text(&cells[2]).contains(DIVE_SHEET_MARKER)
    });
    let Some(table) = tables.get(if has_upcoming { 2 } else { 1 }) else {
        return Ok(Vec::new());
    };

    let mut result: Vec<MeetEventHistory> = Vec::new();
    let mut current: Option<MeetEventHistory> = None;

    for (i, row) in table.select(&tr).enumerate() {
        if i == 0 {
            continue;
        }
        let cells: Vec<ElementRef> = row.select(&td).collect();
        let text = element_text(&row);

        if text.contains('.') && cells.len() > 2 {
            let name = element_text(&cells[0]).replace("  ", "");
            let place = element_text(&cells[1]).replace(' ', "");
            let Ok(score) = element_text(&cells[2]).parse::<f64>() else {
                warn!(row = %text, "skipping history row with malformed score");
                continue;
            };
            let Some(link) = first_href(&row, &anchor) else {
                continue;
            };

            let meet = current.get_or_insert_with(|| MeetEventHistory {
                meet_name: String::new(),
                meet_link: String::new(),
                events: Vec::new(),
            });
            if meet.meet_link.is_empty() {
                meet.meet_link = match meet_links.get(&meet.meet_name) {
                    Some(cached) => cached,
                    None => {
                        let derived = derive_meet_link(&link);
                        meet_links.put(meet.meet_name.clone(), derived.clone());
                        derived
                    }
                };
            }
            meet.events.push(HistoryEvent {
                name,
                place,
                score,
                link,
            });
        } else {
            if let Some(meet) = current.take() {
                result.push(meet);
            }
            current = Some(MeetEventHistory {
                meet_name: text,
                meet_link: String::new(),
                events: Vec::new(),
            });
        }
    }

    if let Some(meet) = current {
        result.push(meet);
    }

    Ok(result)
}

/// Main meet page link from an event link: drop the event-specific query
/// parameters and rewrite the sheet flavor.
fn derive_meet_link(event_link: &str) -> String {
    event_link
        .split('&')
        .next()
        .unwrap_or_default()
        .replace("divesheet", "meet")
}

/// Header metadata of an individual event score page.
pub fn parse_event_summary(document: &Html) -> Result<EventSummary> {
    let table_sel = Selector::parse("table")?;
    let tr = Selector::parse("tr")?;
    let td = Selector::parse("td")?;
    let strong = Selector::parse("strong")?;
    let anchor = Selector::parse("a[href]")?;

    let table = document
        .select(&table_sel)
        .next()
        .ok_or(DiveMeetsError::ElementNotFound {
            context: "event summary table",
        })?;
    let rows: Vec<ElementRef> = table.select(&tr).collect();
    if rows.len() < 5 {
        return Err(DiveMeetsError::ElementNotFound {
            context: "event summary rows",
        });
    }

    let header = select_text(&rows[3], &strong);
    let organization = slice_after(&header, " - ")
        .ok_or(DiveMeetsError::ElementNotFound {
            context: "event organization",
        })?
        .to_string();

    let meet_page_link = first_href(&rows[0], &anchor).ok_or(DiveMeetsError::ElementNotFound {
        context: "event meet page link",
    })?;
    let event_page_link = first_href(&rows[2], &anchor).ok_or(DiveMeetsError::ElementNotFound {
        context: "event page link",
    })?;
    let dates = select_text(&rows[1], &strong);

    let final_row: Vec<ElementRef> = rows[rows.len() - 2].select(&td).collect();
    let final_score = |idx: usize| -> f64 {
        final_row
            .get(idx)
            .map(|c| element_text(c).parse().unwrap_or(0.0))
            .unwrap_or(0.0)
    };

    Ok(EventSummary {
        meet_page_link,
        dates,
        organization,
        total_net_score: final_score(2),
        total_dd: final_score(3),
        total_score: final_score(4),
        event_page_link,
    })
}

/// Parse an individual score sheet into its dive rows.
///
/// Rows are the colored ones; a row without an order number is skipped
/// (synchro sheets interleave such rows). Changed dives, failed dives, no
/// dives, and balks annotate the dive number; carryover rows from a prelim
/// keep order 0, while other scoreless rows are dropped.
pub fn parse_dive_sheet(document: &Html) -> Result<Vec<SheetDive>> {
    let table_sel = Selector::parse("table")?;
    let row_sel = Selector::parse("tr[bgcolor]")?;
    let td = Selector::parse("td")?;
    let anchor = Selector::parse("a[href]")?;

    let table = document
        .select(&table_sel)
        .next()
        .ok_or(DiveMeetsError::ElementNotFound {
            context: "dive sheet table",
        })?;

    let mut result = Vec::new();
    for row in table.select(&row_sel) {
        let cells: Vec<ElementRef> = row.select(&td).collect();
        if cells.len() < 7 {
            continue;
        }

        let Ok(order) = element_text(&cells[0]).parse::<u32>() else {
            continue;
        };

        // A second line in the number cell records a changed dive.
        let number_parts: Vec<String> = cells[1]
            .inner_html()
            .split("<br>")
            .map(|p| p.trim().to_string())
            .collect();
        let mut number = if number_parts.len() > 1 {
            format!("{} (Changed from {})", number_parts[1], number_parts[0])
        } else {
            element_text(&cells[1])
        };

        let last_line = |cell: &ElementRef| -> String {
            cell.inner_html()
                .split("<br>")
                .last()
                .unwrap_or_default()
                .trim()
                .to_string()
        };
        let height = last_line(&cells[2]);
        let name = last_line(&cells[3]);

        // Carryover rows from a prelim keep order 0 and no score.
        let is_carryover = order == 0;

        let score_text = element_text(&cells[4]);
        let has_failed_dive = score_text.contains("Failed Dive");
        let has_no_dive = score_text.contains("No Dive");
        let has_balk = score_text.contains("Balk");
        let net_score: f64 = score_text
            .replace(" Failed Dive", "")
            .replace(" No Dive", "")
            .replace("Dive Changed", "")
            .replace(" Balk", "")
            .trim()
            .parse()
            .unwrap_or(0.0);

        if has_no_dive {
            number.push_str(" (No Dive)");
        } else if has_balk {
            number.push_str(" (Balk)");
        }

        if !is_carryover && !has_failed_dive && !has_no_dive && net_score == 0.0 {
            continue;
        }

        let dd_text = element_text(&cells[5]);
        let dd: f64 = if dd_text.len() > 4 {
            dd_text[dd_text.len() - 4..].parse().unwrap_or(0.0)
        } else {
            dd_text.parse().unwrap_or(0.0)
        };

        let score: f64 = element_text(&cells[6])
            .replace("  ", "")
            .parse()
            .unwrap_or(0.0);
        let score_link = first_href(&cells[6], &anchor).unwrap_or_default();

        result.push(SheetDive {
            order,
            number,
            height,
            name,
            net_score,
            dd,
            score,
            score_link,
        });
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{is_synchro_row, EVENT_ROW_LEN, SYNCHRO_ROW_LEN};

    fn results_fixture(extra_rows: &str) -> String {
        format!(
            "<html><body><table>\
             <tr><td><a href=\"meetresults.php?meetnum=8642\">Fall Classic</a></td></tr>\
             <tr><td>Oct 1, 2022 to Oct 2, 2022</td></tr>\
             <tr><td>Boys 1M</td></tr>\
             <tr><td>Final Results</td></tr>\
             <tr><td>Diver</td><td>Team</td><td>Place</td><td>Score</td><td>Diff</td></tr>\
             {extra_rows}\
             <tr><td>Pages generated by meet control</td></tr>\
             </table></body></html>"
        )
    }

    fn single_row(place: &str, name: &str, id: u32, score: &str) -> String {
        format!(
            "<tr><td><a href=\"profile.php?number={id}\">{name}</a></td>\
             <td><a href=\"profile.php?number=9{id}\">Mason Diving</a></td>\
             <td>{place}</td>\
             <td><a href=\"eventresultsind.php?id={id}\">{score}</a></td>\
             <td>12.40</td></tr>"
        )
    }

    #[test]
    fn test_parse_event_results_singles_and_synchro() {
        let synchro = "<tr>\
            <td><a href=\"profile.php?number=3\">John Doe</a> / <a href=\"profile.php?number=4\">Jane Smith</a></td>\
            <td><a href=\"profile.php?number=93\">Mason Diving</a> / <a href=\"profile.php?number=94\">Ohio State</a></td>\
            <td>3</td>\
            <td><a href=\"eventresultsind.php?id=3\">298.10</a></td>\
            <td>20.15</td></tr>";
        let html = results_fixture(&format!(
            "{}{}{synchro}",
            single_row("1", "Logan Sherwin", 1, "412.50"),
            single_row("2", "Spencer Dearman", 2, "388.00"),
        ));
        let document = Html::parse_document(&html);
        let rows = parse_event_results(&document).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].len(), EVENT_ROW_LEN);
        assert_eq!(rows[1].len(), EVENT_ROW_LEN);
        assert_eq!(rows[2].len(), SYNCHRO_ROW_LEN);
        assert!(is_synchro_row(&rows[2]));

        for row in &rows {
            assert!(!row[0].is_empty());
            assert!(!row[5].is_empty());
            assert!(row[6].contains("eventresultsind.php"));
        }

        assert_eq!(rows[0][0], "1");
        assert_eq!(rows[0][1], "Logan Sherwin");
        assert_eq!(rows[0][5], "412.50");
        assert_eq!(rows[0][8], "Boys 1M");

        assert_eq!(rows[2][9], "Jane Smith");
        assert!(rows[2][10].ends_with("profile.php?number=4"));
        assert_eq!(rows[2][11], "Ohio State");
    }

    #[test]
    fn test_parse_event_results_scratched_and_disqualified() {
        let html = results_fixture(&format!(
            "{}{}",
            single_row("1", "Logan Sherwin", 1, "412.50"),
            single_row("0", "Jane - - Smith", 5, "Disqualified"),
        ));
        let document = Html::parse_document(&html);
        let rows = parse_event_results(&document).unwrap();

        assert_eq!(rows.len(), 2);
        // Disqualified rows move after the field with the next place number.
        assert_eq!(rows[1][0], "2");
        assert_eq!(rows[1][1], "Jane (Scratched)");
        assert_eq!(rows[1][6], "");
        assert_eq!(rows[1][7], "N/A");
    }

    #[test]
    fn test_parse_event_history_groups_meets() {
        let html = "<html><body>\
            <table><tr><td>profile header</td></tr></table>\
            <table>\
            <tr><td>Meet</td><td>Place</td><td>Score</td></tr>\
            <tr><td>Fall Classic</td></tr>\
            <tr><td>Boys 1M</td><td>3</td><td><a href=\"divesheetresultsind.php?meetnum=8642&eventnum=44\">312.50</a></td></tr>\
            <tr><td>Boys 3M</td><td>1</td><td><a href=\"divesheetresultsind.php?meetnum=8642&eventnum=45\">401.15</a></td></tr>\
            <tr><td>Spring Invitational</td></tr>\
            <tr><td>Boys 1M</td><td>2</td><td><a href=\"divesheetresultsind.php?meetnum=8700&eventnum=12\">365.20</a></td></tr>\
            </table>\
            </body></html>";
        let document = Html::parse_document(html);
        let cache = Cache::new();
        let meets = parse_event_history(&document, &cache).unwrap();

        assert_eq!(meets.len(), 2);
        assert_eq!(meets[0].meet_name, "Fall Classic");
        assert_eq!(meets[0].events.len(), 2);
        assert_eq!(meets[0].events[0].place, "3");
        assert_eq!(meets[0].events[0].score, 312.50);
        assert!(meets[0]
            .meet_link
            .ends_with("meetresultsind.php?meetnum=8642"));
        assert_eq!(meets[1].meet_name, "Spring Invitational");
        assert_eq!(meets[1].events.len(), 1);

        // The derived link is memoized per meet name.
        assert_eq!(
            cache.get(&"Fall Classic".to_string()).unwrap(),
            meets[0].meet_link
        );
    }

    #[test]
    fn test_parse_event_summary() {
        let html = "<html><body><table>\
            <tr><td><a href=\"meetresults.php?meetnum=8642\">Fall Classic</a></td></tr>\
            <tr><td><strong>Oct 1, 2022 to Oct 2, 2022</strong></td></tr>\
            <tr><td><a href=\"eventresults.php?event=44\">Boys 1M</a></td></tr>\
            <tr><td><strong>Fall Classic - AAU Diving</strong></td></tr>\
            <tr><td>1</td><td>103B</td><td>18.50</td><td>1.7</td><td>31.45</td></tr>\
            <tr><td>Totals</td><td></td><td>182.30</td><td>12.10</td><td>312.50</td></tr>\
            <tr><td>footer</td></tr>\
            </table></body></html>";
        let document = Html::parse_document(html);
        let summary = parse_event_summary(&document).unwrap();

        assert_eq!(summary.organization, "AAU Diving");
        assert_eq!(summary.dates, "Oct 1, 2022 to Oct 2, 2022");
        assert!(summary.meet_page_link.ends_with("meetresults.php?meetnum=8642"));
        assert!(summary.event_page_link.ends_with("eventresults.php?event=44"));
        assert_eq!(summary.total_net_score, 182.30);
        assert_eq!(summary.total_dd, 12.10);
        assert_eq!(summary.total_score, 312.50);
    }

    fn sheet_row(cells: &str) -> String {
        format!("<tr bgcolor=\"#ffffff\">{cells}</tr>")
    }

    #[test]
    fn test_parse_dive_sheet() {
        let rows = [
            // Normal dive.
            sheet_row(
                "<td>1</td><td>103B</td><td>1M</td><td>Forward 1 1/2 Somersault Pike</td>\
                 <td>18.50</td><td>1.7</td><td><a href=\"judgesheet.php?id=1\">31.45</a></td>",
            ),
            // Changed dive: second line of the number cell wins.
            sheet_row(
                "<td>2</td><td>203B<br>203C</td><td>1M</td><td>Back 1 1/2<br>Back 1 1/2 Tuck</td>\
                 <td>Dive Changed16.00</td><td>1.6</td><td><a href=\"judgesheet.php?id=2\">25.60</a></td>",
            ),
            // Failed dive keeps its zero score.
            sheet_row(
                "<td>3</td><td>303B</td><td>1M</td><td>Reverse 1 1/2</td>\
                 <td>0.00 Failed Dive</td><td>1.6</td><td><a href=\"judgesheet.php?id=3\">0.00</a></td>",
            ),
            // Balk annotates the number.
            sheet_row(
                "<td>4</td><td>403B</td><td>1M</td><td>Inward 1 1/2</td>\
                 <td>12.00 Balk</td><td>1.7</td><td><a href=\"judgesheet.php?id=4\">18.40</a></td>",
            ),
            // Scoreless non-carryover row is dropped.
            sheet_row(
                "<td>5</td><td>5132D</td><td>1M</td><td>Twister</td>\
                 <td>0.00</td><td>2.2</td><td><a href=\"judgesheet.php?id=5\">0.00</a></td>",
            ),
            // Carryover row from a prelim keeps order 0.
            sheet_row(
                "<td>0</td><td>105B</td><td>1M</td><td>Forward 2 1/2</td>\
                 <td>0.00</td><td>2.4</td><td><a href=\"judgesheet.php?id=6\">0.00</a></td>",
            ),
            // Row without an order number is skipped entirely.
            sheet_row(
                "<td></td><td>107B</td><td>1M</td><td>Forward 3 1/2</td>\
                 <td>20.00</td><td>3.1</td><td><a href=\"judgesheet.php?id=7\">62.00</a></td>",
            ),
        ]
        .join("");
        let html = format!("<html><body><table>{rows}</table></body></html>");
        let document = Html::parse_document(&html);
        let dives = parse_dive_sheet(&document).unwrap();

        let orders: Vec<u32> = dives.iter().map(|d| d.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4, 0]);

        assert_eq!(dives[0].number, "103B");
        assert_eq!(dives[0].net_score, 18.50);
        assert_eq!(dives[0].dd, 1.7);
        assert_eq!(dives[0].score, 31.45);
        assert!(dives[0].score_link.ends_with("judgesheet.php?id=1"));

        assert_eq!(dives[1].number, "203C (Changed from 203B)");
        assert_eq!(dives[1].name, "Back 1 1/2 Tuck");
        assert_eq!(dives[1].net_score, 16.00);

        assert_eq!(dives[2].net_score, 0.0);
        assert_eq!(dives[3].number, "403B (Balk)");
        assert_eq!(dives[3].net_score, 12.00);

        assert_eq!(dives[4].order, 0);
        assert_eq!(dives[4].number, "105B");
    }
}
