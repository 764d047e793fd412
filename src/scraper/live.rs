//! Live-scoring page parsing.
//!
//! Live pages render the last and next diver as free text with English
//! labels, so both blocks are sliced out of concatenated cell text with the
//! exact label strings below. A missing label defaults its field (0 / 0.0 /
//! empty) and is simply absent from the parse report; the parse only fails
//! when the page structure itself (tables, anchors) is missing. The labels
//! are exact-match by design: they mirror the upstream site byte for byte,
//! and the report is how callers notice drift.

use ::scraper::{ElementRef, Html, Selector};

use crate::error::{DiveMeetsError, Result};
use crate::model::{FinishedLiveResults, LastDiverInfo, LiveResults, NextDiverInfo, ParseReport};
use crate::scraper::{element_text, resolve_link};
use crate::text::slice_between;

pub const LABEL_LAST_ROUND_PLACE: &str = "Last Round Place: ";
pub const LABEL_LAST_ROUND_TOTAL: &str = "Last Round Total Score: ";
pub const LABEL_DIVER_ORDER: &str = "Diver Order: ";
pub const LABEL_ORDER: &str = "Order: ";
pub const LABEL_CURRENT_PLACE: &str = "Current Place: ";
pub const LABEL_CURRENT_TOTAL: &str = "Current Total Score: ";
pub const LABEL_CURRENT_DIVE: &str = "Current Dive:   ";
pub const LABEL_NEXT_DIVE: &str = "Next Dive:   ";
pub const LABEL_HEIGHT: &str = "Height: ";
pub const LABEL_DD: &str = "DD: ";
pub const LABEL_SCORE: &str = "Score: ";
pub const LABEL_AVG_SCORE: &str = "Avg Score: ";
pub const LABEL_MAX_SCORE: &str = "Max Score Ever: ";

const MARKER_LAST_ROUND: &str = " Last Round";
const MARKER_DIVER_O: &str = " Diver O";
const MARKER_CURRENT: &str = " Current";
const MARKER_NEXT_DIVE: &str = " Next Dive";
const MARKER_HEIGHT: &str = " Height";
const MARKER_DD: &str = " DD:";
const MARKER_SCORE: &str = " Score";
const MARKER_JUDGES: &str = " Judges";
const MARKER_HISTORY: &str = " History for";
const MARKER_MAX_SCORE: &str = "  Max Score";
const MARKER_NEEDED: &str = " Needed";

const MARKER_AB_BOARD: &str = "Brd";
const TITLE_NOISE: &str = "Unofficial Statistics";

/// Parse one snapshot of a live-scoring page.
///
/// The alternate "AB board" layout (column header ending in `"Brd"`) carries
/// only a standings table; every other layout also yields last/next diver
/// blocks and the current-round string.
pub fn parse_live_results(document: &Html) -> Result<LiveResults> {
    let results_sel = Selector::parse("#Results")?;
    let tr = Selector::parse("tr")?;
    let td = Selector::parse("td")?;
    let tbody = Selector::parse("tbody")?;
    let table = Selector::parse("table")?;

    let results = document
        .select(&results_sel)
        .next()
        .ok_or(DiveMeetsError::ElementNotFound {
            context: "live results table",
        })?;
    let rows: Vec<ElementRef> = results.select(&tr).collect();
    if rows.len() < 2 {
        return Err(DiveMeetsError::ElementNotFound {
            context: "live results rows",
        });
    }

    let title = rows[0]
        .select(&td)
        .next()
        .map(|c| element_text(&c))
        .unwrap_or_default()
        .replace(TITLE_NOISE, "")
        .trim()
        .to_string();

    let mut live = LiveResults {
        title,
        ..LiveResults::default()
    };

    if element_text(&rows[1]).ends_with(MARKER_AB_BOARD) {
        live.ab_board = true;
        live.standings = parse_ab_standings(&rows)?;
        return Ok(live);
    }

    if rows.len() < 9 {
        return Err(DiveMeetsError::ElementNotFound {
            context: "live results layout",
        });
    }
    let upper = rows[1]
        .select(&tbody)
        .next()
        .ok_or(DiveMeetsError::ElementNotFound {
            context: "live diver block",
        })?;
    let diver_tables: Vec<ElementRef> = upper.select(&table).collect();
    if diver_tables.len() < 3 {
        return Err(DiveMeetsError::ElementNotFound {
            context: "live diver tables",
        });
    }

    live.last_diver = Some(parse_last_diver(&diver_tables[0], &mut live.report).ok_or(
        DiveMeetsError::ElementNotFound {
            context: "last diver block",
        },
    )?);
    live.next_diver = Some(parse_next_diver(&diver_tables[2], &mut live.report).ok_or(
        DiveMeetsError::ElementNotFound {
            context: "next diver block",
        },
    )?);

    let (round, standings) = parse_standings(&rows)?;
    live.round = Some(round);
    live.standings = standings;

    Ok(live)
}

/// Slice a labeled field out of a diver block's text, recording the label
/// when found. Missing labels yield `None`, which callers default.
fn sliced<'a>(
    text: &'a str,
    label: &'static str,
    to: &str,
    report: &mut ParseReport,
) -> Option<&'a str> {
    let found = slice_between(text, label, to);
    if found.is_some() {
        report.record(label);
    }
    found
}

/// First anchor of a diver block: display name (with a space re-inserted
/// before the team parenthesis) and resolved profile link. `None` when the
/// block has no anchors at all.
fn diver_anchor(block: &ElementRef) -> Option<(String, String)> {
    let anchor = Selector::parse("a[href]").ok()?;
    let a = block.select(&anchor).next()?;
    let mut name = element_text(&a);
    if let Some(idx) = name.find('(') {
        name.insert(idx, ' ');
    }
    let link = resolve_link(a.value().attr("href")?);
    Some((name, link))
}

/// The diver who just went, from the first diver block.
pub fn parse_last_diver(block: &ElementRef, report: &mut ParseReport) -> Option<LastDiverInfo> {
    let (name, link) = diver_anchor(block)?;
    let text = element_text(block);

    let mut info = LastDiverInfo {
        name,
        link,
        ..LastDiverInfo::default()
    };
    info.last_round_place = sliced(&text, LABEL_LAST_ROUND_PLACE, MARKER_LAST_ROUND, report)
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    info.last_round_total = sliced(&text, LABEL_LAST_ROUND_TOTAL, MARKER_DIVER_O, report)
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    info.order = sliced(&text, LABEL_DIVER_ORDER, MARKER_CURRENT, report)
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    info.place = sliced(&text, LABEL_CURRENT_PLACE, MARKER_CURRENT, report)
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    info.total = sliced(&text, LABEL_CURRENT_TOTAL, MARKER_CURRENT, report)
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    info.dive = sliced(&text, LABEL_CURRENT_DIVE, MARKER_HEIGHT, report)
        .unwrap_or_default()
        .to_string();
    info.height = sliced(&text, LABEL_HEIGHT, MARKER_DD, report)
        .unwrap_or_default()
        .to_string();
    info.dd = sliced(&text, LABEL_DD, MARKER_SCORE, report)
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    // The score label repeats inside other labels, so anchor it to the DD
    // value that precedes it.
    info.score = slice_between(
        &text,
        &format!("{} {}", format_dd(info.dd), LABEL_SCORE),
        MARKER_JUDGES,
    )
    .and_then(|v| v.parse().ok())
    .unwrap_or_default();
    if let Some(colon) = text.rfind(':') {
        info.judges_scores = text.get(colon + 2..).unwrap_or_default().to_string();
    }

    Some(info)
}

/// The diver on deck, from the third diver block.
pub fn parse_next_diver(block: &ElementRef, report: &mut ParseReport) -> Option<NextDiverInfo> {
    let (name, link) = diver_anchor(block)?;
    let text = element_text(block);

    let mut info = NextDiverInfo {
        name,
        link,
        ..NextDiverInfo::default()
    };
    info.last_round_place = sliced(&text, LABEL_LAST_ROUND_PLACE, MARKER_LAST_ROUND, report)
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    info.last_round_total = sliced(&text, LABEL_LAST_ROUND_TOTAL, MARKER_DIVER_O, report)
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    info.order = sliced(&text, LABEL_ORDER, MARKER_NEXT_DIVE, report)
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    info.dive = sliced(&text, LABEL_NEXT_DIVE, MARKER_HEIGHT, report)
        .unwrap_or_default()
        .to_string();
    info.height = sliced(&text, LABEL_HEIGHT, MARKER_DD, report)
        .unwrap_or_default()
        .to_string();
    info.dd = sliced(&text, LABEL_DD, MARKER_HISTORY, report)
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    info.avg_score = sliced(&text, LABEL_AVG_SCORE, MARKER_MAX_SCORE, report)
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    info.max_score = sliced(&text, LABEL_MAX_SCORE, MARKER_NEEDED, report)
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    // The score needed for first place trails the block.
    info.for_first_place = text
        .rsplit(' ')
        .next()
        .and_then(|v| v.parse().ok())
        .unwrap_or(999.99);

    Some(info)
}

/// Render a DD the way the page does, with at least one decimal place.
fn format_dd(dd: f64) -> String {
    if dd.fract() == 0.0 {
        format!("{dd:.1}")
    } else {
        format!("{dd}")
    }
}

/// Current round string and the standings table. Standings rows start at
/// index 10; the first cell flags divers still left to dive, the seventh
/// carries the diver name and profile link.
fn parse_standings(rows: &[ElementRef]) -> Result<(String, Vec<Vec<String>>)> {
    let td = Selector::parse("td")?;
    let anchor = Selector::parse("a[href]")?;

    let round = rows
        .get(8)
        .and_then(|row| row.select(&td).next())
        .map(|cell| element_text(&cell))
        .ok_or(DiveMeetsError::ElementNotFound {
            context: "live current round",
        })?;

    let mut standings = Vec::new();
    for row in rows.iter().take(rows.len().saturating_sub(1)).skip(10) {
        let mut record: Vec<String> = Vec::new();
        for (i, cell) in row.select(&td).enumerate() {
            if i > 9 {
                break;
            }
            let text = element_text(&cell);
            if i == 0 {
                record.push((text.is_empty()).to_string());
            } else if i == 6 {
                record.push(text);
                let link = cell
                    .select(&anchor)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .map(resolve_link)
                    .unwrap_or_default();
                record.push(link);
            } else {
                record.push(text);
            }
        }
        standings.push(record);
    }

    Ok((round, standings))
}

/// Standings of an AB board page, which has no diver blocks or round row;
/// the second and third cells carry the paired divers with their links.
fn parse_ab_standings(rows: &[ElementRef]) -> Result<Vec<Vec<String>>> {
    let td = Selector::parse("td")?;
    let anchor = Selector::parse("a[href]")?;

    let mut standings = Vec::new();
    for row in rows.iter().take(rows.len().saturating_sub(1)).skip(2) {
        let mut record: Vec<String> = Vec::new();
        for (i, cell) in row.select(&td).enumerate() {
            if i > 10 {
                break;
            }
            let text = element_text(&cell);
            record.push(text);
            if i == 1 || i == 2 {
                let link = cell
                    .select(&anchor)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .map(resolve_link)
                    .unwrap_or_default();
                record.push(link);
            }
        }
        standings.push(record);
    }

    Ok(standings)
}

/// Parse a finished event off its live-results page.
///
/// Records accumulate from row four until the trailing `"Official"` footer;
/// a malformed row stops the walk and keeps what parsed so far.
pub fn parse_finished_live_results(document: &Html) -> Result<FinishedLiveResults> {
    let tr = Selector::parse("tr")?;
    let anchor = Selector::parse("a[href]")?;

    let mut finished = FinishedLiveResults::default();
    for (i, row) in document.select(&tr).enumerate() {
        let text = element_text(&row);
        if text.starts_with("Official") {
            break;
        }
        if i == 1 {
            finished.event_title = text.replace(TITLE_NOISE, "").trim().to_string();
            continue;
        }
        if i <= 3 {
            continue;
        }

        let links: Vec<String> = row
            .select(&anchor)
            .filter_map(|a| a.value().attr("href"))
            .map(resolve_link)
            .collect();
        let Some(record) = parse_finished_row(&text, &links) else {
            break;
        };
        finished.records.push(record);
    }

    Ok(finished)
}

/// One finished-live row: `place score name (Team) [/ partner (Team)]
/// event_avg round_avg`, with the score link leading the row's anchors and
/// one profile link per diver after it.
fn parse_finished_row(text: &str, links: &[String]) -> Option<Vec<String>> {
    let (place, rest) = text.split_once(' ')?;
    let (score, rest) = rest.split_once(' ')?;
    let partners: Vec<&str> = rest.splitn(2, " / ").collect();

    let mut record = vec![place.to_string()];
    let mut event_avg = String::new();
    let mut round_avg = String::new();

    for (i, diver) in partners.iter().copied().enumerate() {
        // Synchro boards prefix each diver with "(A) " / "(B) ".
        let diver = if diver.matches(')').count() > 1 {
            let mut parts = diver.splitn(2, ") ");
            let head = parts.next();
            parts.next().or(head)?
        } else {
            diver
        };

        let (name_part, tail) = diver.split_once('(')?;
        let mut name_words: Vec<&str> = name_part.trim().split(' ').collect();
        let last = name_words.pop()?.to_string();
        let first = name_words.join(" ");

        let (team, trailing) = tail.split_once(')')?;
        let trailing: Vec<&str> = trailing.split_whitespace().collect();
        if trailing.len() == 2 {
            event_avg = trailing[0].to_string();
            round_avg = trailing[1].to_string();
        }

        record.extend([first, last, links.get(i + 1)?.clone(), team.trim().to_string()]);
        if i == 0 {
            record.push(score.to_string());
            record.push(links.first()?.clone());
        }
        if i + 1 == partners.len() {
            record.insert(7, event_avg.clone());
            record.insert(8, round_avg.clone());
        }
    }

    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIVE_FIXTURE: &str = "<html><body><table id=\"Results\">\
<tr><td>Unofficial Statistics Boys 3M Final</td></tr>\
<tr><td><table><tbody><tr>\
<td><table>\
<tr><td><a href=\"profile.php?number=51197\">Logan Sherwin(Mason Diving)</a></td></tr>\
<tr><td>Last Round Place: 2 Last Round Total Score: 182.10 Diver Order: 5 Current Place: 1 \
Current Total Score: 214.30 Current Dive:   403B Height: 3M DD: 2.2 Score: 32.20 \
Judges Scores: 5.0 5.5 5.5</td></tr>\
</table></td>\
<td><table><tr><td>spacer</td></tr></table></td>\
<td><table>\
<tr><td><a href=\"profile.php?number=60000\">Jane Doe(Ohio State)</a></td></tr>\
<tr><td>Last Round Place: 3 Last Round Total Score: 170.55 Diver Order: 6 \
Next Dive:   105B Height: 3M DD: 2.4 History for this dive Avg Score: 5.40  \
Max Score Ever: 8.00 Needed to take over first place: 45.10</td></tr>\
</table></td>\
</tr></tbody></table></td></tr>\
<tr><td>Round: 4 of 6</td></tr>\
<tr><td>LTD</td><td>Order</td><td>LR Place</td><td>LR Score</td><td>Place</td><td>Score</td>\
<td>Diver</td><td>Avg</td><td>Event Avg</td><td>Round Avg</td></tr>\
<tr><td></td><td>5</td><td>2</td><td>182.10</td><td>1</td><td>214.30</td>\
<td><a href=\"profile.php?number=51197\">Logan Sherwin</a></td><td>6.44</td><td>5.37</td><td>53.58</td></tr>\
<tr><td>X</td><td>6</td><td>3</td><td>170.55</td><td>2</td><td>170.55</td>\
<td><a href=\"profile.php?number=60000\">Jane Doe</a></td><td>5.40</td><td>5.02</td><td>42.64</td></tr>\
<tr><td>generated by meet control</td></tr>\
</table></body></html>";

    #[test]
    fn test_parse_live_results() {
        let document = Html::parse_document(LIVE_FIXTURE);
        let live = parse_live_results(&document).unwrap();

        assert_eq!(live.title, "Boys 3M Final");
        assert!(!live.ab_board);
        assert_eq!(live.round.as_deref(), Some("Round: 4 of 6"));

        let last = live.last_diver.unwrap();
        assert_eq!(last.name, "Logan Sherwin (Mason Diving)");
        assert!(last.link.ends_with("profile.php?number=51197"));
        assert_eq!(last.last_round_place, 2);
        assert_eq!(last.last_round_total, 182.10);
        assert_eq!(last.order, 5);
        assert_eq!(last.place, 1);
        assert_eq!(last.total, 214.30);
        assert_eq!(last.dive, "403B");
        assert_eq!(last.height, "3M");
        assert_eq!(last.dd, 2.2);
        assert_eq!(last.score, 32.20);
        assert_eq!(last.judges_scores, "5.0 5.5 5.5");

        let next = live.next_diver.unwrap();
        assert_eq!(next.name, "Jane Doe (Ohio State)");
        assert_eq!(next.last_round_place, 3);
        assert_eq!(next.order, 6);
        assert_eq!(next.dive, "105B");
        assert_eq!(next.dd, 2.4);
        assert_eq!(next.avg_score, 5.40);
        assert_eq!(next.max_score, 8.00);
        assert_eq!(next.for_first_place, 45.10);

        assert_eq!(live.standings.len(), 2);
        let row = &live.standings[0];
        assert_eq!(row[0], "true");
        assert_eq!(row[6], "Logan Sherwin");
        assert!(row[7].ends_with("profile.php?number=51197"));
        assert_eq!(live.standings[1][0], "false");

        assert!(live.report.contains(LABEL_LAST_ROUND_PLACE));
        assert!(live.report.contains(LABEL_NEXT_DIVE));
    }

    #[test]
    fn test_missing_labels_default_without_failing() {
        let document = Html::parse_document(
            "<html><body><table><tr><td>\
             <a href=\"profile.php?number=1\">Solo Diver(Team)</a> no labels here\
             </td></tr></table></body></html>",
        );
        let td = Selector::parse("td").unwrap();
        let block = document.select(&td).next().unwrap();
        let mut report = ParseReport::new();
        let info = parse_last_diver(&block, &mut report).unwrap();

        assert_eq!(info.name, "Solo Diver (Team)");
        assert_eq!(info.last_round_place, 0);
        assert_eq!(info.last_round_total, 0.0);
        assert_eq!(info.dive, "");
        assert!(report.is_empty());
    }

    #[test]
    fn test_block_without_anchor_fails() {
        let document = Html::parse_document(
            "<html><body><table><tr><td>Last Round Place: 2</td></tr></table></body></html>",
        );
        let td = Selector::parse("td").unwrap();
        let block = document.select(&td).next().unwrap();
        let mut report = ParseReport::new();
        assert!(parse_last_diver(&block, &mut report).is_none());
    }

    #[test]
    fn test_parse_ab_board_layout() {
        let document = Html::parse_document(
            "<html><body><table id=\"Results\">\
             <tr><td>Unofficial Statistics Girls 1M AB</td></tr>\
             <tr><td>Order</td><td>Diver A</td><td>Diver B</td><td>Brd</td></tr>\
             <tr><td>1</td>\
             <td><a href=\"profile.php?number=11\">Alice Jones</a></td>\
             <td><a href=\"profile.php?number=12\">Amy Lee</a></td>\
             <td>3</td></tr>\
             <tr><td>footer</td></tr>\
             </table></body></html>",
        );
        let live = parse_live_results(&document).unwrap();

        assert!(live.ab_board);
        assert_eq!(live.title, "Girls 1M AB");
        assert!(live.last_diver.is_none());
        assert!(live.next_diver.is_none());
        assert!(live.round.is_none());

        assert_eq!(live.standings.len(), 1);
        let row = &live.standings[0];
        assert_eq!(row[0], "1");
        assert_eq!(row[1], "Alice Jones");
        assert!(row[2].ends_with("profile.php?number=11"));
        assert_eq!(row[3], "Amy Lee");
        assert!(row[4].ends_with("profile.php?number=12"));
        assert_eq!(row[5], "3");
    }

    #[test]
    fn test_parse_finished_live_results() {
        let document = Html::parse_document(
            "<html><body><table>\
             <tr><td>Meet Name</td></tr>\
             <tr><td>Boys 1M Final Unofficial Statistics</td></tr>\
             <tr><td>spacer</td></tr>\
             <tr><td>Place Score Diver</td></tr>\
             <tr><td>1 <a href=\"eventresultsind.php?id=1\">412.50</a> \
             <a href=\"profile.php?number=51197\">Logan Sherwin</a> (Mason) 5.50 41.25</td></tr>\
             <tr><td>2 <a href=\"eventresultsind.php?id=2\">398.20</a> \
             <a href=\"profile.php?number=3\">(A) John Doe</a> (TeamA) / \
             <a href=\"profile.php?number=4\">(B) Jane Smith</a> (TeamB) 5.20 39.80</td></tr>\
             <tr><td>Official results pending</td></tr>\
             </table></body></html>",
        );
        let finished = parse_finished_live_results(&document).unwrap();

        assert_eq!(finished.event_title, "Boys 1M Final");
        assert_eq!(finished.records.len(), 2);

        let single = &finished.records[0];
        assert_eq!(single.len(), 9);
        assert_eq!(single[0], "1");
        assert_eq!(single[1], "Logan");
        assert_eq!(single[2], "Sherwin");
        assert!(single[3].ends_with("profile.php?number=51197"));
        assert_eq!(single[4], "Mason");
        assert_eq!(single[5], "412.50");
        assert!(single[6].ends_with("eventresultsind.php?id=1"));
        assert_eq!(single[7], "5.50");
        assert_eq!(single[8], "41.25");

        let pair = &finished.records[1];
        assert_eq!(pair.len(), 13);
        assert_eq!(pair[1], "John");
        assert_eq!(pair[2], "Doe");
        assert_eq!(pair[4], "TeamA");
        assert_eq!(pair[7], "5.20");
        assert_eq!(pair[8], "39.80");
        assert_eq!(pair[9], "Jane");
        assert_eq!(pair[10], "Smith");
        assert_eq!(pair[12], "TeamB");
    }
}
