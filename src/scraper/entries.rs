//! Entry-list page parsing.
//!
//! An entry page interleaves competitor header rows with a nested table of
//! the dives they plan to perform. A header row carries one profile anchor
//! for a single entry and two for a synchro pair; the dive rows beneath it
//! accumulate onto the most recent entry.

use ::scraper::{ElementRef, Html, Selector};
use itertools::Itertools;

use crate::error::Result;
use crate::model::{EntryDive, EventEntry, SynchroPartner};
use crate::scraper::{element_text, resolve_link};

const BOARD_PREFIX: &str = "Board: ";

/// Parse an entry-list page into per-competitor dive sheets.
pub fn parse_entries(document: &Html) -> Result<Vec<EventEntry>> {
    let tr = Selector::parse("tr")?;
    let td = Selector::parse("td")?;
    let profile_anchor = Selector::parse("a[href*=\"profile.php\"]")?;

    let mut entries: Vec<EventEntry> = Vec::new();
    let mut current: Option<EventEntry> = None;

    for row in document.select(&tr) {
        let anchors: Vec<ElementRef> = row.select(&profile_anchor).collect();
        let cells: Vec<ElementRef> = row.select(&td).collect();

        if !anchors.is_empty() && cells.len() >= 2 {
            if let Some(entry) = current.take() {
                entries.push(entry);
            }

            let (first_name, last_name) = split_entry_name(&element_text(&anchors[0]));
            let link = anchors[0].value().attr("href").map(resolve_link);

            // Synchro pairs join their teams the same way they join names.
            let team_text = element_text(&cells[1]);
            let mut team_parts = team_text.splitn(2, " / ");
            let team = team_parts
                .next()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty());
            let partner_team = team_parts.next().map(|t| t.trim().to_string());

            let board = cells.iter().find_map(|cell| {
                element_text(cell)
                    .strip_prefix(BOARD_PREFIX)
                    .map(str::to_string)
            });

            let synchro_partner = anchors.get(1).and_then(|a| {
                let (first, last) = split_entry_name(&element_text(a));
                let href = a.value().attr("href")?;
                Some(SynchroPartner {
                    first_name: first,
                    last_name: last,
                    link: resolve_link(href),
                    team: partner_team.clone(),
                })
            });

            current = Some(EventEntry {
                first_name: Some(first_name).filter(|n| !n.is_empty()),
                last_name: Some(last_name).filter(|n| !n.is_empty()),
                link,
                team,
                board,
                dives: Vec::new(),
                synchro_partner,
            });
        } else if cells.len() == 5 {
            // Dive rows: order, number, height, description, DD. The nested
            // table's header fails the order parse and drops out here.
            if element_text(&cells[0]).parse::<u32>().is_err() {
                continue;
            }
            let Some(entry) = current.as_mut() else {
                continue;
            };

            let height_text = element_text(&cells[2]);
            let mut height_chars = height_text.chars();
            height_chars.next_back();
            let height: f64 = height_chars.as_str().parse().unwrap_or(0.0);

            entry.dives.push(EntryDive {
                number: element_text(&cells[1]),
                height,
                name: element_text(&cells[3]),
                dd: element_text(&cells[4]).parse().unwrap_or(0.0),
            });
        }
    }

    if let Some(entry) = current {
        entries.push(entry);
    }

    Ok(entries)
}

/// Entry names render "Last, First".
fn split_entry_name(text: &str) -> (String, String) {
    match text.splitn(2, ", ").collect_tuple() {
        Some((last, first)) => (first.trim().to_string(), last.trim().to_string()),
        None => (text.trim().to_string(), String::new()),
    }
}
