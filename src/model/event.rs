use serde::Serialize;

/// One competitor row from a finished event results page, in column order:
///
/// `[place, name, name_link, team, team_link, score, score_link, score_diff,
/// event_name]`
///
/// Synchro rows append `[synchro_name, synchro_link, synchro_team,
/// synchro_team_link]`. Consumers branch on row length to detect synchro
/// pairs; see [`is_synchro_row`].
pub type EventResultRow = Vec<String>;

/// Column count for an individual result row.
pub const EVENT_ROW_LEN: usize = 9;
/// Column count for a synchro-pair result row.
pub const SYNCHRO_ROW_LEN: usize = 13;

/// Whether a result row carries the doubled synchro fields.
pub fn is_synchro_row(row: &[String]) -> bool {
    row.len() == SYNCHRO_ROW_LEN
}

/// A diver's results at one meet, grouped from their event-history page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeetEventHistory {
    pub meet_name: String,
    /// Main meet page link, derived from the first event link of the meet.
    pub meet_link: String,
    pub events: Vec<HistoryEvent>,
}

/// One event under a meet in a diver's history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEvent {
    pub name: String,
    pub place: String,
    pub score: f64,
    pub link: String,
}

/// Header metadata from an individual event score page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSummary {
    pub meet_page_link: String,
    pub dates: String,
    pub organization: String,
    pub total_net_score: f64,
    pub total_dd: f64,
    pub total_score: f64,
    pub event_page_link: String,
}

/// One dive from an individual score sheet. The number carries any
/// annotations the page reports ("(Changed from ...)", "(No Dive)",
/// "(Balk)").
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetDive {
    pub order: u32,
    pub number: String,
    pub height: String,
    pub name: String,
    pub net_score: f64,
    pub dd: f64,
    pub score: f64,
    pub score_link: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_synchro_row() {
        assert!(!is_synchro_row(&vec![String::new(); EVENT_ROW_LEN]));
        assert!(is_synchro_row(&vec![String::new(); SYNCHRO_ROW_LEN]));
    }
}
