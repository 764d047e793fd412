use serde::Serialize;

use super::ParseReport;

/// The diver who just completed a dive on a live-scoring page.
///
/// Fields are sliced out of rendered label text; any label missing from the
/// snapshot leaves its field at the default rather than failing the parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LastDiverInfo {
    pub name: String,
    pub link: String,
    pub last_round_place: u32,
    pub last_round_total: f64,
    pub order: u32,
    pub place: u32,
    pub total: f64,
    pub dive: String,
    pub height: String,
    pub dd: f64,
    pub score: f64,
    /// Raw per-judge score string as rendered.
    pub judges_scores: String,
}

/// The diver on deck on a live-scoring page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NextDiverInfo {
    pub name: String,
    pub link: String,
    pub last_round_place: u32,
    pub last_round_total: f64,
    pub order: u32,
    pub dive: String,
    pub height: String,
    pub dd: f64,
    pub avg_score: f64,
    pub max_score: f64,
    /// Score needed to take first place.
    pub for_first_place: f64,
}

/// One snapshot of a live-scoring page, meant to be reparsed on every poll
/// tick.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LiveResults {
    pub title: String,
    /// Current-round string; absent on AB board layouts.
    pub round: Option<String>,
    pub last_diver: Option<LastDiverInfo>,
    pub next_diver: Option<NextDiverInfo>,
    /// Full standings table rows as rendered, with profile links resolved.
    pub standings: Vec<Vec<String>>,
    /// True when the page used the alternate board layout that has no
    /// last/next diver blocks.
    pub ab_board: bool,
    /// Which slicing labels were found in the snapshot.
    pub report: ParseReport,
}

/// A finished event parsed from its live-results page, for events whose
/// final standings never made it to a regular results page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FinishedLiveResults {
    pub event_title: String,
    /// `[place, first, last, link, team, score, score_link, event_avg,
    /// round_avg]` per diver; synchro rows double the name fields to 13
    /// columns like finished event rows.
    pub records: Vec<Vec<String>>,
}

/// Lifecycle of one polling consumer of a live-scoring page.
///
/// `ParseFailed` and `TimedOut` are terminal for a tick, not for the loop:
/// the next tick re-enters `Fetching`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum PollState {
    #[default]
    NotStarted,
    Fetching,
    ParsedOk,
    ParseFailed,
    TimedOut,
}
