use std::collections::BTreeMap;

use serde::Serialize;

/// Parsed contents of a single meet's page. Info pages and results pages
/// share one URL family (`meetinfo` / `meetresults`) and are rewritten into
/// each other, so either side may be absent depending on which link was
/// followed and whether events have started.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MeetPageData {
    pub info: Option<MeetInfo>,
    pub results: Option<MeetResults>,
}

/// Registration-side details of a meet.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MeetInfo {
    pub name: String,
    pub date_range: String,
    /// Labeled detail pairs as rendered ("Fee per event", "Pool", ...).
    pub details: BTreeMap<String, String>,
    /// Per-date warmup/start times, keyed by rendered date string.
    pub schedule: BTreeMap<String, BTreeMap<String, String>>,
    pub events: Vec<MeetEvent>,
}

/// One scheduled event on a meet info page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeetEvent {
    pub date: String,
    pub number: u32,
    pub name: String,
    pub rule: String,
    pub entries: u32,
    pub entries_link: Option<String>,
}

/// Results-side view of a meet.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MeetResults {
    pub name: String,
    pub date: String,
    pub events: Vec<MeetResultsEvent>,
    /// Live-scoring links for events still in progress.
    pub live_events: Vec<LiveEventLink>,
}

/// One finished event on a meet results page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeetResultsEvent {
    pub name: String,
    pub link: String,
    pub entries: u32,
    pub date: String,
}

/// A link to a live-scoring page for an in-progress event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveEventLink {
    pub name: String,
    pub link: String,
}
