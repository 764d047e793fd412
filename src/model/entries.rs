use serde::Serialize;

/// One competitor's sheet from a pre-event entry list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventEntry {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub link: Option<String>,
    pub team: Option<String>,
    pub board: Option<String>,
    pub dives: Vec<EntryDive>,
    /// Present when the entry is a synchro pair.
    pub synchro_partner: Option<SynchroPartner>,
}

/// The second competitor of a synchro entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynchroPartner {
    pub first_name: String,
    pub last_name: String,
    pub link: String,
    pub team: Option<String>,
}

/// One planned dive on an entry sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryDive {
    pub number: String,
    /// Board height in meters.
    pub height: f64,
    pub name: String,
    pub dd: f64,
}
