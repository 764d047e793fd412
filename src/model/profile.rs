use std::collections::HashMap;

use serde::Serialize;

use super::ParseReport;

/// Everything parsed from a single diver/coach profile page.
///
/// Each section parses independently and fails soft: a malformed section is
/// `None` while its siblings remain populated. Which sections appear depends
/// on the account type (diver vs coach) and on how much of the profile the
/// upstream site has filled in.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileData {
    pub info: Option<ProfileInfo>,
    /// Teams this person dives for, keyed by organization name.
    pub diving: Option<HashMap<String, Team>>,
    /// Teams this person coaches, keyed by organization name.
    pub coaching: Option<HashMap<String, Team>>,
    /// Meets judged, with per-event sheet links (place/score unused).
    pub judging: Option<Vec<ProfileMeet>>,
    /// Registered upcoming meets, with per-event sheet links.
    pub upcoming_meets: Option<Vec<ProfileMeet>>,
    /// One row per distinct dive number attempted.
    pub dive_statistics: Option<Vec<DiveStatistic>>,
    /// A coach's roster of divers.
    pub coach_divers: Option<Vec<DiverInfo>>,
    /// Completed meets with per-event place and score.
    pub meet_results: Option<Vec<ProfileMeet>>,
    /// Which identity labels were found on the page.
    pub report: ParseReport,
}

/// Identity fields from the top of a profile page.
///
/// Only the diver ID is guaranteed when a parse succeeds; shell profiles
/// carry nothing else.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileInfo {
    pub first: String,
    pub last: String,
    pub city_state: Option<String>,
    pub country: Option<String>,
    pub gender: Option<String>,
    pub age: Option<u32>,
    pub fina_age: Option<u32>,
    /// DiveMeets number, the primary external key.
    pub diver_id: String,
    pub hs_grad_year: Option<u32>,
}

impl ProfileInfo {
    pub fn name(&self) -> String {
        format!("{} {}", self.first, self.last)
    }

    pub fn name_last_first(&self) -> String {
        format!("{}, {}", self.last, self.first)
    }
}

/// One organization affiliation. For a diving affiliation the coach fields
/// name the team's coach; for a coaching affiliation they point back at the
/// profiled person, so the name is left empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Team {
    pub name: String,
    pub coach_name: String,
    pub coach_link: String,
}

/// A meet header with its events, as grouped in profile history tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileMeet {
    pub name: String,
    pub events: Vec<ProfileMeetEvent>,
}

/// One event row under a profile meet. `place`/`score` are populated only in
/// the completed-results section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileMeetEvent {
    pub name: String,
    pub link: String,
    pub place: Option<u32>,
    pub score: Option<f64>,
}

/// A name/link pair from a coach's diver roster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiverInfo {
    pub first: String,
    pub last: String,
    pub link: String,
}

impl DiverInfo {
    pub fn name(&self) -> String {
        format!("{} {}", self.first, self.last)
    }

    /// The DiveMeets number embedded in the profile link.
    pub fn diver_id(&self) -> String {
        self.link
            .rsplit('=')
            .next()
            .unwrap_or_default()
            .to_string()
    }
}

/// One row of the profile's dive-statistics table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiveStatistic {
    /// Dive number code, e.g. `"5337D"`.
    pub number: String,
    pub name: String,
    /// Board height in meters.
    pub height: f64,
    pub high_score: f64,
    pub high_score_link: String,
    pub avg_score: f64,
    pub avg_score_link: String,
    pub number_of_times: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diver_id_from_link() {
        let diver = DiverInfo {
            first: "John".into(),
            last: "Doe".into(),
            link: "https://secure.meetcontrol.com/divemeets/system/profile.php?number=12345"
                .into(),
        };
        assert_eq!(diver.diver_id(), "12345");
        assert_eq!(diver.name(), "John Doe");
    }
}
