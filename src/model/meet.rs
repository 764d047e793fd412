use std::collections::HashMap;

use serde::Serialize;

/// Upcoming meets nested as year → organization → meets.
pub type MeetDict = HashMap<String, HashMap<String, Vec<MeetBody>>>;

/// One meet row from an organization's upcoming-meets page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeetBody {
    pub name: String,
    pub link: String,
    pub start_date: String,
    pub end_date: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

/// Link and location details shared by the info/results sides of a current
/// meet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeetLinkBody {
    pub link: String,
    pub start_date: String,
    pub end_date: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

/// A meet in progress, from the homepage sidebar. The results link appears
/// only once the first event has finished.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentMeet {
    pub name: String,
    pub info: MeetLinkBody,
    pub results: Option<MeetLinkBody>,
}

/// Output of an index-page walk: upcoming meets by year and organization,
/// plus whatever is running right now. An index page without an "Upcoming"
/// tab yields an empty (not missing) map, so callers can tell "no meets"
/// apart from a call that never happened.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PresentMeets {
    pub upcoming: MeetDict,
    pub current: Vec<CurrentMeet>,
}

/// A flattened upcoming-meet row for record storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeetRecord {
    pub id: i32,
    pub name: String,
    pub organization: Option<String>,
    pub link: String,
    pub start_date: String,
    pub end_date: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

/// Flatten the nested upcoming-meets mapping into storable records. Meets
/// whose links carry no numeric id are dropped.
pub fn flatten_meets(dict: &MeetDict) -> Vec<MeetRecord> {
    let mut result = Vec::new();
    for orgs in dict.values() {
        for (org, meets) in orgs {
            for meet in meets {
                let Some(id) = meet_id(&meet.link) else {
                    continue;
                };
                result.push(MeetRecord {
                    id,
                    name: meet.name.clone(),
                    organization: Some(org.clone()),
                    link: meet.link.clone(),
                    start_date: meet.start_date.clone(),
                    end_date: meet.end_date.clone(),
                    city: meet.city.clone(),
                    state: meet.state.clone(),
                    country: meet.country.clone(),
                });
            }
        }
    }
    result
}

/// The numeric meet id from the trailing `=`-component of a meet link.
pub fn meet_id(link: &str) -> Option<i32> {
    link.rsplit('=').next()?.parse().ok()
}

/// Collapse a start/end date pair into a display string.
pub fn display_date(start: &str, end: &str) -> String {
    if start == end {
        start.to_string()
    } else {
        format!("{start} - {end}")
    }
}
