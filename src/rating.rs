//! Skill-rating computation over parsed dive statistics.
//!
//! A pure reduction pipeline: split a diver's statistics by board category,
//! pick representative "top dives" per dive family, weight each by degree of
//! difficulty and repetition, and sum into springboard/platform/total
//! ratings. A cohort of ratings can then be normalized to a 0-100 scale for
//! ranking display.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::DiveStatistic;

/// Board category inferred from a dive's height.
#[derive(
    Debug,
    Clone,
    Copy,
    Hash,
    Eq,
    PartialEq,
    Serialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
pub enum BoardCategory {
    #[strum(serialize = "1M")]
    OneMeter,
    #[strum(serialize = "3M")]
    ThreeMeter,
    #[strum(serialize = "Platform")]
    Platform,
}

/// Height above 3 meters is platform; above 1 meter is the 3M band.
pub fn board_category(height: f64) -> BoardCategory {
    if height > 3.0 {
        BoardCategory::Platform
    } else if height > 1.0 {
        BoardCategory::ThreeMeter
    } else {
        BoardCategory::OneMeter
    }
}

/// Degree-of-difficulty entry for one dive number.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiveData {
    pub name: String,
    /// DD by height, keyed by the rendered height string ("1", "3", "7.5").
    pub dd: HashMap<String, f64>,
}

/// The static dive-difficulty table, keyed by dive number.
///
/// Matches the upstream JSON shape `{number: {name, dd: {height: dd}}}`.
/// The table is injected by the caller; the crate never loads it from disk.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiveTable(HashMap<String, DiveData>);

impl DiveTable {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn insert(&mut self, number: impl Into<String>, data: DiveData) {
        self.0.insert(number.into(), data);
    }

    /// DD for a dive number at a height, if the table knows it.
    pub fn dd(&self, number: &str, height: f64) -> Option<f64> {
        self.0.get(number)?.dd.get(&format_height(height)).copied()
    }

    pub fn dive_name(&self, number: &str) -> Option<&str> {
        self.0.get(number).map(|d| d.name.as_str())
    }
}

/// Whole-meter heights render without a decimal ("3"), others as-is ("7.5").
fn format_height(height: f64) -> String {
    if height.fract() == 0.0 {
        format!("{}", height as i64)
    } else {
        height.to_string()
    }
}

/// Springboard/platform rating pair and their sum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SkillRatingSummary {
    pub springboard: f64,
    pub platform: f64,
    pub total: f64,
}

/// The rating engine, parameterized by a dive-difficulty table.
pub struct SkillRating<'a> {
    table: &'a DiveTable,
}

impl<'a> SkillRating<'a> {
    pub fn new(table: &'a DiveTable) -> Self {
        Self { table }
    }

    /// Average score times DD. A dive the table doesn't know contributes
    /// zero rather than failing the computation.
    pub fn compute_skill_value(&self, dive: &DiveStatistic) -> f64 {
        dive.avg_score * self.table.dd(&dive.number, dive.height).unwrap_or(0.0)
    }

    /// Split statistics into (1M, 3M, platform) groups by height.
    pub fn stats_by_board(
        &self,
        stats: &[DiveStatistic],
    ) -> (Vec<DiveStatistic>, Vec<DiveStatistic>, Vec<DiveStatistic>) {
        let mut one = Vec::new();
        let mut three = Vec::new();
        let mut platform = Vec::new();

        for dive in stats {
            match board_category(dive.height) {
                BoardCategory::Platform => platform.push(dive.clone()),
                BoardCategory::ThreeMeter => three.push(dive.clone()),
                BoardCategory::OneMeter => one.push(dive.clone()),
            }
        }

        (one, three, platform)
    }

    /// The better of `dive` and `stored` by skill value, ties broken by the
    /// higher times-performed count.
    fn best_dive<'b>(
        &self,
        dive: &'b DiveStatistic,
        stored: Option<&'b DiveStatistic>,
    ) -> &'b DiveStatistic {
        let Some(stored) = stored else {
            return dive;
        };

        let dive_value = self.compute_skill_value(dive);
        let cur_value = self.compute_skill_value(stored);
        if dive_value > cur_value
            || (dive_value == cur_value && dive.number_of_times > stored.number_of_times)
        {
            dive
        } else {
            stored
        }
    }

    /// The "top six" dives used for rating, from statistics already filtered
    /// to one board category.
    ///
    /// Tracks the best dive of each family (leading digit 1-6) plus each
    /// family's runner-up; a runner-up slot is only occupied by a different
    /// dive number than the family leader's. The returned list is the
    /// front/back/reverse/inward/twist leaders plus one wildcard, the best
    /// among all runners-up; the armstand leader competes only for the
    /// wildcard. At most six entries, fewer when families are unattempted.
    pub fn top_dives(&self, dives: &[DiveStatistic]) -> Vec<DiveStatistic> {
        let mut leaders: [Option<&DiveStatistic>; 6] = [None; 6];
        let mut runners_up: [Option<&DiveStatistic>; 6] = [None; 6];

        for dive in dives {
            let Some(family) = dive.number.chars().next().and_then(|c| c.to_digit(10)) else {
                continue;
            };
            if !(1..=6).contains(&family) {
                continue;
            }
            let slot = (family - 1) as usize;

            let Some(leader) = leaders[slot] else {
                leaders[slot] = Some(dive);
                continue;
            };

            let dive_value = self.compute_skill_value(dive);
            let cur_value = self.compute_skill_value(leader);
            if dive_value > cur_value
                || (dive_value == cur_value && dive.number_of_times > leader.number_of_times)
            {
                // The displaced leader only becomes a runner-up when the
                // numbers differ; a harder variant of the same dive does not
                // open a second slot.
                if !same_dive_number(dive, Some(leader)) {
                    runners_up[slot] = Some(leader);
                }
                leaders[slot] = Some(dive);
            } else if !same_dive_number(dive, leaders[slot])
                && !same_dive_number(dive, runners_up[slot])
            {
                runners_up[slot] = Some(self.best_dive(dive, runners_up[slot]));
            }
        }

        let mut wildcard: Option<&DiveStatistic> = None;
        for runner in runners_up.into_iter().flatten() {
            wildcard = Some(self.best_dive(runner, wildcard));
        }

        leaders[..5]
            .iter()
            .copied()
            .flatten()
            .chain(wildcard)
            .cloned()
            .collect()
    }

    /// Rating contribution of one board category's top dives:
    /// `Σ avg_score × DD × (1.01 − 1/times)`.
    pub fn event_metric(&self, dives: &[DiveStatistic]) -> f64 {
        dives
            .iter()
            .map(|dive| {
                self.compute_skill_value(dive) * inverted_number_of_times(dive.number_of_times)
            })
            .sum()
    }

    /// Full rating over a diver's statistics: 1M and 3M metrics sum into the
    /// springboard rating, platform stands alone.
    pub fn skill_rating(&self, stats: &[DiveStatistic]) -> SkillRatingSummary {
        let (one, three, platform) = self.stats_by_board(stats);

        let mut springboard = 0.0;
        let mut platform_rating = 0.0;
        for (category, dives) in [
            (BoardCategory::OneMeter, one),
            (BoardCategory::ThreeMeter, three),
            (BoardCategory::Platform, platform),
        ] {
            let top = self.top_dives(&dives);
            let rating = self.event_metric(&top);
            if category == BoardCategory::Platform {
                platform_rating += rating;
            } else {
                springboard += rating;
            }
        }

        SkillRatingSummary {
            springboard,
            platform: platform_rating,
            total: springboard + platform_rating,
        }
    }
}

/// Repetition weight approaching 1.01 as a dive is performed more often.
fn inverted_number_of_times(times: u32) -> f64 {
    1.01 - 1.0 / f64::from(times)
}

/// True when both dive numbers match ignoring the trailing position letter
/// ("5337D" vs "5337C").
fn same_dive_number(a: &DiveStatistic, b: Option<&DiveStatistic>) -> bool {
    b.is_some_and(|b| strip_position(&a.number) == strip_position(&b.number))
}

fn strip_position(number: &str) -> &str {
    let mut chars = number.chars();
    chars.next_back();
    chars.as_str()
}

/// Map a cohort of ratings onto 0-100: `(v − min) / (max − min) × 100`.
///
/// A cohort of size ≤ 1, or one with no spread, maps to all zeros so the
/// scale never divides by zero.
pub fn normalize_ratings(ratings: &[f64]) -> Vec<f64> {
    if ratings.len() <= 1 {
        return vec![0.0; ratings.len()];
    }

    let min = ratings.iter().copied().fold(f64::INFINITY, f64::min);
    let max = ratings.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max - min == 0.0 {
        return vec![0.0; ratings.len()];
    }

    ratings
        .iter()
        .map(|v| (v - min) / (max - min) * 100.0)
        .collect()
}
