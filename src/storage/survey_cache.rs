// Best known survey per (waypoint, material), ranked by mineral fraction
use crate::models::Survey;
use crate::models::transaction::format_survey;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug)]
pub struct SurveyCache {
    // waypoint_symbol -> material -> survey
    surveys: HashMap<String, HashMap<String, Survey>>,
    freshness_floor: Duration,
}

impl SurveyCache {
    pub fn new(freshness_floor: Duration) -> Self {
        Self {
            surveys: HashMap::new(),
            freshness_floor,
        }
    }

    /// Cached survey for `material` at `waypoint`, dropping it if it has expired
    pub fn best_survey(&mut self, waypoint: &str, material: &str) -> Option<&Survey> {
        self.best_survey_at(waypoint, material, Utc::now())
    }

    pub fn best_survey_at(&mut self, waypoint: &str, material: &str, now: DateTime<Utc>) -> Option<&Survey> {
        let expired = self.surveys.get(waypoint)?.get(material)?.is_expired_at(now);

        if expired {
            if let Some(by_material) = self.surveys.get_mut(waypoint) {
                by_material.remove(material);
                if by_material.is_empty() {
                    self.surveys.remove(waypoint);
                }
            }
            debug!("⏰ Survey for {} at {} has expired", material, waypoint);
            return None;
        }

        self.surveys.get(waypoint)?.get(material)
    }

    /// Merge new surveys. For each material a survey contains, it takes the slot
    /// when the slot is empty, when the cached survey expires within the
    /// freshness floor, or when its mineral fraction is strictly higher.
    pub fn record_surveys(&mut self, waypoint: &str, surveys: &[Survey]) {
        self.record_surveys_at(waypoint, surveys, Utc::now());
    }

    pub fn record_surveys_at(&mut self, waypoint: &str, surveys: &[Survey], now: DateTime<Utc>) {
        let by_material = self.surveys.entry(waypoint.to_string()).or_default();

        for survey in surveys {
            for (material, fraction) in survey.mineral_fractions() {
                let replace = match by_material.get(&material) {
                    None => true,
                    Some(existing) => {
                        existing.expiration - now < self.freshness_floor
                            || fraction > existing.mineral_fraction(&material)
                    }
                };

                if replace {
                    debug!(
                        "💾 Survey {} now best for {} at {} ({:.0}%: {})",
                        survey.signature,
                        material,
                        waypoint,
                        fraction * 100.0,
                        format_survey(survey)
                    );
                    by_material.insert(material, survey.clone());
                }
            }
        }

        if by_material.is_empty() {
            self.surveys.remove(waypoint);
        }
    }

    /// All cached entries as (waypoint, material, survey), sorted for display
    pub fn entries(&self) -> Vec<(&str, &str, &Survey)> {
        let mut entries: Vec<(&str, &str, &Survey)> = self
            .surveys
            .iter()
            .flat_map(|(waypoint, by_material)| {
                by_material
                    .iter()
                    .map(move |(material, survey)| (waypoint.as_str(), material.as_str(), survey))
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0).then_with(|| a.1.cmp(b.1)));
        entries
    }

    pub fn len(&self) -> usize {
        self.surveys.values().map(|by_material| by_material.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
