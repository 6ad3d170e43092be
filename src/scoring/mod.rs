//! Scoring engine
//!
//! Pure functions folding probe results into 0-100 scores and a 1-5 outreach
//! priority (5 is the most urgent).

use crate::audit::Impact;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum weight of a single violation
const MAX_IMPACT_WEIGHT: f64 = 4.0;

const PENALTY_NO_HTTPS: i32 = 30;
const PENALTY_PER_COOKIE: i32 = 5;
const MAX_COOKIE_PENALTY: i32 = 25;
const PENALTY_PER_TRACKER: i32 = 15;
const MAX_TRACKER_PENALTY: i32 = 45;
const PENALTY_NO_BANNER: i32 = 20;

/// Population above which mid-range scores escalate to priority 4
const LARGE_POPULATION: u64 = 5000;

/// Accessibility compliance level derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComplianceStatus {
    Compliant,
    Partial,
    NonCompliant,
}

impl ComplianceStatus {
    pub fn from_score(score: u8) -> Self {
        match score {
            100..=u8::MAX => ComplianceStatus::Compliant,
            75..=99 => ComplianceStatus::Partial,
            _ => ComplianceStatus::NonCompliant,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceStatus::Compliant => "compliant",
            ComplianceStatus::Partial => "partial",
            ComplianceStatus::NonCompliant => "non-compliant",
        }
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weighted accessibility score
///
/// `penalty / (total_criteria * 4)` is capped at 1, so the score never drops
/// below 0 however many violations there are.
pub fn accessibility_score<I>(impacts: I, total_criteria: u32) -> u8
where
    I: IntoIterator<Item = Impact>,
{
    let penalty: u64 = impacts.into_iter().map(|i| u64::from(i.weight())).sum();
    if penalty == 0 {
        return 100;
    }

    let max_penalty = f64::from(total_criteria.max(1)) * MAX_IMPACT_WEIGHT;
    let normalized = (penalty as f64 / max_penalty).min(1.0);
    ((1.0 - normalized) * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Privacy score from pre-consent observations
pub fn privacy_score(is_https: bool, cookies: usize, trackers: usize, has_banner: bool) -> u8 {
    let mut score: i32 = 100;

    if !is_https {
        score -= PENALTY_NO_HTTPS;
    }
    score -= capped_penalty(cookies, PENALTY_PER_COOKIE, MAX_COOKIE_PENALTY);
    score -= capped_penalty(trackers, PENALTY_PER_TRACKER, MAX_TRACKER_PENALTY);
    if !has_banner {
        score -= PENALTY_NO_BANNER;
    }

    score.clamp(0, 100) as u8
}

fn capped_penalty(count: usize, per_item: i32, cap: i32) -> i32 {
    let count = i32::try_from(count).unwrap_or(i32::MAX);
    count.saturating_mul(per_item).min(cap)
}

/// Inputs of the priority rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityInput {
    pub accessibility: u8,
    pub privacy: u8,
    /// Trackers fire before consent and there is no banner to ask for it
    pub trackers_without_banner: bool,
    pub population: Option<u64>,
}

/// Outreach priority, first matching rule wins
pub fn priority(input: &PriorityInput) -> u8 {
    let a11y = input.accessibility;
    let privacy = input.privacy;
    let large = input.population.is_some_and(|p| p > LARGE_POPULATION);

    if a11y < 20 || privacy < 20 || input.trackers_without_banner {
        5
    } else if (a11y < 40 || privacy < 40) && large {
        4
    } else if a11y < 60 || privacy < 60 {
        3
    } else if a11y < 80 || privacy < 80 {
        2
    } else {
        1
    }
}

/// What a problem summary is computed from
#[derive(Debug, Clone, Default)]
pub struct ProblemFacts {
    pub is_https: Option<bool>,
    pub trackers_before_consent: usize,
    pub cookies_before_consent: usize,
    pub has_banner: Option<bool>,
    pub critical_violations: usize,
    pub serious_violations: usize,
    pub accessibility_status: Option<ComplianceStatus>,
    pub performance: Option<f64>,
}

/// Short human-readable problems, most severe first
pub fn problem_summaries(facts: &ProblemFacts) -> Vec<String> {
    let mut problems = Vec::new();

    if facts.is_https == Some(false) {
        problems.push("HTTPS missing".to_string());
    }
    if facts.trackers_before_consent > 0 {
        problems.push(format!(
            "{} tracker(s) before consent",
            facts.trackers_before_consent
        ));
    }
    if facts.has_banner == Some(false) {
        problems.push("no consent banner".to_string());
    }
    if facts.cookies_before_consent > 0 {
        problems.push(format!(
            "{} cookie(s) before consent",
            facts.cookies_before_consent
        ));
    }
    if facts.critical_violations > 0 {
        problems.push(format!(
            "{} critical accessibility violation(s)",
            facts.critical_violations
        ));
    }
    if facts.serious_violations > 0 {
        problems.push(format!(
            "{} serious accessibility violation(s)",
            facts.serious_violations
        ));
    }
    if facts.critical_violations == 0
        && facts.serious_violations == 0
        && facts.accessibility_status == Some(ComplianceStatus::NonCompliant)
    {
        problems.push("accessibility non-compliant".to_string());
    }
    if facts.performance.is_some_and(|p| p < 0.5) {
        problems.push("slow performance".to_string());
    }

    problems
}
