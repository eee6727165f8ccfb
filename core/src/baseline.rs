//! Baseline-users strategies.
//!
//! The baseline is the denominator for every retention and ad-exposure
//! percentage. Historical dashboard variants disagreed on how to pick it,
//! so the choice is an explicit, swappable policy. A manual override always
//! wins over the policy.

use crate::{
    error::{MetrixError, MetrixResult},
    level::LevelRow,
    types::UserCount,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselinePolicy {
    /// Level-1 users, or level-2 users when level 2 reports more (a tutorial
    /// funnel can inflate level 1). Falls back to the largest count when
    /// neither level exists.
    #[default]
    FirstLevels,
    /// Largest user count anywhere in the level table.
    MaxObserved,
    /// No computed value; a manual override is required.
    ManualOnly,
}

impl BaselinePolicy {
    pub fn name(self) -> &'static str {
        match self {
            BaselinePolicy::FirstLevels => "first_levels",
            BaselinePolicy::MaxObserved => "max_observed",
            BaselinePolicy::ManualOnly  => "manual_only",
        }
    }

    /// Apply the policy to cleaned, duplicate-free level rows.
    pub fn compute(self, rows: &[LevelRow]) -> Option<UserCount> {
        let max_observed = || rows.iter().map(|r| r.users).max();
        match self {
            BaselinePolicy::MaxObserved => max_observed(),
            BaselinePolicy::ManualOnly  => None,
            BaselinePolicy::FirstLevels => {
                let at = |level| rows.iter().find(|r| r.level == level).map(|r| r.users);
                match (at(1), at(2)) {
                    (Some(l1), Some(l2)) => Some(l1.max(l2)),
                    (Some(l1), None)     => Some(l1),
                    (None, Some(l2))     => Some(l2),
                    (None, None)         => max_observed(),
                }
            }
        }
    }
}

impl std::str::FromStr for BaselinePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "first_levels" => Ok(BaselinePolicy::FirstLevels),
            "max_observed" => Ok(BaselinePolicy::MaxObserved),
            "manual_only"  => Ok(BaselinePolicy::ManualOnly),
            other          => Err(format!("unknown baseline policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BaselineSource {
    Computed { policy: BaselinePolicy },
    Override,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Baseline {
    pub users:  UserCount,
    pub source: BaselineSource,
}

impl Baseline {
    /// Denominator for percentage math. Zero is a fatal configuration
    /// error, never a silent infinity.
    pub fn denominator(&self) -> MetrixResult<f64> {
        checked_denominator(self.users)
    }
}

pub fn checked_denominator(users: UserCount) -> MetrixResult<f64> {
    if users == 0 {
        return Err(MetrixError::InvalidBaseline { baseline: users });
    }
    Ok(users as f64)
}

/// Pick the baseline for this run. The override replaces the computed
/// value entirely.
pub fn resolve_baseline(
    rows: &[LevelRow],
    policy: BaselinePolicy,
    manual_override: Option<UserCount>,
) -> MetrixResult<Baseline> {
    let baseline = match manual_override {
        Some(users) => Baseline { users, source: BaselineSource::Override },
        None => {
            let users = policy
                .compute(rows)
                .ok_or(MetrixError::BaselineUnavailable { policy: policy.name() })?;
            Baseline { users, source: BaselineSource::Computed { policy } }
        }
    };
    baseline.denominator()?;
    log::debug!("Baseline users = {} ({:?})", baseline.users, baseline.source);
    Ok(baseline)
}
