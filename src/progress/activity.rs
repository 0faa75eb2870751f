//! Tier 3: repository activity scoring.
//!
//! When the repository carries a roadmap checklist, its completion ratio
//! is the tier-3 score outright. Otherwise a capped composite is used:
//!
//! | Component | Contribution |
//! |-----------|--------------|
//! | commits | `min(commits / 50, 1) × 30` |
//! | merged PRs | `min(merged / 10, 1) × 30` |
//! | releases | `min(releases / 3, 1) × 20` |
//! | velocity | `min(commits_per_week / 5, 1) × 20` |

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{ActivityBasis, ActivityCounts, ChecklistProgress, Confidence, Tier3Result};
use crate::models::{Project, Quarter};

static CHECKLIST_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:[-*+]|\d+[.)])\s+\[([ xX])\]").expect("valid checklist regex")
});

const COMMIT_SATURATION: f64 = 50.0;
const MERGED_PR_SATURATION: f64 = 10.0;
const RELEASE_SATURATION: f64 = 3.0;
const VELOCITY_SATURATION: f64 = 5.0;

/// Whether tier 3 should be attempted for a project.
///
/// Requires the project to be under way (in progress or committed) or
/// scheduled at or before the current quarter. Repository reference and
/// token availability are checked by the caller.
pub fn is_due_for_tracking(project: &Project, scheduled: Option<Quarter>, current: Quarter) -> bool {
    project.status.is_active() || scheduled.is_some_and(|q| q <= current)
}

/// Date from which activity is counted: the record's start date, else the
/// first day of the scheduled quarter, else the first day of the year.
pub fn activity_since(project: &Project, scheduled: Option<Quarter>, year: i32) -> Option<NaiveDate> {
    project
        .start_date
        .or_else(|| scheduled.and_then(|q| q.start_date(year)))
        .or_else(|| NaiveDate::from_ymd_opt(year, 1, 1))
}

/// Counts `- [x]` / `- [ ]` items in a markdown document.
pub fn parse_checklist(markdown: &str) -> ChecklistProgress {
    let mut progress = ChecklistProgress::default();
    for caps in CHECKLIST_ITEM.captures_iter(markdown) {
        progress.total += 1;
        if caps.get(1).is_some_and(|m| m.as_str().eq_ignore_ascii_case("x")) {
            progress.done += 1;
        }
    }
    progress
}

/// Scores fetched activity over `weeks` of elapsed time.
pub fn score_activity(counts: ActivityCounts, weeks: f64) -> Tier3Result {
    let weeks = if weeks.is_finite() { weeks.max(1.0) } else { 1.0 };
    let commits_per_week = counts.commits as f64 / weeks;

    if let Some(pct) = counts.roadmap.and_then(|r| r.ratio_pct()) {
        return Tier3Result {
            progress_pct: pct.clamp(0.0, 100.0),
            activity_counts: counts,
            commits_per_week,
            basis: ActivityBasis::Roadmap,
            confidence: Confidence::High,
        };
    }

    let composite = saturate(counts.commits as f64, COMMIT_SATURATION) * 30.0
        + saturate(counts.merged_prs as f64, MERGED_PR_SATURATION) * 30.0
        + saturate(counts.releases as f64, RELEASE_SATURATION) * 20.0
        + saturate(commits_per_week, VELOCITY_SATURATION) * 20.0;

    let any_activity = counts.commits + counts.merged_prs + counts.releases > 0;
    Tier3Result {
        progress_pct: composite.clamp(0.0, 100.0),
        activity_counts: counts,
        commits_per_week,
        basis: ActivityBasis::Composite,
        confidence: if any_activity {
            Confidence::Medium
        } else {
            Confidence::Low
        },
    }
}

#[inline]
fn saturate(value: f64, at: f64) -> f64 {
    (value / at).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProjectStatus;

    #[test]
    fn test_eligibility() {
        let proposed = Project::new("A");
        assert!(!is_due_for_tracking(&proposed, None, Quarter::Q2));
        assert!(!is_due_for_tracking(&proposed, Some(Quarter::Q3), Quarter::Q2));
        assert!(is_due_for_tracking(&proposed, Some(Quarter::Q2), Quarter::Q2));

        let active = Project::new("B").with_status(ProjectStatus::InProgress);
        assert!(is_due_for_tracking(&active, None, Quarter::Q1));
    }

    #[test]
    fn test_activity_since() {
        let d = NaiveDate::from_ymd_opt(2025, 2, 10).unwrap();
        let p = Project::new("A").with_start_date(d);
        assert_eq!(activity_since(&p, Some(Quarter::Q3), 2025), Some(d));
        assert_eq!(
            activity_since(&Project::new("B"), Some(Quarter::Q3), 2025),
            NaiveDate::from_ymd_opt(2025, 7, 1)
        );
        assert_eq!(
            activity_since(&Project::new("C"), None, 2025),
            NaiveDate::from_ymd_opt(2025, 1, 1)
        );
    }

    #[test]
    fn test_parse_checklist() {
        let md = "# Roadmap\n- [x] auth\n- [ ] billing\n  * [X] nested\n1. [ ] numbered\n- plain item\n";
        assert_eq!(parse_checklist(md), ChecklistProgress { done: 2, total: 4 });
    }

    #[test]
    fn test_roadmap_dominates() {
        let counts = ActivityCounts {
            commits: 500,
            merged_prs: 40,
            releases: 9,
            roadmap: Some(ChecklistProgress { done: 1, total: 4 }),
            ..Default::default()
        };
        let r = score_activity(counts, 10.0);
        assert_eq!(r.basis, ActivityBasis::Roadmap);
        assert!((r.progress_pct - 25.0).abs() < 1e-10);
        assert_eq!(r.confidence, Confidence::High);
    }

    #[test]
    fn test_composite() {
        let counts = ActivityCounts {
            commits: 25,
            merged_prs: 5,
            releases: 1,
            roadmap: Some(ChecklistProgress::default()),
            ..Default::default()
        };
        let r = score_activity(counts, 10.0);
        // 15 + 15 + 6.67 + (2.5/5)×20
        assert_eq!(r.basis, ActivityBasis::Composite);
        assert!((r.progress_pct - (15.0 + 15.0 + 20.0 / 3.0 + 10.0)).abs() < 1e-10);
        assert!((r.commits_per_week - 2.5).abs() < 1e-10);
        assert_eq!(r.confidence, Confidence::Medium);
    }

    #[test]
    fn test_composite_saturates() {
        let counts = ActivityCounts {
            commits: 1000,
            merged_prs: 100,
            releases: 10,
            ..Default::default()
        };
        let r = score_activity(counts, 0.0);
        assert!((r.progress_pct - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_no_activity_low_confidence() {
        let r = score_activity(ActivityCounts::default(), 4.0);
        assert!((r.progress_pct - 0.0).abs() < 1e-10);
        assert_eq!(r.confidence, Confidence::Low);
    }
}
