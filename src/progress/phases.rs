//! Tier 1: declared-phase completion.
//!
//! Phases come from three places, merged by normalized name with priority
//! structured > tabular > free text:
//!
//! - **Structured**: the record's `phases` list.
//! - **Tabular**: markdown tables in the narrative whose header has quarter
//!   columns; a row is a phase, a check mark in any quarter cell marks it
//!   complete, and the first filled quarter cell is its timeline.
//! - **Free text**: `Phase N` headings in the narrative; completion and
//!   quarter hints are read from the heading and the lines below it.
//!
//! # Confidence
//!
//! | Contributing sources | Confidence |
//! |----------------------|------------|
//! | any structured phase | high |
//! | tabular (no structured) | medium |
//! | free text only | low |
//! | none | none |

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

use super::{Confidence, PhaseSource, Tier1Result, TrackedPhase};
use crate::models::{Project, Quarter};

static PHASE_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:#{1,6}\s*)?(?:\*\*)?\s*phase\s+(\d+)\b\s*[:.)\-–—]?\s*(.*)$")
        .expect("valid phase heading regex")
});

static PHASE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*phase\s+\d+\s*[:.)\-–—]?\s*").expect("valid phase prefix regex")
});

static COMPLETION_HINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)✅|✔|✓|☑|\[x\]|\b(?:complete|completed|done|delivered|shipped|launched|finished)\b")
        .expect("valid completion regex")
});

static DECORATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\([^)]*\)|\[[^\]]*\]|\*\*|✅|✔|✓|☑|⬜").expect("valid decoration regex")
});

static SEPARATOR_CELL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^:?-{2,}:?$").expect("valid separator regex"));

/// Lines scanned below a free-text heading for hints.
const HINT_WINDOW: usize = 4;

/// Analyzes tier 1 for a project at the given quarter.
pub fn analyze_phases(project: &Project, current: Quarter) -> Tier1Result {
    let structured = structured_phases(project);
    let (tabular, free_text) = match project.narrative.as_deref() {
        Some(text) => (parse_tabular(text), parse_free_text(text)),
        None => (Vec::new(), Vec::new()),
    };
    debug!(
        project = %project.id,
        structured = structured.len(),
        tabular = tabular.len(),
        free_text = free_text.len(),
        "phase sources"
    );

    let phases = merge_phases([structured, tabular, free_text]);
    summarize(phases, current)
}

/// Builds the tier-1 result from merged phases.
pub fn summarize(phases: Vec<TrackedPhase>, current: Quarter) -> Tier1Result {
    if phases.is_empty() {
        return Tier1Result::empty();
    }

    let total_phases = phases.len();
    let completed_phases = phases.iter().filter(|p| p.completed).count();

    let confidence = match phases.iter().map(|p| p.source).min() {
        Some(PhaseSource::Structured) => Confidence::High,
        Some(PhaseSource::Tabular) => Confidence::Medium,
        Some(PhaseSource::FreeText) => Confidence::Low,
        None => Confidence::None,
    };

    let hinted: Vec<Quarter> = phases.iter().filter_map(|p| p.quarter).collect();
    let on_track = if hinted.is_empty() {
        None
    } else {
        let due = hinted.iter().filter(|&&q| q <= current).count();
        Some(completed_phases >= due)
    };

    Tier1Result {
        progress_pct: completed_phases as f64 / total_phases as f64 * 100.0,
        completed_phases,
        total_phases,
        confidence,
        on_track,
        phases,
    }
}

/// Merges phase lists given in priority order, deduplicating by normalized name.
pub fn merge_phases<I>(sources: I) -> Vec<TrackedPhase>
where
    I: IntoIterator<Item = Vec<TrackedPhase>>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for phase in sources.into_iter().flatten() {
        if seen.insert(normalize_name(&phase.name)) {
            merged.push(phase);
        }
    }
    merged
}

/// Dedupe key: `"Phase 2: Pilot Rollout"` and `"pilot rollout"` collide.
pub fn normalize_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let stripped = PHASE_PREFIX.replace(&lowered, "");
    let base = if stripped.trim().is_empty() {
        lowered.as_str()
    } else {
        stripped.as_ref()
    };
    base.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn structured_phases(project: &Project) -> Vec<TrackedPhase> {
    project
        .phases
        .iter()
        .filter(|p| !p.name.trim().is_empty())
        .map(|p| TrackedPhase {
            name: p.name.trim().to_string(),
            quarter: p.timeline_hint.as_deref().and_then(Quarter::from_hint),
            completed: p.completed,
            source: PhaseSource::Structured,
        })
        .collect()
}

/// Extracts phases from markdown tables with quarter columns.
pub fn parse_tabular(text: &str) -> Vec<TrackedPhase> {
    let mut phases = Vec::new();
    let mut columns: Option<Vec<(usize, Quarter)>> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if !trimmed.starts_with('|') {
            columns = None;
            continue;
        }
        let cells = split_row(trimmed);

        let Some(quarter_cols) = &columns else {
            let header: Vec<(usize, Quarter)> = cells
                .iter()
                .enumerate()
                .skip(1)
                .filter_map(|(i, c)| Quarter::from_hint(c).map(|q| (i, q)))
                .collect();
            if !header.is_empty() {
                columns = Some(header);
            }
            continue;
        };

        if cells.iter().all(|c| SEPARATOR_CELL.is_match(c) || c.is_empty()) {
            continue;
        }
        let name = clean_name(cells.first().map(String::as_str).unwrap_or_default());
        if name.is_empty() {
            continue;
        }

        let mut quarter = None;
        let mut completed = false;
        for &(i, q) in quarter_cols {
            let cell = cells.get(i).map(String::as_str).unwrap_or_default();
            if is_empty_cell(cell) {
                continue;
            }
            quarter.get_or_insert(q);
            completed |= COMPLETION_HINT.is_match(cell);
        }

        phases.push(TrackedPhase {
            name,
            quarter,
            completed,
            source: PhaseSource::Tabular,
        });
    }
    phases
}

/// Extracts phases from `Phase N` headings.
pub fn parse_free_text(text: &str) -> Vec<TrackedPhase> {
    let lines: Vec<&str> = text.lines().collect();
    let mut phases = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        if line.trim_start().starts_with('|') {
            continue;
        }
        let Some(caps) = PHASE_HEADING.captures(line) else {
            continue;
        };
        let number = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let title = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

        let mut context = String::from(title);
        for next in lines.iter().skip(i + 1).take(HINT_WINDOW) {
            if PHASE_HEADING.is_match(next) || next.trim_start().starts_with('#') {
                break;
            }
            context.push('\n');
            context.push_str(next);
        }

        let cleaned = clean_name(title);
        let name = if cleaned.is_empty() {
            format!("Phase {number}")
        } else {
            cleaned
        };

        phases.push(TrackedPhase {
            name,
            quarter: Quarter::from_hint(&context),
            completed: COMPLETION_HINT.is_match(&context),
            source: PhaseSource::FreeText,
        });
    }
    phases
}

fn split_row(row: &str) -> Vec<String> {
    row.trim_matches('|')
        .split('|')
        .map(|c| c.trim().to_string())
        .collect()
}

fn is_empty_cell(cell: &str) -> bool {
    matches!(cell.trim(), "" | "-" | "–" | "—")
}

fn clean_name(raw: &str) -> String {
    let without = DECORATION.replace_all(raw, "");
    without
        .trim()
        .trim_end_matches(|c: char| !c.is_alphanumeric() && c != ')')
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Phase;
    use pretty_assertions::assert_eq;

    const NARRATIVE: &str = "\
## Delivery plan

| Phase | Q1 | Q2 | Q3 | Q4 |
|-------|----|----|----|----|
| Discovery | ✅ | | | |
| **Pilot rollout** | | ⬜ | | |
| Scale-out | | | ⬜ | ⬜ |

### Phase 1: Discovery (Q1)
Completed in January.

### Phase 4: Handover
Planned for Q4.
";

    #[test]
    fn test_parse_tabular() {
        let phases = parse_tabular(NARRATIVE);
        let names: Vec<&str> = phases.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Discovery", "Pilot rollout", "Scale-out"]);
        assert!(phases[0].completed);
        assert_eq!(phases[0].quarter, Some(Quarter::Q1));
        assert!(!phases[1].completed);
        assert_eq!(phases[2].quarter, Some(Quarter::Q3));
    }

    #[test]
    fn test_parse_free_text() {
        let phases = parse_free_text(NARRATIVE);
        assert_eq!(phases.len(), 2);
        assert_eq!(phases[0].name, "Discovery");
        assert!(phases[0].completed);
        assert_eq!(phases[0].quarter, Some(Quarter::Q1));
        assert_eq!(phases[1].name, "Handover");
        assert!(!phases[1].completed);
        assert_eq!(phases[1].quarter, Some(Quarter::Q4));
    }

    #[test]
    fn test_free_text_without_title() {
        let phases = parse_free_text("**Phase 2**\nshipped");
        assert_eq!(phases[0].name, "Phase 2");
        assert!(phases[0].completed);
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Phase 2: Pilot Rollout"), "pilot rollout");
        assert_eq!(normalize_name("pilot-rollout"), "pilot rollout");
        assert_eq!(normalize_name("Phase 3"), "phase 3");
    }

    #[test]
    fn test_merge_priority_structured_wins() {
        let project = Project::new("P")
            .with_phase(Phase::new("Pilot rollout").with_timeline("Q2").completed())
            .with_narrative(NARRATIVE);
        let t1 = analyze_phases(&project, Quarter::Q2);

        // Structured Pilot rollout, tabular Discovery + Scale-out, free-text Handover.
        assert_eq!(t1.total_phases, 4);
        let pilot = t1.phases.iter().find(|p| p.name == "Pilot rollout").unwrap();
        assert_eq!(pilot.source, PhaseSource::Structured);
        assert!(pilot.completed);
        let discovery = t1.phases.iter().find(|p| p.name == "Discovery").unwrap();
        assert_eq!(discovery.source, PhaseSource::Tabular);
        assert_eq!(t1.confidence, Confidence::High);
        assert_eq!(t1.completed_phases, 2);
        assert!((t1.progress_pct - 50.0).abs() < 1e-10);
    }

    #[test]
    fn test_confidence_by_source() {
        let tabular_only = Project::new("T").with_narrative(NARRATIVE);
        assert_eq!(analyze_phases(&tabular_only, Quarter::Q1).confidence, Confidence::Medium);

        let free_only = Project::new("F").with_narrative("Phase 1: Build\nPhase 2: Launch");
        assert_eq!(analyze_phases(&free_only, Quarter::Q1).confidence, Confidence::Low);

        let none = analyze_phases(&Project::new("N"), Quarter::Q1);
        assert_eq!(none.confidence, Confidence::None);
        assert_eq!(none.total_phases, 0);
        assert!((none.progress_pct - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_on_track_flag() {
        let project = Project::new("P")
            .with_phase(Phase::new("A").with_timeline("Q1").completed())
            .with_phase(Phase::new("B").with_timeline("Q2"))
            .with_phase(Phase::new("C").with_timeline("Q4"));

        assert_eq!(analyze_phases(&project, Quarter::Q1).on_track, Some(true));
        assert_eq!(analyze_phases(&project, Quarter::Q2).on_track, Some(false));

        let unhinted = Project::new("U").with_phase(Phase::new("A"));
        assert_eq!(analyze_phases(&unhinted, Quarter::Q4).on_track, None);
    }
}
