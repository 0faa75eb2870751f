//! Built-in scoring factors.
//!
//! # Factors
//!
//! | Factor | Formula |
//! |--------|---------|
//! | Financial | `min(100, value_in_millions × 25)` |
//! | Strategic | `min(100, 20 × pillars + driver bonus)` |
//! | Feasibility | base ±, plus expertise / pilot / vendor / champion bonuses |
//! | TimeToValue | step function of `ceil(effort / 60)` quarters |
//! | Roi | `min(100, roi_percent / 5)` |
//!
//! Missing inputs score 0 rather than failing.

use super::{clamp_score, FactorScore, ScoringContext, ScoringFactor};
use crate::models::{Project, StrategicDriver};

/// Person-days in one quarter of delivery.
pub const DAYS_PER_QUARTER: f64 = 60.0;

// ======================== Multi-factor components ========================

/// Financial value.
///
/// Each million of estimated value is worth 25 points; $4M saturates.
#[derive(Debug, Clone, Copy)]
pub struct Financial;

impl ScoringFactor for Financial {
    fn name(&self) -> &'static str {
        "financial"
    }

    fn evaluate(&self, project: &Project, _context: &ScoringContext) -> FactorScore {
        clamp_score(project.value_in_millions() * 25.0)
    }

    fn description(&self) -> &'static str {
        "Estimated value in millions × 25"
    }
}

/// Strategic alignment.
///
/// 20 points per pillar, plus a driver bonus: growth 20, retention 15,
/// innovation 10. Other drivers carry no bonus.
#[derive(Debug, Clone, Copy)]
pub struct Strategic;

impl Strategic {
    /// Bonus contributed by one driver tag.
    pub fn driver_bonus(driver: StrategicDriver) -> f64 {
        match driver {
            StrategicDriver::Growth => 20.0,
            StrategicDriver::Retention => 15.0,
            StrategicDriver::Innovation => 10.0,
            StrategicDriver::Efficiency
            | StrategicDriver::Compliance
            | StrategicDriver::CostReduction => 0.0,
        }
    }
}

impl ScoringFactor for Strategic {
    fn name(&self) -> &'static str {
        "strategic"
    }

    fn evaluate(&self, project: &Project, _context: &ScoringContext) -> FactorScore {
        let pillars = 20.0 * project.strategic_pillars.len() as f64;
        let drivers: f64 = project
            .strategic_drivers
            .iter()
            .map(|&d| Self::driver_bonus(d))
            .sum();
        clamp_score(pillars + drivers)
    }

    fn description(&self) -> &'static str {
        "Pillar coverage plus driver bonus"
    }
}

/// Delivery feasibility.
///
/// Starts at 30 when nothing blocks the project, −50 otherwise, then adds:
/// - 15 for domain expertise (always assumed)
/// - 20 if any phase reads as exploratory (pilot, PoC, prototype, ...)
/// - 15 if no dependency names an external vendor
/// - 15 if a champion is assigned
#[derive(Debug, Clone, Copy)]
pub struct Feasibility;

impl Feasibility {
    const UNBLOCKED_BASE: f64 = 30.0;
    const BLOCKED_BASE: f64 = -50.0;
    const EXPERTISE_BONUS: f64 = 15.0;
    const PILOT_BONUS: f64 = 20.0;
    const NO_VENDOR_BONUS: f64 = 15.0;
    const CHAMPION_BONUS: f64 = 15.0;

    /// Whether any phase name contains an exploratory keyword.
    pub fn has_pilot_phase(project: &Project, context: &ScoringContext) -> bool {
        project.phases.iter().any(|phase| {
            let name = phase.name.to_lowercase();
            context.pilot_keywords.iter().any(|k| name.contains(k.as_str()))
        })
    }

    /// Whether any declared dependency references an external vendor.
    pub fn has_vendor_dependency(project: &Project, context: &ScoringContext) -> bool {
        project.declared_dependencies.iter().any(|dep| {
            let target = dep.target_id.to_lowercase();
            let note = dep.note.as_deref().unwrap_or_default().to_lowercase();
            context
                .vendor_keywords
                .iter()
                .any(|k| target.contains(k.as_str()) || note.contains(k.as_str()))
        })
    }
}

impl ScoringFactor for Feasibility {
    fn name(&self) -> &'static str {
        "feasibility"
    }

    fn evaluate(&self, project: &Project, context: &ScoringContext) -> FactorScore {
        let mut score = if context.is_blocked(&project.id) {
            Self::BLOCKED_BASE
        } else {
            Self::UNBLOCKED_BASE
        };
        score += Self::EXPERTISE_BONUS;
        if Self::has_pilot_phase(project, context) {
            score += Self::PILOT_BONUS;
        }
        if !Self::has_vendor_dependency(project, context) {
            score += Self::NO_VENDOR_BONUS;
        }
        if project.champion.is_some() {
            score += Self::CHAMPION_BONUS;
        }
        clamp_score(score)
    }

    fn description(&self) -> &'static str {
        "Blocking, expertise, pilot, vendor and champion signals"
    }
}

/// Time to value.
///
/// Quarters of effort `q = ceil(effort / 60)` map to
/// `<1 → 100, 1 → 80, 2 → 60, 3 → 40, ≥4 → 20`.
#[derive(Debug, Clone, Copy)]
pub struct TimeToValue;

impl TimeToValue {
    /// Maps an effort estimate to its score.
    pub fn score_for_effort(effort_days: f64) -> FactorScore {
        let effort = if effort_days.is_finite() {
            effort_days.max(0.0)
        } else {
            0.0
        };
        let quarters = (effort / DAYS_PER_QUARTER).ceil() as u32;
        match quarters {
            0 => 100.0,
            1 => 80.0,
            2 => 60.0,
            3 => 40.0,
            _ => 20.0,
        }
    }
}

impl ScoringFactor for TimeToValue {
    fn name(&self) -> &'static str {
        "time_to_value"
    }

    fn evaluate(&self, project: &Project, context: &ScoringContext) -> FactorScore {
        Self::score_for_effort(context.effort_days(project))
    }

    fn description(&self) -> &'static str {
        "Quarters until value is delivered"
    }
}

// ======================== ROI ========================

/// Return on investment.
///
/// 500% ROI saturates the score.
#[derive(Debug, Clone, Copy)]
pub struct Roi;

impl ScoringFactor for Roi {
    fn name(&self) -> &'static str {
        "roi"
    }

    fn evaluate(&self, project: &Project, _context: &ScoringContext) -> FactorScore {
        clamp_score(project.roi_percent.unwrap_or(0.0) / 5.0)
    }

    fn description(&self) -> &'static str {
        "Forecast ROI percent / 5"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DeclaredDependency, Phase, Quarter, StrategicPillar};

    fn ctx() -> ScoringContext {
        ScoringContext::at_quarter(Quarter::Q1)
    }

    #[test]
    fn test_financial() {
        assert!((Financial.evaluate(&Project::new("A").with_value(2_000_000.0), &ctx()) - 50.0).abs() < 1e-10);
        assert!((Financial.evaluate(&Project::new("A").with_value(9_000_000.0), &ctx()) - 100.0).abs() < 1e-10);
        assert!((Financial.evaluate(&Project::new("A"), &ctx()) - 0.0).abs() < 1e-10);
        assert!((Financial.evaluate(&Project::new("A").with_value(-1_000_000.0), &ctx()) - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_strategic() {
        let p = Project::new("A")
            .with_pillar(StrategicPillar::Productivity)
            .with_pillar(StrategicPillar::Innovation)
            .with_driver(StrategicDriver::Retention)
            .with_driver(StrategicDriver::Innovation)
            .with_driver(StrategicDriver::Compliance);
        // 2×20 + 15 + 10 + 0
        assert!((Strategic.evaluate(&p, &ctx()) - 65.0).abs() < 1e-10);

        let saturated = Project::new("B")
            .with_pillar(StrategicPillar::Productivity)
            .with_pillar(StrategicPillar::Innovation)
            .with_pillar(StrategicPillar::Talent)
            .with_pillar(StrategicPillar::Governance)
            .with_driver(StrategicDriver::Growth);
        assert!((Strategic.evaluate(&saturated, &ctx()) - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_feasibility_unblocked_full() {
        let p = Project::new("A")
            .with_phase(Phase::new("Pilot with two teams"))
            .with_champion("sam");
        // 30 + 15 + 20 + 15 + 15
        assert!((Feasibility.evaluate(&p, &ctx()) - 95.0).abs() < 1e-10);
    }

    #[test]
    fn test_feasibility_blocked_clamps_to_zero() {
        let p = Project::new("A")
            .with_dependency(DeclaredDependency::hard("vendor-sso").with_note("external vendor"));
        let c = ctx().with_blocking("A", vec!["B".into()]);
        // -50 + 15 + 0 + 0 + 0 → clamped
        assert!((Feasibility.evaluate(&p, &c) - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_feasibility_vendor_detection() {
        let c = ctx();
        let by_id = Project::new("A").with_dependency(DeclaredDependency::soft("Vendor-API"));
        let by_note = Project::new("B")
            .with_dependency(DeclaredDependency::soft("P7").with_note("needs third-party licence"));
        let clean = Project::new("C").with_dependency(DeclaredDependency::soft("P7"));
        assert!(Feasibility::has_vendor_dependency(&by_id, &c));
        assert!(Feasibility::has_vendor_dependency(&by_note, &c));
        assert!(!Feasibility::has_vendor_dependency(&clean, &c));
        // 30 + 15 + 0 + 15 + 0
        assert!((Feasibility.evaluate(&clean, &c) - 60.0).abs() < 1e-10);
    }

    #[test]
    fn test_time_to_value_steps() {
        assert!((TimeToValue::score_for_effort(0.0) - 100.0).abs() < 1e-10);
        assert!((TimeToValue::score_for_effort(1.0) - 80.0).abs() < 1e-10);
        assert!((TimeToValue::score_for_effort(60.0) - 80.0).abs() < 1e-10);
        assert!((TimeToValue::score_for_effort(61.0) - 60.0).abs() < 1e-10);
        assert!((TimeToValue::score_for_effort(180.0) - 40.0).abs() < 1e-10);
        assert!((TimeToValue::score_for_effort(181.0) - 20.0).abs() < 1e-10);
        assert!((TimeToValue::score_for_effort(f64::NAN) - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_roi() {
        assert!((Roi.evaluate(&Project::new("A").with_roi(300.0), &ctx()) - 60.0).abs() < 1e-10);
        assert!((Roi.evaluate(&Project::new("A").with_roi(900.0), &ctx()) - 100.0).abs() < 1e-10);
        assert!((Roi.evaluate(&Project::new("A"), &ctx()) - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_factor_names() {
        assert_eq!(Financial.name(), "financial");
        assert_eq!(TimeToValue.name(), "time_to_value");
        assert_eq!(Roi.description(), "Forecast ROI percent / 5");
    }
}
