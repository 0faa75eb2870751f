//! Input validation for project portfolios.
//!
//! Checks structural integrity of project records before planning.
//! Detects:
//! - Duplicate IDs
//! - Empty IDs
//! - Invalid effort estimates (negative or non-finite)
//! - Dependencies on unknown projects
//! - Self-dependencies
//!
//! None of these abort a run: the graph builder drops what it cannot use
//! and the findings are carried in the pipeline output.

use crate::models::Project;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// Two projects share the same ID.
    DuplicateId,
    /// A project has an empty ID.
    EmptyId,
    /// Effort is negative or not a number.
    InvalidEffort,
    /// A dependency references a project that doesn't exist.
    UnknownDependency,
    /// A project depends on itself.
    SelfDependency,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a project set.
///
/// Checks:
/// 1. No empty project IDs
/// 2. No duplicate project IDs
/// 3. Effort estimates are finite and non-negative
/// 4. All dependency targets point to existing projects
/// 5. No project depends on itself
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_projects(projects: &[Project]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut ids = HashSet::new();
    for p in projects {
        if p.id.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyId,
                format!("Project '{}' has an empty ID", p.name),
            ));
            continue;
        }
        if !ids.insert(p.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate project ID: {}", p.id),
            ));
        }
    }

    for p in projects {
        if !p.effort_days.is_finite() || p.effort_days < 0.0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidEffort,
                format!("Project '{}' has invalid effort {}", p.id, p.effort_days),
            ));
        }

        for dep in &p.declared_dependencies {
            if dep.target_id == p.id {
                errors.push(ValidationError::new(
                    ValidationErrorKind::SelfDependency,
                    format!("Project '{}' depends on itself", p.id),
                ));
            } else if !ids.contains(dep.target_id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownDependency,
                    format!(
                        "Project '{}' references unknown dependency '{}'",
                        p.id, dep.target_id
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DeclaredDependency;

    fn sample_projects() -> Vec<Project> {
        vec![
            Project::new("P1").with_name("Assistant pilot"),
            Project::new("P2")
                .with_name("Org rollout")
                .with_dependency(DeclaredDependency::hard("P1")),
            Project::new("P3").with_dependency(DeclaredDependency::soft("P2")),
        ]
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_projects(&sample_projects()).is_ok());
    }

    #[test]
    fn test_duplicate_project_id() {
        let projects = vec![Project::new("P1"), Project::new("P1")];
        let errors = validate_projects(&projects).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId));
    }

    #[test]
    fn test_empty_id() {
        let projects = vec![Project::new("  ").with_name("Nameless")];
        let errors = validate_projects(&projects).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::EmptyId);
    }

    #[test]
    fn test_invalid_effort() {
        let projects = vec![
            Project::new("P1").with_effort(-5.0),
            Project::new("P2").with_effort(f64::NAN),
        ];
        let errors = validate_projects(&projects).unwrap_err();
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationErrorKind::InvalidEffort)
                .count(),
            2
        );
    }

    #[test]
    fn test_unknown_dependency() {
        let projects =
            vec![Project::new("P1").with_dependency(DeclaredDependency::hard("NONEXISTENT"))];
        let errors = validate_projects(&projects).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownDependency));
    }

    #[test]
    fn test_self_dependency() {
        let projects = vec![Project::new("P1").with_dependency(DeclaredDependency::soft("P1"))];
        let errors = validate_projects(&projects).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::SelfDependency);
    }

    #[test]
    fn test_multiple_errors() {
        let projects = vec![
            Project::new("P1").with_effort(-1.0),
            Project::new("P1").with_dependency(DeclaredDependency::hard("UNKNOWN")),
        ];
        let errors = validate_projects(&projects).unwrap_err();
        assert!(errors.len() >= 3);
    }
}
