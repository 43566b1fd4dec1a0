//! Design validators over a scene snapshot.
//!
//! Each validator is a pure read: it walks the derived geometry and emits
//! diagnostics without touching the graph. Errors mark geometry that cannot
//! be fabricated as drawn; warnings mark geometry that cuts but is probably
//! not what the designer meant.

pub mod extension;
pub mod overlap;
pub mod path;

pub use extension::check_extensions;
pub use overlap::check_overlaps;
pub use path::check_paths;

use crate::scene::{PanelKind, PanelView, Snapshot};

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// One validator finding.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Stable rule identifier, e.g. `extension-eligibility`.
    pub rule: &'static str,
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    fn error(rule: &'static str, message: String) -> Self {
        Self {
            rule,
            severity: Severity::Error,
            message,
        }
    }

    fn warning(rule: &'static str, message: String) -> Self {
        Self {
            rule,
            severity: Severity::Warning,
            message,
        }
    }
}

/// Outcome of one validator run.
#[derive(Debug, Clone)]
pub struct CheckReport {
    /// `true` when no error-severity diagnostics were produced.
    pub valid: bool,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    /// How many subjects (edges, pairs, segments) the run examined.
    pub checked: usize,
    pub summary: String,
}

impl CheckReport {
    fn from_diagnostics(diagnostics: Vec<Diagnostic>, checked: usize) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) = diagnostics
            .into_iter()
            .partition(|d| d.severity == Severity::Error);
        let summary = format!(
            "{checked} checked, {} errors, {} warnings",
            errors.len(),
            warnings.len()
        );
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
            checked,
            summary,
        }
    }

    /// Folds several reports into one.
    #[must_use]
    pub fn merged(reports: impl IntoIterator<Item = CheckReport>) -> Self {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut checked = 0;
        for report in reports {
            errors.extend(report.errors);
            warnings.extend(report.warnings);
            checked += report.checked;
        }
        let summary = format!(
            "{checked} checked, {} errors, {} warnings",
            errors.len(),
            warnings.len()
        );
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
            checked,
            summary,
        }
    }
}

/// Runs every validator and merges the reports.
#[must_use]
pub fn check_all(snapshot: &Snapshot<'_>) -> CheckReport {
    CheckReport::merged([
        check_extensions(snapshot),
        check_overlaps(snapshot),
        check_paths(snapshot),
    ])
}

/// Human-readable panel label for diagnostics.
fn panel_label(view: &PanelView<'_>) -> String {
    match view.data.kind {
        PanelKind::Face { face, .. } => format!("face {face:?}"),
        PanelKind::SubAssemblyFace { face, .. } => format!("sub-assembly face {face:?}"),
        PanelKind::Divider { axis, position, .. } => format!("divider {axis:?}@{position}"),
    }
}
