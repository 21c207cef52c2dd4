//! Suite results and the pass/fail verdict
//!
//! A case either passes, fails on its first broken assertion, or is skipped
//! because a fixture it depends on could not be set up. Skips count against
//! the verdict: an unexercised contract is not a passing one.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Outcome of a single case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Pass,
    Fail,
    Skip,
}

impl CaseStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Skip => "skip",
        }
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of running one case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CaseOutcome {
    /// Case name, e.g. "post_barrel_empty_body"
    pub name: String,
    /// Resource group: "barrels" or "measurements"
    pub group: String,
    pub status: CaseStatus,
    /// Failure or skip reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Wall time spent in the case
    pub elapsed_ms: u64,
}

/// Everything a suite run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SuiteReport {
    /// Environment name the suite ran against
    pub environment: String,
    /// Resolved base URL
    pub base_url: String,
    pub outcomes: Vec<CaseOutcome>,
}

impl SuiteReport {
    #[must_use]
    pub fn new(environment: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            base_url: base_url.into(),
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: CaseOutcome) {
        self.outcomes.push(outcome);
    }

    #[must_use]
    pub fn count(&self, status: CaseStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// PASS requires at least one case and every case passing.
    #[must_use]
    pub fn verdict(&self) -> Verdict {
        let passed = self.count(CaseStatus::Pass);
        let failed = self.count(CaseStatus::Fail);
        let skipped = self.count(CaseStatus::Skip);

        if self.outcomes.is_empty() {
            return Verdict {
                status: VerdictStatus::Fail,
                exit_code: 1,
                reason: "No cases were run".to_string(),
            };
        }

        if failed == 0 && skipped == 0 {
            return Verdict {
                status: VerdictStatus::Pass,
                exit_code: 0,
                reason: format!("All {passed} cases passed"),
            };
        }

        let mut parts = vec![format!("{failed} failed")];
        if skipped > 0 {
            parts.push(format!("{skipped} skipped"));
        }
        parts.push(format!("{passed} passed"));
        Verdict {
            status: VerdictStatus::Fail,
            exit_code: 1,
            reason: parts.join(", "),
        }
    }

    /// Human-readable listing, one line per case.
    #[must_use]
    pub fn to_terminal(&self) -> String {
        let mut out = format!("Environment: {} ({})\n", self.environment, self.base_url);
        for o in &self.outcomes {
            let tag = match o.status {
                CaseStatus::Pass => "PASS",
                CaseStatus::Fail => "FAIL",
                CaseStatus::Skip => "SKIP",
            };
            out.push_str(&format!(
                "  [{tag}] {}::{} ({} ms)\n",
                o.group, o.name, o.elapsed_ms
            ));
            if let Some(msg) = &o.message {
                out.push_str(&format!("         {msg}\n"));
            }
        }
        out
    }
}

/// Final verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Verdict {
    pub status: VerdictStatus,
    pub exit_code: i32,
    pub reason: String,
}

/// Pass or fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerdictStatus {
    Pass,
    Fail,
}

impl std::fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

/// JSON Schema of the machine-readable report.
///
/// # Errors
///
/// Returns error if the schema cannot be serialized.
pub fn generate_schema() -> Result<String, serde_json::Error> {
    let schema = schemars::schema_for!(SuiteReport);
    serde_json::to_string_pretty(&schema)
}
