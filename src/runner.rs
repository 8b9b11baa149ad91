use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::candidate::{Candidate, CandidateSpec};
use crate::reference::reference_fib;
use crate::{FibcheckError, Result};

/// Compute both implementations at `n` and require agreement. Returns the
/// agreed value, or a comparison failure carrying both sides.
pub fn verify_case(candidate: &dyn Candidate, n: i64) -> Result<i64> {
    let reference = reference_fib(n);
    let value = candidate.compute(n)?;

    if value != reference {
        return Err(FibcheckError::Comparison {
            n,
            reference,
            candidate: value,
            label: candidate.label().to_string(),
        });
    }

    debug!(n, value, "case agreed");
    Ok(value)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeReport {
    pub cases: usize,
}

/// Verify every index in `range`, stopping at the first divergence.
pub fn check_range(candidate: &dyn Candidate, range: RangeInclusive<i64>) -> Result<RangeReport> {
    if *range.start() < 1 {
        return Err(FibcheckError::InvalidInput(format!(
            "sequence index must be >= 1, got {}",
            range.start()
        )));
    }

    let mut cases = 0;
    for n in range {
        verify_case(candidate, n)?;
        cases += 1;
    }

    info!(cases, label = candidate.label(), "range check passed");
    Ok(RangeReport { cases })
}

/// A divergent suite case, kept as data so the report can render all
/// failures rather than aborting at the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseFailure {
    pub n: i64,
    pub reference: i64,
    pub candidate: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteReport {
    pub label: String,
    pub passed: usize,
    pub failures: Vec<CaseFailure>,
}

impl SuiteReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SuiteFile {
    suite: SuiteTable,
    candidate: CandidateSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SuiteTable {
    #[serde(default)]
    label: Option<String>,
    cases: Vec<i64>,
}

/// A batch of comparison cases described in TOML:
///
/// ```toml
/// [suite]
/// label = "rcc nightly"
/// cases = [1, 2, 3, 10, 20]
///
/// [candidate]
/// kind = "dylib"
/// path = "target/fib.so"
/// ```
#[derive(Debug, Clone)]
pub struct Suite {
    pub label: String,
    pub cases: Vec<i64>,
    pub candidate: CandidateSpec,
}

impl Suite {
    pub fn from_str(content: &str) -> Result<Self> {
        let file: SuiteFile = toml::from_str(content)?;
        let label = file.suite.label.unwrap_or_else(|| "suite".to_string());

        if file.suite.cases.is_empty() {
            return Err(FibcheckError::InvalidInput(
                "suite has no cases".to_string(),
            ));
        }
        if let Some(&bad) = file.suite.cases.iter().find(|&&n| n < 1) {
            return Err(FibcheckError::InvalidInput(format!(
                "sequence index must be >= 1, got {bad}"
            )));
        }

        Ok(Self {
            label,
            cases: file.suite.cases,
            candidate: file.candidate,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Build the described candidate and run every case against the
    /// reference. Provider failures abort the run; divergences are collected.
    pub fn run(&self) -> Result<SuiteReport> {
        let candidate = self.candidate.build()?;
        info!(label = %self.label, cases = self.cases.len(), "running suite");

        let mut passed = 0;
        let mut failures = Vec::new();
        for &n in &self.cases {
            match verify_case(candidate.as_ref(), n) {
                Ok(_) => passed += 1,
                Err(FibcheckError::Comparison {
                    n,
                    reference,
                    candidate,
                    ..
                }) => failures.push(CaseFailure {
                    n,
                    reference,
                    candidate,
                }),
                Err(e) => return Err(e),
            }
        }

        Ok(SuiteReport {
            label: self.label.clone(),
            passed,
            failures,
        })
    }
}
