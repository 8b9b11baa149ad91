use std::io::{BufRead, Write};

use tracing::debug;

use crate::candidate::Candidate;
use crate::reference::reference_fib;
use crate::{FibcheckError, Result};

/// Fixed strings of the comparison session. `candidate_label`, when set,
/// overrides whatever label the provider carries.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub prompt: String,
    pub reference_label: String,
    pub candidate_label: Option<String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            prompt: "Calculate fibonacci sequence to: ".to_string(),
            reference_label: "Reference".to_string(),
            candidate_label: None,
        }
    }
}

/// Outcome of one session: both values at the requested index. The session
/// itself never judges; comparison belongs to the runner or the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub n: i64,
    pub reference: i64,
    pub candidate: i64,
    pub candidate_label: String,
}

impl SessionReport {
    pub fn matches(&self) -> bool {
        self.reference == self.candidate
    }
}

pub struct Harness {
    config: HarnessConfig,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            config: HarnessConfig::default(),
        }
    }

    pub fn with_config(config: HarnessConfig) -> Self {
        Self { config }
    }

    /// Run one comparison session: prompt, read one index, emit one line per
    /// implementation.
    ///
    /// Output format, with the default labels:
    ///
    /// ```text
    /// Reference Fib(10) = 55
    /// rcc Fib(10) = 55
    /// ```
    ///
    /// Malformed, absent, or non-positive input fails with an invalid-input
    /// error before the candidate is invoked.
    pub fn run_session<R: BufRead, W: Write>(
        &self,
        mut input: R,
        mut output: W,
        candidate: &dyn Candidate,
    ) -> Result<SessionReport> {
        write!(output, "{}", self.config.prompt)?;
        output.flush()?;

        let n = read_index(&mut input)?;
        debug!(n, "running comparison session");

        let reference = reference_fib(n);
        let candidate_value = candidate.compute(n)?;

        let label = self
            .config
            .candidate_label
            .as_deref()
            .unwrap_or_else(|| candidate.label());

        writeln!(
            output,
            "{} Fib({n}) = {reference}",
            self.config.reference_label
        )?;
        writeln!(output, "{label} Fib({n}) = {candidate_value}")?;

        Ok(SessionReport {
            n,
            reference,
            candidate: candidate_value,
            candidate_label: label.to_string(),
        })
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

fn read_index<R: BufRead>(input: &mut R) -> Result<i64> {
    let mut line = String::new();
    let read = input.read_line(&mut line)?;
    if read == 0 {
        return Err(FibcheckError::InvalidInput(
            "no input provided".to_string(),
        ));
    }

    let trimmed = line.trim();
    let n: i64 = trimmed.parse().map_err(|_| {
        FibcheckError::InvalidInput(format!("expected an integer, got {trimmed:?}"))
    })?;

    // The recursive reference is undefined below 1; reject here rather than
    // diverge in the oracle.
    if n < 1 {
        return Err(FibcheckError::InvalidInput(format!(
            "sequence index must be >= 1, got {n}"
        )));
    }

    Ok(n)
}
