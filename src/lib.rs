use thiserror::Error;

mod candidate;
mod harness;
mod reference;
mod runner;

#[cfg(not(target_os = "windows"))]
pub use candidate::DylibCandidate;
pub use candidate::{
    BuiltinCandidate, Candidate, CandidateKind, CandidateSpec, CommandCandidate, FnCandidate,
};
pub use harness::{Harness, HarnessConfig, SessionReport};
pub use reference::{iterative_fib, reference_fib};
pub use runner::{check_range, verify_case, CaseFailure, RangeReport, Suite, SuiteReport};

#[derive(Error, Debug)]
pub enum FibcheckError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Linkage error: {0}")]
    Linkage(String),

    #[error("Candidate failed: {0}")]
    CandidateFailed(String),

    #[error("Comparison failure at n = {n}: Reference = {reference}, {label} = {candidate}")]
    Comparison {
        n: i64,
        reference: i64,
        candidate: i64,
        label: String,
    },

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, FibcheckError>;
