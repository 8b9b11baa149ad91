use std::process::Command;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::reference::iterative_fib;
use crate::{FibcheckError, Result};

/// A candidate implementation of the `(integer) -> integer` contract under
/// test. Candidates are injected rather than linked, so the harness can
/// drive compiled artifacts, external processes, or plain functions through
/// one seam.
pub trait Candidate {
    fn label(&self) -> &str;

    fn compute(&self, n: i64) -> Result<i64>;
}

/// Built-in candidate backed by the iterative computation. Always available,
/// used as the default when no external artifact is given.
pub struct BuiltinCandidate {
    label: String,
}

impl BuiltinCandidate {
    pub fn new() -> Self {
        Self {
            label: "builtin".to_string(),
        }
    }

    pub fn with_label(label: &str) -> Self {
        Self {
            label: label.to_string(),
        }
    }
}

impl Default for BuiltinCandidate {
    fn default() -> Self {
        Self::new()
    }
}

impl Candidate for BuiltinCandidate {
    fn label(&self) -> &str {
        &self.label
    }

    fn compute(&self, n: i64) -> Result<i64> {
        Ok(iterative_fib(n))
    }
}

/// Candidate wrapping an arbitrary function value. This is the plain
/// injected form used by embedders and tests.
pub struct FnCandidate {
    label: String,
    func: fn(i64) -> i64,
}

impl FnCandidate {
    pub fn new(label: &str, func: fn(i64) -> i64) -> Self {
        Self {
            label: label.to_string(),
            func,
        }
    }
}

impl Candidate for FnCandidate {
    fn label(&self) -> &str {
        &self.label
    }

    fn compute(&self, n: i64) -> Result<i64> {
        Ok((self.func)(n))
    }
}

/// Candidate resolved from a shared object, the usual form for compiler
/// output. The symbol must have the C signature `int fib(int)`.
#[cfg(not(target_os = "windows"))]
pub struct DylibCandidate {
    label: String,
    symbol: String,
    library: libloading::Library,
}

#[cfg(not(target_os = "windows"))]
impl DylibCandidate {
    /// Load `path` and resolve `symbol`, failing with a linkage error if
    /// either step does not succeed. Resolution happens here so a missing
    /// symbol surfaces at load time, not at first use.
    pub fn load(path: &str, symbol: &str, label: &str) -> Result<Self> {
        debug!(path, symbol, "loading candidate library");
        let library = unsafe { libloading::Library::new(path) }.map_err(|e| {
            FibcheckError::Linkage(format!("failed to load {path}: {e}"))
        })?;

        let candidate = Self {
            label: label.to_string(),
            symbol: symbol.to_string(),
            library,
        };
        candidate.resolve()?;
        Ok(candidate)
    }

    fn resolve(&self) -> Result<libloading::Symbol<'_, unsafe extern "C" fn(i32) -> i32>> {
        unsafe { self.library.get(self.symbol.as_bytes()) }.map_err(|e| {
            FibcheckError::Linkage(format!("unresolved symbol `{}`: {e}", self.symbol))
        })
    }
}

#[cfg(not(target_os = "windows"))]
impl Candidate for DylibCandidate {
    fn label(&self) -> &str {
        &self.label
    }

    fn compute(&self, n: i64) -> Result<i64> {
        let n = i32::try_from(n).map_err(|_| {
            FibcheckError::InvalidInput(format!("{n} is out of range for the C int contract"))
        })?;
        let func = self.resolve()?;
        Ok(i64::from(unsafe { func(n) }))
    }
}

/// Candidate driven as an external process: the input index is appended as
/// the final argument and the result is read from the last non-empty line of
/// stdout.
pub struct CommandCandidate {
    label: String,
    program: String,
    args: Vec<String>,
}

impl CommandCandidate {
    pub fn new(program: &str, args: &[String], label: &str) -> Self {
        Self {
            label: label.to_string(),
            program: program.to_string(),
            args: args.to_vec(),
        }
    }
}

impl Candidate for CommandCandidate {
    fn label(&self) -> &str {
        &self.label
    }

    fn compute(&self, n: i64) -> Result<i64> {
        debug!(program = %self.program, n, "invoking candidate process");
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(n.to_string())
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FibcheckError::CandidateFailed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let last_line = stdout
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .ok_or_else(|| {
                FibcheckError::CandidateFailed(format!("{} produced no output", self.program))
            })?;

        last_line.trim().parse::<i64>().map_err(|_| {
            FibcheckError::CandidateFailed(format!(
                "{} produced non-integer output: {last_line:?}",
                self.program
            ))
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    Builtin,
    Dylib,
    Command,
}

/// Declarative candidate description, as written in suite files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSpec {
    pub kind: CandidateKind,
    pub path: Option<String>,
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default)]
    pub args: Vec<String>,
    pub label: Option<String>,
}

fn default_symbol() -> String {
    "fib".to_string()
}

impl CandidateSpec {
    pub fn builtin() -> Self {
        Self {
            kind: CandidateKind::Builtin,
            path: None,
            symbol: default_symbol(),
            args: Vec::new(),
            label: None,
        }
    }

    /// Construct the provider this spec describes.
    pub fn build(&self) -> Result<Box<dyn Candidate>> {
        match self.kind {
            CandidateKind::Builtin => {
                let label = self.label.as_deref().unwrap_or("builtin");
                Ok(Box::new(BuiltinCandidate::with_label(label)))
            }
            CandidateKind::Dylib => {
                let path = self.path.as_deref().ok_or_else(|| {
                    FibcheckError::InvalidInput(
                        "dylib candidate requires a library path".to_string(),
                    )
                })?;
                let label = self.label.as_deref().unwrap_or("rcc");
                #[cfg(not(target_os = "windows"))]
                {
                    Ok(Box::new(DylibCandidate::load(path, &self.symbol, label)?))
                }
                #[cfg(target_os = "windows")]
                {
                    let _ = (path, label);
                    Err(FibcheckError::Linkage(
                        "dynamic library candidates are not supported on Windows".to_string(),
                    ))
                }
            }
            CandidateKind::Command => {
                let program = self.path.as_deref().ok_or_else(|| {
                    FibcheckError::InvalidInput(
                        "command candidate requires a program path".to_string(),
                    )
                })?;
                let label = self.label.as_deref().unwrap_or(program);
                Ok(Box::new(CommandCandidate::new(program, &self.args, label)))
            }
        }
    }
}
