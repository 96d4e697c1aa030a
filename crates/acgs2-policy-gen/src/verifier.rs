// crates/acgs2-policy-gen/src/verifier.rs
// ============================================================================
// Module: Formal Verifier
// Description: Subprocess-backed Dafny-style formal verification, reached
//              through a trait seam so the crate never links a verifier.
// ============================================================================

use std::io::Write as _;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use tempfile::Builder as TempFileBuilder;

use crate::error::PolicyGenError;

/// Default wall-clock budget for a verifier subprocess, per the external
/// interfaces contract.
pub const DEFAULT_VERIFIER_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// Outcome of invoking a formal verifier on a generated Dafny module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DafnyStatus {
    /// The verifier exited zero: the module is formally proven.
    Verified,
    /// The verifier exited non-zero: verification failed.
    Failed,
    /// The verifier could not be invoked at all (missing binary, timeout).
    Error,
}

impl DafnyStatus {
    /// Returns the lowercase wire label for this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "verified",
            Self::Failed => "failed",
            Self::Error => "error",
        }
    }
}

/// Full transcript of a formal verification attempt.
#[derive(Debug, Clone)]
pub struct DafnyCheckResult {
    /// The verification outcome.
    pub status: DafnyStatus,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// The subprocess exit code, absent if the process never completed.
    pub exit_code: Option<i32>,
}

/// Invokes an external formal verifier over a generated module.
#[async_trait]
pub trait FormalVerifier: Send + Sync {
    /// Verifies `dafny_code`, returning its full transcript.
    ///
    /// # Errors
    /// Returns [`PolicyGenError::VerifierFailed`] only when the verifier could
    /// not be invoked at all; a non-zero exit is reported as `Ok` with
    /// [`DafnyStatus::Failed`].
    async fn verify(&self, dafny_code: &str) -> Result<DafnyCheckResult, PolicyGenError>;
}

/// A [`FormalVerifier`] that shells out to a configured Dafny-compatible
/// binary, invoked as `<binary> verify <tempfile>`.
pub struct SubprocessDafnyVerifier {
    binary_path: PathBuf,
    timeout: StdDuration,
}

impl SubprocessDafnyVerifier {
    /// Creates a verifier invoking `binary_path` with the default 30s budget.
    #[must_use]
    pub fn new(binary_path: impl Into<PathBuf>) -> Self {
        Self { binary_path: binary_path.into(), timeout: DEFAULT_VERIFIER_TIMEOUT }
    }

    /// Overrides the wall-clock budget.
    #[must_use]
    pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl FormalVerifier for SubprocessDafnyVerifier {
    async fn verify(&self, dafny_code: &str) -> Result<DafnyCheckResult, PolicyGenError> {
        let mut file = TempFileBuilder::new()
            .suffix(".dfy")
            .tempfile()
            .map_err(|err| PolicyGenError::VerifierFailed(err.to_string()))?;
        file.write_all(dafny_code.as_bytes()).map_err(|err| PolicyGenError::VerifierFailed(err.to_string()))?;
        let path = file.path().to_owned();

        let mut command = tokio::process::Command::new(&self.binary_path);
        command.arg("verify").arg(&path).stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);

        let child = command.spawn().map_err(|err| PolicyGenError::VerifierFailed(err.to_string()))?;
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => return Err(PolicyGenError::VerifierFailed(err.to_string())),
            Err(_) => {
                return Ok(DafnyCheckResult {
                    status: DafnyStatus::Error,
                    stdout: String::new(),
                    stderr: "verifier timed out".to_owned(),
                    exit_code: None,
                })
            }
        };

        let status =
            if output.status.success() { DafnyStatus::Verified } else { DafnyStatus::Failed };
        Ok(DafnyCheckResult {
            status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, reason = "test-only assertions")]
    use super::*;

    #[tokio::test]
    async fn missing_binary_is_reported_as_a_verifier_error() {
        let verifier = SubprocessDafnyVerifier::new("/nonexistent/dafny-binary-path");
        let err = verifier.verify("module Foo {}").await.expect_err("binary does not exist");
        assert!(matches!(err, PolicyGenError::VerifierFailed(_)));
    }

    #[tokio::test]
    async fn a_real_zero_exit_binary_reports_verified() {
        let verifier = SubprocessDafnyVerifier::new("/usr/bin/true");
        let result = verifier.verify("module Foo {}").await.expect("spawns");
        assert_eq!(result.status, DafnyStatus::Verified);
        assert_eq!(result.exit_code, Some(0));
    }

    #[tokio::test]
    async fn a_real_nonzero_exit_binary_reports_failed() {
        let verifier = SubprocessDafnyVerifier::new("/usr/bin/false");
        let result = verifier.verify("module Foo {}").await.expect("spawns");
        assert_eq!(result.status, DafnyStatus::Failed);
    }
}
