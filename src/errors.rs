//! testenv error types
//!
//! Three layers, one per boundary:
//! - [`AssertionFailure`]: raised by the assertion registry, caught by the engine.
//! - [`TestError`]: anything a test body raises, caught at the unit boundary.
//! - [`HarnessError`] / [`ConfigError`]: surfaced to the harness's caller.

use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

/// Raised by an assertion when its predicate is not satisfied.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum AssertionFailure {
    #[error("{message}")]
    #[diagnostic(code(testenv::assertion::failed))]
    Failed {
        assertion: String,
        message: String,
    },

    #[error("{assertion} expects {expected} argument(s), got {actual}")]
    #[diagnostic(code(testenv::assertion::arity))]
    ArityMismatch {
        assertion: String,
        expected: usize,
        actual: usize,
    },

    #[error("unknown assertion '{path}'")]
    #[diagnostic(
        code(testenv::assertion::unknown),
        help("namespaced assertions use dotted paths, e.g. 'array.lengthIs'")
    )]
    UnknownAssertion { path: String },
}

impl AssertionFailure {
    /// The dotted path of the assertion that raised, if it is known.
    pub fn assertion(&self) -> &str {
        match self {
            AssertionFailure::Failed { assertion, .. }
            | AssertionFailure::ArityMismatch { assertion, .. } => assertion,
            AssertionFailure::UnknownAssertion { path } => path,
        }
    }
}

/// An error raised by a test body.
///
/// Bodies propagate assertion failures with `?` and raise anything else with
/// [`TestError::raise`] or the [`fail!`](crate::fail) macro.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum TestError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Assertion(#[from] AssertionFailure),

    #[error("{0}")]
    #[diagnostic(code(testenv::test::raised))]
    Raised(String),

    #[error("{0}")]
    #[diagnostic(code(testenv::test::panicked))]
    Panicked(String),
}

impl TestError {
    pub fn raise(message: impl Into<String>) -> Self {
        TestError::Raised(message.into())
    }

    /// Wraps any other error by its description.
    pub fn from_error(err: &dyn std::error::Error) -> Self {
        TestError::Raised(err.to_string())
    }
}

impl From<String> for TestError {
    fn from(message: String) -> Self {
        TestError::Raised(message)
    }
}

impl From<&str> for TestError {
    fn from(message: &str) -> Self {
        TestError::Raised(message.to_string())
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for TestError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        TestError::Raised(err.to_string())
    }
}

/// Errors surfaced to the caller of the harness. These signal misuse of the
/// harness, not test failures.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum HarnessError {
    #[error("invalid test id {id} ({reason})")]
    #[diagnostic(
        code(testenv::harness::invalid_test_id),
        help("test ids are zero-based registration indices; results exist only after a run")
    )]
    InvalidTestId { id: usize, reason: InvalidIdReason },
}

impl HarnessError {
    pub fn out_of_range(id: usize, len: usize) -> Self {
        HarnessError::InvalidTestId {
            id,
            reason: InvalidIdReason::OutOfRange { len },
        }
    }

    pub fn not_run(id: usize) -> Self {
        HarnessError::InvalidTestId {
            id,
            reason: InvalidIdReason::NotRun,
        }
    }
}

/// Why an id was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidIdReason {
    /// No unit is registered at the id.
    OutOfRange { len: usize },
    /// The unit exists but no run has stored its result.
    NotRun,
}

impl fmt::Display for InvalidIdReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidIdReason::OutOfRange { len } => write!(f, "valid ids: 0..{len}"),
            InvalidIdReason::NotRun => write!(f, "registered but not run yet"),
        }
    }
}

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("invalid harness configuration: {0}")]
    #[diagnostic(code(testenv::config::parse))]
    Parse(#[from] serde_json::Error),

    #[error("cannot read harness configuration {path}: {source}")]
    #[diagnostic(code(testenv::config::read))]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Raises a [`TestError::Raised`] from a test body, `format!`-style.
///
/// ```rust
/// use testenv::{fail, TestOutcome};
/// fn body(ok: bool) -> TestOutcome {
///     if !ok {
///         fail!("expected ok, got {}", ok);
///     }
///     Ok(())
/// }
/// assert!(body(false).is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($arg:tt)*) => {
        return Err($crate::errors::TestError::Raised(format!($($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assertion_failure_displays_fixed_message() {
        let err = AssertionFailure::Failed {
            assertion: "areEqual".into(),
            message: "areEqual failed".into(),
        };
        assert_eq!(err.to_string(), "areEqual failed");
        assert_eq!(err.assertion(), "areEqual");
    }

    #[test]
    fn test_error_is_transparent_over_assertions() {
        let err: TestError = AssertionFailure::Failed {
            assertion: "isTrue".into(),
            message: "isTrue failed".into(),
        }
        .into();
        assert_eq!(err.to_string(), "isTrue failed");
    }

    #[test]
    fn raised_errors_keep_their_description() {
        assert_eq!(TestError::raise("boom").to_string(), "boom");
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        assert_eq!(TestError::from_error(&io).to_string(), "disk gone");
    }

    #[test]
    fn invalid_test_id_carries_code() {
        let err = HarnessError::out_of_range(4, 3);
        assert_eq!(err.to_string(), "invalid test id 4 (valid ids: 0..3)");
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("testenv::harness::invalid_test_id"));
    }

    #[test]
    fn unrun_ids_say_so() {
        let err = HarnessError::not_run(0);
        assert_eq!(err.to_string(), "invalid test id 0 (registered but not run yet)");
    }
}
