//! Test units: a body plus its classification.

use std::fmt;

use crate::assertions::Assert;
use crate::errors::TestError;

/// What a test body returns: `Ok(())` when it completed, `Err` when it raised.
pub type TestOutcome = Result<(), TestError>;

/// A test body. It receives the assertion context explicitly.
pub type TestBody = Box<dyn Fn(&Assert) -> TestOutcome>;

/// How a unit's outcome is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitKind {
    /// Passes when the body completes.
    #[default]
    Standard,
    /// Passes when the body raises.
    ExpectError,
    /// Registered separately but judged exactly like `Standard`.
    NotThrowingError,
}

impl UnitKind {
    pub fn expects_error(&self) -> bool {
        matches!(self, UnitKind::ExpectError)
    }
}

/// A registered test. Immutable once created.
pub struct TestUnit {
    name: String,
    body: TestBody,
    kind: UnitKind,
}

impl TestUnit {
    pub fn new<F>(name: impl Into<String>, kind: UnitKind, body: F) -> Self
    where
        F: Fn(&Assert) -> TestOutcome + 'static,
    {
        Self {
            name: name.into(),
            body: Box::new(body),
            kind,
        }
    }

    /// The declared name; empty for anonymous units.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    pub fn invoke(&self, assert: &Assert) -> TestOutcome {
        (self.body)(assert)
    }
}

impl fmt::Debug for TestUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestUnit")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Pairs a `fn` item with its own identifier, for registering named bodies.
///
/// ```rust
/// use testenv::{named, Assert, Harness, TestOutcome};
///
/// fn simple_math(t: &Assert) -> TestOutcome {
///     t.is_true(1 + 1 == 2)?;
///     Ok(())
/// }
///
/// let mut harness = Harness::new();
/// let (name, body) = named!(simple_math);
/// harness.add_test(name, body).run_tests();
/// assert_eq!(harness.test_result(0).unwrap().name, "simple_math");
/// ```
#[macro_export]
macro_rules! named {
    ($body:ident) => {
        (stringify!($body), $body)
    };
}
