pub use crate::assertions::Assert;
pub use crate::engine::TestResult;
pub use crate::errors::{AssertionFailure, HarnessError, TestError};
pub use crate::harness::Harness;
pub use crate::unit::{TestOutcome, UnitKind};
pub use crate::value::Value;

pub mod assertions;
pub mod config;
pub mod engine;
pub mod errors;
pub mod harness;
pub mod report;
pub mod unit;
pub mod value;
