//! The harness: registration, execution and reporting in one owned object.
//!
//! # Example Usage
//!
//! ```rust
//! use testenv::{Harness, TestError};
//!
//! let mut harness = Harness::new();
//! harness
//!     .add_test("check_if_pythagoras_was_right", |t| {
//!         t.are_equal(5 * 5, 3 * 3 + 4 * 4)?;
//!         Ok(())
//!     })
//!     .add_error_test("error_test_success", |_| {
//!         Err(TestError::raise("Something went wrong, and this is what we wanted"))
//!     })
//!     .add_test("another_failing_test", |_| {
//!         Err(TestError::raise("This is not supposed to happen"))
//!     })
//!     .run_tests();
//!
//! assert_eq!(harness.failed_count(), 1);
//! assert_eq!(harness.summary().to_string(), "All: 3 | Failed: 1 | Succeeded: 2");
//! ```

use tracing::debug;

use crate::assertions::Assert;
use crate::config::{HarnessConfig, ReportFormat};
use crate::engine::{self, ResultTable, TestResult};
use crate::errors::HarnessError;
use crate::report::{self, ReportSink, StdoutSink, Summary};
use crate::unit::{TestOutcome, TestUnit, UnitKind};

/// Setup callback run at the start of every full run.
pub type InitHook = Box<dyn FnMut()>;

pub struct Harness {
    init: Option<InitHook>,
    units: Vec<TestUnit>,
    results: ResultTable,
    failed: usize,
    assert: Assert,
    config: HarnessConfig,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    pub fn new() -> Self {
        Self::init(None)
    }

    /// Creates a harness with an optional init hook.
    pub fn init(hook: Option<InitHook>) -> Self {
        Self {
            init: hook,
            units: Vec::new(),
            results: ResultTable::new(),
            failed: 0,
            assert: Assert::default(),
            config: HarnessConfig::default(),
        }
    }

    pub fn with_init(hook: impl FnMut() + 'static) -> Self {
        Self::init(Some(Box::new(hook)))
    }

    pub fn with_config(mut self, config: HarnessConfig) -> Self {
        self.config = config;
        self
    }

    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    fn register<F>(&mut self, name: impl Into<String>, kind: UnitKind, body: F) -> &mut Self
    where
        F: Fn(&Assert) -> TestOutcome + 'static,
    {
        self.units.push(TestUnit::new(name, kind, body));
        self
    }

    /// Registers a test that passes when its body completes.
    pub fn add_test<F>(&mut self, name: impl Into<String>, body: F) -> &mut Self
    where
        F: Fn(&Assert) -> TestOutcome + 'static,
    {
        self.register(name, UnitKind::Standard, body)
    }

    /// Registers a test that passes only when its body raises.
    pub fn add_error_test<F>(&mut self, name: impl Into<String>, body: F) -> &mut Self
    where
        F: Fn(&Assert) -> TestOutcome + 'static,
    {
        self.register(name, UnitKind::ExpectError, body)
    }

    /// Registers a test that must not raise; judged like [`add_test`](Self::add_test).
    pub fn add_not_error_test<F>(&mut self, name: impl Into<String>, body: F) -> &mut Self
    where
        F: Fn(&Assert) -> TestOutcome + 'static,
    {
        self.register(name, UnitKind::NotThrowingError, body)
    }

    // ------------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------------

    /// Runs the init hook, then every unit in registration order.
    pub fn run_tests(&mut self) -> &mut Self {
        if let Some(hook) = self.init.as_mut() {
            debug!("running init hook");
            hook();
        }
        self.results.clear();
        self.failed = engine::run_all(&self.units, &self.assert, &mut self.results);
        self
    }

    /// Re-runs one unit and replaces its result. The init hook is not called.
    ///
    /// The failure count is recomputed from the stored results afterwards.
    pub fn run_test(&mut self, id: usize) -> Result<&TestResult, HarnessError> {
        engine::rerun(&self.units, &self.assert, &mut self.results, id)?;
        self.failed = self.results.failed();
        self.test_result(id)
    }

    /// The stored result for `id`; fails if `id` is out of range or not yet run.
    pub fn test_result(&self, id: usize) -> Result<&TestResult, HarnessError> {
        if id >= self.units.len() {
            return Err(HarnessError::out_of_range(id, self.units.len()));
        }
        self.results.get(id).ok_or(HarnessError::not_run(id))
    }

    // ------------------------------------------------------------------------
    // Reporting
    // ------------------------------------------------------------------------

    /// Prints to stdout as a table or as one line per result.
    pub fn print_results(&self, table_mode: bool) -> &Self {
        let mut sink = StdoutSink::new(self.config.color.color_choice());
        self.print_results_to(&mut sink, table_mode)
    }

    pub fn print_results_to(&self, sink: &mut dyn ReportSink, table_mode: bool) -> &Self {
        self.report(sink, ReportFormat::from_table_mode(table_mode));
        self
    }

    /// Prints to stdout in the configured format.
    pub fn print_configured(&self) -> &Self {
        let mut sink = StdoutSink::new(self.config.color.color_choice());
        self.report(&mut sink, self.config.report);
        self
    }

    pub fn report(&self, sink: &mut dyn ReportSink, format: ReportFormat) {
        report::print_report(sink, &self.results, self.summary(), format);
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn results(&self) -> &ResultTable {
        &self.results
    }

    pub fn units(&self) -> &[TestUnit] {
        &self.units
    }

    pub fn failed_count(&self) -> usize {
        self.failed
    }

    pub fn summary(&self) -> Summary {
        Summary::new(self.results.len(), self.failed)
    }

    pub fn assertion_context(&self) -> &Assert {
        &self.assert
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }
}
