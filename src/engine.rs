//! Execution engine: runs test units against the assertion context and records
//! one [`TestResult`] per execution.
//!
//! A unit body either completes, returns a [`TestError`], or panics. The last two
//! are both "raised" and are caught here; they never escape a single unit.
//! [`UnitKind::ExpectError`] inverts the verdict exactly once, in [`judge`].

use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::assertions::Assert;
use crate::errors::{HarnessError, TestError};
use crate::unit::{TestOutcome, TestUnit, UnitKind};

/// Recorded when an error-expecting unit completes without raising.
pub const DID_NOT_RAISE: &str = "Error test did not fail";

// ============================================================================
// RESULTS
// ============================================================================

/// The outcome of executing one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestResult {
    pub success: bool,
    #[serde(rename = "methodName")]
    pub name: String,
    #[serde(rename = "executionTime")]
    pub duration_ms: u64,
    /// Empty on success.
    pub message: String,
}

impl TestResult {
    pub fn passed(name: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            success: true,
            name: name.into(),
            duration_ms,
            message: String::new(),
        }
    }

    #[cold]
    pub fn failed(name: impl Into<String>, duration_ms: u64, message: impl Into<String>) -> Self {
        Self {
            success: false,
            name: name.into(),
            duration_ms,
            message: message.into(),
        }
    }
}

/// Results indexed by unit id.
///
/// A full run fills every slot in order. A single re-run may populate a slot no
/// full run has reached yet, so slots are optional.
#[derive(Debug, Clone, Default)]
pub struct ResultTable {
    slots: Vec<Option<TestResult>>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn push(&mut self, result: TestResult) {
        self.slots.push(Some(result));
    }

    /// Overwrites slot `id`, growing the table if needed.
    pub fn store(&mut self, id: usize, result: TestResult) -> &TestResult {
        if self.slots.len() <= id {
            self.slots.resize(id + 1, None);
        }
        self.slots[id].insert(result)
    }

    pub fn get(&self, id: usize) -> Option<&TestResult> {
        self.slots.get(id).and_then(Option::as_ref)
    }

    /// Populated slots with their ids, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &TestResult)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.as_ref().map(|r| (id, r)))
    }

    /// Number of populated slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn failed(&self) -> usize {
        self.iter().filter(|(_, r)| !r.success).count()
    }
}

// ============================================================================
// SINGLE UNIT
// ============================================================================

/// Executes one unit and judges it by its kind.
pub fn run_unit(unit: &TestUnit, assert: &Assert) -> TestResult {
    debug!(name = unit.name(), kind = ?unit.kind(), "running test unit");
    let start = Instant::now();
    let outcome = invoke_guarded(unit, assert);
    let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    let raised = outcome.err().map(|err| err.to_string());
    let result = judge(unit.kind(), unit.name(), duration_ms, raised);
    debug!(
        name = unit.name(),
        success = result.success,
        duration_ms,
        "test unit finished"
    );
    result
}

/// Turns "did the body raise, and with what" into a verdict for `kind`.
pub fn judge(kind: UnitKind, name: &str, duration_ms: u64, raised: Option<String>) -> TestResult {
    match (kind.expects_error(), raised) {
        (false, None) => TestResult::passed(name, duration_ms),
        (false, Some(message)) => TestResult::failed(name, duration_ms, message),
        (true, Some(_)) => TestResult::passed(name, duration_ms),
        (true, None) => TestResult::failed(name, duration_ms, DID_NOT_RAISE),
    }
}

thread_local! {
    static IN_UNIT_BODY: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

/// Wraps the process panic hook once so that panics raised inside a unit body
/// are not printed; the message is recorded in the result instead. Panics on
/// any other thread, or outside a body, still reach the previous hook.
fn install_quiet_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !IN_UNIT_BODY.with(Cell::get) {
                previous(info);
            }
        }));
    });
}

fn invoke_guarded(unit: &TestUnit, assert: &Assert) -> TestOutcome {
    install_quiet_hook();
    let was_inside = IN_UNIT_BODY.with(|flag| flag.replace(true));
    let caught = panic::catch_unwind(AssertUnwindSafe(|| unit.invoke(assert)));
    IN_UNIT_BODY.with(|flag| flag.set(was_inside));

    match caught {
        Ok(outcome) => outcome,
        Err(payload) => Err(TestError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "test body panicked".to_string()
    }
}

// ============================================================================
// SEQUENCES
// ============================================================================

/// Runs every unit in registration order, appending to `results`.
///
/// Returns the number of failed units.
#[tracing::instrument(skip_all, fields(units = units.len()))]
pub fn run_all(units: &[TestUnit], assert: &Assert, results: &mut ResultTable) -> usize {
    let mut failed = 0;
    for unit in units {
        let result = run_unit(unit, assert);
        if !result.success {
            failed += 1;
        }
        results.push(result);
    }
    info!(total = units.len(), failed, "test run complete");
    failed
}

/// Re-executes unit `id` alone and overwrites its slot.
pub fn rerun<'r>(
    units: &[TestUnit],
    assert: &Assert,
    results: &'r mut ResultTable,
    id: usize,
) -> Result<&'r TestResult, HarnessError> {
    let unit = units
        .get(id)
        .ok_or_else(|| HarnessError::out_of_range(id, units.len()))?;
    let result = run_unit(unit, assert);
    Ok(results.store(id, result))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(kind: UnitKind, raises: bool) -> TestUnit {
        TestUnit::new("sample", kind, move |_| {
            if raises {
                Err(TestError::raise("raised on purpose"))
            } else {
                Ok(())
            }
        })
    }

    #[test]
    fn judge_covers_every_kind() {
        let cases = [
            (UnitKind::Standard, false, true, ""),
            (UnitKind::Standard, true, false, "raised on purpose"),
            (UnitKind::NotThrowingError, false, true, ""),
            (UnitKind::NotThrowingError, true, false, "raised on purpose"),
            (UnitKind::ExpectError, true, true, ""),
            (UnitKind::ExpectError, false, false, DID_NOT_RAISE),
        ];
        for (kind, raises, success, message) in cases {
            let result = run_unit(&unit(kind, raises), &Assert::default());
            assert_eq!(result.success, success, "{kind:?} raises={raises}");
            assert_eq!(result.message, message, "{kind:?} raises={raises}");
            assert_eq!(result.name, "sample");
        }
    }

    #[test]
    fn assertion_failures_become_messages() {
        let unit = TestUnit::new("math", UnitKind::Standard, |t| {
            t.are_equal(1, 2)?;
            Ok(())
        });
        let result = run_unit(&unit, &Assert::default());
        assert!(!result.success);
        assert_eq!(result.message, "areEqual failed");
    }

    #[test]
    fn panics_are_caught_at_the_unit_boundary() {
        let unit = TestUnit::new("panics", UnitKind::Standard, |_| panic!("kaboom"));
        let result = run_unit(&unit, &Assert::default());
        assert!(!result.success);
        assert_eq!(result.message, "kaboom");

        let formatted = TestUnit::new("", UnitKind::ExpectError, |_| panic!("code {}", 7));
        let result = run_unit(&formatted, &Assert::default());
        assert!(result.success);
        assert!(result.message.is_empty());
    }

    #[test]
    fn body_flag_is_cleared_after_a_panic() {
        let unit = TestUnit::new("panics", UnitKind::Standard, |_| panic!("kaboom"));
        run_unit(&unit, &Assert::default());
        assert!(!IN_UNIT_BODY.with(Cell::get));
    }

    #[test]
    fn run_all_counts_failures_once() {
        let units = vec![
            unit(UnitKind::Standard, false),
            unit(UnitKind::ExpectError, true),
            unit(UnitKind::ExpectError, false),
            unit(UnitKind::Standard, true),
        ];
        let mut results = ResultTable::new();
        let failed = run_all(&units, &Assert::default(), &mut results);
        assert_eq!(failed, 2);
        assert_eq!(results.len(), 4);
        assert_eq!(results.failed(), failed);
    }

    #[test]
    fn rerun_overwrites_a_single_slot() {
        let units = vec![unit(UnitKind::Standard, false), unit(UnitKind::Standard, true)];
        let mut results = ResultTable::new();
        results.push(TestResult::failed("stale", 0, "old"));
        results.push(TestResult::passed("stale", 0));

        let fresh = rerun(&units, &Assert::default(), &mut results, 0).cloned();
        assert_eq!(fresh.map(|r| r.success), Ok(true));
        assert_eq!(results.get(0).map(|r| r.name.as_str()), Some("sample"));
        assert_eq!(results.get(1), Some(&TestResult::passed("stale", 0)));
    }

    #[test]
    fn rerun_rejects_out_of_range_ids() {
        let units = vec![unit(UnitKind::Standard, false)];
        let mut results = ResultTable::new();
        assert_eq!(
            rerun(&units, &Assert::default(), &mut results, 1),
            Err(HarnessError::out_of_range(1, 1))
        );
        assert!(results.is_empty());
    }

    #[test]
    fn store_grows_the_table_with_empty_slots() {
        let mut results = ResultTable::new();
        results.store(2, TestResult::passed("late", 1));
        assert_eq!(results.len(), 1);
        assert!(results.get(0).is_none());
        assert_eq!(results.iter().map(|(id, _)| id).collect::<Vec<_>>(), vec![2]);
    }
}
