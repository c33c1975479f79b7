//! The fixed predicate set, exercised through the assertion context.

use testenv::assertions::{default_registry, messages};
use testenv::{Assert, AssertionFailure, Value};

fn failure_message(result: Result<(), AssertionFailure>) -> Option<String> {
    result.err().map(|e| e.to_string())
}

#[cfg(test)]
mod predicate_table_tests {
    use super::*;

    #[test]
    fn equality_predicates() {
        let t = Assert::default();
        assert!(t.are_equal(5 * 5, 3 * 3 + 4 * 4).is_ok());
        assert!(t.are_equal("1", 1).is_ok());
        assert!(t.are_equal(Value::Null, Value::Undefined).is_ok());
        assert_eq!(
            failure_message(t.are_equiv("1", 1)),
            Some(messages::ARE_EQUIV.to_string())
        );
        assert!(t.are_equiv(2.0, 2).is_ok());
        assert!(t.are_equiv(Value::Number(f64::NAN), Value::Number(f64::NAN)).is_err());
    }

    #[test]
    fn loose_equality_past_the_integer_range() {
        let t = Assert::default();
        assert!(t.are_equal(vec![1e20], 1e20).is_ok());
        assert!(t.are_equal(vec![1e21], "1e+21").is_ok());
        assert!(t.are_equal("0b11", 3).is_ok());
        assert!(t.are_equal("0o17", 15).is_ok());
    }

    #[test]
    fn truthiness_predicates() {
        let t = Assert::default();
        assert!(t.is_true(1 + 1 == 2).is_ok());
        assert!(t.is_true("non-empty").is_ok());
        assert!(t.is_false(0).is_ok());
        assert!(t.is_false("").is_ok());
        assert_eq!(failure_message(t.is_true(Value::Null)), Some("isTrue failed".into()));
        assert_eq!(failure_message(t.is_false(vec![0])), Some("isFalse failed".into()));
    }

    #[test]
    fn type_predicates() {
        let t = Assert::default();
        assert!(t.is_function(Value::function("")).is_ok());
        assert!(t.is_function("function(){}").is_err());
        assert!(t.is_object(Value::object([("a", 1)])).is_ok());
        assert!(t.is_object(Value::Null).is_ok());
        assert!(t.is_number(1.5).is_ok());
        assert!(t.is_number("1.5").is_err());
        assert!(t.is_string("text").is_ok());
        assert_eq!(failure_message(t.is_string(1)), Some("isString failed".into()));
    }

    #[test]
    fn property_predicates() {
        let t = Assert::default();
        let obj = Value::object([("a", 1)]);
        assert!(t.has_prop(obj.clone(), "a").is_ok());
        assert_eq!(failure_message(t.has_prop(obj, "b")), Some("hasProp failed".into()));
        assert!(t.has_prop(vec![1, 2], "length").is_ok());
    }

    #[test]
    fn array_namespace() {
        let t = Assert::default();
        assert!(t.array().is_empty(Vec::<Value>::new()).is_ok());
        assert!(t.array().length_is(vec![1, 2, 3], 3).is_ok());
        assert_eq!(
            failure_message(t.array().length_is(vec![1, 2, 3], 4)),
            Some("lengthIs failed".into())
        );
        assert_eq!(
            failure_message(t.array().is_empty(vec![1])),
            Some("isEmpty failed".into())
        );
    }
}

#[cfg(test)]
mod registry_tests {
    use super::*;

    #[test]
    fn every_registered_path_is_callable_by_name() {
        let t = Assert::default();
        for name in default_registry().names() {
            let assertion = default_registry().get(&name).unwrap();
            let args = vec![Value::Undefined; assertion.arity()];
            // Any verdict is fine; the call must reach the predicate.
            match t.call(&name, &args) {
                Ok(()) | Err(AssertionFailure::Failed { .. }) => {}
                Err(other) => panic!("{name}: {other}"),
            }
        }
    }

    #[test]
    fn arity_is_enforced_for_calls_by_name() {
        let t = Assert::default();
        assert_eq!(
            t.call("isTrue", &[Value::from(true), Value::from(true)]),
            Err(AssertionFailure::ArityMismatch {
                assertion: "isTrue".into(),
                expected: 1,
                actual: 2,
            })
        );
    }

    #[test]
    fn the_registry_is_shared() {
        assert!(std::ptr::eq(
            Assert::default().registry(),
            Assert::default().registry()
        ));
    }
}
