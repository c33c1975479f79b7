//! The predicate functions behind each registered assertion.
//!
//! Predicates are pure: they inspect their operands and return a bool. Raising is
//! the job of the [`Assertion`](super::Assertion) wrapper.

use crate::value::Value;

pub fn is_true(x: &Value) -> bool {
    x.is_truthy()
}

pub fn is_false(x: &Value) -> bool {
    !x.is_truthy()
}

pub fn are_equal(x: &Value, y: &Value) -> bool {
    x.loose_eq(y)
}

pub fn are_equiv(x: &Value, y: &Value) -> bool {
    x.strict_eq(y)
}

pub fn is_function(x: &Value) -> bool {
    x.type_of() == "function"
}

pub fn is_object(x: &Value) -> bool {
    x.type_of() == "object"
}

pub fn is_number(x: &Value) -> bool {
    x.type_of() == "number"
}

pub fn is_string(x: &Value) -> bool {
    x.type_of() == "string"
}

/// Property names are compared by their string form, so `hasProp(list, 0)` works.
pub fn has_prop(x: &Value, name: &Value) -> bool {
    x.has_own_prop(&name.to_string())
}

// array namespace

/// `a.length == n`; a value without a length never matches.
pub fn length_is(a: &Value, n: &Value) -> bool {
    match a.len() {
        Some(len) => Value::from(len).loose_eq(n),
        None => Value::Undefined.loose_eq(n),
    }
}

pub fn is_empty(a: &Value) -> bool {
    a.len() == Some(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_prop_stringifies_the_name() {
        let list = Value::from(vec![10, 20]);
        assert!(has_prop(&list, &Value::from(1)));
        assert!(!has_prop(&list, &Value::from(2)));
        assert!(has_prop(&Value::object([("a", 1)]), &Value::from("a")));
    }

    #[test]
    fn length_is_coerces_the_expected_length() {
        let list = Value::from(vec![1, 2, 3]);
        assert!(length_is(&list, &Value::from(3)));
        assert!(length_is(&list, &Value::from("3")));
        assert!(!length_is(&list, &Value::from(2)));
        assert!(length_is(&Value::from("abc"), &Value::from(3)));
        assert!(!length_is(&Value::from(3), &Value::from(0)));
    }

    #[test]
    fn type_predicates() {
        assert!(is_object(&Value::Null));
        assert!(is_object(&Value::from(vec![1])));
        assert!(!is_object(&Value::function("f")));
        assert!(is_number(&Value::Number(f64::NAN)));
        assert!(is_string(&Value::from("")));
        assert!(is_empty(&Value::from("")));
        assert!(!is_empty(&Value::Map(Default::default())));
    }
}
