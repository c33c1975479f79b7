//! # Assertion Registry
//!
//! A fixed set of named predicates exposed as raising assertions.
//!
//! ## Module Structure
//!
//! - **`predicates`**: the pure predicate functions
//! - [`PREDICATE_TABLE`]: the declarative name → (predicate, message) tree
//! - [`AssertionRegistry`]: the flattened, built-once lookup of raising wrappers
//! - [`Assert`]: the context handed to every test body
//!
//! ## Registry Invariant
//! The registry is built once per process from [`PREDICATE_TABLE`] and shared
//! read-only by all test executions. Nothing mutates it after construction.

use im::HashMap;
use once_cell::sync::Lazy;

use crate::errors::AssertionFailure;
use crate::value::Value;

pub mod predicates;

// ============================================================================
// CORE TYPES
// ============================================================================

pub type UnaryPredicate = fn(&Value) -> bool;
pub type BinaryPredicate = fn(&Value, &Value) -> bool;

#[derive(Clone, Copy)]
pub enum Predicate {
    Unary(UnaryPredicate),
    Binary(BinaryPredicate),
}

impl Predicate {
    pub fn arity(&self) -> usize {
        match self {
            Predicate::Unary(_) => 1,
            Predicate::Binary(_) => 2,
        }
    }

    /// Evaluates the predicate; callers have already checked the arity.
    fn eval(&self, args: &[Value]) -> bool {
        match (self, args) {
            (Predicate::Unary(p), [x]) => p(x),
            (Predicate::Binary(p), [x, y]) => p(x, y),
            _ => false,
        }
    }
}

/// A predicate plus the message it fails with.
#[derive(Clone, Copy)]
pub struct AssertionDef {
    pub predicate: Predicate,
    pub message: &'static str,
}

/// One node of the declarative assertion table.
pub enum PredicateTree {
    Leaf(AssertionDef),
    Namespace(&'static [(&'static str, PredicateTree)]),
}

const fn unary(predicate: UnaryPredicate, message: &'static str) -> PredicateTree {
    PredicateTree::Leaf(AssertionDef {
        predicate: Predicate::Unary(predicate),
        message,
    })
}

const fn binary(predicate: BinaryPredicate, message: &'static str) -> PredicateTree {
    PredicateTree::Leaf(AssertionDef {
        predicate: Predicate::Binary(predicate),
        message,
    })
}

/// Fixed failure messages, one per assertion name.
pub mod messages {
    pub const IS_TRUE: &str = "isTrue failed";
    pub const IS_FALSE: &str = "isFalse failed";
    pub const ARE_EQUAL: &str = "areEqual failed";
    pub const ARE_EQUIV: &str = "areEquiv failed";
    pub const IS_FUNCTION: &str = "isFunction failed";
    pub const IS_OBJECT: &str = "isObject failed";
    pub const IS_NUMBER: &str = "isNumber failed";
    pub const IS_STRING: &str = "isString failed";
    pub const HAS_PROP: &str = "hasProp failed";
    pub const LENGTH_IS: &str = "lengthIs failed";
    pub const IS_EMPTY: &str = "isEmpty failed";
}

use self::predicates as p;

pub static PREDICATE_TABLE: &[(&str, PredicateTree)] = &[
    ("isTrue", unary(p::is_true, messages::IS_TRUE)),
    ("isFalse", unary(p::is_false, messages::IS_FALSE)),
    ("areEqual", binary(p::are_equal, messages::ARE_EQUAL)),
    ("areEquiv", binary(p::are_equiv, messages::ARE_EQUIV)),
    ("isFunction", unary(p::is_function, messages::IS_FUNCTION)),
    ("isObject", unary(p::is_object, messages::IS_OBJECT)),
    ("isNumber", unary(p::is_number, messages::IS_NUMBER)),
    ("isString", unary(p::is_string, messages::IS_STRING)),
    ("hasProp", binary(p::has_prop, messages::HAS_PROP)),
    (
        "array",
        PredicateTree::Namespace(&[
            ("lengthIs", binary(p::length_is, messages::LENGTH_IS)),
            ("isEmpty", unary(p::is_empty, messages::IS_EMPTY)),
        ]),
    ),
];

// ============================================================================
// REGISTRY
// ============================================================================

/// A raising wrapper around one [`AssertionDef`].
#[derive(Clone)]
pub struct Assertion {
    path: String,
    def: AssertionDef,
}

impl Assertion {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn arity(&self) -> usize {
        self.def.predicate.arity()
    }

    pub fn message(&self) -> &'static str {
        self.def.message
    }

    /// Succeeds silently or fails with this assertion's fixed message.
    pub fn check(&self, args: &[Value]) -> Result<(), AssertionFailure> {
        if args.len() != self.arity() {
            return Err(AssertionFailure::ArityMismatch {
                assertion: self.path.clone(),
                expected: self.arity(),
                actual: args.len(),
            });
        }
        if self.def.predicate.eval(args) {
            Ok(())
        } else {
            Err(AssertionFailure::Failed {
                assertion: self.path.clone(),
                message: self.def.message.to_string(),
            })
        }
    }
}

/// Lookup of every assertion by dotted path, e.g. `"array.lengthIs"`.
#[derive(Default, Clone)]
pub struct AssertionRegistry {
    assertions: HashMap<String, Assertion>,
}

impl AssertionRegistry {
    /// Walks a declarative table and mirrors it as raising wrappers.
    pub fn from_table(table: &[(&'static str, PredicateTree)]) -> Self {
        let mut registry = Self::default();
        registry.register_tree("", table);
        registry
    }

    fn register_tree(&mut self, prefix: &str, table: &[(&'static str, PredicateTree)]) {
        for (name, node) in table {
            let path = if prefix.is_empty() {
                name.to_string()
            } else {
                format!("{prefix}.{name}")
            };
            match node {
                PredicateTree::Leaf(def) => {
                    self.assertions.insert(
                        path.clone(),
                        Assertion {
                            path,
                            def: *def,
                        },
                    );
                }
                PredicateTree::Namespace(children) => self.register_tree(&path, children),
            }
        }
    }

    pub fn get(&self, path: &str) -> Option<&Assertion> {
        self.assertions.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.assertions.contains_key(path)
    }

    /// All registered paths, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.assertions.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.assertions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assertions.is_empty()
    }
}

static DEFAULT_REGISTRY: Lazy<AssertionRegistry> =
    Lazy::new(|| AssertionRegistry::from_table(PREDICATE_TABLE));

/// The process-wide registry built from [`PREDICATE_TABLE`].
pub fn default_registry() -> &'static AssertionRegistry {
    &DEFAULT_REGISTRY
}

// ============================================================================
// ASSERTION CONTEXT
// ============================================================================

/// The context every test body receives.
///
/// ```rust
/// use testenv::assertions::Assert;
/// use testenv::value::Value;
/// let assert = Assert::default();
/// assert!(assert.are_equal(5 * 5, 3 * 3 + 4 * 4).is_ok());
/// assert!(assert.are_equiv("1", 1).is_err());
/// assert!(assert.array().length_is(vec![1, 2, 3], 3).is_ok());
/// assert!(assert.call("array.isEmpty", &[Value::from(Vec::<Value>::new())]).is_ok());
/// ```
#[derive(Clone, Copy)]
pub struct Assert {
    registry: &'static AssertionRegistry,
}

impl Default for Assert {
    fn default() -> Self {
        Self::new(default_registry())
    }
}

/// The outcome of one assertion call.
pub type Check = Result<(), AssertionFailure>;

impl Assert {
    pub fn new(registry: &'static AssertionRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'static AssertionRegistry {
        self.registry
    }

    /// Invokes an assertion by its dotted path.
    pub fn call(&self, path: &str, args: &[Value]) -> Check {
        match self.registry.get(path) {
            Some(assertion) => assertion.check(args),
            None => Err(AssertionFailure::UnknownAssertion {
                path: path.to_string(),
            }),
        }
    }

    fn check1(&self, path: &str, x: impl Into<Value>) -> Check {
        self.call(path, &[x.into()])
    }

    fn check2(&self, path: &str, x: impl Into<Value>, y: impl Into<Value>) -> Check {
        self.call(path, &[x.into(), y.into()])
    }

    pub fn is_true(&self, x: impl Into<Value>) -> Check {
        self.check1("isTrue", x)
    }

    pub fn is_false(&self, x: impl Into<Value>) -> Check {
        self.check1("isFalse", x)
    }

    /// Loose equality: `are_equal("1", 1)` passes.
    pub fn are_equal(&self, x: impl Into<Value>, y: impl Into<Value>) -> Check {
        self.check2("areEqual", x, y)
    }

    /// Strict equality: `are_equiv("1", 1)` fails.
    pub fn are_equiv(&self, x: impl Into<Value>, y: impl Into<Value>) -> Check {
        self.check2("areEquiv", x, y)
    }

    pub fn is_function(&self, x: impl Into<Value>) -> Check {
        self.check1("isFunction", x)
    }

    pub fn is_object(&self, x: impl Into<Value>) -> Check {
        self.check1("isObject", x)
    }

    pub fn is_number(&self, x: impl Into<Value>) -> Check {
        self.check1("isNumber", x)
    }

    pub fn is_string(&self, x: impl Into<Value>) -> Check {
        self.check1("isString", x)
    }

    pub fn has_prop(&self, x: impl Into<Value>, name: impl Into<Value>) -> Check {
        self.check2("hasProp", x, name)
    }

    pub fn array(&self) -> ArrayAssert<'_> {
        ArrayAssert { assert: self }
    }
}

/// The `array.*` namespace.
pub struct ArrayAssert<'a> {
    assert: &'a Assert,
}

impl ArrayAssert<'_> {
    pub fn length_is(&self, a: impl Into<Value>, n: impl Into<Value>) -> Check {
        self.assert.check2("array.lengthIs", a, n)
    }

    pub fn is_empty(&self, a: impl Into<Value>) -> Check {
        self.assert.check1("array.isEmpty", a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed_with(check: Check, expected: &str) -> bool {
        matches!(check, Err(AssertionFailure::Failed { message, .. }) if message == expected)
    }

    #[test]
    fn registry_mirrors_the_table() {
        let registry = default_registry();
        assert_eq!(registry.len(), 11);
        assert!(registry.contains("array.lengthIs"));
        assert!(registry.contains("array.isEmpty"));
        assert!(!registry.contains("array"));
        assert!(!registry.contains("lengthIs"));
        assert_eq!(registry.names().first().map(String::as_str), Some("areEqual"));
    }

    #[test]
    fn assertions_know_their_arity_and_message() {
        let registry = default_registry();
        let has_prop = registry.get("hasProp").expect("hasProp registered");
        assert_eq!(has_prop.arity(), 2);
        assert_eq!(has_prop.message(), messages::HAS_PROP);
        assert!(registry.get("isEmpty").is_none());
    }

    #[test]
    fn predicate_examples() {
        let t = Assert::default();
        assert!(t.are_equal(5 * 5, 3 * 3 + 4 * 4).is_ok());
        assert!(t.are_equal("1", 1).is_ok());
        assert!(failed_with(t.are_equiv("1", 1), messages::ARE_EQUIV));
        assert!(t.array().is_empty(Vec::<Value>::new()).is_ok());
        assert!(t.array().length_is(vec![1, 2, 3], 3).is_ok());
        assert!(t.is_function(Value::function("")).is_ok());
        assert!(t.has_prop(Value::object([("a", 1)]), "a").is_ok());
        assert!(failed_with(
            t.has_prop(Value::object([("a", 1)]), "b"),
            messages::HAS_PROP
        ));
    }

    #[test]
    fn namespaced_failures_use_the_leaf_message() {
        let t = Assert::default();
        assert!(failed_with(t.array().is_empty(vec![1]), "isEmpty failed"));
        assert!(failed_with(t.array().length_is(vec![1], 2), "lengthIs failed"));
    }

    #[test]
    fn call_checks_arity_and_path() {
        let t = Assert::default();
        assert_eq!(
            t.call("areEqual", &[Value::from(1)]),
            Err(AssertionFailure::ArityMismatch {
                assertion: "areEqual".into(),
                expected: 2,
                actual: 1,
            })
        );
        assert_eq!(
            t.call("array.missing", &[]),
            Err(AssertionFailure::UnknownAssertion {
                path: "array.missing".into()
            })
        );
    }

    #[test]
    fn custom_tables_build_nested_paths() {
        static TABLE: &[(&str, PredicateTree)] = &[(
            "outer",
            PredicateTree::Namespace(&[(
                "inner",
                PredicateTree::Namespace(&[("isTrue", unary(p::is_true, "nested failed"))]),
            )]),
        )];
        let registry = AssertionRegistry::from_table(TABLE);
        assert_eq!(registry.names(), vec!["outer.inner.isTrue".to_string()]);
    }
}
