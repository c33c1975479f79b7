use im::HashMap;
use std::fmt;
use std::sync::Arc;

/// A named callable marker, compared by identity.
///
/// Two `FunctionRef`s are equal only when one is a clone of the other, mirroring
/// reference semantics for functions.
///
/// # Examples
///
/// ```rust
/// use testenv::value::FunctionRef;
/// let f = FunctionRef::new("add");
/// let g = FunctionRef::new("add");
/// assert_eq!(f, f.clone());
/// assert_ne!(f, g);
/// assert_eq!(f.name(), "add");
/// ```
#[derive(Debug, Clone)]
pub struct FunctionRef {
    name: Arc<str>,
}

impl FunctionRef {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: name.into() }
    }

    pub fn anonymous() -> Self {
        Self::new("")
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for FunctionRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.name, &other.name)
    }
}

/// A dynamically typed operand for assertions.
///
/// # Examples
///
/// ```rust
/// use testenv::value::Value;
/// let n = Value::Number(3.14);
/// assert_eq!(n.type_name(), "Number");
/// let s = Value::from("hello");
/// assert_eq!(s.type_of(), "string");
/// assert!(Value::default().is_undefined());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    Map(HashMap<String, Value>),
    Function(FunctionRef),
}

impl Value {
    /// Builds a `Map` value from key/value pairs.
    ///
    /// ```rust
    /// use testenv::value::Value;
    /// let obj = Value::object([("a", 1)]);
    /// assert!(obj.has_own_prop("a"));
    /// ```
    pub fn object<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn function(name: &str) -> Self {
        Value::Function(FunctionRef::new(name))
    }

    /// Returns the type name of the value as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "Undefined",
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Number(_) => "Number",
            Value::String(_) => "String",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
            Value::Function(_) => "Function",
        }
    }

    /// Returns the `typeof` classification. `Null`, lists and maps are all `"object"`.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null | Value::List(_) | Value::Map(_) => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Function(_) => "function",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::List(_) | Value::Map(_) | Value::Function(_) => true,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Equality without coercion. `NaN` never equals itself.
    pub fn strict_eq(&self, other: &Value) -> bool {
        self == other
    }

    /// Equality with primitive coercion.
    ///
    /// ```rust
    /// use testenv::value::Value;
    /// assert!(Value::from("1").loose_eq(&Value::from(1)));
    /// assert!(Value::Null.loose_eq(&Value::Undefined));
    /// assert!(!Value::Null.loose_eq(&Value::from(0)));
    /// assert!(Value::from(vec![1]).loose_eq(&Value::from(true)));
    /// ```
    pub fn loose_eq(&self, other: &Value) -> bool {
        use Value::*;
        match (self, other) {
            (Undefined | Null, Undefined | Null) => true,
            (Undefined | Null, _) | (_, Undefined | Null) => false,
            (Number(a), String(b)) => *a == string_to_number(b),
            (String(a), Number(b)) => string_to_number(a) == *b,
            (Bool(b), _) => Number(bool_to_number(*b)).loose_eq(other),
            (_, Bool(b)) => self.loose_eq(&Number(bool_to_number(*b))),
            (List(_) | Map(_) | Function(_), Number(_) | String(_)) => {
                String(self.to_primitive_string()).loose_eq(other)
            }
            (Number(_) | String(_), List(_) | Map(_) | Function(_)) => {
                self.loose_eq(&String(other.to_primitive_string()))
            }
            _ => self.strict_eq(other),
        }
    }

    /// The `length` property: element count for lists, UTF-16 units for strings.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::List(items) => Some(items.len()),
            Value::String(s) => Some(s.encode_utf16().count()),
            _ => None,
        }
    }

    /// Whether `name` is an own property of this value.
    pub fn has_own_prop(&self, name: &str) -> bool {
        match self {
            Value::Map(map) => map.contains_key(name),
            Value::List(_) | Value::String(_) => {
                name == "length" || self.len().is_some_and(|len| is_index_below(name, len))
            }
            Value::Function(_) => name == "name" || name == "length",
            _ => false,
        }
    }

    fn to_primitive_string(&self) -> String {
        match self {
            Value::List(items) => items
                .iter()
                .map(|item| match item {
                    Value::Undefined | Value::Null => String::new(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            other => other.to_string(),
        }
    }

    // ------------------------------------------------------------------------
    // Display formatting helpers
    // ------------------------------------------------------------------------

    fn fmt_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
        if n.is_nan() {
            write!(f, "NaN")
        } else if n.is_infinite() {
            write!(f, "{}Infinity", if n < 0.0 { "-" } else { "" })
        } else if n == 0.0 {
            write!(f, "0")
        } else {
            if n < 0.0 {
                write!(f, "-")?;
            }
            write!(f, "{}", number_to_string(n.abs()))
        }
    }
}

/// Shortest round-trip rendering of a finite, positive number. Plain decimal
/// notation covers `1e-6 <= n < 1e21`; everything else uses an exponent.
fn number_to_string(n: f64) -> String {
    // `{:e}` yields the shortest round-trip digits, e.g. "1.2345e2".
    let scientific = format!("{:e}", n);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    // Position of the decimal point relative to the first digit.
    let point = exponent.parse::<i32>().unwrap_or(0) + 1;

    if k <= point && point <= 21 {
        format!("{digits}{}", "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{int}.{frac}")
    } else if -6 < point && point <= 0 {
        format!("0.{}{digits}", "0".repeat((-point) as usize))
    } else {
        let (lead, rest) = digits.split_at(1);
        let sign = if point > 0 { "+" } else { "-" };
        let exp = (point - 1).abs();
        if rest.is_empty() {
            format!("{lead}e{sign}{exp}")
        } else {
            format!("{lead}.{rest}e{sign}{exp}")
        }
    }
}

fn bool_to_number(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Numeric conversion of a string operand: whitespace trimmed, empty is zero,
/// anything unparsable is `NaN`.
fn string_to_number(s: &str) -> f64 {
    let t = s.trim();
    if t.is_empty() {
        return 0.0;
    }
    match t {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    for (prefixes, radix) in [(["0x", "0X"], 16), (["0o", "0O"], 8), (["0b", "0B"], 2)] {
        if let Some(body) = prefixes.iter().find_map(|p| t.strip_prefix(p)) {
            return radix_to_number(body, radix);
        }
    }
    // Rust also accepts "inf" and "nan"; those are not numeric literals here.
    if t.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return f64::NAN;
    }
    t.parse::<f64>().unwrap_or(f64::NAN)
}

/// Digits after a `0x`/`0o`/`0b` prefix. Signs and empty bodies are rejected.
fn radix_to_number(body: &str, radix: u32) -> f64 {
    if body.is_empty() || !body.chars().all(|c| c.is_digit(radix)) {
        return f64::NAN;
    }
    body.chars()
        .filter_map(|c| c.to_digit(radix))
        .fold(0.0, |acc, d| acc * f64::from(radix) + f64::from(d))
}

fn is_index_below(name: &str, len: usize) -> bool {
    match name.parse::<usize>() {
        Ok(idx) => idx.to_string() == name && idx < len,
        Err(_) => false,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => Value::fmt_number(f, *n),
            Value::String(s) => write!(f, "{}", s),
            Value::List(_) => write!(f, "{}", self.to_primitive_string()),
            Value::Map(_) => write!(f, "[object Object]"),
            Value::Function(func) => write!(f, "function {}() {{}}", func.name()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Number(n as f64)
                }
            }
        )*
    };
}

impl_from_int!(i32, i64, u32, u64, usize);

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<FunctionRef> for Value {
    fn from(func: FunctionRef) -> Self {
        Value::Function(func)
    }
}
