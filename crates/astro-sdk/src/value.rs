//! Script values
//!
//! [`Value`] is what crosses the boundary between the language engine and
//! member closures. Primitive values are stored inline; host-backed values
//! are shared [`Structure`] handles.

use std::fmt;
use std::sync::Arc;

use crate::error::{AccessViolation, SuffixError, SuffixResult};
use crate::structure::Structure;

/// A script-visible value
#[derive(Clone, Default)]
pub enum Value {
    /// No value (result of SET, void methods)
    #[default]
    None,
    /// Boolean
    Bool(bool),
    /// Integral scalar
    Int(i64),
    /// Floating-point scalar
    Scalar(f64),
    /// String
    Str(String),
    /// List of values
    List(Vec<Value>),
    /// Host-backed structure
    Structure(Arc<dyn Structure>),
}

impl Value {
    /// Wrap a structure
    pub fn structure<S: Structure + 'static>(s: S) -> Self {
        Value::Structure(Arc::new(s))
    }

    /// Script type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "None",
            Value::Bool(_) => "Boolean",
            Value::Int(_) | Value::Scalar(_) => "Scalar",
            Value::Str(_) => "String",
            Value::List(_) => "List",
            Value::Structure(s) => s.type_name(),
        }
    }

    /// Check if this is `None`
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Get as bool if this is a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as f64 if this is a scalar
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Scalar(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as i64 if this is an integral scalar
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
            Value::Scalar(f)
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 =>
            {
                Some(*f as i64)
            }
            _ => None,
        }
    }

    /// Get as string slice if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get as list if this is a list
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get the structure handle if this is a structure
    pub fn as_structure(&self) -> Option<&Arc<dyn Structure>> {
        match self {
            Value::Structure(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Int(_) | Value::Scalar(_), Value::Int(_) | Value::Scalar(_)) => {
                self.as_f64() == other.as_f64()
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Structure(a), Value::Structure(b)) => a.key() == b.key(),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Int(i) => write!(f, "Int({})", i),
            Value::Scalar(x) => write!(f, "Scalar({})", x),
            Value::Str(s) => write!(f, "Str({:?})", s),
            Value::List(items) => f.debug_list().entries(items).finish(),
            Value::Structure(s) => write!(f, "Structure({})", s.label()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => Ok(()),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Scalar(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Structure(s) => write!(f, "{}", s.label()),
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::None
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Scalar(x as f64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Scalar(x)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<Arc<dyn Structure>> for Value {
    fn from(s: Arc<dyn Structure>) -> Self {
        Value::Structure(s)
    }
}

/// Convert a script value into a typed closure parameter.
///
/// Implement this trait to accept a type as a method argument or SET value.
pub trait FromValue: Sized {
    /// Script type name used in conversion errors
    const TYPE_NAME: &'static str;

    /// Convert, returning `None` if the value has the wrong type
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    const TYPE_NAME: &'static str = "Any";

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for bool {
    const TYPE_NAME: &'static str = "Boolean";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for String {
    const TYPE_NAME: &'static str = "String";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromValue for f64 {
    const TYPE_NAME: &'static str = "Scalar";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FromValue for i64 {
    const TYPE_NAME: &'static str = "Scalar";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl FromValue for i32 {
    const TYPE_NAME: &'static str = "Scalar";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64().and_then(|i| i32::try_from(i).ok())
    }
}

impl FromValue for usize {
    const TYPE_NAME: &'static str = "Scalar";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64().and_then(|i| usize::try_from(i).ok())
    }
}

impl FromValue for Arc<dyn Structure> {
    const TYPE_NAME: &'static str = "Structure";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_structure().cloned()
    }
}

/// Convert argument `index` of a checked argument list
pub fn arg<A: FromValue>(args: &[Value], index: usize) -> SuffixResult<A> {
    let value = args.get(index).unwrap_or(&Value::None);
    A::from_value(value).ok_or_else(|| {
        SuffixError::violation(AccessViolation::ArgumentType {
            index,
            expected: A::TYPE_NAME,
            got: value.type_name(),
        })
    })
}

/// Convert a SET value
pub fn assigned<V: FromValue>(value: &Value) -> SuffixResult<V> {
    V::from_value(value).ok_or_else(|| {
        SuffixError::violation(AccessViolation::ValueType {
            expected: V::TYPE_NAME,
            got: value.type_name(),
        })
    })
}

/// Identity of a structure: its type plus the host-entity handle it wraps.
///
/// Equality and hashing of structures go through this key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StructureKey {
    /// Script type name
    pub type_name: &'static str,
    /// Host-entity identity
    pub identity: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_equality_across_representations() {
        assert_eq!(Value::Int(3), Value::Scalar(3.0));
        assert_ne!(Value::Int(3), Value::Str("3".into()));
        assert_eq!(Value::from(vec![1, 2]), Value::List(vec![Value::Int(1), Value::Int(2)]));
    }

    #[test]
    fn test_integral_conversions() {
        assert_eq!(i64::from_value(&Value::Scalar(2.0)), Some(2));
        assert_eq!(i64::from_value(&Value::Scalar(2.5)), None);
        assert_eq!(usize::from_value(&Value::Int(-1)), None);
        assert_eq!(f64::from_value(&Value::Int(4)), Some(4.0));
    }

    #[test]
    fn test_integral_conversion_rejects_out_of_range_scalars() {
        assert_eq!(Value::Scalar(1e300).as_i64(), None);
        assert_eq!(Value::Scalar(-1e300).as_i64(), None);
        assert_eq!(Value::Scalar(9_223_372_036_854_775_808.0).as_i64(), None);
        assert_eq!(Value::Scalar(f64::INFINITY).as_i64(), None);
        assert_eq!(Value::Scalar(f64::NAN).as_i64(), None);
        assert_eq!(Value::Scalar(-9_223_372_036_854_775_808.0).as_i64(), Some(i64::MIN));
        assert_eq!(i32::from_value(&Value::Scalar(1e12)), None);
    }

    #[test]
    fn test_any_value_accepted_as_value() {
        assert_eq!(<Value as FromValue>::TYPE_NAME, "Any");
        assert_eq!(Value::from_value(&Value::Bool(true)), Some(Value::Bool(true)));
    }

    #[test]
    fn test_arg_type_mismatch() {
        let args = vec![Value::Bool(true)];
        let err = arg::<String>(&args, 0).unwrap_err();
        assert_eq!(
            err,
            SuffixError::violation(AccessViolation::ArgumentType {
                index: 0,
                expected: "String",
                got: "Boolean",
            })
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Bool(true).to_string(), "True");
        assert_eq!(Value::from(vec!["a", "b"]).to_string(), "[a, b]");
        assert_eq!(Value::None.to_string(), "");
    }
}
