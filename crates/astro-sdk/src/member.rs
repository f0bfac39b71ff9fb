//! Member descriptors
//!
//! A [`Member`] is one addressable suffix of a value type: its names, the
//! closures bound to it and optional documentation. The closures take the
//! value as their first argument, which lets one descriptor be shared by every
//! instance of the type.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::context::ExecutionContext;
use crate::error::SuffixResult;
use crate::value::Value;

/// Property read (also used for zero-argument calls)
pub type Getter<T> = Arc<dyn Fn(&T, &dyn ExecutionContext) -> SuffixResult<Value> + Send + Sync>;

/// Property write
pub type Setter<T> =
    Arc<dyn Fn(&T, &dyn ExecutionContext, Value) -> SuffixResult<()> + Send + Sync>;

/// Call with an argument list already checked against the member's arity
pub type Invoker<T> =
    Arc<dyn Fn(&T, &dyn ExecutionContext, &[Value]) -> SuffixResult<Value> + Send + Sync>;

/// Box a getter closure
pub fn getter<T, F>(f: F) -> Getter<T>
where
    F: Fn(&T, &dyn ExecutionContext) -> SuffixResult<Value> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Box a setter closure
pub fn setter<T, F>(f: F) -> Setter<T>
where
    F: Fn(&T, &dyn ExecutionContext, Value) -> SuffixResult<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Box an invoker closure
pub fn invoker<T, F>(f: F) -> Invoker<T>
where
    F: Fn(&T, &dyn ExecutionContext, &[Value]) -> SuffixResult<Value> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Accepted argument count of a callable member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Arity {
    /// Fewest arguments accepted
    pub min: usize,
    /// Most arguments accepted, `None` for variadic
    pub max: Option<usize>,
}

impl Arity {
    /// Exactly `n` arguments
    pub const fn exact(n: usize) -> Self {
        Arity {
            min: n,
            max: Some(n),
        }
    }

    /// Between `min` and `max` arguments, inclusive
    pub const fn range(min: usize, max: usize) -> Self {
        Arity {
            min,
            max: Some(max),
        }
    }

    /// `min` or more arguments
    pub const fn at_least(min: usize) -> Self {
        Arity { min, max: None }
    }

    /// Whether `count` arguments are acceptable
    pub fn admits(&self, count: usize) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{}", max),
            Some(max) => write!(f, "{} to {}", self.min, max),
            None => write!(f, "at least {}", self.min),
        }
    }
}

/// Read/write/call classification of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    /// Property that can only be read
    ReadOnly,
    /// Property that can be read and SET
    ReadWrite,
    /// Method without arguments
    Call0,
    /// Method taking arguments
    CallN(Arity),
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessKind::ReadOnly => write!(f, "get"),
            AccessKind::ReadWrite => write!(f, "get/set"),
            AccessKind::Call0 => write!(f, "method()"),
            AccessKind::CallN(arity) => write!(f, "method({})", arity),
        }
    }
}

/// Closures bound to a member. The variant fixes the access kind, so only
/// read-write members can carry a setter.
pub enum Binding<T> {
    /// Read-only property
    Get(Getter<T>),
    /// Read-write property
    GetSet(Getter<T>, Setter<T>),
    /// Zero-argument method
    Call0(Getter<T>),
    /// Method with an argument range
    CallN(Arity, Invoker<T>),
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        match self {
            Binding::Get(g) => Binding::Get(g.clone()),
            Binding::GetSet(g, s) => Binding::GetSet(g.clone(), s.clone()),
            Binding::Call0(g) => Binding::Call0(g.clone()),
            Binding::CallN(arity, i) => Binding::CallN(*arity, i.clone()),
        }
    }
}

impl<T> Binding<T> {
    /// Access kind implied by this binding
    pub fn access_kind(&self) -> AccessKind {
        match self {
            Binding::Get(_) => AccessKind::ReadOnly,
            Binding::GetSet(..) => AccessKind::ReadWrite,
            Binding::Call0(_) => AccessKind::Call0,
            Binding::CallN(arity, _) => AccessKind::CallN(*arity),
        }
    }
}

/// The canonical name of a member followed by its aliases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Names(Vec<String>);

impl Names {
    fn into_parts(self) -> (String, Vec<String>) {
        let mut iter = self.0.into_iter();
        let name = iter.next().unwrap_or_default();
        (name, iter.collect())
    }
}

impl From<&str> for Names {
    fn from(name: &str) -> Self {
        Names(vec![name.to_string()])
    }
}

impl From<String> for Names {
    fn from(name: String) -> Self {
        Names(vec![name])
    }
}

impl<const N: usize> From<[&str; N]> for Names {
    fn from(names: [&str; N]) -> Self {
        Names(names.iter().map(|s| s.to_string()).collect())
    }
}

impl From<&[&str]> for Names {
    fn from(names: &[&str]) -> Self {
        Names(names.iter().map(|s| s.to_string()).collect())
    }
}

/// One addressable member of value type `T`
pub struct Member<T> {
    name: String,
    aliases: Vec<String>,
    binding: Binding<T>,
    doc: Option<String>,
    origin: &'static str,
}

impl<T> Member<T> {
    /// Create a member from its names and binding.
    ///
    /// The first name is canonical; the rest are aliases. `origin` is the
    /// type name that declared the member, set by the table on registration.
    pub fn new(names: impl Into<Names>, binding: Binding<T>) -> Self {
        let (name, aliases) = names.into().into_parts();
        Member {
            name,
            aliases,
            binding,
            doc: None,
            origin: "",
        }
    }

    /// Attach documentation text
    pub fn doc(&mut self, text: impl Into<String>) -> &mut Self {
        self.doc = Some(text.into());
        self
    }

    /// Canonical name, as registered
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alias names, as registered
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Canonical name followed by aliases
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(|s| s.as_str()))
    }

    /// Bound closures
    pub fn binding(&self) -> &Binding<T> {
        &self.binding
    }

    /// Access kind
    pub fn access_kind(&self) -> AccessKind {
        self.binding.access_kind()
    }

    /// Documentation text
    pub fn doc_text(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Type name that declared this member
    pub fn origin(&self) -> &'static str {
        self.origin
    }

    pub(crate) fn set_origin(&mut self, origin: &'static str) {
        self.origin = origin;
    }

    /// Introspection record
    pub fn info(&self) -> MemberInfo {
        MemberInfo {
            name: self.name.clone(),
            aliases: self.aliases.clone(),
            access: self.access_kind(),
            doc: self.doc.clone(),
            origin: self.origin,
        }
    }

    /// Re-bind this member onto a derived type `U` that embeds a `T`
    pub fn project<U>(&self, up: fn(&U) -> &T) -> Member<U>
    where
        T: 'static,
        U: 'static,
    {
        let binding = match &self.binding {
            Binding::Get(g) => {
                let g = g.clone();
                Binding::Get(getter(move |u: &U, ctx| g(up(u), ctx)))
            }
            Binding::GetSet(g, s) => {
                let (g, s) = (g.clone(), s.clone());
                Binding::GetSet(
                    getter(move |u: &U, ctx| g(up(u), ctx)),
                    setter(move |u: &U, ctx, v| s(up(u), ctx, v)),
                )
            }
            Binding::Call0(g) => {
                let g = g.clone();
                Binding::Call0(getter(move |u: &U, ctx| g(up(u), ctx)))
            }
            Binding::CallN(arity, i) => {
                let i = i.clone();
                Binding::CallN(*arity, invoker(move |u: &U, ctx, args| i(up(u), ctx, args)))
            }
        };
        Member {
            name: self.name.clone(),
            aliases: self.aliases.clone(),
            binding,
            doc: self.doc.clone(),
            origin: self.origin,
        }
    }
}

impl<T> fmt::Debug for Member<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("access", &self.access_kind())
            .field("origin", &self.origin)
            .finish()
    }
}

/// Introspection record used by help listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberInfo {
    /// Canonical name
    pub name: String,
    /// Alias names
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Access kind
    pub access: AccessKind,
    /// Documentation text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Type name that declared the member
    pub origin: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_admits() {
        assert!(Arity::exact(1).admits(1));
        assert!(!Arity::exact(1).admits(0));
        assert!(Arity::range(1, 3).admits(3));
        assert!(!Arity::range(1, 3).admits(4));
        assert!(Arity::at_least(2).admits(10));
        assert_eq!(Arity::range(1, 3).to_string(), "1 to 3");
        assert_eq!(Arity::at_least(2).to_string(), "at least 2");
    }

    #[test]
    fn test_names_split_canonical_and_aliases() {
        let member: Member<()> = Member::new(
            ["MODULES", "ALLMODULES"],
            Binding::Get(getter(|_: &(), _| Ok(Value::None))),
        );
        assert_eq!(member.name(), "MODULES");
        assert_eq!(member.aliases(), &["ALLMODULES".to_string()]);
        assert_eq!(member.access_kind(), AccessKind::ReadOnly);
    }

    #[test]
    fn test_binding_fixes_access_kind() {
        let rw: Binding<()> = Binding::GetSet(
            getter(|_: &(), _| Ok(Value::None)),
            setter(|_: &(), _, _| Ok(())),
        );
        assert_eq!(rw.access_kind(), AccessKind::ReadWrite);

        let call: Binding<()> = Binding::CallN(Arity::exact(2), invoker(|_: &(), _, _| Ok(Value::None)));
        assert_eq!(call.access_kind(), AccessKind::CallN(Arity::exact(2)));
    }
}
