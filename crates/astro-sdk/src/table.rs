//! Member tables
//!
//! A [`MemberTable`] maps every name and alias of a value type's members to
//! its descriptor. Lookup is case-insensitive and exact. Tables are built once
//! per type through a [`TableBuilder`] and are read-only afterwards.

use rustc_hash::FxHashMap;

use crate::context::ExecutionContext;
use crate::error::SuffixResult;
use crate::member::{getter, invoker, setter, Arity, Binding, Member, MemberInfo, Names};
use crate::structure::{Suffixed, STRUCTURE_TYPE_NAME};
use crate::value::{arg, assigned, FromValue, Value};

/// Normalized form of a member name used as the table key
pub fn normalize(name: &str) -> String {
    name.to_uppercase()
}

/// Registration conflict
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    /// Name (or alias) already taken in this table
    #[error("Suffix name {name} on {type_name} is already registered as {existing}")]
    Duplicate {
        /// Table owner
        type_name: &'static str,
        /// Name being registered
        name: String,
        /// Canonical name of the member that owns it
        existing: String,
    },

    /// Member registered without any name
    #[error("Suffix on {type_name} registered without a name")]
    Unnamed {
        /// Table owner
        type_name: &'static str,
    },
}

/// Insertion-ordered, case-insensitive member table for value type `T`
pub struct MemberTable<T> {
    type_name: &'static str,
    members: Vec<Member<T>>,
    index: FxHashMap<String, usize>,
}

impl<T: 'static> MemberTable<T> {
    /// Start building a table for the type named `type_name`
    pub fn builder(type_name: &'static str) -> TableBuilder<T> {
        TableBuilder {
            table: MemberTable {
                type_name,
                members: Vec::new(),
                index: FxHashMap::default(),
            },
            origin: type_name,
        }
    }

    /// Type that owns this table
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Case-insensitive lookup by canonical name or alias
    pub fn lookup(&self, name: &str) -> Option<&Member<T>> {
        self.index.get(&normalize(name)).map(|&i| &self.members[i])
    }

    /// Check if a name or alias is registered
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&normalize(name))
    }

    /// Members in insertion order
    pub fn members(&self) -> impl Iterator<Item = &Member<T>> {
        self.members.iter()
    }

    /// Every registered name and alias, in insertion order
    pub fn names(&self) -> Vec<&str> {
        self.members.iter().flat_map(|m| m.all_names()).collect()
    }

    /// Introspection records in insertion order
    pub fn list(&self) -> Vec<MemberInfo> {
        self.members.iter().map(Member::info).collect()
    }

    /// Number of members (aliases not counted)
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the table has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl<T> std::fmt::Debug for MemberTable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberTable")
            .field("type_name", &self.type_name)
            .field("members", &self.members.len())
            .field("names", &self.index.len())
            .finish()
    }
}

/// Registration phase of a [`MemberTable`]
pub struct TableBuilder<T> {
    table: MemberTable<T>,
    origin: &'static str,
}

impl<T: 'static> TableBuilder<T> {
    /// Register a member, rejecting name conflicts
    pub fn try_register(&mut self, mut member: Member<T>) -> Result<&mut Member<T>, RegistrationError> {
        let type_name = self.table.type_name;
        if member.name().is_empty() {
            return Err(RegistrationError::Unnamed { type_name });
        }

        let mut keys: Vec<String> = Vec::new();
        for name in member.all_names() {
            let key = normalize(name);
            if let Some(&i) = self.table.index.get(&key) {
                return Err(RegistrationError::Duplicate {
                    type_name,
                    name: name.to_string(),
                    existing: self.table.members[i].name().to_string(),
                });
            }
            if keys.contains(&key) {
                return Err(RegistrationError::Duplicate {
                    type_name,
                    name: name.to_string(),
                    existing: member.name().to_string(),
                });
            }
            keys.push(key);
        }

        if member.origin().is_empty() {
            member.set_origin(self.origin);
        }
        let slot = self.table.members.len();
        for key in keys {
            self.table.index.insert(key, slot);
        }
        self.table.members.push(member);
        Ok(&mut self.table.members[slot])
    }

    /// Register a member.
    ///
    /// # Panics
    /// Panics if any of the member's names is already registered. Tables are
    /// built from static declarations, so a conflict is a programming error.
    pub fn register(&mut self, member: Member<T>) -> &mut Member<T> {
        match self.try_register(member) {
            Ok(member) => member,
            Err(err) => panic!("{}", err),
        }
    }

    /// Read-only property
    pub fn get<R, F>(&mut self, names: impl Into<Names>, f: F) -> &mut Member<T>
    where
        R: Into<Value>,
        F: Fn(&T, &dyn ExecutionContext) -> SuffixResult<R> + Send + Sync + 'static,
    {
        self.register(Member::new(
            names,
            Binding::Get(getter(move |t, ctx| f(t, ctx).map(Into::into))),
        ))
    }

    /// Read-write property
    pub fn get_set<R, V, G, S>(&mut self, names: impl Into<Names>, get: G, set: S) -> &mut Member<T>
    where
        R: Into<Value>,
        V: FromValue,
        G: Fn(&T, &dyn ExecutionContext) -> SuffixResult<R> + Send + Sync + 'static,
        S: Fn(&T, &dyn ExecutionContext, V) -> SuffixResult<()> + Send + Sync + 'static,
    {
        self.register(Member::new(
            names,
            Binding::GetSet(
                getter(move |t, ctx| get(t, ctx).map(Into::into)),
                setter(move |t, ctx, value| set(t, ctx, assigned::<V>(&value)?)),
            ),
        ))
    }

    /// Method without arguments
    pub fn call0<R, F>(&mut self, names: impl Into<Names>, f: F) -> &mut Member<T>
    where
        R: Into<Value>,
        F: Fn(&T, &dyn ExecutionContext) -> SuffixResult<R> + Send + Sync + 'static,
    {
        self.register(Member::new(
            names,
            Binding::Call0(getter(move |t, ctx| f(t, ctx).map(Into::into))),
        ))
    }

    /// Method with one typed argument
    pub fn call1<A, R, F>(&mut self, names: impl Into<Names>, f: F) -> &mut Member<T>
    where
        A: FromValue,
        R: Into<Value>,
        F: Fn(&T, &dyn ExecutionContext, A) -> SuffixResult<R> + Send + Sync + 'static,
    {
        self.register(Member::new(
            names,
            Binding::CallN(
                Arity::exact(1),
                invoker(move |t, ctx, args| f(t, ctx, arg::<A>(args, 0)?).map(Into::into)),
            ),
        ))
    }

    /// Method with two typed arguments
    pub fn call2<A, B, R, F>(&mut self, names: impl Into<Names>, f: F) -> &mut Member<T>
    where
        A: FromValue,
        B: FromValue,
        R: Into<Value>,
        F: Fn(&T, &dyn ExecutionContext, A, B) -> SuffixResult<R> + Send + Sync + 'static,
    {
        self.register(Member::new(
            names,
            Binding::CallN(
                Arity::exact(2),
                invoker(move |t, ctx, args| {
                    f(t, ctx, arg::<A>(args, 0)?, arg::<B>(args, 1)?).map(Into::into)
                }),
            ),
        ))
    }

    /// Method over a raw argument list within `arity`
    pub fn call_n<R, F>(&mut self, names: impl Into<Names>, arity: Arity, f: F) -> &mut Member<T>
    where
        R: Into<Value>,
        F: Fn(&T, &dyn ExecutionContext, &[Value]) -> SuffixResult<R> + Send + Sync + 'static,
    {
        self.register(Member::new(
            names,
            Binding::CallN(arity, invoker(move |t, ctx, args| f(t, ctx, args).map(Into::into))),
        ))
    }

    /// Copy the members of parent type `P` into this table.
    ///
    /// Each member is re-bound through `up`. The parent's base structure
    /// members are skipped; this table already carries its own.
    pub fn inherit<P: Suffixed>(&mut self, up: fn(&T) -> &P) -> &mut Self {
        for member in P::table().members() {
            if member.origin() == STRUCTURE_TYPE_NAME {
                continue;
            }
            self.register(member.project(up));
        }
        self
    }

    /// Record `origin` as the declaring type of members registered from now on
    pub(crate) fn declared_by(&mut self, origin: &'static str) {
        self.origin = origin;
    }

    /// Finish registration
    pub fn build(self) -> MemberTable<T> {
        self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::AccessKind;
    use pretty_assertions::assert_eq;

    struct Widget;

    fn widget_table() -> MemberTable<Widget> {
        let mut b = MemberTable::builder("Widget");
        b.get("NAME", |_, _| Ok("widget"));
        b.get(["MODULES", "ALLMODULES"], |_, _| Ok(vec!["a", "b"]))
            .doc("A list of all the modules' names");
        b.call1("HASMODULE", |_, _, name: String| Ok(name == "a"));
        b.build()
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = widget_table();
        for name in ["NAME", "name", "Name", "nAmE"] {
            assert_eq!(table.lookup(name).map(|m| m.name()), Some("NAME"));
        }
        assert!(table.lookup("NAM").is_none());
    }

    #[test]
    fn test_aliases_resolve_to_same_member() {
        let table = widget_table();
        let a = table.lookup("modules").unwrap() as *const _;
        let b = table.lookup("AllModules").unwrap() as *const _;
        assert_eq!(a, b);
        assert_eq!(table.len(), 3);
        assert_eq!(table.names(), vec!["NAME", "MODULES", "ALLMODULES", "HASMODULE"]);
    }

    #[test]
    fn test_list_preserves_order_and_docs() {
        let table = widget_table();
        let listed = table.list();
        let names: Vec<_> = listed.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["NAME", "MODULES", "HASMODULE"]);
        assert_eq!(listed[1].doc.as_deref(), Some("A list of all the modules' names"));
        assert_eq!(listed[2].access, AccessKind::CallN(Arity::exact(1)));
        assert_eq!(listed[0].origin, "Widget");
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut b: TableBuilder<Widget> = MemberTable::builder("Widget");
        b.get("TAG", |_, _| Ok(""));
        let err = b
            .try_register(Member::new("tag", Binding::Get(getter(|_: &Widget, _| Ok(Value::None)))))
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::Duplicate {
                type_name: "Widget",
                name: "tag".into(),
                existing: "TAG".into(),
            }
        );
    }

    #[test]
    fn test_duplicate_alias_within_member_rejected() {
        let mut b: TableBuilder<Widget> = MemberTable::builder("Widget");
        let err = b
            .try_register(Member::new(
                ["MASS", "Mass"],
                Binding::Get(getter(|_: &Widget, _| Ok(Value::None))),
            ))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::Duplicate { .. }));
        assert!(b.build().is_empty());
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn test_register_panics_on_alias_conflict() {
        let mut b: TableBuilder<Widget> = MemberTable::builder("Widget");
        b.get(["MODULES", "ALLMODULES"], |_, _| Ok(0));
        b.get("allmodules", |_, _| Ok(1));
    }
}
