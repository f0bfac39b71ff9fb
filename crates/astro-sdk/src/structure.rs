//! Addressable values
//!
//! [`Structure`] is the object-safe trait the language engine talks to.
//! Value types implement [`Suffixed`] instead and get `Structure` through a
//! blanket impl: they only supply their type name, a label, an identity and a
//! static member table.
//!
//! # Example
//!
//! ```ignore
//! struct Eta { world: WorldHandle, vessel: VesselId }
//!
//! static TABLE: Lazy<MemberTable<Eta>> = Lazy::new(|| {
//!     let mut b = table_builder::<Eta>();
//!     b.call0("APOAPSIS", |eta, _| eta.time_to_ap());
//!     b.build()
//! });
//!
//! impl Suffixed for Eta {
//!     const TYPE_NAME: &'static str = "VesselEta";
//!     fn table() -> &'static MemberTable<Self> { &TABLE }
//!     fn describe(&self) -> String { "ETA".into() }
//!     fn identity(&self) -> u64 { self.vessel.0 }
//! }
//! ```

use crate::context::ExecutionContext;
use crate::dispatch;
use crate::error::SuffixResult;
use crate::member::MemberInfo;
use crate::table::{MemberTable, TableBuilder};
use crate::value::{StructureKey, Value};

/// Type name at the root of every value hierarchy
pub const STRUCTURE_TYPE_NAME: &str = "Structure";

/// A member access as requested by the language engine
#[derive(Debug, Clone, PartialEq)]
pub enum AccessRequest {
    /// `value:NAME`
    Get,
    /// `SET value:NAME TO x`
    Set(Value),
    /// `value:NAME(args)`
    Call(Vec<Value>),
}

/// Script-visible value exposing named members
pub trait Structure: Send + Sync {
    /// Script type name
    fn type_name(&self) -> &'static str;

    /// Descriptive label identifying this particular value in messages
    fn label(&self) -> String;

    /// Identity used for equality and hashing
    fn key(&self) -> StructureKey;

    /// Resolve and perform a member access
    fn access(
        &self,
        ctx: &dyn ExecutionContext,
        name: &str,
        request: AccessRequest,
    ) -> SuffixResult<Value>;

    /// Member listing for help output, in registration order
    fn members(&self) -> Vec<MemberInfo>;
}

/// A value type with a static member table
pub trait Suffixed: Send + Sync + Sized + 'static {
    /// Script type name
    const TYPE_NAME: &'static str;

    /// Parent type names, nearest first, excluding `Structure`
    const PARENTS: &'static [&'static str] = &[];

    /// Member table shared by every instance
    fn table() -> &'static MemberTable<Self>;

    /// Descriptive label, e.g. `PART(mk1pod,uid=1234)`
    fn describe(&self) -> String;

    /// Identity of the wrapped host entity
    fn identity(&self) -> u64;
}

impl<T: Suffixed> Structure for T {
    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn label(&self) -> String {
        self.describe()
    }

    fn key(&self) -> StructureKey {
        StructureKey {
            type_name: T::TYPE_NAME,
            identity: self.identity(),
        }
    }

    fn access(
        &self,
        ctx: &dyn ExecutionContext,
        name: &str,
        request: AccessRequest,
    ) -> SuffixResult<Value> {
        dispatch::dispatch(T::table(), self, T::describe, ctx, name, request)
    }

    fn members(&self) -> Vec<MemberInfo> {
        T::table().list()
    }
}

/// Type chain of `T`, most derived first, ending with `Structure`
pub fn type_chain<T: Suffixed>() -> Vec<&'static str> {
    std::iter::once(T::TYPE_NAME)
        .chain(T::PARENTS.iter().copied())
        .chain(std::iter::once(STRUCTURE_TYPE_NAME))
        .collect()
}

/// Start a member table for `T` with the base members every value carries
pub fn table_builder<T: Suffixed>() -> TableBuilder<T> {
    let mut b = MemberTable::builder(T::TYPE_NAME);
    register_base_members(&mut b);
    b
}

fn register_base_members<T: Suffixed>(b: &mut TableBuilder<T>) {
    b.declared_by(STRUCTURE_TYPE_NAME);

    b.get("TOSTRING", |t: &T, _| Ok(t.describe()))
        .doc("Descriptive string for this value");
    b.get("TYPENAME", |_: &T, _| Ok(T::TYPE_NAME))
        .doc("Name of this value's type");
    b.get("INHERITANCE", |_: &T, _| Ok(type_chain::<T>().join(" derived from ")))
        .doc("Type hierarchy of this value");
    b.call1("ISTYPE", |_: &T, _, name: String| {
        Ok(type_chain::<T>().iter().any(|t| t.eq_ignore_ascii_case(&name)))
    })
    .doc("Whether this value is of the given type or derives from it");
    b.call1("HASSUFFIX", |_: &T, _, name: String| Ok(T::table().contains(&name)))
        .doc("Whether this value has a suffix with the given name");
    b.get("SUFFIXNAMES", |_: &T, _| {
        let mut names: Vec<&str> = T::table().names();
        names.sort_unstable();
        Ok(names)
    })
    .doc("Every suffix name this value accepts, sorted");

    b.declared_by(T::TYPE_NAME);
}
