//! Astro SDK - suffix dispatch for script-visible values
//!
//! Every value a flight script can touch (a part, a vessel, an ETA readout)
//! exposes named members, called suffixes, through a per-type member table.
//! This crate provides the tables, the dispatch resolver that turns
//! `value:NAME`, `SET value:NAME TO x` and `value:NAME(args)` into calls on
//! host-bound closures, and the structured errors those accesses can raise.
//!
//! # Example
//!
//! ```ignore
//! use astro_sdk::{table_builder, MemberTable, Suffixed};
//! use once_cell::sync::Lazy;
//!
//! static TABLE: Lazy<MemberTable<Resource>> = Lazy::new(|| {
//!     let mut b = table_builder::<Resource>();
//!     b.get("AMOUNT", |r, _| Ok(r.amount)).doc("Units currently stored");
//!     b.build()
//! });
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod member;
pub mod scope;
pub mod structure;
pub mod table;
pub mod value;

pub use config::{ConfigError, DispatchConfig};
pub use context::{ensure_current_subject, DetachedContext, DispatchPolicy, ExecutionContext, SubjectId};
pub use error::{AccessViolation, ErrorKind, SuffixError, SuffixResult};
pub use member::{AccessKind, Arity, Binding, Member, MemberInfo};
pub use scope::{Frame, Keyword, ScopeTracker};
pub use structure::{table_builder, type_chain, AccessRequest, Structure, Suffixed, STRUCTURE_TYPE_NAME};
pub use table::{MemberTable, RegistrationError, TableBuilder};
pub use value::{FromValue, StructureKey, Value};
