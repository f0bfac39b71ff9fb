//! Astro host - simulated flight world for script values
//!
//! Loads a world from a scenario file and exposes its vessels, parts,
//! modules and resources as script values dispatched through `astro-sdk`.
//!
//! # Example
//!
//! ```ignore
//! use astro_host::{part_value, CpuContext, WorldHandle};
//! use astro_sdk::{AccessRequest, DispatchPolicy, Structure};
//!
//! let world = WorldHandle::load(Path::new("station.toml"))?;
//! let ctx = CpuContext::for_world(&world, DispatchPolicy::default());
//! let part = part_value(&world, 100)?;
//! let tag = part.as_structure().unwrap().access(&ctx, "TAG", AccessRequest::Get)?;
//! ```

#![warn(missing_docs)]

pub mod cpu;
pub mod error;
pub mod scenario;
pub mod values;
pub mod world;

pub use cpu::CpuContext;
pub use error::{HostError, HostResult, ScenarioError};
pub use scenario::{FieldValue, Scenario};
pub use values::{
    init_tables, inheritance_of, members_of, part_value, part_values, DockingPortValue,
    PartModuleValue, PartValue, ResourceValue, VesselEta, VesselValue, TYPE_NAMES,
};
pub use world::{PartKind, World, WorldHandle};
