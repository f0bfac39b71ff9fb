//! In-memory flight world
//!
//! [`World`] holds the live state every script value reads through. Values
//! keep a [`WorldHandle`] plus an entity id and never cache what they read.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use rustc_hash::FxHashMap;

use astro_sdk::SubjectId;

use crate::error::{HostError, HostResult, ScenarioError};
use crate::scenario::{FieldValue, Scenario};

/// Module that makes a part a command part
pub const COMMAND_MODULE: &str = "ModuleCommand";

/// Module that makes a part a docking port
pub const DOCKING_MODULE: &str = "ModuleDockingNode";

/// What a part can do as a control reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    /// Carries a command module
    Command,
    /// Carries a docking node
    DockingPort,
    /// Anything else
    Generic,
}

/// Live part state
#[derive(Debug, Clone, PartialEq)]
pub struct PartRecord {
    /// Unique flight id
    pub uid: u64,
    /// Owning vessel id
    pub vessel: u64,
    /// Internal part name
    pub name: String,
    /// Display title
    pub title: String,
    /// Inverse stage number
    pub stage: i64,
    /// Whether fuel flows through this part
    pub fuel_crossfeed: bool,
    /// Name tag
    pub tag: String,
    /// Parent part uid
    pub parent: Option<u64>,
    /// Child part uids, in scenario order
    pub children: Vec<u64>,
    /// Mass without resources
    pub dry_mass: f64,
    /// Whether the part takes part in physics
    pub physics: bool,
    /// Part modules, in order
    pub modules: Vec<ModuleRecord>,
    /// Resources held by the part
    pub resources: Vec<ResourceRecord>,
}

/// Live module state
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleRecord {
    /// Module class name
    pub name: String,
    /// Script-visible fields
    pub fields: BTreeMap<String, FieldValue>,
}

impl ModuleRecord {
    /// Case-insensitive field lookup, returning the field's own spelling
    pub fn field(&self, name: &str) -> Option<(&str, &FieldValue)> {
        self.fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(k, v)| (k.as_str(), v))
    }
}

/// Live resource state
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRecord {
    /// Resource name
    pub name: String,
    /// Units stored
    pub amount: f64,
    /// Units when full
    pub capacity: f64,
    /// Tonnes per unit
    pub density: f64,
}

impl PartRecord {
    /// Index of the first module named `name`, ignoring case
    pub fn module_index(&self, name: &str) -> Option<usize> {
        self.modules
            .iter()
            .position(|m| m.name.eq_ignore_ascii_case(name))
    }

    /// Check if the part carries a module named `name`
    pub fn has_module(&self, name: &str) -> bool {
        self.module_index(name).is_some()
    }

    /// Control-reference capability
    pub fn kind(&self) -> PartKind {
        if self.has_module(COMMAND_MODULE) {
            PartKind::Command
        } else if self.has_module(DOCKING_MODULE) {
            PartKind::DockingPort
        } else {
            PartKind::Generic
        }
    }

    /// Whether the part carries a docking node
    pub fn is_docking_port(&self) -> bool {
        self.has_module(DOCKING_MODULE)
    }

    /// Current mass including resources
    pub fn mass(&self) -> f64 {
        self.dry_mass
            + self
                .resources
                .iter()
                .map(|r| r.amount * r.density)
                .sum::<f64>()
    }

    /// Mass with every resource full
    pub fn wet_mass(&self) -> f64 {
        self.dry_mass
            + self
                .resources
                .iter()
                .map(|r| r.capacity * r.density)
                .sum::<f64>()
    }

    /// Descriptive label used in script messages
    pub fn label(&self) -> String {
        if self.tag.is_empty() {
            format!("PART({},uid={})", self.name, self.uid)
        } else {
            format!("PART({},tag={})", self.name, self.tag)
        }
    }
}

/// Orbit readouts
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Orbit {
    /// Seconds until apoapsis
    pub time_to_apoapsis: f64,
    /// Seconds until periapsis
    pub time_to_periapsis: f64,
    /// Universal time at which the current orbit patch ends
    pub end_ut: f64,
}

/// Live vessel state
#[derive(Debug, Clone, PartialEq)]
pub struct VesselRecord {
    /// Unique vessel id
    pub id: u64,
    /// Vessel name
    pub name: String,
    /// Root part uid
    pub root: u64,
    /// Part uids, in scenario order
    pub parts: Vec<u64>,
    /// Part currently used as the control reference
    pub control_part: u64,
    /// Orbit readouts
    pub orbit: Orbit,
}

/// The simulated world
#[derive(Debug, Clone)]
pub struct World {
    universal_time: f64,
    cpu_vessel: u64,
    vessels: FxHashMap<u64, VesselRecord>,
    vessel_order: Vec<u64>,
    parts: FxHashMap<u64, PartRecord>,
}

impl World {
    /// Build a world from a validated scenario
    pub fn from_scenario(scenario: Scenario) -> HostResult<Self> {
        let mut vessels = FxHashMap::default();
        let mut vessel_order = Vec::new();
        for v in &scenario.vessels {
            vessel_order.push(v.id);
            vessels.insert(
                v.id,
                VesselRecord {
                    id: v.id,
                    name: v.name.clone(),
                    root: v.root,
                    parts: Vec::new(),
                    control_part: v.root,
                    orbit: Orbit {
                        time_to_apoapsis: v.orbit.time_to_apoapsis,
                        time_to_periapsis: v.orbit.time_to_periapsis,
                        end_ut: v.orbit.end_ut,
                    },
                },
            );
        }

        let cpu_vessel = scenario
            .vessels
            .iter()
            .find(|v| v.name == scenario.cpu_vessel)
            .map(|v| v.id)
            .ok_or_else(|| HostError::VesselNameNotFound(scenario.cpu_vessel.clone()))?;

        let mut parts = FxHashMap::default();
        for p in scenario.parts {
            vessels
                .get_mut(&p.vessel)
                .ok_or(HostError::VesselNotFound(p.vessel))?
                .parts
                .push(p.uid);
            parts.insert(
                p.uid,
                PartRecord {
                    uid: p.uid,
                    vessel: p.vessel,
                    title: p.title.unwrap_or_else(|| p.name.clone()),
                    name: p.name,
                    stage: p.stage,
                    fuel_crossfeed: p.fuel_crossfeed,
                    tag: p.tag,
                    parent: p.parent,
                    children: Vec::new(),
                    dry_mass: p.dry_mass,
                    physics: p.physics,
                    modules: p
                        .modules
                        .into_iter()
                        .map(|m| ModuleRecord {
                            name: m.name,
                            fields: m.fields,
                        })
                        .collect(),
                    resources: p
                        .resources
                        .into_iter()
                        .map(|r| ResourceRecord {
                            name: r.name,
                            amount: r.amount,
                            capacity: r.capacity,
                            density: r.density,
                        })
                        .collect(),
                },
            );
        }

        let links: Vec<(u64, u64)> = vessel_order
            .iter()
            .flat_map(|id| vessels[id].parts.iter())
            .filter_map(|uid| parts[uid].parent.map(|parent| (parent, *uid)))
            .collect();
        for (parent, child) in links {
            parts
                .get_mut(&parent)
                .ok_or(HostError::PartNotFound(parent))?
                .children
                .push(child);
        }

        Ok(World {
            universal_time: scenario.universal_time,
            cpu_vessel,
            vessels,
            vessel_order,
            parts,
        })
    }

    /// Universal time in seconds
    pub fn universal_time(&self) -> f64 {
        self.universal_time
    }

    /// Advance the universal clock
    pub fn advance(&mut self, seconds: f64) {
        self.universal_time += seconds;
    }

    /// Id of the vessel the CPU runs on
    pub fn cpu_vessel(&self) -> u64 {
        self.cpu_vessel
    }

    /// Look up a part
    pub fn part(&self, uid: u64) -> HostResult<&PartRecord> {
        self.parts.get(&uid).ok_or(HostError::PartNotFound(uid))
    }

    /// Look up a part for mutation
    pub fn part_mut(&mut self, uid: u64) -> HostResult<&mut PartRecord> {
        self.parts.get_mut(&uid).ok_or(HostError::PartNotFound(uid))
    }

    /// Look up a vessel
    pub fn vessel(&self, id: u64) -> HostResult<&VesselRecord> {
        self.vessels.get(&id).ok_or(HostError::VesselNotFound(id))
    }

    /// Look up a vessel for mutation
    pub fn vessel_mut(&mut self, id: u64) -> HostResult<&mut VesselRecord> {
        self.vessels.get_mut(&id).ok_or(HostError::VesselNotFound(id))
    }

    /// Look up a vessel by name, ignoring case
    pub fn vessel_by_name(&self, name: &str) -> HostResult<&VesselRecord> {
        self.vessel_order
            .iter()
            .filter_map(|id| self.vessels.get(id))
            .find(|v| v.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| HostError::VesselNameNotFound(name.to_string()))
    }

    /// Total current mass of a vessel
    pub fn vessel_mass(&self, id: u64) -> HostResult<f64> {
        let vessel = self.vessel(id)?;
        vessel
            .parts
            .iter()
            .map(|uid| self.part(*uid).map(PartRecord::mass))
            .sum()
    }

    /// Replace a part's name tag
    pub fn set_tag(&mut self, uid: u64, tag: String) -> HostResult<()> {
        tracing::debug!(uid, tag = %tag, "part tag changed");
        self.part_mut(uid)?.tag = tag;
        Ok(())
    }

    /// Rename a vessel
    pub fn rename_vessel(&mut self, id: u64, name: String) -> HostResult<()> {
        tracing::debug!(vessel = id, name = %name, "vessel renamed");
        self.vessel_mut(id)?.name = name;
        Ok(())
    }

    /// Overwrite an existing module field, keeping the field's own spelling
    pub fn set_field(
        &mut self,
        uid: u64,
        module: usize,
        field: &str,
        value: FieldValue,
    ) -> HostResult<()> {
        let record = self
            .part_mut(uid)?
            .modules
            .get_mut(module)
            .ok_or(HostError::ModuleNotFound { uid, index: module })?;
        let key = record
            .field(field)
            .map(|(k, _)| k.to_string())
            .unwrap_or_else(|| field.to_string());
        tracing::debug!(uid, module = %record.name, field = %key, "module field changed");
        record.fields.insert(key, value);
        Ok(())
    }

    /// Make `uid` the control reference of its vessel
    pub fn control_from(&mut self, uid: u64) -> HostResult<()> {
        let vessel = self.part(uid)?.vessel;
        self.vessel_mut(vessel)?.control_part = uid;
        tracing::debug!(uid, vessel, "control reference changed");
        Ok(())
    }

    /// Release a docked port. Returns whether anything changed.
    pub fn undock(&mut self, uid: u64) -> HostResult<bool> {
        let part = self.part_mut(uid)?;
        let index = part
            .module_index(DOCKING_MODULE)
            .ok_or(HostError::NotDockingPort(uid))?;
        let state = part.modules[index]
            .fields
            .entry("state".to_string())
            .or_insert_with(|| FieldValue::Text("Ready".into()));

        let docked = state.as_text().is_some_and(|s| s.starts_with("Docked"));
        if docked {
            *state = FieldValue::Text("Ready".into());
            tracing::debug!(uid, "docking port released");
        }
        Ok(docked)
    }
}

/// Shared handle to the world
#[derive(Debug, Clone)]
pub struct WorldHandle(Arc<RwLock<World>>);

impl WorldHandle {
    /// Wrap a world
    pub fn new(world: World) -> Self {
        WorldHandle(Arc::new(RwLock::new(world)))
    }

    /// Load and validate a scenario file
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        Self::from_scenario(Scenario::from_file(path)?)
    }

    /// Parse and validate a scenario string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ScenarioError> {
        Self::from_scenario(Scenario::from_str(content)?)
    }

    fn from_scenario(scenario: Scenario) -> Result<Self, ScenarioError> {
        let world = World::from_scenario(scenario)
            .map_err(|e| ScenarioError::ValidationError(e.to_string()))?;
        Ok(Self::new(world))
    }

    /// Shared read access
    pub fn read(&self) -> RwLockReadGuard<'_, World> {
        self.0.read()
    }

    /// Exclusive write access
    pub fn write(&self) -> RwLockWriteGuard<'_, World> {
        self.0.write()
    }

    /// The CPU vessel as a dispatch subject
    pub fn cpu_subject(&self) -> SubjectId {
        SubjectId(self.read().cpu_vessel())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHIP: &str = r#"
universal_time = 100.0
cpu_vessel = "Relay"

[[vessels]]
id = 1
name = "Relay"
root = 1

[[parts]]
uid = 1
vessel = 1
name = "okto2"
dry_mass = 0.1
modules = [{ name = "ModuleCommand" }]

[[parts]]
uid = 2
vessel = 1
name = "tank"
parent = 1
dry_mass = 0.5
resources = [{ name = "LiquidFuel", amount = 50.0, capacity = 100.0, density = 0.005 }]

[[parts]]
uid = 3
vessel = 1
name = "port"
parent = 2
modules = [{ name = "ModuleDockingNode", fields = { state = "Docked (docker)" } }]
"#;

    #[test]
    fn test_children_and_kind() {
        let world = WorldHandle::from_str(SHIP).unwrap();
        let w = world.read();
        assert_eq!(w.part(1).unwrap().children, vec![2]);
        assert_eq!(w.part(2).unwrap().children, vec![3]);
        assert_eq!(w.part(1).unwrap().kind(), PartKind::Command);
        assert_eq!(w.part(3).unwrap().kind(), PartKind::DockingPort);
        assert_eq!(w.part(2).unwrap().kind(), PartKind::Generic);
        assert_eq!(w.part(2).unwrap().title, "tank");
    }

    #[test]
    fn test_masses() {
        let world = WorldHandle::from_str(SHIP).unwrap();
        let w = world.read();
        let tank = w.part(2).unwrap();
        assert!((tank.mass() - 0.75).abs() < 1e-9);
        assert!((tank.wet_mass() - 1.0).abs() < 1e-9);
        assert!((w.vessel_mass(1).unwrap() - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_undock_only_once() {
        let world = WorldHandle::from_str(SHIP).unwrap();
        assert!(world.write().undock(3).unwrap());
        assert!(!world.write().undock(3).unwrap());
        assert_eq!(world.write().undock(2), Err(HostError::NotDockingPort(2)));
    }

    #[test]
    fn test_label_prefers_tag() {
        let world = WorldHandle::from_str(SHIP).unwrap();
        assert_eq!(world.read().part(2).unwrap().label(), "PART(tank,uid=2)");
        world.write().part_mut(2).unwrap().tag = "main".into();
        assert_eq!(world.read().part(2).unwrap().label(), "PART(tank,tag=main)");
    }

    #[test]
    fn test_missing_entities() {
        let world = WorldHandle::from_str(SHIP).unwrap();
        let w = world.read();
        assert_eq!(w.part(99).unwrap_err(), HostError::PartNotFound(99));
        assert_eq!(w.vessel_by_name("relay").unwrap().id, 1);
        assert!(w.vessel_by_name("Lander").is_err());
    }
}
