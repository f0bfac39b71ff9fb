//! Scenario files (scenario.toml)
//!
//! A scenario describes the simulated world a script runs against: the
//! universal clock, the vessel the CPU part sits on, every vessel's orbit and
//! every part with its modules and resources.
//!
//! ```toml
//! universal_time = 1000.0
//! cpu_vessel = "Relay"
//!
//! [[vessels]]
//! id = 1
//! name = "Relay"
//! root = 100
//! orbit = { time_to_apoapsis = 420.0, time_to_periapsis = 1800.0, end_ut = 5000.0 }
//!
//! [[parts]]
//! uid = 100
//! vessel = 1
//! name = "okto2"
//! modules = [{ name = "ModuleCommand" }]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use astro_sdk::Value;

use crate::error::ScenarioError;

/// Scenario root
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Universal time at scenario start, in seconds
    #[serde(default)]
    pub universal_time: f64,

    /// Name of the vessel the CPU runs on
    pub cpu_vessel: String,

    /// Vessels in the world
    #[serde(default)]
    pub vessels: Vec<VesselSpec>,

    /// Parts of every vessel
    #[serde(default)]
    pub parts: Vec<PartSpec>,
}

/// One vessel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VesselSpec {
    /// Unique vessel id
    pub id: u64,
    /// Vessel name
    pub name: String,
    /// Uid of the root part
    pub root: u64,
    /// Orbit parameters
    #[serde(default)]
    pub orbit: OrbitSpec,
}

/// Orbit parameters relevant to ETA readouts
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OrbitSpec {
    /// Seconds until apoapsis
    #[serde(default)]
    pub time_to_apoapsis: f64,
    /// Seconds until periapsis
    #[serde(default)]
    pub time_to_periapsis: f64,
    /// Universal time at which the current orbit patch ends
    #[serde(default)]
    pub end_ut: f64,
}

/// One part
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PartSpec {
    /// Unique flight id
    pub uid: u64,
    /// Owning vessel id
    pub vessel: u64,
    /// Internal part name
    pub name: String,
    /// Display title (defaults to the name)
    #[serde(default)]
    pub title: Option<String>,
    /// Inverse stage number
    #[serde(default)]
    pub stage: i64,
    /// Whether fuel flows through this part
    #[serde(default = "default_true")]
    pub fuel_crossfeed: bool,
    /// Name tag
    #[serde(default)]
    pub tag: String,
    /// Parent part uid; absent for the root part
    #[serde(default)]
    pub parent: Option<u64>,
    /// Mass without resources, in tonnes
    #[serde(default)]
    pub dry_mass: f64,
    /// Whether the part takes part in physics
    #[serde(default = "default_true")]
    pub physics: bool,
    /// Part modules, in order
    #[serde(default)]
    pub modules: Vec<ModuleSpec>,
    /// Resources held by the part
    #[serde(default)]
    pub resources: Vec<ResourceSpec>,
}

/// One part module
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ModuleSpec {
    /// Module class name
    pub name: String,
    /// Fields exposed to scripts
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

/// One resource container
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ResourceSpec {
    /// Resource name
    pub name: String,
    /// Units stored
    pub amount: f64,
    /// Units the container holds when full
    pub capacity: f64,
    /// Tonnes per unit
    #[serde(default)]
    pub density: f64,
}

/// Value of a module field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    /// Boolean field
    Bool(bool),
    /// Integral field
    Int(i64),
    /// Floating-point field
    Float(f64),
    /// Text field
    Text(String),
}

impl FieldValue {
    /// Convert a script value, if it has a field-compatible type
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(FieldValue::Bool(*b)),
            Value::Int(i) => Some(FieldValue::Int(*i)),
            Value::Scalar(x) => Some(FieldValue::Float(*x)),
            Value::Str(s) => Some(FieldValue::Text(s.clone())),
            _ => None,
        }
    }

    /// Text content, if this is a text field
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&FieldValue> for Value {
    fn from(field: &FieldValue) -> Self {
        match field {
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Int(i) => Value::Int(*i),
            FieldValue::Float(x) => Value::Scalar(*x),
            FieldValue::Text(s) => Value::Str(s.clone()),
        }
    }
}

fn default_true() -> bool {
    true
}

impl Scenario {
    /// Load a scenario from a file
    pub fn from_file(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a scenario from a string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = toml::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Validate cross references
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let mut vessel_ids = FxHashSet::default();
        let mut vessel_names = FxHashSet::default();
        for vessel in &self.vessels {
            if !vessel_ids.insert(vessel.id) {
                return Err(invalid(format!("Duplicate vessel id {}", vessel.id)));
            }
            if vessel.name.is_empty() {
                return Err(invalid(format!("Vessel {} has an empty name", vessel.id)));
            }
            if !vessel_names.insert(vessel.name.as_str()) {
                return Err(invalid(format!("Duplicate vessel name '{}'", vessel.name)));
            }
        }

        if !vessel_names.contains(self.cpu_vessel.as_str()) {
            return Err(invalid(format!(
                "CPU vessel '{}' is not in the scenario",
                self.cpu_vessel
            )));
        }

        let mut parts: FxHashMap<u64, &PartSpec> = FxHashMap::default();
        for part in &self.parts {
            if parts.insert(part.uid, part).is_some() {
                return Err(invalid(format!("Duplicate part uid {}", part.uid)));
            }
            if !vessel_ids.contains(&part.vessel) {
                return Err(invalid(format!(
                    "Part {} belongs to unknown vessel {}",
                    part.uid, part.vessel
                )));
            }
            for resource in &part.resources {
                if !(0.0..=resource.capacity).contains(&resource.amount) {
                    return Err(invalid(format!(
                        "Part {} holds {} {} but can only hold {}",
                        part.uid, resource.amount, resource.name, resource.capacity
                    )));
                }
            }
        }

        for part in &self.parts {
            let Some(parent) = part.parent else { continue };
            match parts.get(&parent) {
                None => {
                    return Err(invalid(format!(
                        "Part {} has unknown parent {}",
                        part.uid, parent
                    )))
                }
                Some(p) if p.vessel != part.vessel => {
                    return Err(invalid(format!(
                        "Part {} and its parent {} are on different vessels",
                        part.uid, parent
                    )))
                }
                Some(_) => {}
            }

            // Walk up; a chain longer than the part count is a cycle.
            let mut current = parent;
            for _ in 0..=parts.len() {
                match parts.get(&current).and_then(|p| p.parent) {
                    Some(next) if next == part.uid => {
                        return Err(invalid(format!("Part {} is its own ancestor", part.uid)))
                    }
                    Some(next) => current = next,
                    None => break,
                }
            }
        }

        for vessel in &self.vessels {
            match parts.get(&vessel.root) {
                None => {
                    return Err(invalid(format!(
                        "Vessel '{}' has unknown root part {}",
                        vessel.name, vessel.root
                    )))
                }
                Some(root) if root.vessel != vessel.id || root.parent.is_some() => {
                    return Err(invalid(format!(
                        "Root part {} of vessel '{}' must belong to it and have no parent",
                        vessel.root, vessel.name
                    )))
                }
                Some(_) => {}
            }
        }

        Ok(())
    }
}

fn invalid(msg: String) -> ScenarioError {
    ScenarioError::ValidationError(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
cpu_vessel = "Relay"

[[vessels]]
id = 1
name = "Relay"
root = 100

[[parts]]
uid = 100
vessel = 1
name = "okto2"
"#;

    #[test]
    fn test_minimal_scenario() {
        let scenario = Scenario::from_str(MINIMAL).unwrap();
        assert_eq!(scenario.cpu_vessel, "Relay");
        let part = &scenario.parts[0];
        assert!(part.fuel_crossfeed);
        assert!(part.physics);
        assert_eq!(part.title, None);
        assert_eq!(scenario.vessels[0].orbit, OrbitSpec::default());
    }

    #[test]
    fn test_unknown_cpu_vessel() {
        let toml = MINIMAL.replace("cpu_vessel = \"Relay\"", "cpu_vessel = \"Lander\"");
        let err = Scenario::from_str(&toml).unwrap_err();
        assert!(err.to_string().contains("CPU vessel 'Lander'"));
    }

    #[test]
    fn test_dangling_parent() {
        let toml = format!("{}parent = 7\n", MINIMAL);
        let err = Scenario::from_str(&toml).unwrap_err();
        assert!(matches!(err, ScenarioError::ValidationError(msg) if msg.contains("unknown parent 7")));
    }

    #[test]
    fn test_field_values_untagged() {
        let toml = format!(
            "{}modules = [{{ name = \"ModuleDockingNode\", fields = {{ state = \"Ready\", acquireForce = 2.5, enabled = true }} }}]\n",
            MINIMAL
        );
        let scenario = Scenario::from_str(&toml).unwrap();
        let fields = &scenario.parts[0].modules[0].fields;
        assert_eq!(fields["state"], FieldValue::Text("Ready".into()));
        assert_eq!(fields["acquireForce"], FieldValue::Float(2.5));
        assert_eq!(fields["enabled"], FieldValue::Bool(true));
    }

    #[test]
    fn test_resource_amount_out_of_range() {
        let resource = |amount: &str| {
            format!(
                "{}resources = [{{ name = \"LiquidFuel\", amount = {}, capacity = 100.0 }}]\n",
                MINIMAL, amount
            )
        };
        assert!(Scenario::from_str(&resource("100.0")).is_ok());
        for amount in ["-1.0", "100.5", "nan"] {
            let err = Scenario::from_str(&resource(amount)).unwrap_err();
            assert!(
                matches!(err, ScenarioError::ValidationError(ref msg) if msg.contains("LiquidFuel")),
                "amount {} accepted",
                amount
            );
        }
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let scenario = Scenario::from_file(file.path()).unwrap();
        assert_eq!(scenario.parts[0].name, "okto2");

        let missing = Scenario::from_file(Path::new("/nonexistent/scenario.toml"));
        assert!(matches!(missing, Err(ScenarioError::IoError(_))));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let toml = format!("{}colour = \"red\"\n", MINIMAL);
        assert!(matches!(
            Scenario::from_str(&toml),
            Err(ScenarioError::ParseError(_))
        ));
    }
}
