//! Access targets and literal arguments given on the command line

use std::str::FromStr;

use anyhow::{anyhow, bail, Context};

use astro_host::{part_value, VesselEta, VesselValue, WorldHandle};
use astro_sdk::Value;

/// Value addressed by `part:<uid>`, `vessel:<name>` or `eta:<vessel>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A part by flight id
    Part(u64),
    /// A vessel by name
    Vessel(String),
    /// A vessel's ETA readouts
    Eta(String),
}

impl FromStr for Target {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, rest) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("Target '{}' must look like part:<uid>, vessel:<name> or eta:<vessel>", s))?;
        if rest.is_empty() {
            bail!("Target '{}' is missing a name or id", s);
        }
        match kind.to_lowercase().as_str() {
            "part" => {
                let uid = rest
                    .parse()
                    .with_context(|| format!("Part uid '{}' is not a number", rest))?;
                Ok(Target::Part(uid))
            }
            "vessel" => Ok(Target::Vessel(rest.to_string())),
            "eta" => Ok(Target::Eta(rest.to_string())),
            other => bail!("Unknown target kind '{}'", other),
        }
    }
}

impl Target {
    /// Build the script value this target names
    pub fn resolve(&self, world: &WorldHandle) -> anyhow::Result<Value> {
        match self {
            Target::Part(uid) => {
                part_value(world, *uid).map_err(|e| anyhow!("Cannot resolve part {}: {}", uid, e))
            }
            Target::Vessel(name) => {
                let id = world.read().vessel_by_name(name)?.id;
                Ok(Value::structure(VesselValue::new(world.clone(), id)))
            }
            Target::Eta(name) => {
                let id = world.read().vessel_by_name(name)?.id;
                Ok(Value::structure(VesselEta::new(world.clone(), id)))
            }
        }
    }
}

/// Parse a literal argument: booleans, integers, decimals, otherwise a string.
///
/// Surrounding double quotes force a string.
pub fn parse_literal(s: &str) -> Value {
    if let Some(inner) = s.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        return Value::from(inner);
    }
    if s.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(x) = s.parse::<f64>() {
        return Value::Scalar(x);
    }
    Value::from(s)
}
