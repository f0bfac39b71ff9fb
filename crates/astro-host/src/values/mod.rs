//! Script values backed by the world

mod docking_port;
mod eta;
mod module;
mod part;
mod resource;
mod vessel;

pub use docking_port::DockingPortValue;
pub use eta::VesselEta;
pub use module::PartModuleValue;
pub use part::{part_value, part_values, PartValue};
pub use resource::ResourceValue;
pub use vessel::VesselValue;

use astro_sdk::{type_chain, MemberInfo, Suffixed};

/// Script type names of every value type, in listing order
pub const TYPE_NAMES: &[&str] = &[
    PartValue::TYPE_NAME,
    DockingPortValue::TYPE_NAME,
    VesselValue::TYPE_NAME,
    VesselEta::TYPE_NAME,
    PartModuleValue::TYPE_NAME,
    ResourceValue::TYPE_NAME,
];

/// Build every member table now.
///
/// Tables are otherwise built on first use. Call this at startup so a
/// registration conflict panics before any script runs.
pub fn init_tables() {
    PartValue::table();
    DockingPortValue::table();
    VesselValue::table();
    VesselEta::table();
    PartModuleValue::table();
    ResourceValue::table();
    tracing::debug!(types = TYPE_NAMES.len(), "member tables built");
}

/// Member listing of the value type named `type_name`, ignoring case
pub fn members_of(type_name: &str) -> Option<Vec<MemberInfo>> {
    let listing = match type_name.to_lowercase().as_str() {
        "part" => PartValue::table().list(),
        "dockingport" => DockingPortValue::table().list(),
        "vessel" => VesselValue::table().list(),
        "vesseleta" => VesselEta::table().list(),
        "partmodule" => PartModuleValue::table().list(),
        "resource" => ResourceValue::table().list(),
        _ => return None,
    };
    Some(listing)
}

/// Type chain of the value type named `type_name`, ignoring case
pub fn inheritance_of(type_name: &str) -> Option<Vec<&'static str>> {
    let chain = match type_name.to_lowercase().as_str() {
        "part" => type_chain::<PartValue>(),
        "dockingport" => type_chain::<DockingPortValue>(),
        "vessel" => type_chain::<VesselValue>(),
        "vesseleta" => type_chain::<VesselEta>(),
        "partmodule" => type_chain::<PartModuleValue>(),
        "resource" => type_chain::<ResourceValue>(),
        _ => return None,
    };
    Some(chain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tables_builds_every_type() {
        init_tables();
        for name in TYPE_NAMES {
            let members = members_of(name).unwrap();
            assert!(members.iter().any(|m| m.name == "TYPENAME"), "{} lacks base members", name);
            assert_eq!(inheritance_of(name).unwrap()[0], *name);
        }
    }

    #[test]
    fn test_docking_port_table_includes_part_members() {
        init_tables();
        let names: Vec<String> = members_of("dockingport")
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert!(names.contains(&"CONTROLFROM".to_string()));
        assert!(names.contains(&"UNDOCK".to_string()));
    }
}
