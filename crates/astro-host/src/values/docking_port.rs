//! Docking port values

use once_cell::sync::Lazy;

use astro_sdk::{ensure_current_subject, table_builder, MemberTable, SuffixResult, Suffixed};

use crate::error::HostError;
use crate::values::PartValue;
use crate::world::DOCKING_MODULE;

/// A part carrying a docking node. Everything a part offers is available too.
#[derive(Debug, Clone)]
pub struct DockingPortValue {
    part: PartValue,
}

impl DockingPortValue {
    /// Wrap a part known to carry a docking node
    pub fn new(part: PartValue) -> Self {
        Self { part }
    }

    /// The underlying part
    pub fn part(&self) -> &PartValue {
        &self.part
    }

    fn node_field(&self, field: &'static str, default: &'static str) -> SuffixResult<String> {
        let uid = self.part.uid();
        self.part
            .with(|r| {
                let index = r.module_index(DOCKING_MODULE)?;
                Some(
                    r.modules[index]
                        .field(field)
                        .and_then(|(_, v)| v.as_text())
                        .unwrap_or(default)
                        .to_string(),
                )
            })?
            .ok_or_else(|| HostError::NotDockingPort(uid).into())
    }
}

static DOCKING_PORT_TABLE: Lazy<MemberTable<DockingPortValue>> = Lazy::new(|| {
    let mut b = table_builder::<DockingPortValue>();
    b.inherit::<PartValue>(|d| &d.part);

    b.get("STATE", |d: &DockingPortValue, _| d.node_field("state", "Ready"))
        .doc("Docking state, e.g. Ready or Docked (docker)");
    b.get("NODETYPE", |d: &DockingPortValue, _| d.node_field("nodeType", "size1"))
        .doc("Size class of the docking node");
    b.call0("UNDOCK", |d: &DockingPortValue, ctx| {
        ensure_current_subject(ctx, d.part.subject()?)?;
        d.part.world().write().undock(d.part.uid())?;
        Ok(())
    })
    .doc("Release whatever is docked to this port");
    b.build()
});

impl Suffixed for DockingPortValue {
    const TYPE_NAME: &'static str = "DockingPort";
    const PARENTS: &'static [&'static str] = &["Part"];

    fn table() -> &'static MemberTable<Self> {
        &DOCKING_PORT_TABLE
    }

    fn describe(&self) -> String {
        self.part.describe()
    }

    fn identity(&self) -> u64 {
        self.part.uid()
    }
}
