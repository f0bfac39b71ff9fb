//! Vessel values

use once_cell::sync::Lazy;

use astro_sdk::{
    ensure_current_subject, table_builder, MemberTable, SubjectId, SuffixResult, Suffixed, Value,
};

use crate::values::{part_value, part_values, VesselEta};
use crate::world::{VesselRecord, WorldHandle};

/// A vessel in the world
#[derive(Debug, Clone)]
pub struct VesselValue {
    world: WorldHandle,
    id: u64,
}

impl VesselValue {
    /// Value for vessel `id`
    pub fn new(world: WorldHandle, id: u64) -> Self {
        Self { world, id }
    }

    /// Vessel id
    pub fn id(&self) -> u64 {
        self.id
    }

    fn with<R>(&self, f: impl FnOnce(&VesselRecord) -> R) -> SuffixResult<R> {
        let world = self.world.read();
        Ok(f(world.vessel(self.id)?))
    }
}

static VESSEL_TABLE: Lazy<MemberTable<VesselValue>> = Lazy::new(|| {
    let mut b = table_builder::<VesselValue>();
    b.get_set(
        ["NAME", "SHIPNAME"],
        |v: &VesselValue, _| v.with(|r| r.name.clone()),
        |v: &VesselValue, ctx, name: String| {
            ensure_current_subject(ctx, SubjectId(v.id))?;
            v.world.write().rename_vessel(v.id, name)?;
            Ok(())
        },
    )
    .doc("Name of the vessel");
    b.get("PARTS", |v: &VesselValue, _| {
        let parts = v.with(|r| r.parts.clone())?;
        part_values(&v.world, &parts)
    })
    .doc("Every part of the vessel");
    b.call1("PARTSTAGGED", |v: &VesselValue, _, tag: String| {
        let tagged: Vec<u64> = {
            let world = v.world.read();
            let vessel = world.vessel(v.id)?;
            vessel
                .parts
                .iter()
                .filter(|uid| {
                    world
                        .part(**uid)
                        .is_ok_and(|p| !p.tag.is_empty() && p.tag.eq_ignore_ascii_case(&tag))
                })
                .copied()
                .collect()
        };
        part_values(&v.world, &tagged)
    })
    .doc("Parts whose name tag matches, ignoring case");
    b.get("ROOTPART", |v: &VesselValue, _| {
        let root = v.with(|r| r.root)?;
        part_value(&v.world, root)
    });
    b.get("CONTROLPART", |v: &VesselValue, _| {
        let part = v.with(|r| r.control_part)?;
        part_value(&v.world, part)
    })
    .doc("Part currently used as the control reference");
    b.get("ETA", |v: &VesselValue, _| {
        Ok(Value::structure(VesselEta::new(v.world.clone(), v.id)))
    });
    b.get("MASS", |v: &VesselValue, _| Ok(v.world.read().vessel_mass(v.id)?));
    b.get("ISCURRENT", |v: &VesselValue, ctx| {
        Ok(ctx.is_current_subject(SubjectId(v.id)))
    })
    .doc("Whether this CPU runs aboard the vessel");
    b.build()
});

impl Suffixed for VesselValue {
    const TYPE_NAME: &'static str = "Vessel";

    fn table() -> &'static MemberTable<Self> {
        &VESSEL_TABLE
    }

    fn describe(&self) -> String {
        match self.world.read().vessel(self.id) {
            Ok(v) => format!("VESSEL(\"{}\")", v.name),
            Err(_) => format!("VESSEL(<gone>,id={})", self.id),
        }
    }

    fn identity(&self) -> u64 {
        self.id
    }
}
