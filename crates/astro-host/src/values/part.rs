//! Part values

use once_cell::sync::Lazy;

use astro_sdk::{
    ensure_current_subject, table_builder, ExecutionContext, MemberTable, SubjectId, SuffixError,
    SuffixResult, Suffixed, TableBuilder, Value,
};

use crate::error::HostError;
use crate::values::{DockingPortValue, PartModuleValue, ResourceValue, VesselValue};
use crate::world::{PartKind, PartRecord, WorldHandle};

/// Construct the script value for part `uid`, picking the most specific type.
pub fn part_value(world: &WorldHandle, uid: u64) -> SuffixResult<Value> {
    let docking = world.read().part(uid)?.is_docking_port();
    let part = PartValue::new(world.clone(), uid);
    Ok(if docking {
        Value::structure(DockingPortValue::new(part))
    } else {
        Value::structure(part)
    })
}

/// Construct values for every part in `uids`
pub fn part_values(world: &WorldHandle, uids: &[u64]) -> SuffixResult<Value> {
    let values = uids
        .iter()
        .map(|uid| part_value(world, *uid))
        .collect::<SuffixResult<Vec<Value>>>()?;
    Ok(Value::List(values))
}

/// A part of some vessel
#[derive(Debug, Clone)]
pub struct PartValue {
    world: WorldHandle,
    uid: u64,
}

impl PartValue {
    /// Value for part `uid`
    pub fn new(world: WorldHandle, uid: u64) -> Self {
        Self { world, uid }
    }

    /// Flight id of the wrapped part
    pub fn uid(&self) -> u64 {
        self.uid
    }

    /// World this part lives in
    pub fn world(&self) -> &WorldHandle {
        &self.world
    }

    /// Read the live part record
    pub fn with<R>(&self, f: impl FnOnce(&PartRecord) -> R) -> SuffixResult<R> {
        let world = self.world.read();
        Ok(f(world.part(self.uid)?))
    }

    /// Owning vessel as a dispatch subject
    pub fn subject(&self) -> SuffixResult<SubjectId> {
        self.with(|p| SubjectId(p.vessel))
    }

    fn module(&self, index: usize) -> Value {
        Value::structure(PartModuleValue::new(self.world.clone(), self.uid, index))
    }

    fn control_from(&self, ctx: &dyn ExecutionContext) -> SuffixResult<()> {
        ensure_current_subject(ctx, self.subject()?)?;
        if self.with(PartRecord::kind)? == PartKind::Generic {
            return Err(SuffixError::command_invalid_here(
                "CONTROLFROM",
                "a generic part value",
                "a docking port or command part",
            ));
        }
        self.world.write().control_from(self.uid)?;
        Ok(())
    }
}

static PART_TABLE: Lazy<MemberTable<PartValue>> = Lazy::new(|| {
    let mut b = table_builder::<PartValue>();
    register(&mut b);
    b.build()
});

fn register(b: &mut TableBuilder<PartValue>) {
    b.call0("CONTROLFROM", |p: &PartValue, ctx| p.control_from(ctx))
        .doc("Make this part the vessel's control reference");
    b.get("NAME", |p: &PartValue, _| p.with(|r| r.name.clone()));
    b.get("FUELCROSSFEED", |p: &PartValue, _| p.with(|r| r.fuel_crossfeed));
    b.get("TITLE", |p: &PartValue, _| p.with(|r| r.title.clone()));
    b.get("STAGE", |p: &PartValue, _| p.with(|r| r.stage));
    b.get("UID", |p: &PartValue, _| p.with(|r| r.uid.to_string()));
    b.get_set(
        "TAG",
        |p: &PartValue, _| p.with(|r| r.tag.clone()),
        |p: &PartValue, ctx, tag: String| {
            ensure_current_subject(ctx, p.subject()?)?;
            p.world.write().set_tag(p.uid, tag)?;
            Ok(())
        },
    )
    .doc("Name tag of this part");
    b.get("RESOURCES", |p: &PartValue, _| {
        let count = p.with(|r| r.resources.len())?;
        Ok((0..count)
            .map(|i| Value::structure(ResourceValue::new(p.world.clone(), p.uid, i)))
            .collect::<Vec<_>>())
    });
    b.get("TARGETABLE", |p: &PartValue, _| p.with(PartRecord::is_docking_port));
    b.get("SHIP", |p: &PartValue, _| {
        let vessel = p.with(|r| r.vessel)?;
        Ok(Value::structure(VesselValue::new(p.world.clone(), vessel)))
    });
    b.call1("HASMODULE", |p: &PartValue, _, name: String| {
        p.with(|r| r.has_module(&name))
    });
    b.call1("GETMODULE", |p: &PartValue, _, name: String| {
        match p.with(|r| r.module_index(&name))? {
            Some(index) => Ok(p.module(index)),
            None => Err(SuffixError::lookup("module", name.to_uppercase(), p.describe())),
        }
    });
    b.call1("GETMODULEBYINDEX", |p: &PartValue, _, index: i64| {
        let count = p.with(|r| r.modules.len())?;
        match usize::try_from(index) {
            Ok(i) if i < count => Ok(p.module(i)),
            _ => Err(SuffixError::lookup(
                "module",
                format!("MODULEINDEX[{}]", index),
                p.describe(),
            )),
        }
    });
    b.get(["MODULES", "ALLMODULES"], |p: &PartValue, _| {
        p.with(|r| r.modules.iter().map(|m| m.name.clone()).collect::<Vec<_>>())
    })
    .doc("Names of every module on this part, in order");
    b.get("PARENT", |p: &PartValue, _| {
        let parent = p.with(|r| r.parent)?.ok_or(HostError::NoParent(p.uid))?;
        part_value(&p.world, parent)
    })
    .doc("The parent part of this part");
    b.get("HASPARENT", |p: &PartValue, _| p.with(|r| r.parent.is_some()))
        .doc("Whether this part has a parent; check before reading PARENT");
    b.get("CHILDREN", |p: &PartValue, _| {
        let children = p.with(|r| r.children.clone())?;
        part_values(&p.world, &children)
    })
    .doc("Parts attached directly below this one");
    b.get("DRYMASS", |p: &PartValue, _| p.with(|r| r.dry_mass))
        .doc("The Part's mass when empty");
    b.get("MASS", |p: &PartValue, _| p.with(PartRecord::mass))
        .doc("The Part's current mass");
    b.get("WETMASS", |p: &PartValue, _| p.with(PartRecord::wet_mass))
        .doc("The Part's mass when full");
    b.get("HASPHYSICS", |p: &PartValue, _| p.with(|r| r.physics))
        .doc("Whether the part has mass in the physics simulation");
}

impl Suffixed for PartValue {
    const TYPE_NAME: &'static str = "Part";

    fn table() -> &'static MemberTable<Self> {
        &PART_TABLE
    }

    fn describe(&self) -> String {
        self.world
            .read()
            .part(self.uid)
            .map(PartRecord::label)
            .unwrap_or_else(|_| format!("PART(<gone>,uid={})", self.uid))
    }

    fn identity(&self) -> u64 {
        self.uid
    }
}
