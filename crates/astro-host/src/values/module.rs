//! Part module values

use std::hash::{Hash, Hasher};

use once_cell::sync::Lazy;
use rustc_hash::FxHasher;

use astro_sdk::{
    ensure_current_subject, table_builder, AccessViolation, MemberTable, SubjectId, SuffixError,
    SuffixResult, Suffixed, Value,
};

use crate::error::HostError;
use crate::scenario::FieldValue;
use crate::values::part_value;
use crate::world::{ModuleRecord, WorldHandle};

/// One module of a part, exposing its fields
#[derive(Debug, Clone)]
pub struct PartModuleValue {
    world: WorldHandle,
    uid: u64,
    index: usize,
}

impl PartModuleValue {
    /// Module `index` of part `uid`
    pub fn new(world: WorldHandle, uid: u64, index: usize) -> Self {
        Self { world, uid, index }
    }

    fn with<R>(&self, f: impl FnOnce(&ModuleRecord) -> R) -> SuffixResult<R> {
        let world = self.world.read();
        let module = world
            .part(self.uid)?
            .modules
            .get(self.index)
            .ok_or(HostError::ModuleNotFound {
                uid: self.uid,
                index: self.index,
            })?;
        Ok(f(module))
    }

    fn missing_field(&self, name: &str) -> SuffixError {
        SuffixError::lookup("field", name, self.describe())
    }
}

static MODULE_TABLE: Lazy<MemberTable<PartModuleValue>> = Lazy::new(|| {
    let mut b = table_builder::<PartModuleValue>();
    b.get("NAME", |m: &PartModuleValue, _| m.with(|r| r.name.clone()));
    b.get("PART", |m: &PartModuleValue, _| part_value(&m.world, m.uid))
        .doc("The part this module belongs to");
    b.get("ALLFIELDNAMES", |m: &PartModuleValue, _| {
        m.with(|r| r.fields.keys().cloned().collect::<Vec<_>>())
    });
    b.call1("HASFIELD", |m: &PartModuleValue, _, name: String| {
        m.with(|r| r.field(&name).is_some())
    });
    b.call1("GETFIELD", |m: &PartModuleValue, _, name: String| {
        m.with(|r| r.field(&name).map(|(_, v)| Value::from(v)))?
            .ok_or_else(|| m.missing_field(&name))
    });
    b.call2(
        "SETFIELD",
        |m: &PartModuleValue, ctx, name: String, value: Value| {
            let vessel = m.world.read().part(m.uid)?.vessel;
            ensure_current_subject(ctx, SubjectId(vessel))?;
            if !m.with(|r| r.field(&name).is_some())? {
                return Err(m.missing_field(&name));
            }
            let field = FieldValue::from_value(&value).ok_or_else(|| {
                SuffixError::violation(AccessViolation::ArgumentType {
                    index: 1,
                    expected: "Boolean, Scalar or String",
                    got: value.type_name(),
                })
            })?;
            m.world.write().set_field(m.uid, m.index, &name, field)?;
            Ok(())
        },
    )
    .doc("Overwrite an existing field");
    b.build()
});

impl Suffixed for PartModuleValue {
    const TYPE_NAME: &'static str = "PartModule";

    fn table() -> &'static MemberTable<Self> {
        &MODULE_TABLE
    }

    fn describe(&self) -> String {
        let world = self.world.read();
        match world.part(self.uid) {
            Ok(part) => match part.modules.get(self.index) {
                Some(module) => format!("PARTMODULE({}) of {}", module.name, part.label()),
                None => format!("PARTMODULE(#{}) of {}", self.index, part.label()),
            },
            Err(_) => format!("PARTMODULE(#{}) of PART(<gone>,uid={})", self.index, self.uid),
        }
    }

    fn identity(&self) -> u64 {
        let mut hasher = FxHasher::default();
        (self.uid, self.index).hash(&mut hasher);
        hasher.finish()
    }
}
