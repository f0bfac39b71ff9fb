//! Resource values

use std::hash::{Hash, Hasher};

use once_cell::sync::Lazy;
use rustc_hash::FxHasher;

use astro_sdk::{table_builder, MemberTable, SuffixResult, Suffixed};

use crate::error::HostError;
use crate::world::{ResourceRecord, WorldHandle};

/// One resource container of a part
#[derive(Debug, Clone)]
pub struct ResourceValue {
    world: WorldHandle,
    uid: u64,
    index: usize,
}

impl ResourceValue {
    /// Resource `index` of part `uid`
    pub fn new(world: WorldHandle, uid: u64, index: usize) -> Self {
        Self { world, uid, index }
    }

    fn with<R>(&self, f: impl FnOnce(&ResourceRecord) -> R) -> SuffixResult<R> {
        let world = self.world.read();
        let resource = world
            .part(self.uid)?
            .resources
            .get(self.index)
            .ok_or(HostError::ResourceNotFound {
                uid: self.uid,
                index: self.index,
            })?;
        Ok(f(resource))
    }
}

static RESOURCE_TABLE: Lazy<MemberTable<ResourceValue>> = Lazy::new(|| {
    let mut b = table_builder::<ResourceValue>();
    b.get("NAME", |r: &ResourceValue, _| r.with(|res| res.name.clone()));
    b.get("AMOUNT", |r: &ResourceValue, _| r.with(|res| res.amount))
        .doc("Units currently stored");
    b.get("CAPACITY", |r: &ResourceValue, _| r.with(|res| res.capacity))
        .doc("Units stored when full");
    b.get("DENSITY", |r: &ResourceValue, _| r.with(|res| res.density));
    b.build()
});

impl Suffixed for ResourceValue {
    const TYPE_NAME: &'static str = "Resource";

    fn table() -> &'static MemberTable<Self> {
        &RESOURCE_TABLE
    }

    fn describe(&self) -> String {
        self.with(|res| format!("RESOURCE({},{}/{})", res.name, res.amount, res.capacity))
            .unwrap_or_else(|_| format!("RESOURCE(#{} of uid={})", self.index, self.uid))
    }

    fn identity(&self) -> u64 {
        let mut hasher = FxHasher::default();
        (self.uid, self.index).hash(&mut hasher);
        hasher.finish()
    }
}
