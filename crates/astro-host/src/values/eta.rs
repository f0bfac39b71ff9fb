//! Time-to-event readouts of a vessel's orbit

use once_cell::sync::Lazy;

use astro_sdk::{table_builder, MemberTable, SuffixResult, Suffixed};

use crate::world::{Orbit, WorldHandle};

/// ETA readouts of one vessel
#[derive(Debug, Clone)]
pub struct VesselEta {
    world: WorldHandle,
    vessel: u64,
}

impl VesselEta {
    /// Readouts for vessel `vessel`
    pub fn new(world: WorldHandle, vessel: u64) -> Self {
        Self { world, vessel }
    }

    fn with<R>(&self, f: impl FnOnce(&Orbit, f64) -> R) -> SuffixResult<R> {
        let world = self.world.read();
        let orbit = world.vessel(self.vessel)?.orbit;
        Ok(f(&orbit, world.universal_time()))
    }

    fn apoapsis(&self) -> SuffixResult<f64> {
        self.with(|o, _| o.time_to_apoapsis)
    }

    fn periapsis(&self) -> SuffixResult<f64> {
        self.with(|o, _| o.time_to_periapsis)
    }

    fn transition(&self) -> SuffixResult<f64> {
        self.with(|o, now| o.end_ut - now)
    }
}

static ETA_TABLE: Lazy<MemberTable<VesselEta>> = Lazy::new(|| {
    let mut b = table_builder::<VesselEta>();
    b.call0("APOAPSIS", |e: &VesselEta, _| e.apoapsis())
        .doc("Seconds until apoapsis");
    b.call0("PERIAPSIS", |e: &VesselEta, _| e.periapsis())
        .doc("Seconds until periapsis");
    b.call0("TRANSITION", |e: &VesselEta, _| e.transition())
        .doc("Seconds until the current orbit patch ends");
    b.build()
});

impl Suffixed for VesselEta {
    const TYPE_NAME: &'static str = "VesselEta";

    fn table() -> &'static MemberTable<Self> {
        &ETA_TABLE
    }

    fn describe(&self) -> String {
        let world = self.world.read();
        match world.vessel(self.vessel) {
            Ok(v) => format!(
                "ETA of VESSEL(\"{}\"): Apoapsis={} Periapsis={} Transition={}",
                v.name,
                v.orbit.time_to_apoapsis,
                v.orbit.time_to_periapsis,
                v.orbit.end_ut - world.universal_time()
            ),
            Err(_) => format!("ETA(id={})", self.vessel),
        }
    }

    fn identity(&self) -> u64 {
        self.vessel
    }
}
