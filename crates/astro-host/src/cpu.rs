//! Execution context of a CPU part

use astro_sdk::{DispatchPolicy, ExecutionContext, SubjectId};

use crate::world::WorldHandle;

/// Context for scripts running on a CPU part aboard `vessel`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuContext {
    vessel: SubjectId,
    policy: DispatchPolicy,
}

impl CpuContext {
    /// Context for a CPU aboard `vessel`
    pub fn new(vessel: SubjectId, policy: DispatchPolicy) -> Self {
        Self { vessel, policy }
    }

    /// Context for the scenario's CPU vessel
    pub fn for_world(world: &WorldHandle, policy: DispatchPolicy) -> Self {
        Self::new(world.cpu_subject(), policy)
    }
}

impl ExecutionContext for CpuContext {
    fn is_current_subject(&self, subject: SubjectId) -> bool {
        subject == self.vessel
    }

    fn policy(&self) -> DispatchPolicy {
        self.policy
    }
}
