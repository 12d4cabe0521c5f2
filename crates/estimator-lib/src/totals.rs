//! Replica-scaled totals
//!
//! For every record, per-pod resources are multiplied by the static replica
//! count, the autoscaler minimum and the autoscaler maximum. A missing
//! multiplier or missing resources makes that vector not applicable, which
//! is distinct from zero and contributes nothing to the gross totals.

use crate::models::{PodResources, ResourceField};
use crate::quantity::{ResourceClass, ResourceQuantity};
use crate::registry::ObjectRecord;
use serde::Serialize;

/// Which replica count a vector was scaled by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplicaBasis {
    Replicas,
    Min,
    Max,
}

impl ReplicaBasis {
    pub const ALL: [ReplicaBasis; 3] = [ReplicaBasis::Replicas, ReplicaBasis::Min, ReplicaBasis::Max];
}

/// Derived totals for one record; `None` means not applicable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecordTotals {
    pub at_replicas: Option<PodResources>,
    pub at_min: Option<PodResources>,
    pub at_max: Option<PodResources>,
}

impl RecordTotals {
    pub fn compute(record: &ObjectRecord) -> Self {
        let scale = |count: Option<u32>| match (record.resources, count) {
            (Some(per_pod), Some(n)) => Some(per_pod.scaled(n)),
            _ => None,
        };

        Self {
            at_replicas: scale(record.replicas),
            at_min: scale(record.min_replicas),
            at_max: scale(record.max_replicas),
        }
    }

    pub fn get(&self, basis: ReplicaBasis) -> Option<&PodResources> {
        match basis {
            ReplicaBasis::Replicas => self.at_replicas.as_ref(),
            ReplicaBasis::Min => self.at_min.as_ref(),
            ReplicaBasis::Max => self.at_max.as_ref(),
        }
    }
}

/// One resource field at each replica basis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplicaScaled {
    pub at_replicas: ResourceQuantity,
    pub at_min: ResourceQuantity,
    pub at_max: ResourceQuantity,
}

impl ReplicaScaled {
    pub fn zero(class: ResourceClass) -> Self {
        Self {
            at_replicas: ResourceQuantity::zero(class),
            at_min: ResourceQuantity::zero(class),
            at_max: ResourceQuantity::zero(class),
        }
    }

    pub fn get(&self, basis: ReplicaBasis) -> ResourceQuantity {
        match basis {
            ReplicaBasis::Replicas => self.at_replicas,
            ReplicaBasis::Min => self.at_min,
            ReplicaBasis::Max => self.at_max,
        }
    }

    fn get_mut(&mut self, basis: ReplicaBasis) -> &mut ResourceQuantity {
        match basis {
            ReplicaBasis::Replicas => &mut self.at_replicas,
            ReplicaBasis::Min => &mut self.at_min,
            ReplicaBasis::Max => &mut self.at_max,
        }
    }
}

/// Cluster-wide sum across every record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GrossTotals {
    pub cpu_request: ReplicaScaled,
    pub cpu_limit: ReplicaScaled,
    pub memory_request: ReplicaScaled,
    pub memory_limit: ReplicaScaled,
}

impl Default for GrossTotals {
    fn default() -> Self {
        Self::new()
    }
}

impl GrossTotals {
    pub fn new() -> Self {
        Self {
            cpu_request: ReplicaScaled::zero(ResourceClass::Cpu),
            cpu_limit: ReplicaScaled::zero(ResourceClass::Cpu),
            memory_request: ReplicaScaled::zero(ResourceClass::Memory),
            memory_limit: ReplicaScaled::zero(ResourceClass::Memory),
        }
    }

    pub fn get(&self, field: ResourceField) -> &ReplicaScaled {
        match field {
            ResourceField::CpuRequest => &self.cpu_request,
            ResourceField::CpuLimit => &self.cpu_limit,
            ResourceField::MemoryRequest => &self.memory_request,
            ResourceField::MemoryLimit => &self.memory_limit,
        }
    }

    fn get_mut(&mut self, field: ResourceField) -> &mut ReplicaScaled {
        match field {
            ResourceField::CpuRequest => &mut self.cpu_request,
            ResourceField::CpuLimit => &mut self.cpu_limit,
            ResourceField::MemoryRequest => &mut self.memory_request,
            ResourceField::MemoryLimit => &mut self.memory_limit,
        }
    }

    /// Add a record's applicable vectors; not-applicable ones are skipped
    pub fn fold(&mut self, totals: &RecordTotals) {
        for basis in ReplicaBasis::ALL {
            let Some(scaled) = totals.get(basis) else {
                continue;
            };
            for field in ResourceField::ALL {
                let contribution = scaled.get(field);
                if !contribution.is_zero() {
                    *self.get_mut(field).get_mut(basis) += contribution;
                }
            }
        }
    }
}

/// A record together with its derived totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSummary {
    #[serde(flatten)]
    pub record: ObjectRecord,
    pub totals: RecordTotals,
}

/// Walk the records once, deriving per-record totals and the gross sum
pub fn compute(records: Vec<ObjectRecord>) -> (Vec<RecordSummary>, GrossTotals) {
    let mut gross = GrossTotals::new();

    let summaries = records
        .into_iter()
        .map(|record| {
            let totals = RecordTotals::compute(&record);
            gross.fold(&totals);
            RecordSummary { record, totals }
        })
        .collect();

    (summaries, gross)
}
