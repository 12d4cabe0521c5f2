//! Core data models for the estimator

use crate::quantity::{ResourceClass, ResourceQuantity};
use serde::Serialize;
use std::fmt;

/// Identity of a workload object in the registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ObjectKey {
    pub kind: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

/// The four resource fields tracked per pod
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceField {
    CpuRequest,
    CpuLimit,
    MemoryRequest,
    MemoryLimit,
}

impl ResourceField {
    pub const ALL: [ResourceField; 4] = [
        ResourceField::CpuRequest,
        ResourceField::CpuLimit,
        ResourceField::MemoryRequest,
        ResourceField::MemoryLimit,
    ];

    pub fn class(self) -> ResourceClass {
        match self {
            ResourceField::CpuRequest | ResourceField::CpuLimit => ResourceClass::Cpu,
            ResourceField::MemoryRequest | ResourceField::MemoryLimit => ResourceClass::Memory,
        }
    }
}

impl fmt::Display for ResourceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResourceField::CpuRequest => "cpu request",
            ResourceField::CpuLimit => "cpu limit",
            ResourceField::MemoryRequest => "memory request",
            ResourceField::MemoryLimit => "memory limit",
        };
        f.write_str(label)
    }
}

/// Raw `cpu`/`memory` entries of a requests or limits map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceList {
    pub cpu: Option<String>,
    pub memory: Option<String>,
}

/// Declared resources of a single container, quantities still unparsed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerResources {
    pub name: Option<String>,
    pub requests: ResourceList,
    pub limits: ResourceList,
}

impl ContainerResources {
    /// Raw value declared for `field`, if any
    pub fn raw(&self, field: ResourceField) -> Option<&str> {
        let value = match field {
            ResourceField::CpuRequest => &self.requests.cpu,
            ResourceField::CpuLimit => &self.limits.cpu,
            ResourceField::MemoryRequest => &self.requests.memory,
            ResourceField::MemoryLimit => &self.limits.memory,
        };
        value.as_deref()
    }
}

/// The part of a pod template the estimator reads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodTemplate {
    pub containers: Vec<ContainerResources>,
    pub init_containers: Vec<ContainerResources>,
}

impl PodTemplate {
    /// Regular containers first, then init containers
    pub fn all_containers(&self) -> impl Iterator<Item = &ContainerResources> {
        self.containers.iter().chain(self.init_containers.iter())
    }
}

/// Per-pod resource totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PodResources {
    pub cpu_request: ResourceQuantity,
    pub cpu_limit: ResourceQuantity,
    pub memory_request: ResourceQuantity,
    pub memory_limit: ResourceQuantity,
}

impl Default for PodResources {
    fn default() -> Self {
        Self::zero()
    }
}

impl PodResources {
    pub fn zero() -> Self {
        Self {
            cpu_request: ResourceQuantity::zero(ResourceClass::Cpu),
            cpu_limit: ResourceQuantity::zero(ResourceClass::Cpu),
            memory_request: ResourceQuantity::zero(ResourceClass::Memory),
            memory_limit: ResourceQuantity::zero(ResourceClass::Memory),
        }
    }

    pub fn get(&self, field: ResourceField) -> ResourceQuantity {
        match field {
            ResourceField::CpuRequest => self.cpu_request,
            ResourceField::CpuLimit => self.cpu_limit,
            ResourceField::MemoryRequest => self.memory_request,
            ResourceField::MemoryLimit => self.memory_limit,
        }
    }

    pub fn get_mut(&mut self, field: ResourceField) -> &mut ResourceQuantity {
        match field {
            ResourceField::CpuRequest => &mut self.cpu_request,
            ResourceField::CpuLimit => &mut self.cpu_limit,
            ResourceField::MemoryRequest => &mut self.memory_request,
            ResourceField::MemoryLimit => &mut self.memory_limit,
        }
    }

    /// Every field multiplied by `replicas`
    pub fn scaled(&self, replicas: u32) -> Self {
        Self {
            cpu_request: self.cpu_request.scaled(replicas),
            cpu_limit: self.cpu_limit.scaled(replicas),
            memory_request: self.memory_request.scaled(replicas),
            memory_limit: self.memory_limit.scaled(replicas),
        }
    }
}

impl std::ops::Add for PodResources {
    type Output = PodResources;

    fn add(self, rhs: PodResources) -> PodResources {
        PodResources {
            cpu_request: self.cpu_request + rhs.cpu_request,
            cpu_limit: self.cpu_limit + rhs.cpu_limit,
            memory_request: self.memory_request + rhs.memory_request,
            memory_limit: self.memory_limit + rhs.memory_limit,
        }
    }
}

/// A replicated workload as handed over by the decoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadObject {
    pub kind: String,
    pub name: String,
    pub pod_template: PodTemplate,
    /// `None` when the manifest leaves scaling to an autoscaler
    pub static_replicas: Option<u32>,
}

impl WorkloadObject {
    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(&self.kind, &self.name)
    }
}

/// Replica bounds declared by a HorizontalPodAutoscaler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoscalerObject {
    pub target_kind: String,
    pub target_name: String,
    pub min_replicas: u32,
    pub max_replicas: u32,
}

impl AutoscalerObject {
    /// The workload this autoscaler governs; its own name is irrelevant
    pub fn target(&self) -> ObjectKey {
        ObjectKey::new(&self.target_kind, &self.target_name)
    }
}

/// Result of decoding one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedObject {
    Workload(WorkloadObject),
    Autoscaler(AutoscalerObject),
    /// A kind the estimator does not account for
    Other { kind: String },
}

impl DecodedObject {
    pub fn kind(&self) -> &str {
        match self {
            DecodedObject::Workload(w) => &w.kind,
            DecodedObject::Autoscaler(_) => "HorizontalPodAutoscaler",
            DecodedObject::Other { kind } => kind,
        }
    }
}
