//! Object registry
//!
//! Holds one [`ObjectRecord`] per (kind, name). A record is created by
//! whichever sighting arrives first, a workload or an autoscaler targeting
//! it, and every later sighting merges into the same record. Workload and
//! autoscaler sightings write disjoint halves of the record, so applying
//! them in either order produces the same result.

use crate::models::{ObjectKey, PodResources};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Everything known about one workload object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectRecord {
    pub kind: String,
    pub name: String,
    /// Per-pod totals; `None` until the workload itself has been seen
    pub resources: Option<PodResources>,
    /// Static replica count; `None` if unset or not yet seen
    pub replicas: Option<u32>,
    pub min_replicas: Option<u32>,
    pub max_replicas: Option<u32>,
}

/// One observation about a registry key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sighting {
    Workload {
        resources: PodResources,
        replicas: Option<u32>,
    },
    AutoscalerBounds {
        min_replicas: u32,
        max_replicas: u32,
    },
}

impl ObjectRecord {
    /// An empty record with every field unset
    pub fn placeholder(key: &ObjectKey) -> Self {
        Self {
            kind: key.kind.clone(),
            name: key.name.clone(),
            resources: None,
            replicas: None,
            min_replicas: None,
            max_replicas: None,
        }
    }

    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(&self.kind, &self.name)
    }

    /// Apply a sighting in place. Each variant overwrites only its own half.
    pub fn merge(&mut self, sighting: Sighting) {
        match sighting {
            Sighting::Workload {
                resources,
                replicas,
            } => {
                self.resources = Some(resources);
                self.replicas = replicas;
            }
            Sighting::AutoscalerBounds {
                min_replicas,
                max_replicas,
            } => {
                self.min_replicas = Some(min_replicas);
                self.max_replicas = Some(max_replicas);
            }
        }
    }

    pub fn has_autoscaler(&self) -> bool {
        self.min_replicas.is_some() || self.max_replicas.is_some()
    }

    /// Bounds were recorded but the target workload never was
    pub fn is_unresolved(&self) -> bool {
        self.resources.is_none() && self.has_autoscaler()
    }
}

/// Insertion-ordered map of (kind, name) to record
#[derive(Debug, Clone, Default)]
pub struct Registry {
    records: Vec<ObjectRecord>,
    index: HashMap<ObjectKey, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact key lookup
    pub fn find(&self, kind: &str, name: &str) -> Option<&ObjectRecord> {
        self.get(&ObjectKey::new(kind, name))
    }

    pub fn get(&self, key: &ObjectKey) -> Option<&ObjectRecord> {
        self.index.get(key).map(|&i| &self.records[i])
    }

    /// Look up or create the record for `key`, then merge the sighting into it
    pub fn upsert(&mut self, key: ObjectKey, sighting: Sighting) -> &ObjectRecord {
        let slot = match self.index.get(&key) {
            Some(&i) => i,
            None => {
                debug!(kind = %key.kind, name = %key.name, "Creating registry record");
                self.records.push(ObjectRecord::placeholder(&key));
                let i = self.records.len() - 1;
                self.index.insert(key, i);
                i
            }
        };

        let record = &mut self.records[slot];
        record.merge(sighting);
        record
    }

    pub fn upsert_workload(
        &mut self,
        kind: &str,
        name: &str,
        resources: PodResources,
        replicas: Option<u32>,
    ) -> &ObjectRecord {
        self.upsert(
            ObjectKey::new(kind, name),
            Sighting::Workload {
                resources,
                replicas,
            },
        )
    }

    pub fn upsert_autoscaler_bounds(
        &mut self,
        target_kind: &str,
        target_name: &str,
        min_replicas: u32,
        max_replicas: u32,
    ) -> &ObjectRecord {
        self.upsert(
            ObjectKey::new(target_kind, target_name),
            Sighting::AutoscalerBounds {
                min_replicas,
                max_replicas,
            },
        )
    }

    /// Records in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &ObjectRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[ObjectRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ObjectRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
