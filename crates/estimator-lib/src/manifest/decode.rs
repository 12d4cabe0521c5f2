//! YAML decoding of workload and autoscaler manifests
//!
//! Only the fields the estimator consumes are modelled: kind, name,
//! replicas, container resources, the autoscaler's scale target and its
//! replica bounds. Everything else in the document is ignored.

use super::ManifestDecoder;
use crate::error::DecodeError;
use crate::models::{
    AutoscalerObject, ContainerResources, DecodedObject, PodTemplate, ResourceList,
    WorkloadObject,
};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};

/// Workload kinds accounted for unless configured otherwise
pub const DEFAULT_WORKLOAD_KINDS: &[&str] = &["Deployment", "StatefulSet", "ReplicaSet"];

pub const AUTOSCALER_KIND: &str = "HorizontalPodAutoscaler";

/// Minimum replicas the API server assumes when an HPA omits it
const DEFAULT_MIN_REPLICAS: u32 = 1;

#[derive(Debug, Deserialize)]
struct ObjectMeta {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WorkloadManifest {
    metadata: Option<ObjectMeta>,
    spec: Option<WorkloadSpec>,
}

#[derive(Debug, Deserialize)]
struct WorkloadSpec {
    replicas: Option<u32>,
    template: Option<PodTemplateSpec>,
}

#[derive(Debug, Deserialize)]
struct PodTemplateSpec {
    spec: Option<PodSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PodSpec {
    containers: Option<Vec<ContainerManifest>>,
    init_containers: Option<Vec<ContainerManifest>>,
}

#[derive(Debug, Deserialize)]
struct ContainerManifest {
    name: Option<String>,
    resources: Option<ResourceRequirements>,
}

#[derive(Debug, Deserialize)]
struct ResourceRequirements {
    requests: Option<BTreeMap<String, serde_yaml::Value>>,
    limits: Option<BTreeMap<String, serde_yaml::Value>>,
}

/// Raw text of a quantity entry
///
/// Strings and bare numbers are taken as written. Any other value is kept
/// as its YAML text so the quantity parser rejects that one field.
fn raw_quantity(value: serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Null => None,
        serde_yaml::Value::String(s) => Some(s),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        other => Some(
            serde_yaml::to_string(&other)
                .map(|text| text.trim_end().to_string())
                .unwrap_or_default(),
        ),
    }
}

#[derive(Debug, Deserialize)]
struct AutoscalerManifest {
    spec: Option<AutoscalerSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AutoscalerSpec {
    scale_target_ref: Option<ScaleTargetRef>,
    min_replicas: Option<u32>,
    max_replicas: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ScaleTargetRef {
    kind: Option<String>,
    name: Option<String>,
}

/// Decoder backed by `serde_yaml`
#[derive(Debug, Clone)]
pub struct YamlDecoder {
    workload_kinds: HashSet<String>,
}

impl Default for YamlDecoder {
    fn default() -> Self {
        Self::with_workload_kinds(DEFAULT_WORKLOAD_KINDS.iter().copied())
    }
}

impl YamlDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder that treats exactly the given kinds as workloads
    pub fn with_workload_kinds<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            workload_kinds: kinds.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_workload_kind(&self, kind: &str) -> bool {
        self.workload_kinds.contains(kind)
    }

    fn decode_workload(
        &self,
        kind: String,
        value: serde_yaml::Value,
    ) -> Result<WorkloadObject, DecodeError> {
        let manifest: WorkloadManifest =
            serde_yaml::from_value(value).map_err(|e| DecodeError::Shape {
                kind: kind.clone(),
                reason: e.to_string(),
            })?;

        let name = manifest
            .metadata
            .and_then(|m| m.name)
            .ok_or_else(|| DecodeError::MissingField {
                kind: Some(kind.clone()),
                field: "metadata.name",
            })?;

        let (static_replicas, pod_spec) = match manifest.spec {
            Some(spec) => (spec.replicas, spec.template.and_then(|t| t.spec)),
            None => (None, None),
        };

        let pod_template = match pod_spec {
            Some(spec) => PodTemplate {
                containers: convert_containers(spec.containers),
                init_containers: convert_containers(spec.init_containers),
            },
            None => PodTemplate::default(),
        };

        Ok(WorkloadObject {
            kind,
            name,
            pod_template,
            static_replicas,
        })
    }

    fn decode_autoscaler(&self, value: serde_yaml::Value) -> Result<AutoscalerObject, DecodeError> {
        let missing = |field: &'static str| DecodeError::MissingField {
            kind: Some(AUTOSCALER_KIND.to_string()),
            field,
        };

        let manifest: AutoscalerManifest =
            serde_yaml::from_value(value).map_err(|e| DecodeError::Shape {
                kind: AUTOSCALER_KIND.to_string(),
                reason: e.to_string(),
            })?;

        let spec = manifest.spec.ok_or_else(|| missing("spec"))?;
        let target = spec
            .scale_target_ref
            .ok_or_else(|| missing("spec.scaleTargetRef"))?;

        Ok(AutoscalerObject {
            target_kind: target
                .kind
                .ok_or_else(|| missing("spec.scaleTargetRef.kind"))?,
            target_name: target
                .name
                .ok_or_else(|| missing("spec.scaleTargetRef.name"))?,
            min_replicas: spec.min_replicas.unwrap_or(DEFAULT_MIN_REPLICAS),
            max_replicas: spec.max_replicas.ok_or_else(|| missing("spec.maxReplicas"))?,
        })
    }
}

impl ManifestDecoder for YamlDecoder {
    fn decode(&self, document: &str) -> Result<DecodedObject, DecodeError> {
        let value: serde_yaml::Value =
            serde_yaml::from_str(document).map_err(|e| DecodeError::InvalidYaml(e.to_string()))?;

        if !value.is_mapping() {
            return Err(DecodeError::InvalidYaml(
                "document is not a mapping".to_string(),
            ));
        }

        let kind = match value.get("kind") {
            Some(serde_yaml::Value::String(kind)) => kind.clone(),
            Some(_) => {
                return Err(DecodeError::Shape {
                    kind: "<unknown>".to_string(),
                    reason: "`kind` is not a string".to_string(),
                })
            }
            None => {
                return Err(DecodeError::MissingField {
                    kind: None,
                    field: "kind",
                })
            }
        };

        if kind == AUTOSCALER_KIND {
            self.decode_autoscaler(value).map(DecodedObject::Autoscaler)
        } else if self.is_workload_kind(&kind) {
            self.decode_workload(kind, value).map(DecodedObject::Workload)
        } else {
            Ok(DecodedObject::Other { kind })
        }
    }
}

fn convert_containers(containers: Option<Vec<ContainerManifest>>) -> Vec<ContainerResources> {
    containers
        .unwrap_or_default()
        .into_iter()
        .map(|c| {
            let (requests, limits) = match c.resources {
                Some(r) => (convert_list(r.requests), convert_list(r.limits)),
                None => (ResourceList::default(), ResourceList::default()),
            };
            ContainerResources {
                name: c.name,
                requests,
                limits,
            }
        })
        .collect()
}

fn convert_list(list: Option<BTreeMap<String, serde_yaml::Value>>) -> ResourceList {
    let mut list = list.unwrap_or_default();
    let mut take = |key: &str| list.remove(key).and_then(raw_quantity);

    ResourceList {
        cpu: take("cpu"),
        memory: take("memory"),
    }
}
