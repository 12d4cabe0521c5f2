//! Pod resource accumulation
//!
//! Sums container requests and limits into per-pod totals. Init containers
//! are included: the scheduler reserves for them too, even though they do
//! not run alongside the main containers.

use crate::error::QuantityError;
use crate::models::{ContainerResources, PodResources, PodTemplate, ResourceField};
use crate::quantity::ResourceQuantity;

/// A single container field that failed to parse and was counted as zero
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub container: Option<String>,
    pub field: ResourceField,
    pub value: String,
    pub error: QuantityError,
}

/// Summed pod resources plus any field-level parse failures
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accumulation {
    pub totals: PodResources,
    pub errors: Vec<FieldError>,
}

impl Accumulation {
    fn absorb(&mut self, other: Accumulation) {
        self.totals = self.totals + other.totals;
        self.errors.extend(other.errors);
    }
}

/// Resources of one container. Absent fields count as zero.
pub fn container_totals(container: &ContainerResources) -> Accumulation {
    let mut acc = Accumulation::default();

    for field in ResourceField::ALL {
        let Some(raw) = container.raw(field) else {
            continue;
        };

        match ResourceQuantity::parse(field.class(), raw) {
            Ok(quantity) => *acc.totals.get_mut(field) = quantity,
            Err(error) => acc.errors.push(FieldError {
                container: container.name.clone(),
                field,
                value: raw.to_string(),
                error,
            }),
        }
    }

    acc
}

/// Sum over an arbitrary sequence of containers
pub fn accumulate_containers<'a, I>(containers: I) -> Accumulation
where
    I: IntoIterator<Item = &'a ContainerResources>,
{
    containers
        .into_iter()
        .map(container_totals)
        .fold(Accumulation::default(), |mut acc, next| {
            acc.absorb(next);
            acc
        })
}

/// Sum over a pod template: regular containers, then init containers
pub fn accumulate(template: &PodTemplate) -> Accumulation {
    accumulate_containers(template.all_containers())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResourceList;

    fn container(name: &str, cpu_req: Option<&str>, mem_req: Option<&str>) -> ContainerResources {
        ContainerResources {
            name: Some(name.to_string()),
            requests: ResourceList {
                cpu: cpu_req.map(String::from),
                memory: mem_req.map(String::from),
            },
            limits: ResourceList::default(),
        }
    }

    fn with_limits(mut c: ContainerResources, cpu: &str, mem: &str) -> ContainerResources {
        c.limits = ResourceList {
            cpu: Some(cpu.to_string()),
            memory: Some(mem.to_string()),
        };
        c
    }

    #[test]
    fn test_single_container() {
        let c = with_limits(container("app", Some("100m"), Some("64Mi")), "200m", "128Mi");
        let acc = container_totals(&c);

        assert!(acc.errors.is_empty());
        assert_eq!(acc.totals.cpu_request.millicores(), 100);
        assert_eq!(acc.totals.cpu_limit.millicores(), 200);
        assert_eq!(acc.totals.memory_request.base_units(), 64 * 1024 * 1024);
        assert_eq!(acc.totals.memory_limit.base_units(), 128 * 1024 * 1024);
    }

    #[test]
    fn test_missing_resources_are_zero() {
        let acc = container_totals(&ContainerResources::default());
        assert_eq!(acc.totals, PodResources::zero());
        assert!(acc.errors.is_empty());
    }

    #[test]
    fn test_init_containers_are_included() {
        let template = PodTemplate {
            containers: vec![container("app", Some("250m"), Some("256Mi"))],
            init_containers: vec![container("migrate", Some("500m"), Some("128Mi"))],
        };

        let acc = accumulate(&template);
        assert_eq!(acc.totals.cpu_request.millicores(), 750);
        assert_eq!(acc.totals.memory_request.base_units(), 384 * 1024 * 1024);
    }

    #[test]
    fn test_additivity_and_order_independence() {
        let a = with_limits(container("a", Some("100m"), Some("64Mi")), "1", "1Gi");
        let b = container("b", Some("0.3"), None);
        let c = with_limits(container("c", None, Some("1G")), "1500m", "2G");

        let forward = accumulate_containers([&a, &b, &c]);
        let reversed = accumulate_containers([&c, &b, &a]);
        assert_eq!(forward.totals, reversed.totals);

        let pairwise = container_totals(&a).totals
            + container_totals(&b).totals
            + container_totals(&c).totals;
        assert_eq!(forward.totals, pairwise);
        assert_eq!(forward.totals.cpu_request.to_string(), "0.4");
        assert_eq!(forward.totals.cpu_limit.to_string(), "2.5");
    }

    #[test]
    fn test_malformed_field_counts_as_zero() {
        let c = with_limits(container("app", Some("100m"), Some("abc")), "200m", "128Mi");
        let acc = container_totals(&c);

        assert_eq!(acc.totals.memory_request.base_units(), 0);
        assert_eq!(acc.totals.cpu_request.millicores(), 100);
        assert_eq!(acc.totals.memory_limit.base_units(), 128 * 1024 * 1024);

        assert_eq!(acc.errors.len(), 1);
        let err = &acc.errors[0];
        assert_eq!(err.field, ResourceField::MemoryRequest);
        assert_eq!(err.value, "abc");
        assert_eq!(err.container.as_deref(), Some("app"));
    }
}
