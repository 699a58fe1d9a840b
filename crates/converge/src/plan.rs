//! Plan - the ordered, pre-resolved list of resources to reconcile
//!
//! Order is the declared execution order: packages come before the
//! services that need them, directories before files written into them,
//! file writes before the services that read them. The builder encodes
//! those constraints as literal list position; the engine never reorders.

use crate::resource::{BoxedResource, Resource};
use thiserror::Error;

/// Invalid `--target` selector
#[derive(Debug, Error)]
pub enum TargetError {
    /// Selector had more than one dot
    #[error("invalid target '{0}': expected 'type' or 'type.name'")]
    Malformed(String),
}

/// An ordered execution plan
pub struct Plan {
    resources: Vec<BoxedResource>,
}

impl Plan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self {
            resources: Vec::new(),
        }
    }

    /// Append a resource; it runs after everything already in the plan
    pub fn push(&mut self, resource: BoxedResource) {
        self.resources.push(resource);
    }

    /// Number of resources in the plan
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Iterate resources in execution order
    pub fn iter(&self) -> impl Iterator<Item = &BoxedResource> {
        self.resources.iter()
    }

    /// Consume the plan in execution order
    pub fn into_resources(self) -> Vec<BoxedResource> {
        self.resources
    }

    /// Filter plan to only include resources matching a predicate
    ///
    /// Relative order of the kept resources is preserved.
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&dyn Resource) -> bool,
    {
        Self {
            resources: self
                .resources
                .into_iter()
                .filter(|r| predicate(r.as_ref()))
                .collect(),
        }
    }

    /// Filter plan to only include resources matching a target selector
    ///
    /// Target format: "type" or "type.name"
    pub fn filter_by_target(self, target: Option<&str>) -> Result<Self, TargetError> {
        match target {
            None => Ok(self),
            Some(t) => {
                let (resource_type, name) = parse_target(t)?;
                Ok(self
                    .filter(|r| matches_filter(r, resource_type.as_deref(), name.as_deref())))
            }
        }
    }
}

impl Default for Plan {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a target string like "type.name" into (type, name)
fn parse_target(target: &str) -> Result<(Option<String>, Option<String>), TargetError> {
    let parts: Vec<&str> = target.split('.').collect();
    match parts.len() {
        1 => Ok((Some(parts[0].to_string()), None)),
        2 => Ok((Some(parts[0].to_string()), Some(parts[1].to_string()))),
        _ => Err(TargetError::Malformed(target.to_string())),
    }
}

/// Check if a resource matches the filter criteria
fn matches_filter(
    resource: &dyn Resource,
    resource_type: Option<&str>,
    name: Option<&str>,
) -> bool {
    if let Some(rt) = resource_type {
        // Allow common aliases
        let matches_type = match rt {
            "packages" => resource.resource_type() == "package_set",
            "files" => resource.resource_type() == "config_file",
            "services" => resource.resource_type() == "service",
            "firewall" => resource.resource_type() == "firewall_rule",
            _ => resource.resource_type() == rt || resource.resource_type().starts_with(rt),
        };
        if !matches_type {
            return false;
        }
    }

    if let Some(n) = name
        && !resource.id().contains(n)
    {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ApplyContext;
    use crate::types::Satisfaction;

    #[derive(Debug)]
    struct Fake {
        id: &'static str,
        rtype: &'static str,
    }

    impl Resource for Fake {
        fn id(&self) -> String {
            self.id.to_string()
        }

        fn description(&self) -> String {
            self.id.to_string()
        }

        fn resource_type(&self) -> &'static str {
            self.rtype
        }

        fn probe(&self) -> anyhow::Result<Satisfaction> {
            Ok(Satisfaction::Missing)
        }

        fn apply(&self, _ctx: &mut ApplyContext) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn sample_plan() -> Plan {
        let mut plan = Plan::new();
        plan.push(Box::new(Fake {
            id: "base",
            rtype: "package_set",
        }));
        plan.push(Box::new(Fake {
            id: "nginx",
            rtype: "service",
        }));
        plan.push(Box::new(Fake {
            id: "postgresql",
            rtype: "service",
        }));
        plan
    }

    #[test]
    fn test_parse_target() {
        assert_eq!(
            parse_target("service").unwrap(),
            (Some("service".to_string()), None)
        );
        assert_eq!(
            parse_target("service.nginx").unwrap(),
            (Some("service".to_string()), Some("nginx".to_string()))
        );
        assert!(parse_target("a.b.c").is_err());
    }

    #[test]
    fn test_filter_by_type() {
        let plan = sample_plan().filter_by_target(Some("service")).unwrap();
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn test_filter_by_type_and_name() {
        let plan = sample_plan()
            .filter_by_target(Some("service.nginx"))
            .unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.iter().next().unwrap().id(), "nginx");
    }

    #[test]
    fn test_filter_alias() {
        let plan = sample_plan().filter_by_target(Some("packages")).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.iter().next().unwrap().id(), "base");
    }

    #[test]
    fn test_no_target_keeps_everything() {
        let plan = sample_plan().filter_by_target(None).unwrap();
        assert_eq!(plan.len(), 3);
    }
}
