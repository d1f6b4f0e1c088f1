use crate::command::KubectlConfig;
use lazykube_framework::{CategoryRef, Inventory, LeafRef, LookupError};
use std::sync::Arc;

/// Lists namespaces and resources with `kubectl get -o name`.
pub struct KubectlInventory {
    config: Arc<KubectlConfig>,
}

impl KubectlInventory {
    pub fn new(config: Arc<KubectlConfig>) -> Self {
        Self { config }
    }
}

impl Inventory for KubectlInventory {
    fn list_namespaces(&self) -> Result<Vec<String>, LookupError> {
        let output = self.config.output(&["get", "namespaces", "-o", "name"])?;
        parse_names(&output, "namespace")
    }

    fn list_children(&self, category: &CategoryRef) -> Result<Vec<LeafRef>, LookupError> {
        let resource_type = category.kind.resource_type();
        let output = self.config.output(&[
            "get",
            resource_type,
            "-n",
            category.namespace.as_str(),
            "-o",
            "name",
        ])?;
        let names = parse_names(&output, resource_type)?;
        Ok(names.into_iter().map(|name| category.leaf(name)).collect())
    }
}

/// Parse `<type>/<name>` lines into sorted names.
///
/// `kubectl` prints the group-qualified form for some types
/// (`service/x` vs `service.serving.knative.dev/x`); anything that is not
/// the plain `resource_type` prefix is rejected.
fn parse_names(output: &str, resource_type: &str) -> Result<Vec<String>, LookupError> {
    let mut names = Vec::new();
    for line in output.lines().map(str::trim).filter(|line| !line.is_empty()) {
        match line.split_once('/') {
            Some((kind, name)) if kind == resource_type && !name.is_empty() => {
                names.push(name.to_string())
            }
            _ => {
                return Err(LookupError::Malformed(format!(
                    "expected {}/<name>, got {:?}",
                    resource_type, line
                )));
            }
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_strips_prefix_and_sorts() {
        let output = "pod/web-7d9\npod/api-1\n\npod/db-0\n";
        assert_eq!(
            parse_names(output, "pod").unwrap(),
            vec!["api-1", "db-0", "web-7d9"]
        );
    }

    #[test]
    fn test_parse_names_empty_output() {
        assert!(parse_names("", "configmap").unwrap().is_empty());
    }

    #[test]
    fn test_parse_names_rejects_foreign_lines() {
        assert!(matches!(
            parse_names("No resources found in default namespace.", "pod"),
            Err(LookupError::Malformed(_))
        ));
        assert!(matches!(
            parse_names("service/", "service"),
            Err(LookupError::Malformed(_))
        ));
    }
}
