use crate::command::KubectlConfig;
use lazykube_framework::{DescribeError, Describer, LeafRef};
use std::sync::Arc;

/// `kubectl describe <type> <name> -n <namespace>`
pub struct KubectlDescriber {
    config: Arc<KubectlConfig>,
}

impl KubectlDescriber {
    pub fn new(config: Arc<KubectlConfig>) -> Self {
        Self { config }
    }
}

impl Describer for KubectlDescriber {
    fn describe(&self, leaf: &LeafRef) -> Result<String, DescribeError> {
        let output = self.config.output(&[
            "describe",
            leaf.kind.resource_type(),
            leaf.name.as_str(),
            "-n",
            leaf.namespace.as_str(),
        ])?;
        Ok(output)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use lazykube_framework::ResourceKind;

    #[test]
    fn test_describe_arguments() {
        let mut config = KubectlConfig::new();
        config.program = "echo".to_string();
        let describer = KubectlDescriber::new(Arc::new(config));

        let leaf = LeafRef::new(ResourceKind::Services, "default", "frontend");
        assert_eq!(
            describer.describe(&leaf).unwrap(),
            "describe service frontend -n default\n"
        );
    }

    #[test]
    fn test_failed_describe() {
        let mut config = KubectlConfig::new();
        config.program = "false".to_string();
        let describer = KubectlDescriber::new(Arc::new(config));

        let leaf = LeafRef::new(ResourceKind::Pods, "default", "web");
        assert!(matches!(
            describer.describe(&leaf),
            Err(DescribeError::Failed(_))
        ));
    }
}
