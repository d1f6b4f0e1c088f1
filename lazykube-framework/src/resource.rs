//! Payload carried by every tree node: a closed set of kinds the handlers
//! dispatch on with `match`.

use crate::{theme, tree::Glyphs};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Pods,
    ConfigMaps,
    Services,
}

impl ResourceKind {
    /// categories created under every namespace, in display order
    pub const ALL: [ResourceKind; 3] = [Self::Pods, Self::ConfigMaps, Self::Services];

    pub fn label(self) -> &'static str {
        match self {
            Self::Pods => "Pods",
            Self::ConfigMaps => "ConfigMaps",
            Self::Services => "Services",
        }
    }

    /// singular resource type name, as accepted by `kubectl`
    pub fn resource_type(self) -> &'static str {
        match self {
            Self::Pods => "pod",
            Self::ConfigMaps => "configmap",
            Self::Services => "service",
        }
    }

    /// only pods produce a live log feed
    pub fn is_loggable(self) -> bool {
        matches!(self, Self::Pods)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CategoryRef {
    pub kind: ResourceKind,
    pub namespace: String,
}

impl CategoryRef {
    pub fn new(kind: ResourceKind, namespace: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: namespace.into(),
        }
    }

    pub fn leaf(&self, name: impl Into<String>) -> LeafRef {
        LeafRef::new(self.kind, self.namespace.clone(), name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LeafRef {
    pub kind: ResourceKind,
    pub namespace: String,
    pub name: String,
}

impl LeafRef {
    pub fn new(kind: ResourceKind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn is_loggable(&self) -> bool {
        self.kind.is_loggable()
    }
}

impl fmt::Display for LeafRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.namespace,
            self.kind.resource_type(),
            self.name
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceRef {
    Root,
    Namespace(String),
    Category(CategoryRef),
    Leaf(LeafRef),
}

impl ResourceRef {
    pub fn glyphs(&self) -> Glyphs {
        match self {
            Self::Root => Glyphs::fixed("⎈"),
            Self::Namespace(_) => Glyphs::new("◇", "◆"),
            Self::Category(_) => Glyphs::new("▫", "▪"),
            Self::Leaf(leaf) if leaf.is_loggable() => Glyphs::fixed("●"),
            Self::Leaf(_) => Glyphs::fixed("○"),
        }
    }

    pub fn color(&self) -> u8 {
        match self {
            Self::Root => theme::ROOT_FG,
            Self::Namespace(_) => theme::NAMESPACE_FG,
            Self::Category(_) => theme::CATEGORY_FG,
            Self::Leaf(leaf) if leaf.is_loggable() => theme::LOGGABLE_FG,
            Self::Leaf(_) => theme::LEAF_FG,
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafRef> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_pods_are_loggable() {
        assert!(ResourceKind::Pods.is_loggable());
        assert!(!ResourceKind::ConfigMaps.is_loggable());
        assert!(!ResourceKind::Services.is_loggable());
    }

    #[test]
    fn test_category_builds_leaf_of_same_kind() {
        let category = CategoryRef::new(ResourceKind::Services, "kube-system");
        let leaf = category.leaf("kube-dns");
        assert_eq!(leaf.kind, ResourceKind::Services);
        assert_eq!(leaf.to_string(), "kube-system/service/kube-dns");
    }

    #[test]
    fn test_glyphs_distinguish_loggable_leaves() {
        let pod = ResourceRef::Leaf(LeafRef::new(ResourceKind::Pods, "ns", "p"));
        let svc = ResourceRef::Leaf(LeafRef::new(ResourceKind::Services, "ns", "s"));
        assert_ne!(pod.glyphs(), svc.glyphs());
        assert_ne!(pod.color(), svc.color());
    }
}
