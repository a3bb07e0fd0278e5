//! Inheritance walks over the host's class registry.
//!
//! Ancestors come from following superclass links; descendants can only be
//! found by scanning every class the host knows about, which costs
//! O(classes × depth). That is acceptable for a once-per-process audit and
//! is never done on a dispatch path.

use crate::runtime::{Class, Reflect};
use fxhash::FxHashSet;

/// A target class and every class related to it by ancestry or descent,
/// computed from the live registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchySnapshot {
    /// The class the snapshot was taken for.
    pub target: Class,
    /// `target` followed by its superclasses up to the root.
    pub ancestors: Vec<Class>,
    /// Classes whose superclass chain reaches `target`, in registry order.
    pub descendants: Vec<Class>,
}

impl HierarchySnapshot {
    /// Ancestors (including the target) followed by descendants.
    pub fn related(&self) -> impl Iterator<Item = Class> + '_ {
        self.ancestors.iter().chain(&self.descendants).copied()
    }

    /// Number of related classes, target included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ancestors.len() + self.descendants.len()
    }

    /// Always `false`: a snapshot contains at least its target.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `class` is the target, an ancestor, or a descendant.
    #[must_use]
    pub fn contains(&self, class: Class) -> bool {
        self.ancestors.contains(&class) || self.descendants.contains(&class)
    }
}

/// Computes ancestor and descendant sets.
pub struct HierarchyWalker<'r, R: Reflect + ?Sized> {
    host: &'r R,
}

impl<'r, R: Reflect + ?Sized> HierarchyWalker<'r, R> {
    /// Creates a walker over `host`.
    pub fn new(host: &'r R) -> Self {
        HierarchyWalker { host }
    }

    /// `class` and its superclasses, self first, root last.
    ///
    /// A class seen twice ends the walk, so a host reporting a malformed
    /// cyclic chain cannot make this loop forever.
    pub fn ancestors_of(&self, class: Class) -> Vec<Class> {
        let mut seen = FxHashSet::default();
        let mut chain = Vec::new();
        let mut current = Some(class);

        while let Some(cls) = current {
            if !seen.insert(cls) {
                break;
            }
            chain.push(cls);
            current = self.host.superclass(cls);
        }

        chain
    }

    /// Every registered class that inherits, directly or not, from `class`.
    /// `class` itself is not included.
    pub fn descendants_of(&self, class: Class) -> Vec<Class> {
        self.host
            .all_classes()
            .into_iter()
            .filter(|&candidate| candidate != class && self.inherits_from(candidate, class))
            .collect()
    }

    /// Whether `ancestor` appears in `class`'s superclass chain, starting at
    /// its parent.
    pub fn inherits_from(&self, class: Class, ancestor: Class) -> bool {
        self.ancestors_of(class).into_iter().skip(1).any(|c| c == ancestor)
    }

    /// Fresh snapshot of everything related to `target`.
    pub fn snapshot(&self, target: Class) -> HierarchySnapshot {
        HierarchySnapshot {
            target,
            ancestors: self.ancestors_of(target),
            descendants: self.descendants_of(target),
        }
    }
}
