//! Group-tree resolution.
//!
//! Turns a flat, ordered sequence of `(path, item)` pairs into a tree of
//! named groups. The same algorithm places content items into nested tabs
//! and pages into navbar menus or sidebar sections.
//!
//! # Ordering
//!
//! ```text
//! input                        tree
//! ─────────────────────        ──────────────────────
//! chart  "Sales/Q1"            ungrouped: [text]
//! chart  "Sales/Q2"     ──►    Sales
//! text   (none)                 ├── Q1: [chart]
//!                               └── Q2: [chart]
//! ```
//!
//! - siblings keep the order in which their label was first seen
//! - a path seen again appends to the existing node
//! - items without a path go to `ungrouped`

use super::ResolvedItem;
use crate::spec::TabPath;

/// One path segment: a label, its child groups and the items placed
/// directly under it.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupNode<T> {
    label: String,
    children: Vec<GroupNode<T>>,
    items: Vec<T>,
}

impl<T> GroupNode<T> {
    fn new(label: &str) -> Self {
        Self {
            label: label.to_owned(),
            children: Vec::new(),
            items: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn children(&self) -> &[GroupNode<T>] {
        &self.children
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn child(&self, label: &str) -> Option<&GroupNode<T>> {
        self.children.iter().find(|c| c.label == label)
    }

    /// Number of items in this node and all descendants.
    pub fn len(&self) -> usize {
        self.items.len() + self.children.iter().map(GroupNode::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn depth(&self) -> usize {
        1 + self.children.iter().map(GroupNode::depth).max().unwrap_or(0)
    }
}

/// Reuse the sibling labelled `label` or append a new one.
fn find_or_insert<'a, T>(siblings: &'a mut Vec<GroupNode<T>>, label: &str) -> &'a mut GroupNode<T> {
    let idx = match siblings.iter().position(|node| node.label == label) {
        Some(idx) => idx,
        None => {
            siblings.push(GroupNode::new(label));
            siblings.len() - 1
        }
    };
    &mut siblings[idx]
}

/// Top-level groups plus the items that belong to no group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTree<T> {
    ungrouped: Vec<T>,
    groups: Vec<GroupNode<T>>,
    /// Path of every inserted item, in insertion order (`None` = root).
    locations: Vec<Option<TabPath>>,
}

impl<T> Default for GroupTree<T> {
    fn default() -> Self {
        Self {
            ungrouped: Vec::new(),
            groups: Vec::new(),
            locations: Vec::new(),
        }
    }
}

impl<T> GroupTree<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from items in authored order.
    pub fn build<'p, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Option<&'p TabPath>, T)>,
    {
        let mut tree = Self::new();
        for (path, item) in entries {
            tree.insert(path, item);
        }
        tree
    }

    /// Append an item under `path`, creating missing nodes top-down.
    pub fn insert(&mut self, path: Option<&TabPath>, item: T) {
        self.locations.push(path.cloned());

        let Some(path) = path else {
            self.ungrouped.push(item);
            return;
        };

        let mut segments = path.segments();
        // TabPath is never empty
        let Some(first) = segments.next() else {
            self.ungrouped.push(item);
            return;
        };

        let mut node = find_or_insert(&mut self.groups, first);
        for segment in segments {
            node = find_or_insert(&mut node.children, segment);
        }
        node.items.push(item);
    }

    pub fn ungrouped(&self) -> &[T] {
        &self.ungrouped
    }

    pub fn groups(&self) -> &[GroupNode<T>] {
        &self.groups
    }

    /// Node reached by walking `path`, if it exists.
    pub fn node(&self, path: &TabPath) -> Option<&GroupNode<T>> {
        let mut segments = path.segments();
        let first = segments.next()?;
        let mut node = self.groups.iter().find(|n| n.label == first)?;
        for segment in segments {
            node = node.child(segment)?;
        }
        Some(node)
    }

    /// Where the `index`-th inserted item was placed; `None` means root.
    pub fn location(&self, index: usize) -> Option<&TabPath> {
        self.locations.get(index).and_then(Option::as_ref)
    }

    /// Deepest nesting level (0 when there are no groups).
    pub fn depth(&self) -> usize {
        self.groups.iter().map(GroupNode::depth).max().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// Tab tree of one page's items.
pub type TabTree<'a> = GroupTree<&'a ResolvedItem<'a>>;

/// Resolve a page's items into nested tab groups.
pub fn resolve_tabs<'a>(items: &'a [ResolvedItem<'a>]) -> TabTree<'a> {
    GroupTree::build(items.iter().map(|resolved| (resolved.item.tab_path(), resolved)))
}
