//! Site navigation built from page paths.
//!
//! Pages are grouped with the same [`GroupTree`] used for tabs. The navbar
//! only nests one level, so deeper groups are flattened into their menu as
//! header entries:
//!
//! ```text
//! Reports/Regional/West   ──►  Reports ▾
//! Reports                       Summary
//!                               Regional       (header)
//!                               West
//! ```
//!
//! The sidebar keeps the full nesting as sections.

use super::tree::{GroupNode, GroupTree};
use crate::spec::TabPath;
use serde::Serialize;

/// A page as seen by the navigation builder.
#[derive(Debug, Clone)]
pub struct NavPage<'a> {
    pub title: &'a str,
    pub href: String,
    pub nav: Option<&'a TabPath>,
    pub sidebar: Option<&'a TabPath>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NavEntry {
    Link { text: String, href: String },
    Menu { text: String, menu: Vec<NavEntry> },
    /// Non-link label inside a menu.
    Header { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SidebarEntry {
    Link { text: String, href: String },
    Section {
        section: String,
        contents: Vec<SidebarEntry>,
    },
}

fn link(page: &NavPage<'_>) -> NavEntry {
    NavEntry::Link {
        text: page.title.to_owned(),
        href: page.href.clone(),
    }
}

/// Navbar entries: ungrouped pages first, then one menu per top-level group.
pub fn navbar(pages: &[NavPage<'_>]) -> Vec<NavEntry> {
    let tree = GroupTree::build(pages.iter().map(|page| (page.nav, page)));

    let mut entries: Vec<NavEntry> = tree.ungrouped().iter().map(|page| link(page)).collect();
    for group in tree.groups() {
        let mut menu = Vec::new();
        flatten_menu(group, None, &mut menu);
        entries.push(NavEntry::Menu {
            text: group.label().to_owned(),
            menu,
        });
    }
    entries
}

/// Menu entries of `node`: its own pages, then each sub-group as a header
/// followed by its entries.
fn flatten_menu(node: &GroupNode<&NavPage<'_>>, prefix: Option<&str>, menu: &mut Vec<NavEntry>) {
    menu.extend(node.items().iter().map(|page| link(page)));
    for child in node.children() {
        let label = match prefix {
            Some(prefix) => format!("{prefix} / {}", child.label()),
            None => child.label().to_owned(),
        };
        menu.push(NavEntry::Header {
            text: label.clone(),
        });
        flatten_menu(child, Some(&label), menu);
    }
}

/// Sidebar entries. Pages without a `sidebar` path fall back to their `nav`
/// path.
pub fn sidebar(pages: &[NavPage<'_>]) -> Vec<SidebarEntry> {
    let tree = GroupTree::build(pages.iter().map(|page| (page.sidebar.or(page.nav), page)));

    let mut entries: Vec<SidebarEntry> =
        tree.ungrouped().iter().map(|page| sidebar_link(page)).collect();
    entries.extend(tree.groups().iter().map(section));
    entries
}

fn sidebar_link(page: &NavPage<'_>) -> SidebarEntry {
    SidebarEntry::Link {
        text: page.title.to_owned(),
        href: page.href.clone(),
    }
}

fn section(node: &GroupNode<&NavPage<'_>>) -> SidebarEntry {
    let mut contents: Vec<SidebarEntry> =
        node.items().iter().map(|page| sidebar_link(page)).collect();
    contents.extend(node.children().iter().map(section));
    SidebarEntry::Section {
        section: node.label().to_owned(),
        contents,
    }
}
