// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status tree: display grouping of a commit's jobs by variant path.
//!
//! Items are inserted in order with their path segments. At each level the
//! list is scanned front to back for a branch with the next segment; the item
//! descends into the first match, or a new branch is appended at the end.
//! Existing entries are never reordered or merged, so the tree keeps
//! insertion order within every group.

use smol_str::SmolStr;

/// One entry in a status tree level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node<T> {
    Leaf(T),
    Branch { segment: SmolStr, children: Vec<Node<T>> },
}

/// Insert `payload` under `path` into one level of a tree.
///
/// An empty `path` appends a leaf at this level.
pub fn insert<T, S: AsRef<str>>(nodes: &mut Vec<Node<T>>, path: &[S], payload: T) {
    let Some((first, rest)) = path.split_first() else {
        nodes.push(Node::Leaf(payload));
        return;
    };
    let first = first.as_ref();

    let existing = nodes
        .iter()
        .position(|node| matches!(node, Node::Branch { segment, .. } if segment == first));
    let index = existing.unwrap_or_else(|| {
        nodes.push(Node::Branch { segment: SmolStr::new(first), children: Vec::new() });
        nodes.len() - 1
    });

    if let Node::Branch { children, .. } = &mut nodes[index] {
        insert(children, rest, payload);
    }
}

/// Top level of a status tree. Built fresh per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTree<T> {
    nodes: Vec<Node<T>>,
}

impl<T> Default for StatusTree<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<T> StatusTree<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<S: AsRef<str>>(&mut self, path: &[S], payload: T) {
        insert(&mut self.nodes, path, payload);
    }

    pub fn nodes(&self) -> &[Node<T>] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Payloads in depth-first, left-to-right order.
    pub fn leaves(&self) -> Vec<&T> {
        fn walk<'a, T>(nodes: &'a [Node<T>], out: &mut Vec<&'a T>) {
            for node in nodes {
                match node {
                    Node::Leaf(payload) => out.push(payload),
                    Node::Branch { children, .. } => walk(children, out),
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.nodes, &mut out);
        out
    }
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;
