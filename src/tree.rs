//! Tree passes run after scanning: include pruning, index assignment and
//! flattening into per-file records.

use crate::model::{DirNode, FileNode, FileRecord, Node, Tree};
use crate::pattern::PatternSet;
use indexmap::IndexMap;

/// Ordinal given to the first file in pre-order.
pub const FIRST_INDEX: usize = 1;

/// Keep files whose relative path matches `include`, plus their ancestors.
///
/// A directory whose own path matches survives even when emptied. The root
/// always survives. Without a pattern set the tree is returned unchanged.
pub fn prune<C>(tree: Tree<C>, include: Option<&PatternSet>) -> Tree<C> {
    let Some(include) = include else {
        return tree;
    };
    Tree {
        basename: tree.basename,
        root: prune_dir(tree.root, include),
    }
}

fn prune_dir<C>(dir: DirNode<C>, include: &PatternSet) -> DirNode<C> {
    let children = dir
        .children
        .into_iter()
        .filter_map(|(name, child)| match child {
            Node::File(file) => include
                .is_match(&file.rel_path)
                .then_some((name, Node::File(file))),
            Node::Directory(sub) => {
                let sub = prune_dir(sub, include);
                (!sub.children.is_empty() || include.is_match(&sub.rel_path))
                    .then_some((name, Node::Directory(sub)))
            }
        })
        .collect::<IndexMap<_, _>>();
    DirNode {
        rel_path: dir.rel_path,
        children,
    }
}

/// Number files `FIRST_INDEX..` in pre-order.
pub fn assign_indices<C>(mut tree: Tree<C>) -> Tree<C> {
    let mut next = FIRST_INDEX;
    number_dir(&mut tree.root, &mut next);
    tree
}

fn number_dir<C>(dir: &mut DirNode<C>, next: &mut usize) {
    for child in dir.children.values_mut() {
        match child {
            Node::File(file) => {
                file.index = Some(*next);
                *next += 1;
            }
            Node::Directory(sub) => number_dir(sub, next),
        }
    }
}

/// One record per file in pre-order, content converted by `convert`.
pub fn flatten<C, R>(tree: &Tree<C>, mut convert: impl FnMut(&C) -> R) -> Vec<FileRecord<R>> {
    let mut records = Vec::new();
    collect(&tree.root, &mut convert, &mut records);
    records
}

fn collect<C, R>(dir: &DirNode<C>, convert: &mut impl FnMut(&C) -> R, records: &mut Vec<FileRecord<R>>) {
    for (name, child) in &dir.children {
        match child {
            Node::File(FileNode {
                rel_path,
                index,
                content,
            }) => records.push(FileRecord {
                basename: name.clone(),
                rel_path: rel_path.clone(),
                kind: "file",
                index: *index,
                content: convert(content),
            }),
            Node::Directory(sub) => collect(sub, convert, records),
        }
    }
}
