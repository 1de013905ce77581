// src/services/tree.rs

use std::collections::{HashMap, VecDeque};

use crate::models::comment::{Comment, CommentNode};

/// Deepest level at which replies are nested (the returned node is level 1).
/// Replies below it are listed flat under their level-`MAX_NESTING_DEPTH`
/// ancestor in thread order, each keeping its `parent_id`. Keeps the
/// recursive drop and serialization of `CommentNode` bounded.
pub const MAX_NESTING_DEPTH: usize = 32;

/// Which nodes `build_tree` returns once the batch is linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeMode {
    /// Every comment without a parent.
    RootsOnly,
    /// The single comment with this ID, children attached.
    SubtreeOf(i64),
}

/// Assembles a flat batch of comments into nested nodes.
///
/// Deleted comments are masked but keep their children. Children follow the
/// order of the input batch; no extra sorting is applied. A comment whose
/// parent is not part of the batch is linked as a root of the batch, which is
/// how a subtree fetch (the node plus its descendants, but not the node's own
/// parent) links correctly. Nesting stops at [`MAX_NESTING_DEPTH`].
pub fn build_tree(records: Vec<Comment>, mode: TreeMode) -> Vec<CommentNode> {
    let mut order = Vec::with_capacity(records.len());
    let mut index: HashMap<i64, CommentNode> = HashMap::with_capacity(records.len());

    for record in records {
        order.push(record.id);
        index.insert(record.id, CommentNode::from(record));
    }

    // parent id -> child ids, in input order
    let mut children: HashMap<i64, Vec<i64>> = HashMap::new();
    for id in &order {
        if let Some(parent_id) = index.get(id).and_then(|node| node.parent_id) {
            if index.contains_key(&parent_id) {
                children.entry(parent_id).or_default().push(*id);
            }
        }
    }

    match mode {
        TreeMode::RootsOnly => {
            let roots: Vec<i64> = order
                .into_iter()
                .filter(|id| index.get(id).is_some_and(|node| node.parent_id.is_none()))
                .collect();

            roots
                .into_iter()
                .filter_map(|id| assemble(id, &mut index, &children))
                .collect()
        }
        TreeMode::SubtreeOf(root_id) => assemble(root_id, &mut index, &children)
            .into_iter()
            .collect(),
    }
}

/// Masks each comment without nesting. Used for search results.
pub fn flatten_for_search(records: Vec<Comment>) -> Vec<CommentNode> {
    records.into_iter().map(CommentNode::from).collect()
}

/// Removes `id` from the index and attaches its descendants bottom-up.
///
/// Nodes are taken out of the index as they are placed, so a malformed batch
/// (duplicate IDs or a parent cycle) still terminates.
fn assemble(
    id: i64,
    index: &mut HashMap<i64, CommentNode>,
    children: &HashMap<i64, Vec<i64>>,
) -> Option<CommentNode> {
    let replies_of = |id: i64| -> VecDeque<i64> {
        children.get(&id).map(|ids| ids.iter().copied().collect()).unwrap_or_default()
    };

    let root = index.remove(&id)?;

    // Depth-first walk with an explicit stack; its length is the current depth.
    let mut stack: Vec<(CommentNode, VecDeque<i64>)> = vec![(root, replies_of(id))];

    loop {
        let next_child = match stack.last_mut() {
            Some((_, pending)) => pending.pop_front(),
            None => return None,
        };

        match next_child {
            Some(child_id) => {
                let Some(child) = index.remove(&child_id) else {
                    continue;
                };

                if stack.len() < MAX_NESTING_DEPTH {
                    stack.push((child, replies_of(child_id)));
                } else if let Some((deepest, pending)) = stack.last_mut() {
                    // Past the cap: attach as a sibling and visit its replies next.
                    for reply_id in replies_of(child_id).into_iter().rev() {
                        pending.push_front(reply_id);
                    }
                    deepest.children.push(child);
                }
            }
            None => {
                let (finished, _) = stack.pop()?;
                match stack.last_mut() {
                    Some((parent, _)) => parent.children.push(finished),
                    None => return Some(finished),
                }
            }
        }
    }
}
