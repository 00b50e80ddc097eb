//! Positional path ids.
//!
//! A task's id is a dotted sequence of 1-based sibling positions (`3`, `3.2`,
//! `3.2.1`), so the id encodes both depth and position. The functions here are
//! pure; keeping ids in sync with tree positions after a structural change is
//! done by [`renumber`].

use super::task::TaskNode;

/// Maximum nesting depth (0-based): depth-2 tasks cannot have children.
pub const MAX_DEPTH: usize = 2;

/// Nesting depth of an id: the number of `.` separators.
pub fn depth_of(id: &str) -> usize {
    id.chars().filter(|c| *c == '.').count()
}

/// Parent id, obtained by dropping the last segment. Top-level ids have no
/// parent, denoted by the empty string.
pub fn parent_id_of(id: &str) -> &str {
    match id.rfind('.') {
        Some(pos) => &id[..pos],
        None => "",
    }
}

/// Build a child id from a parent id and a 1-based ordinal.
pub fn child_id_of(parent_id: &str, ordinal: usize) -> String {
    if parent_id.is_empty() {
        ordinal.to_string()
    } else {
        format!("{}.{}", parent_id, ordinal)
    }
}

/// Reassign positional ids to a sibling group after a structural change.
///
/// Every member gets `child_id_of(parent_id, position + 1)`, and its children
/// are renumbered recursively under the newly assigned id (descendant ids
/// embed every ancestor id, so the rewrite has to propagate all the way down).
pub fn renumber(siblings: &mut [TaskNode], parent_id: &str) {
    for (i, task) in siblings.iter_mut().enumerate() {
        task.id = child_id_of(parent_id, i + 1);
        if !task.children.is_empty() {
            let id = task.id.clone();
            renumber(&mut task.children, &id);
        }
    }
}
