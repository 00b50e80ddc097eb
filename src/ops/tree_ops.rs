use chrono::NaiveDate;

use crate::model::path::{self, MAX_DEPTH};
use crate::model::task::{TaskNode, TreeSnapshot};

/// Error type for tree operations
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("cannot add subtask: maximum nesting depth (3 levels) reached")]
    DepthLimit,
    #[error("drop target is not a sibling of the dragged task")]
    InvalidDrop,
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Find a task by id anywhere in the forest.
pub fn find<'a>(tree: &'a [TaskNode], id: &str) -> Option<&'a TaskNode> {
    for task in tree {
        if task.id == id {
            return Some(task);
        }
        if let Some(found) = find(&task.children, id) {
            return Some(found);
        }
    }
    None
}

/// Find a task by id anywhere in the forest, returning a mutable reference.
pub fn find_mut<'a>(tree: &'a mut [TaskNode], id: &str) -> Option<&'a mut TaskNode> {
    for task in tree.iter_mut() {
        if task.id == id {
            return Some(task);
        }
        if let Some(found) = find_mut(&mut task.children, id) {
            return Some(found);
        }
    }
    None
}

/// Next ordinal for a new top-level task: one past the highest numeric
/// top-level id. Scans the current ids rather than keeping a counter, since
/// renumbering after deletions moves ids back down.
pub fn next_main_ordinal(tree: &[TaskNode]) -> usize {
    let mut max = 0usize;
    for task in tree {
        if let Ok(n) = task.id.parse::<usize>()
            && n > max
        {
            max = n;
        }
    }
    max + 1
}

// ---------------------------------------------------------------------------
// Structural mutations
//
// Every one of these renumbers the affected sibling group before returning,
// so ids always mirror tree positions when the caller next reads the tree.
// ---------------------------------------------------------------------------

/// Append a new top-level task. Returns its assigned id.
pub fn add_main(tree: &mut TreeSnapshot, description: String, deadline: Option<NaiveDate>) -> String {
    let id = path::child_id_of("", next_main_ordinal(tree));
    tree.push(TaskNode::new(id, description, deadline));
    path::renumber(tree, "");
    tree.last().map(|t| t.id.clone()).unwrap_or_default()
}

/// Append a new subtask under `parent_id`. Returns the assigned id, or
/// `DepthLimit` when the parent already sits at the maximum depth.
pub fn add_sub(
    tree: &mut TreeSnapshot,
    parent_id: &str,
    description: String,
    deadline: Option<NaiveDate>,
) -> Result<String, TreeError> {
    let parent =
        find_mut(tree, parent_id).ok_or_else(|| TreeError::NotFound(parent_id.to_string()))?;
    if path::depth_of(&parent.id) >= MAX_DEPTH {
        return Err(TreeError::DepthLimit);
    }

    let id = path::child_id_of(&parent.id, parent.children.len() + 1);
    parent
        .children
        .push(TaskNode::new(id, description, deadline));
    let parent_id = parent.id.clone();
    path::renumber(&mut parent.children, &parent_id);
    Ok(parent.children.last().map(|t| t.id.clone()).unwrap_or_default())
}

/// Remove a task and its entire subtree, renumbering the surviving siblings.
/// Returns the removed subtree, or None when the id does not exist (no-op).
pub fn delete(tree: &mut TreeSnapshot, id: &str) -> Option<TaskNode> {
    remove_from(tree, "", id)
}

fn remove_from(siblings: &mut Vec<TaskNode>, parent_id: &str, id: &str) -> Option<TaskNode> {
    if let Some(pos) = siblings.iter().position(|t| t.id == id) {
        let removed = siblings.remove(pos);
        path::renumber(siblings, parent_id);
        return Some(removed);
    }
    for task in siblings.iter_mut() {
        let pid = task.id.clone();
        if let Some(removed) = remove_from(&mut task.children, &pid, id) {
            return Some(removed);
        }
    }
    None
}

/// Move `dragged_id` to the position of `target_id` within their shared
/// sibling group: remove first, then insert at the target's position as it
/// stands after the removal. Dropping a task onto itself is a no-op.
pub fn reorder(tree: &mut TreeSnapshot, dragged_id: &str, target_id: &str) -> Result<(), TreeError> {
    let parent_id = path::parent_id_of(dragged_id).to_string();
    if parent_id != path::parent_id_of(target_id) {
        return Err(TreeError::InvalidDrop);
    }
    if dragged_id == target_id {
        return Ok(());
    }

    let siblings: &mut Vec<TaskNode> = if parent_id.is_empty() {
        tree
    } else {
        let parent =
            find_mut(tree, &parent_id).ok_or_else(|| TreeError::NotFound(parent_id.clone()))?;
        &mut parent.children
    };

    let Some(from) = siblings.iter().position(|t| t.id == dragged_id) else {
        return Err(TreeError::NotFound(dragged_id.to_string()));
    };
    if !siblings.iter().any(|t| t.id == target_id) {
        return Err(TreeError::NotFound(target_id.to_string()));
    }

    let dragged = siblings.remove(from);
    let to = siblings
        .iter()
        .position(|t| t.id == target_id)
        .unwrap_or(from);
    siblings.insert(to, dragged);
    path::renumber(siblings, &parent_id);
    Ok(())
}

// ---------------------------------------------------------------------------
// In-place mutations (no renumbering needed)
// ---------------------------------------------------------------------------

/// Flip `completed` on the exact task; does not cascade up or down.
pub fn toggle_completed(tree: &mut TreeSnapshot, id: &str) -> Result<(), TreeError> {
    let task = find_mut(tree, id).ok_or_else(|| TreeError::NotFound(id.to_string()))?;
    task.completed = !task.completed;
    Ok(())
}

/// Flip `collapsed`. Tasks without children stay expanded (no-op).
pub fn toggle_collapsed(tree: &mut TreeSnapshot, id: &str) -> Result<(), TreeError> {
    let task = find_mut(tree, id).ok_or_else(|| TreeError::NotFound(id.to_string()))?;
    if task.children.is_empty() {
        return Ok(());
    }
    task.collapsed = !task.collapsed;
    Ok(())
}

/// Replace a task's description and deadline in place.
pub fn edit_fields(
    tree: &mut TreeSnapshot,
    id: &str,
    description: String,
    deadline: Option<NaiveDate>,
) -> Result<(), TreeError> {
    let task = find_mut(tree, id).ok_or_else(|| TreeError::NotFound(id.to_string()))?;
    task.description = description;
    task.deadline = deadline;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
