use crate::model::task::TaskNode;

/// Flatten the forest into the ordered sequence of tasks eligible for
/// display: pre-order, skipping completed top-level subtrees when
/// `show_completed` is false and the descendants of collapsed tasks.
///
/// Row addressing used by navigation is the 1-based position in this
/// sequence; there is no other ordering source.
pub fn visible_tasks(tree: &[TaskNode], show_completed: bool) -> Vec<&TaskNode> {
    let mut visible = Vec::new();
    collect(tree, true, show_completed, &mut visible);
    visible
}

fn collect<'a>(
    list: &'a [TaskNode],
    top_level: bool,
    show_completed: bool,
    out: &mut Vec<&'a TaskNode>,
) {
    for task in list {
        // The completed filter applies only at the top level; a completed
        // subtask stays visible under its parent.
        if top_level && task.completed && !show_completed {
            continue;
        }
        out.push(task);
        if !task.children.is_empty() && !task.collapsed {
            collect(&task.children, false, show_completed, out);
        }
    }
}
