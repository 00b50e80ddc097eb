use serde::Serialize;

use crate::model::path;
use crate::model::task::TaskNode;
use crate::session::Session;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct RowJson {
    pub id: String,
    pub depth: usize,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    pub completed: bool,
    pub collapsed: bool,
}

#[derive(Serialize)]
pub struct PageListJson {
    pub active: String,
    pub pages: Vec<String>,
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn row_json(task: &TaskNode) -> RowJson {
    RowJson {
        id: task.id.clone(),
        depth: path::depth_of(&task.id),
        description: task.description.clone(),
        deadline: task.deadline.map(|d| d.format("%Y-%m-%d").to_string()),
        completed: task.completed,
        collapsed: task.collapsed,
    }
}

/// Print the active page's visible rows.
pub fn print_page(session: &Session, json: bool) {
    let rows = session.visible();

    if json {
        let rows: Vec<RowJson> = rows.iter().map(|t| row_json(t)).collect();
        println!("{}", serde_json::to_string_pretty(&rows).unwrap_or_default());
        return;
    }

    println!("# {}", session.active_page());
    if rows.is_empty() {
        println!("  (no tasks)");
        return;
    }
    for task in rows {
        let indent = "  ".repeat(path::depth_of(&task.id));
        let mark = if task.completed { "x" } else { " " };
        let fold = if task.collapsed && !task.children.is_empty() {
            " +"
        } else {
            ""
        };
        let deadline = match task.deadline {
            Some(d) => format!("  ({})", d.format("%Y-%m-%d")),
            None => String::new(),
        };
        println!(
            "{}[{}] {}  {}{}{}",
            indent, mark, task.id, task.description, deadline, fold
        );
    }
}

/// Print the page list, marking the active one.
pub fn print_pages(session: &Session, json: bool) {
    if json {
        let out = PageListJson {
            active: session.active_page().to_string(),
            pages: session.pages().to_vec(),
        };
        println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        return;
    }
    for page in session.pages() {
        let marker = if page == session.active_page() { "*" } else { " " };
        println!("{} {}", marker, page);
    }
}
