use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single task with its nested subtasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskNode {
    /// Positional path id like `3`, `3.2`, or `3.2.1`
    pub id: String,
    /// Description text; inline markup is stored verbatim
    #[serde(default)]
    pub description: String,
    /// Optional deadline, stored as `YYYY-MM-DD` (empty string when unset)
    #[serde(default, with = "deadline_codec")]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
    /// Whether subtasks are hidden from the visible projection
    #[serde(default)]
    pub collapsed: bool,
    /// Nested subtasks, in display order
    #[serde(default)]
    pub children: Vec<TaskNode>,
}

/// The ordered forest of top-level tasks for one page
pub type TreeSnapshot = Vec<TaskNode>;

impl TaskNode {
    pub fn new(id: String, description: String, deadline: Option<NaiveDate>) -> Self {
        TaskNode {
            id,
            description,
            deadline,
            completed: false,
            collapsed: false,
            children: Vec::new(),
        }
    }
}

/// Parse a stored deadline string. Accepts `YYYY-MM-DD` and, for blobs written
/// by older versions, a full RFC 3339 timestamp (the date part is kept).
/// Empty or unparseable input yields None.
pub fn parse_deadline(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    chrono::DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Serde codec mapping `Option<NaiveDate>` to the stored string form
/// (`YYYY-MM-DD`, or `""` when unset).
mod deadline_codec {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(super::parse_deadline(&raw))
    }
}
