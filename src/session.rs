use chrono::NaiveDate;

use crate::io::state::{self, UiState};
use crate::io::store::{Backup, DEFAULT_PAGE, PageStore, StoreError, UndoSlot};
use crate::model::path;
use crate::model::task::{TaskNode, TreeSnapshot};
use crate::ops::tree_ops::{self, TreeError};
use crate::ops::visible;

/// Error type for session and page-registry operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("page not found: {0}")]
    PageNotFound(String),
    #[error("a page named \"{0}\" already exists")]
    DuplicatePage(String),
    #[error("the \"default\" page cannot be renamed or removed")]
    ProtectedPage,
    #[error("page name cannot be empty")]
    EmptyPageName,
    #[error("page name cannot contain '/': {0}")]
    InvalidPageName(String),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The active editing session: the page registry, the active page's tree,
/// the single-slot undo buffer, and the focus row. All mutations go through
/// here so that every change is persisted before the caller reads again.
pub struct Session {
    store: PageStore,
    pages: Vec<String>,
    active: String,
    tree: TreeSnapshot,
    /// Snapshot taken right before the last delete; one level only
    undo_slot: Option<TreeSnapshot>,
    show_completed: bool,
    /// 1-based row in the visible projection
    focus: usize,
}

impl Session {
    /// Open a session. `requested` (e.g. from a --page flag) wins when it
    /// names an existing page; otherwise the last active page from the
    /// persisted UI state is used, falling back to "default".
    pub fn open(store: PageStore, requested: Option<&str>) -> Session {
        let pages = store.load_pages();
        let ui = state::read_ui_state(store.dir()).unwrap_or_default();
        let wanted = requested.unwrap_or(ui.active_page.as_str());
        let active = if pages.iter().any(|p| p == wanted) {
            wanted.to_string()
        } else {
            DEFAULT_PAGE.to_string()
        };

        let mut tree = store.load_tree(&active);
        // Blobs written by older versions may carry sparse ids; re-establish
        // the positional invariant before anything reads the tree.
        path::renumber(&mut tree, "");

        // A pre-delete snapshot left by an earlier invocation is still
        // undoable, as long as it belongs to the page being activated.
        let undo_slot = store
            .load_undo()
            .filter(|slot| slot.page == active)
            .map(|slot| slot.tree);

        Session {
            store,
            pages,
            active,
            tree,
            undo_slot,
            show_completed: ui.show_completed,
            focus: 1,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn active_page(&self) -> &str {
        &self.active
    }

    pub fn tree(&self) -> &TreeSnapshot {
        &self.tree
    }

    pub fn show_completed(&self) -> bool {
        self.show_completed
    }

    /// The flattened, collapse- and filter-aware display sequence.
    pub fn visible(&self) -> Vec<&TaskNode> {
        visible::visible_tasks(&self.tree, self.show_completed)
    }

    pub fn find(&self, id: &str) -> Option<&TaskNode> {
        tree_ops::find(&self.tree, id)
    }

    // -----------------------------------------------------------------------
    // Task mutations — mutate, then persist synchronously
    // -----------------------------------------------------------------------

    /// Add a top-level task and move focus to it. Returns the new id.
    pub fn add_main(
        &mut self,
        description: String,
        deadline: Option<NaiveDate>,
    ) -> Result<String, SessionError> {
        let id = tree_ops::add_main(&mut self.tree, description, deadline);
        self.persist_tree()?;
        self.focus_on(&id);
        Ok(id)
    }

    /// Add a subtask and move focus to it. Returns the new id.
    pub fn add_sub(
        &mut self,
        parent_id: &str,
        description: String,
        deadline: Option<NaiveDate>,
    ) -> Result<String, SessionError> {
        let id = tree_ops::add_sub(&mut self.tree, parent_id, description, deadline)?;
        self.persist_tree()?;
        self.focus_on(&id);
        Ok(id)
    }

    /// Delete a task and its subtree. The pre-delete tree is kept in the
    /// undo slot (replacing whatever was there) only when something was
    /// actually removed, so a miss cannot clobber an earlier snapshot.
    pub fn delete(&mut self, id: &str) -> Result<(), SessionError> {
        let snapshot = self.tree.clone();
        match tree_ops::delete(&mut self.tree, id) {
            Some(_) => {
                self.persist_tree()?;
                let slot = UndoSlot {
                    page: self.active.clone(),
                    tree: snapshot,
                };
                let _ = self.store.save_undo(&slot);
                self.undo_slot = Some(slot.tree);
                self.clamp_focus();
                Ok(())
            }
            None => Err(TreeError::NotFound(id.to_string()).into()),
        }
    }

    /// Restore the pre-delete snapshot, if any. Returns whether anything was
    /// undone; an empty slot is a reported no-op, not an error.
    pub fn undo(&mut self) -> Result<bool, SessionError> {
        match self.undo_slot.take() {
            Some(snapshot) => {
                self.tree = snapshot;
                self.persist_tree()?;
                self.store.clear_undo();
                self.clamp_focus();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn toggle_completed(&mut self, id: &str) -> Result<(), SessionError> {
        tree_ops::toggle_completed(&mut self.tree, id)?;
        self.persist_tree()?;
        self.clamp_focus();
        Ok(())
    }

    pub fn toggle_collapsed(&mut self, id: &str) -> Result<(), SessionError> {
        tree_ops::toggle_collapsed(&mut self.tree, id)?;
        self.persist_tree()?;
        self.clamp_focus();
        Ok(())
    }

    pub fn edit(
        &mut self,
        id: &str,
        description: String,
        deadline: Option<NaiveDate>,
    ) -> Result<(), SessionError> {
        tree_ops::edit_fields(&mut self.tree, id, description, deadline)?;
        self.persist_tree()?;
        Ok(())
    }

    /// Move `dragged_id` to `target_id`'s position. Returns whether the tree
    /// changed: a cross-parent drop is a normal consequence of an imprecise
    /// gesture and is ignored without an error.
    pub fn reorder(&mut self, dragged_id: &str, target_id: &str) -> Result<bool, SessionError> {
        match tree_ops::reorder(&mut self.tree, dragged_id, target_id) {
            Ok(()) => {
                self.persist_tree()?;
                Ok(true)
            }
            Err(TreeError::InvalidDrop) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Flip the completed-tasks filter. Returns the new value.
    pub fn toggle_show_completed(&mut self) -> bool {
        self.show_completed = !self.show_completed;
        self.persist_ui();
        self.clamp_focus();
        self.show_completed
    }

    // -----------------------------------------------------------------------
    // Focus row
    // -----------------------------------------------------------------------

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn focused_task(&self) -> Option<&TaskNode> {
        self.visible().get(self.focus.wrapping_sub(1)).copied()
    }

    /// Move focus to the row showing `id`, if it is visible.
    pub fn focus_on(&mut self, id: &str) {
        if let Some(pos) = self.visible().iter().position(|t| t.id == id) {
            self.focus = pos + 1;
        }
    }

    /// Move focus up one row, wrapping to the last row.
    pub fn focus_up(&mut self) {
        let count = self.visible().len();
        if count == 0 {
            self.focus = 1;
        } else if self.focus <= 1 {
            self.focus = count;
        } else {
            self.focus -= 1;
        }
    }

    /// Move focus down one row, wrapping to the first row.
    pub fn focus_down(&mut self) {
        let count = self.visible().len();
        if count == 0 || self.focus >= count {
            self.focus = 1;
        } else {
            self.focus += 1;
        }
    }

    fn clamp_focus(&mut self) {
        let count = self.visible().len();
        self.focus = self.focus.clamp(1, count.max(1));
    }

    // -----------------------------------------------------------------------
    // Page registry
    // -----------------------------------------------------------------------

    /// Create an empty page. The name must be new, non-empty, and usable as
    /// a file name.
    pub fn add_page(&mut self, name: &str) -> Result<(), SessionError> {
        validate_page_name(name)?;
        if self.pages.iter().any(|p| p == name) {
            return Err(SessionError::DuplicatePage(name.to_string()));
        }
        self.pages.push(name.to_string());
        self.store.save_pages(&self.pages)?;
        self.store.save_tree(name, &TreeSnapshot::new())?;
        Ok(())
    }

    /// Remove a page and its blob. The default page is protected; removing
    /// the active page falls back to "default".
    pub fn remove_page(&mut self, name: &str) -> Result<(), SessionError> {
        if name == DEFAULT_PAGE {
            return Err(SessionError::ProtectedPage);
        }
        let Some(pos) = self.pages.iter().position(|p| p == name) else {
            return Err(SessionError::PageNotFound(name.to_string()));
        };
        self.pages.remove(pos);
        self.store.save_pages(&self.pages)?;
        self.store.remove_tree(name);
        if self.active == name {
            self.activate(DEFAULT_PAGE);
        }
        Ok(())
    }

    /// Rename a page, transferring its blob. The default page is protected.
    pub fn rename_page(&mut self, old: &str, new: &str) -> Result<(), SessionError> {
        if old == DEFAULT_PAGE {
            return Err(SessionError::ProtectedPage);
        }
        validate_page_name(new)?;
        if self.pages.iter().any(|p| p == new) {
            return Err(SessionError::DuplicatePage(new.to_string()));
        }
        let Some(pos) = self.pages.iter().position(|p| p == old) else {
            return Err(SessionError::PageNotFound(old.to_string()));
        };
        self.pages[pos] = new.to_string();
        self.store.save_pages(&self.pages)?;
        self.store.rename_tree(old, new)?;
        if self.active == old {
            self.active = new.to_string();
            self.persist_ui();
            // The slot stays with the renamed page
            if let Some(tree) = &self.undo_slot {
                let _ = self.store.save_undo(&UndoSlot {
                    page: new.to_string(),
                    tree: tree.clone(),
                });
            }
        }
        Ok(())
    }

    /// Make another page active: reload its tree, drop the undo slot (undo
    /// never crosses pages), and reset focus to the first row.
    pub fn switch_to(&mut self, name: &str) -> Result<(), SessionError> {
        if !self.pages.iter().any(|p| p == name) {
            return Err(SessionError::PageNotFound(name.to_string()));
        }
        self.activate(name);
        Ok(())
    }

    /// Cycle to the next page, wrapping around. Returns the new active name.
    pub fn next_page(&mut self) -> String {
        self.cycle(1)
    }

    /// Cycle to the previous page, wrapping around. Returns the new active name.
    pub fn prev_page(&mut self) -> String {
        self.cycle(-1)
    }

    fn cycle(&mut self, step: isize) -> String {
        let len = self.pages.len() as isize;
        let idx = self
            .pages
            .iter()
            .position(|p| *p == self.active)
            .unwrap_or(0) as isize;
        let next = (idx + step).rem_euclid(len.max(1)) as usize;
        let name = self.pages[next].clone();
        self.activate(&name);
        name
    }

    fn activate(&mut self, name: &str) {
        self.active = name.to_string();
        self.tree = self.store.load_tree(name);
        path::renumber(&mut self.tree, "");
        // Undo never crosses pages
        self.undo_slot = None;
        self.store.clear_undo();
        self.focus = 1;
        self.persist_ui();
    }

    // -----------------------------------------------------------------------
    // Export / import
    // -----------------------------------------------------------------------

    /// Serialize every page into the backup payload.
    pub fn export_all(&self) -> String {
        self.store.export_all().to_json()
    }

    /// Replace the whole registry and all blobs from a backup payload. The
    /// payload is validated in full before anything is written; afterwards
    /// the active page is re-resolved (falling back to "default" when the
    /// import removed it).
    pub fn import_all(&mut self, payload: &str) -> Result<(), SessionError> {
        let backup = Backup::from_json(payload)?;
        self.store.import_all(&backup)?;
        self.pages = self.store.load_pages();
        let active = if self.pages.iter().any(|p| *p == self.active) {
            self.active.clone()
        } else {
            DEFAULT_PAGE.to_string()
        };
        self.activate(&active);
        Ok(())
    }

    /// The active page's raw stored blob, for a single-page export.
    pub fn export_page(&self) -> String {
        self.store.raw_tree(&self.active)
    }

    /// Import a single page's snapshot into `page` (default: the active
    /// page), creating the page if it is new, then switch to it. A payload
    /// that is not a task array aborts with no state change.
    pub fn import_page(&mut self, page: Option<&str>, payload: &str) -> Result<(), SessionError> {
        let mut tree: TreeSnapshot = serde_json::from_str(payload)
            .map_err(|e| StoreError::MalformedImport(e.to_string()))?;
        path::renumber(&mut tree, "");

        let target = match page {
            Some(name) => name.to_string(),
            None => self.active.clone(),
        };
        if !self.pages.iter().any(|p| *p == target) {
            validate_page_name(&target)?;
            self.pages.push(target.clone());
            self.store.save_pages(&self.pages)?;
        }
        self.store.save_tree(&target, &tree)?;
        self.activate(&target);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Persistence helpers
    // -----------------------------------------------------------------------

    fn persist_tree(&self) -> Result<(), StoreError> {
        self.store.save_tree(&self.active, &self.tree)
    }

    fn persist_ui(&self) {
        let ui = UiState {
            active_page: self.active.clone(),
            show_completed: self.show_completed,
        };
        let _ = state::write_ui_state(self.store.dir(), &ui);
    }
}

/// Page names double as file names, so they must be non-empty and free of
/// path separators.
fn validate_page_name(name: &str) -> Result<(), SessionError> {
    if name.trim().is_empty() {
        return Err(SessionError::EmptyPageName);
    }
    if name.contains('/') || name.contains('\\') {
        return Err(SessionError::InvalidPageName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn temp_session() -> (TempDir, Session) {
        let tmp = TempDir::new().unwrap();
        let store = PageStore::open(tmp.path()).unwrap();
        (tmp, Session::open(store, None))
    }

    fn reopen(tmp: &TempDir, page: Option<&str>) -> Session {
        Session::open(PageStore::open(tmp.path()).unwrap(), page)
    }

    // --- undo ---

    #[test]
    fn undo_restores_pre_delete_tree() {
        let (_tmp, mut session) = temp_session();
        session.add_main("write report".into(), None).unwrap();
        session.add_main("plan trip".into(), None).unwrap();
        session.add_sub("2", "book flights".into(), None).unwrap();
        let before = session.tree().clone();

        session.delete("2").unwrap();
        assert_eq!(session.tree().len(), 1);

        assert!(session.undo().unwrap());
        assert_eq!(session.tree(), &before);
    }

    #[test]
    fn undo_slot_survives_reopen() {
        let (tmp, mut session) = temp_session();
        session.add_main("keep".into(), None).unwrap();
        session.add_main("drop".into(), None).unwrap();
        session.delete("2").unwrap();
        drop(session);

        let mut session2 = reopen(&tmp, None);
        assert!(session2.undo().unwrap());
        assert_eq!(session2.tree().len(), 2);
        assert_eq!(session2.tree()[1].description, "drop");
        // Slot consumed
        assert!(!session2.undo().unwrap());
    }

    #[test]
    fn stale_undo_slot_from_other_page_ignored() {
        let (tmp, mut session) = temp_session();
        session.add_page("work").unwrap();
        session.add_main("a".into(), None).unwrap();
        session.delete("1").unwrap();
        drop(session);

        // Opening on a different page must not offer the default page's slot
        let mut session2 = reopen(&tmp, Some("work"));
        assert!(!session2.undo().unwrap());
    }

    #[test]
    fn undo_empty_slot_reports_noop() {
        let (_tmp, mut session) = temp_session();
        session.add_main("a".into(), None).unwrap();
        assert!(!session.undo().unwrap());
        assert_eq!(session.tree().len(), 1);
    }

    #[test]
    fn only_delete_arms_the_undo_slot() {
        let (_tmp, mut session) = temp_session();
        session.add_main("a".into(), None).unwrap();
        session.add_main("b".into(), None).unwrap();
        session.delete("2").unwrap();
        // Non-destructive operations leave the slot alone
        session.toggle_completed("1").unwrap();
        session.edit("1", "a edited".into(), None).unwrap();

        assert!(session.undo().unwrap());
        // Slot restored the pre-delete tree (with "b"), slot now empty
        assert_eq!(session.tree().len(), 2);
        assert!(!session.undo().unwrap());
    }

    #[test]
    fn failed_delete_keeps_previous_snapshot() {
        let (_tmp, mut session) = temp_session();
        session.add_main("a".into(), None).unwrap();
        session.add_main("b".into(), None).unwrap();
        session.delete("2").unwrap();
        assert!(session.delete("9").is_err());
        // The miss did not clobber the snapshot from the real delete
        assert!(session.undo().unwrap());
        assert_eq!(session.tree().len(), 2);
    }

    // --- persistence ---

    #[test]
    fn mutations_persist_immediately() {
        let (tmp, mut session) = temp_session();
        session.add_main("write report".into(), None).unwrap();
        session.toggle_completed("1").unwrap();

        let session2 = reopen(&tmp, None);
        assert_eq!(session2.tree().len(), 1);
        assert!(session2.tree()[0].completed);
    }

    #[test]
    fn sparse_ids_normalized_on_load() {
        let tmp = TempDir::new().unwrap();
        let store = PageStore::open(tmp.path()).unwrap();
        // Blob in the shape older versions left behind after deletes
        std::fs::write(
            tmp.path().join("pages").join("default.json"),
            r#"[{"id":"2","description":"a","deadline":"","completed":false,"collapsed":false,"children":[]},
                {"id":"5","description":"b","deadline":"","completed":false,"collapsed":false,"children":[{"id":"5.3","description":"b1","deadline":"","completed":false,"collapsed":false,"children":[]}]}]"#,
        )
        .unwrap();

        let session = Session::open(store, None);
        assert_eq!(session.tree()[0].id, "1");
        assert_eq!(session.tree()[1].id, "2");
        assert_eq!(session.tree()[1].children[0].id, "2.1");
    }

    // --- pages ---

    #[test]
    fn pages_are_isolated() {
        let (_tmp, mut session) = temp_session();
        session.add_main("home task".into(), None).unwrap();
        session.add_page("work").unwrap();
        session.switch_to("work").unwrap();
        session.add_main("work task".into(), None).unwrap();
        session.delete("1").unwrap();

        session.switch_to("default").unwrap();
        assert_eq!(session.tree().len(), 1);
        assert_eq!(session.tree()[0].description, "home task");
    }

    #[test]
    fn switch_discards_undo() {
        let (_tmp, mut session) = temp_session();
        session.add_main("a".into(), None).unwrap();
        session.add_page("work").unwrap();
        session.delete("1").unwrap();
        session.switch_to("work").unwrap();
        assert!(!session.undo().unwrap());
    }

    #[test]
    fn switch_resets_focus() {
        let (_tmp, mut session) = temp_session();
        session.add_main("a".into(), None).unwrap();
        session.add_main("b".into(), None).unwrap();
        assert_eq!(session.focus(), 2);
        session.add_page("work").unwrap();
        session.switch_to("work").unwrap();
        assert_eq!(session.focus(), 1);
    }

    #[test]
    fn default_page_protected() {
        let (_tmp, mut session) = temp_session();
        assert!(matches!(
            session.remove_page("default"),
            Err(SessionError::ProtectedPage)
        ));
        assert!(matches!(
            session.rename_page("default", "main"),
            Err(SessionError::ProtectedPage)
        ));
    }

    #[test]
    fn duplicate_and_invalid_page_names_rejected() {
        let (_tmp, mut session) = temp_session();
        session.add_page("work").unwrap();
        assert!(matches!(
            session.add_page("work"),
            Err(SessionError::DuplicatePage(_))
        ));
        assert!(matches!(
            session.add_page(""),
            Err(SessionError::EmptyPageName)
        ));
        assert!(matches!(
            session.add_page("a/b"),
            Err(SessionError::InvalidPageName(_))
        ));
        assert!(matches!(
            session.rename_page("work", ""),
            Err(SessionError::EmptyPageName)
        ));
    }

    #[test]
    fn remove_active_page_falls_back_to_default() {
        let (_tmp, mut session) = temp_session();
        session.add_page("work").unwrap();
        session.switch_to("work").unwrap();
        session.remove_page("work").unwrap();
        assert_eq!(session.active_page(), "default");
        assert_eq!(session.pages(), ["default"]);
    }

    #[test]
    fn rename_moves_tree_and_follows_active() {
        let (tmp, mut session) = temp_session();
        session.add_page("work").unwrap();
        session.switch_to("work").unwrap();
        session.add_main("ship release".into(), None).unwrap();
        session.rename_page("work", "job").unwrap();
        assert_eq!(session.active_page(), "job");

        let session2 = reopen(&tmp, Some("job"));
        assert_eq!(session2.tree()[0].description, "ship release");
        assert_eq!(session2.pages(), ["default", "job"]);
    }

    #[test]
    fn page_cycling_wraps() {
        let (_tmp, mut session) = temp_session();
        session.add_page("work").unwrap();
        session.add_page("errands").unwrap();
        assert_eq!(session.next_page(), "work");
        assert_eq!(session.next_page(), "errands");
        assert_eq!(session.next_page(), "default");
        assert_eq!(session.prev_page(), "errands");
    }

    #[test]
    fn unknown_requested_page_falls_back_to_default() {
        let (tmp, mut session) = temp_session();
        session.add_main("a".into(), None).unwrap();
        let session2 = reopen(&tmp, Some("nope"));
        assert_eq!(session2.active_page(), "default");
    }

    #[test]
    fn last_active_page_remembered() {
        let (tmp, mut session) = temp_session();
        session.add_page("work").unwrap();
        session.switch_to("work").unwrap();
        drop(session);
        let session2 = reopen(&tmp, None);
        assert_eq!(session2.active_page(), "work");
    }

    // --- focus ---

    #[test]
    fn add_focuses_new_task() {
        let (_tmp, mut session) = temp_session();
        session.add_main("a".into(), None).unwrap();
        session.add_main("b".into(), None).unwrap();
        assert_eq!(session.focused_task().unwrap().id, "2");
        session.add_sub("1", "a1".into(), None).unwrap();
        assert_eq!(session.focused_task().unwrap().id, "1.1");
    }

    #[test]
    fn focus_wraps_both_ways() {
        let (_tmp, mut session) = temp_session();
        session.add_main("a".into(), None).unwrap();
        session.add_main("b".into(), None).unwrap();
        session.add_main("c".into(), None).unwrap();
        assert_eq!(session.focus(), 3);
        session.focus_down();
        assert_eq!(session.focus(), 1);
        session.focus_up();
        assert_eq!(session.focus(), 3);
        session.focus_up();
        assert_eq!(session.focus(), 2);
    }

    #[test]
    fn focus_clamped_when_rows_disappear() {
        let (_tmp, mut session) = temp_session();
        session.add_main("a".into(), None).unwrap();
        session.add_main("b".into(), None).unwrap();
        assert_eq!(session.focus(), 2);
        session.delete("2").unwrap();
        assert_eq!(session.focus(), 1);
    }

    // --- show-completed filter ---

    #[test]
    fn toggle_show_completed_persists() {
        let (tmp, mut session) = temp_session();
        session.add_main("a".into(), None).unwrap();
        session.toggle_completed("1").unwrap();
        assert_eq!(session.visible().len(), 1);
        assert!(!session.toggle_show_completed());
        assert_eq!(session.visible().len(), 0);

        let session2 = reopen(&tmp, None);
        assert!(!session2.show_completed());
    }

    // --- reorder boundary ---

    #[test]
    fn invalid_drop_is_silent() {
        let (_tmp, mut session) = temp_session();
        session.add_main("a".into(), None).unwrap();
        session.add_main("b".into(), None).unwrap();
        session.add_sub("1", "a1".into(), None).unwrap();
        // Cross-parent drop: ignored, tree untouched
        assert!(!session.reorder("1.1", "2").unwrap());
        assert_eq!(session.find("1.1").unwrap().description, "a1");
        // Real reorder still works
        assert!(session.reorder("2", "1").unwrap());
        assert_eq!(session.tree()[0].description, "b");
    }

    // --- export / import ---

    #[test]
    fn bulk_backup_round_trip() {
        let (_tmp, mut session) = temp_session();
        session.add_main("home task".into(), None).unwrap();
        session.add_page("work").unwrap();
        session.switch_to("work").unwrap();
        session.add_main("work task".into(), None).unwrap();
        let payload = session.export_all();

        let (_tmp2, mut other) = temp_session();
        other.add_main("to be overwritten".into(), None).unwrap();
        other.import_all(&payload).unwrap();
        assert_eq!(other.pages(), ["default", "work"]);
        // The active "default" page now holds the backup's tree
        assert_eq!(other.tree().len(), 1);
        assert_eq!(other.tree()[0].description, "home task");
        other.switch_to("work").unwrap();
        assert_eq!(other.tree()[0].description, "work task");
    }

    #[test]
    fn malformed_bulk_import_leaves_state() {
        let (_tmp, mut session) = temp_session();
        session.add_main("keep me".into(), None).unwrap();
        assert!(session.import_all(r#"{"pages": ["default"]}"#).is_err());
        assert!(session.import_all("garbage").is_err());
        assert_eq!(session.tree()[0].description, "keep me");
    }

    #[test]
    fn single_page_export_import() {
        let (_tmp, mut session) = temp_session();
        session.add_main("a".into(), None).unwrap();
        session.add_sub("1", "a1".into(), None).unwrap();
        let blob = session.export_page();

        let (_tmp2, mut other) = temp_session();
        other.import_page(Some("copied"), &blob).unwrap();
        assert_eq!(other.active_page(), "copied");
        assert_eq!(other.tree().len(), 1);
        assert_eq!(other.tree()[0].children[0].id, "1.1");
    }

    #[test]
    fn malformed_single_import_aborts() {
        let (_tmp, mut session) = temp_session();
        session.add_main("keep me".into(), None).unwrap();
        assert!(session.import_page(None, "{\"not\": \"an array\"}").is_err());
        assert_eq!(session.tree()[0].description, "keep me");
    }
}
