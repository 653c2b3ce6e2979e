//! Notes page
//!
//! Editor changes stay in the draft until `save`, checklist toggles
//! included. Toggling an item on a note card outside the editor writes
//! through at once.

use askbook_backend::domain::{DomainError, DomainResult, Note, NoteColor, Principal};
use askbook_backend::repository::EntityService;

use crate::context::AppContext;
use crate::draft::NoteDraft;
use crate::store::LiveList;

/// The note currently open in the editor
pub struct NoteEditor {
    original: Note,
    draft: NoteDraft,
}

impl NoteEditor {
    fn open(note: Note) -> Self {
        Self {
            draft: NoteDraft::from_note(&note),
            original: note,
        }
    }

    pub fn note_id(&self) -> &str {
        &self.original.id
    }

    pub fn original(&self) -> &Note {
        &self.original
    }

    pub fn draft(&self) -> &NoteDraft {
        &self.draft
    }

    pub fn is_dirty(&self) -> bool {
        self.draft.is_dirty(&self.original)
    }
}

pub struct NotesPage {
    ctx: AppContext,
    principal: Principal,
    notes: LiveList<Note>,
    editor: Option<NoteEditor>,
}

impl NotesPage {
    pub async fn open(ctx: AppContext) -> DomainResult<Self> {
        let principal = ctx.principal()?;
        let subscription = ctx.notes.subscribe(&principal).await.map_err(|e| {
            ctx.notices.error("Failed to load notes", &e);
            e
        })?;
        Ok(Self {
            ctx,
            principal,
            notes: LiveList::new(subscription),
            editor: None,
        })
    }

    /// Apply the next snapshot; false once the subscription is gone
    pub async fn sync(&mut self) -> bool {
        match self.notes.pump().await {
            Ok(changed) => changed,
            Err(e) => {
                self.ctx.notices.error("Lost connection to notes", &e);
                false
            }
        }
    }

    pub fn notes(&self) -> &[Note] {
        self.notes.items()
    }

    pub fn is_loading(&self) -> bool {
        self.notes.is_loading()
    }

    pub fn editor(&self) -> Option<&NoteEditor> {
        self.editor.as_ref()
    }

    /// Store an empty note, then open it in the editor
    pub async fn create_note(&mut self) -> Option<String> {
        let mut note = Note::new(self.ctx.now_millis());
        match self.ctx.notes.create(&self.principal, &note).await {
            Ok(id) => {
                self.ctx.notices.success("New note created");
                note.id = id.clone();
                self.editor = Some(NoteEditor::open(note));
                Some(id)
            }
            Err(e) => {
                self.ctx.notices.error("Failed to create note", &e);
                None
            }
        }
    }

    pub fn start_editing(&mut self, note_id: &str) -> DomainResult<()> {
        let note = self
            .notes()
            .iter()
            .find(|n| n.id == note_id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("note {}", note_id)))?;
        self.editor = Some(NoteEditor::open(note));
        Ok(())
    }

    /// Discard the draft
    pub fn close_editor(&mut self) {
        self.editor = None;
    }

    fn draft_mut(&mut self) -> Option<&mut NoteDraft> {
        self.editor.as_mut().map(|editor| &mut editor.draft)
    }

    pub fn set_title(&mut self, title: &str) {
        if let Some(draft) = self.draft_mut() {
            draft.title = title.to_string();
        }
    }

    pub fn set_content(&mut self, content: &str) {
        if let Some(draft) = self.draft_mut() {
            draft.content = content.to_string();
        }
    }

    pub fn set_color(&mut self, color: NoteColor) {
        if let Some(draft) = self.draft_mut() {
            draft.color = color;
        }
    }

    pub fn set_check_list(&mut self, is_check_list: bool) {
        if let Some(draft) = self.draft_mut() {
            draft.is_check_list = is_check_list;
        }
    }

    /// Append an item to the draft; blank text is ignored
    pub fn add_item(&mut self, text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() || self.editor.is_none() {
            return None;
        }
        let item = self.ctx.notes.new_item(text);
        let id = item.id.clone();
        self.draft_mut()?.add_item(item);
        Some(id)
    }

    pub fn remove_item(&mut self, item_id: &str) -> bool {
        self.draft_mut().is_some_and(|draft| draft.remove_item(item_id))
    }

    /// Draft only; written with the rest of the note on save
    pub fn toggle_item(&mut self, item_id: &str, checked: bool) -> bool {
        self.draft_mut().is_some_and(|draft| draft.set_checked(item_id, checked))
    }

    /// Write the draft. The editor stays open if the write fails.
    pub async fn save(&mut self) -> bool {
        let Some(editor) = self.editor.as_ref() else {
            return false;
        };
        let note = editor.draft.apply_to(&editor.original);
        match self.ctx.notes.update(&self.principal, &note).await {
            Ok(()) => {
                self.ctx.notices.success("Note saved");
                self.editor = None;
                true
            }
            Err(e) => {
                self.ctx.notices.error("Failed to save note", &e);
                false
            }
        }
    }

    pub async fn delete_note(&mut self, note_id: &str) -> bool {
        match self.ctx.notes.delete(&self.principal, note_id).await {
            Ok(()) => {
                if self.editor.as_ref().is_some_and(|e| e.note_id() == note_id) {
                    self.editor = None;
                }
                self.ctx.notices.success("Note deleted");
                true
            }
            Err(e) => {
                self.ctx.notices.error("Failed to delete note", &e);
                false
            }
        }
    }

    /// Toggle from a note card. The local copy is patched once the write
    /// succeeds; on failure it stays as the last snapshot left it.
    pub async fn toggle_item_in_place(&mut self, note_id: &str, item_id: &str, checked: bool) -> bool {
        let result = self
            .ctx
            .notes
            .toggle_checklist_item(&self.principal, note_id, item_id, checked)
            .await;
        match result {
            Ok(()) => {
                let now = self.ctx.now_millis();
                self.notes.patch(
                    |n| n.id == note_id,
                    |n| {
                        if let Some(item) = n.items.iter_mut().find(|i| i.id == item_id) {
                            item.checked = checked;
                        }
                        n.updated_at = now;
                    },
                );
                true
            }
            Err(e) => {
                self.ctx.notices.error("Failed to update checklist item", &e);
                false
            }
        }
    }
}
