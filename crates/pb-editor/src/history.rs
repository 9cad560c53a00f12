//! Undo/redo history.
//!
//! Every entry is a whole-project snapshot. Projects are held behind `Arc`
//! and edited copy-on-write (`Arc::make_mut`), so a snapshot is a pointer
//! clone and stays immutable once taken.
//!
//! Drag gestures use **gesture batching**: the project is captured when the
//! gesture starts and a single entry is pushed when it ends, so the
//! transient pointer-move updates in between never reach the stack.

use pb_core::model::Project;
use std::sync::Arc;

/// Default number of undo steps kept.
pub const DEFAULT_HISTORY_DEPTH: usize = 100;

#[derive(Debug, Clone)]
struct Entry {
    snapshot: Arc<Project>,
    description: String,
}

/// Bounded past/future snapshot stacks.
#[derive(Debug)]
pub struct History {
    past: Vec<Entry>,
    future: Vec<Entry>,
    /// Maximum undo depth; the oldest entry is evicted past it.
    max_depth: usize,
    /// Project captured when the current gesture began.
    gesture: Option<Arc<Project>>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            past: Vec::with_capacity(max_depth.min(DEFAULT_HISTORY_DEPTH)),
            future: Vec::new(),
            max_depth: max_depth.max(1),
            gesture: None,
        }
    }

    fn push(&mut self, snapshot: Arc<Project>, description: &str) {
        self.past.push(Entry {
            snapshot,
            description: description.to_string(),
        });
        if self.past.len() > self.max_depth {
            self.past.remove(0);
        }
        self.future.clear();
        log::debug!("history: pushed \"{description}\" ({} entries)", self.past.len());
    }

    /// Apply `mutator` as one undoable step.
    ///
    /// On error the project is restored and nothing is recorded. A mutation
    /// that leaves the project equal to before records nothing either.
    /// Inside a gesture the change is applied live and folded into the
    /// gesture's entry.
    pub fn commit<T, E>(
        &mut self,
        project: &mut Arc<Project>,
        description: &str,
        mutator: impl FnOnce(&mut Project) -> Result<T, E>,
    ) -> Result<T, E> {
        let before = Arc::clone(project);
        match mutator(Arc::make_mut(project)) {
            Ok(value) => {
                if self.gesture.is_none() && **project != *before {
                    self.push(before, description);
                }
                Ok(value)
            }
            Err(e) => {
                *project = before;
                Err(e)
            }
        }
    }

    /// Capture the project at the start of a gesture. Nested calls keep the
    /// first capture.
    pub fn begin_gesture(&mut self, project: &Arc<Project>) {
        if self.gesture.is_none() {
            self.gesture = Some(Arc::clone(project));
        }
    }

    pub fn in_gesture(&self) -> bool {
        self.gesture.is_some()
    }

    /// Close the gesture, pushing one entry if the project changed.
    /// Returns true if an entry was pushed.
    pub fn end_gesture(&mut self, project: &Arc<Project>, description: &str) -> bool {
        let Some(before) = self.gesture.take() else {
            return false;
        };
        if Arc::ptr_eq(&before, project) || **project == *before {
            return false;
        }
        self.push(before, description);
        true
    }

    /// Restore the latest snapshot. Returns its description.
    pub fn undo(&mut self, project: &mut Arc<Project>) -> Option<String> {
        let entry = self.past.pop()?;
        let current = std::mem::replace(project, entry.snapshot);
        self.future.push(Entry {
            snapshot: current,
            description: entry.description.clone(),
        });
        log::debug!("history: undo \"{}\"", entry.description);
        Some(entry.description)
    }

    /// Re-apply the latest undone snapshot. Returns its description.
    pub fn redo(&mut self, project: &mut Arc<Project>) -> Option<String> {
        let entry = self.future.pop()?;
        let current = std::mem::replace(project, entry.snapshot);
        self.past.push(Entry {
            snapshot: current,
            description: entry.description.clone(),
        });
        log::debug!("history: redo \"{}\"", entry.description);
        Some(entry.description)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.past.len()
    }

    pub fn redo_len(&self) -> usize {
        self.future.len()
    }

    /// Description of the step `undo` would revert.
    pub fn undo_description(&self) -> Option<&str> {
        self.past.last().map(|e| e.description.as_str())
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
        self.gesture = None;
    }
}
