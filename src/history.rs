//! Bounded linear undo/redo over full layer-list snapshots.
//!
//! Every transition is total and returns the next [`History`]; edits always clear the redo side.

use std::collections::VecDeque;

use crate::layer::model::{LayerId, LayerList, TextLayer};

/// Maximum number of snapshots retained on each of the undo and redo sides.
pub const MAX_HISTORY: usize = 50;

/// `past` (oldest first) / `present` / `future` (nearest redo first).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct History {
    past: VecDeque<LayerList>,
    present: LayerList,
    future: VecDeque<LayerList>,
}

impl History {
    /// Empty history with an empty present.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current layer list.
    pub fn present(&self) -> &[TextLayer] {
        &self.present
    }

    /// Undo snapshots, oldest first.
    pub fn past(&self) -> &VecDeque<LayerList> {
        &self.past
    }

    /// Redo snapshots, nearest first.
    pub fn future(&self) -> &VecDeque<LayerList> {
        &self.future
    }

    /// Return `true` when [`History::undo`] would change anything.
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Return `true` when [`History::redo`] would change anything.
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Find a layer of the present list.
    pub fn layer(&self, id: &LayerId) -> Option<&TextLayer> {
        self.present.iter().find(|l| &l.id == id)
    }

    /// Append a layer on top of the stack.
    pub fn add_layer(self, layer: TextLayer) -> Self {
        self.commit(|mut present| {
            present.push(layer);
            present
        })
    }

    /// Replace the layer whose id matches `layer.id`, keeping order.
    ///
    /// An unknown id still records a snapshot and clears redo, leaving the layers untouched.
    pub fn update_layer(self, layer: TextLayer) -> Self {
        self.commit(|mut present| {
            if let Some(slot) = present.iter_mut().find(|l| l.id == layer.id) {
                *slot = layer;
            }
            present
        })
    }

    /// Remove the layer with `id`.
    pub fn delete_layer(self, id: &LayerId) -> Self {
        self.commit(|mut present| {
            present.retain(|l| &l.id != id);
            present
        })
    }

    /// Step back one snapshot; no-op when there is nothing to undo.
    pub fn undo(mut self) -> Self {
        let Some(previous) = self.past.pop_back() else {
            return self;
        };
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push_front(current);
        self.future.truncate(MAX_HISTORY);
        self
    }

    /// Step forward one snapshot; no-op when there is nothing to redo.
    pub fn redo(mut self) -> Self {
        let Some(next) = self.future.pop_front() else {
            return self;
        };
        let current = std::mem::replace(&mut self.present, next);
        push_past(&mut self.past, current);
        self
    }

    /// Drop every snapshot and layer.
    pub fn reset(self) -> Self {
        Self::new()
    }

    fn commit(mut self, edit: impl FnOnce(LayerList) -> LayerList) -> Self {
        let next = edit(self.present.clone());
        let current = std::mem::replace(&mut self.present, next);
        push_past(&mut self.past, current);
        self.future.clear();
        self
    }
}

fn push_past(past: &mut VecDeque<LayerList>, snapshot: LayerList) {
    past.push_back(snapshot);
    while past.len() > MAX_HISTORY {
        past.pop_front();
    }
}

#[cfg(test)]
#[path = "../tests/unit/history/history.rs"]
mod tests;
