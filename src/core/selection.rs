//! Clip selection model.
//!
//! Single-select replaces the selection on every pick. Multi-select keeps a set
//! and remembers the last picked clip separately, which anchors range operations.
//! Selection changes never enter the command history.

use crate::core::clip::ClipId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    #[default]
    Single,
    Multi,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    mode: SelectionMode,
    clips: Vec<ClipId>, // Pick order
    last_selected: Option<ClipId>,
}

impl Selection {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Switch modes. Leaving multi-select keeps only the last picked clip.
    pub fn set_mode(&mut self, mode: SelectionMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        if mode == SelectionMode::Single {
            self.clips.clear();
            if let Some(last) = self.last_selected {
                self.clips.push(last);
            }
        }
    }

    /// Select `id` and deselect everything else.
    pub fn select_only(&mut self, id: ClipId) {
        self.clips.clear();
        self.clips.push(id);
        self.last_selected = Some(id);
    }

    /// Add or remove `id` from a multi-selection.
    ///
    /// In single mode this behaves like `select_only`.
    pub fn toggle(&mut self, id: ClipId) {
        if self.mode == SelectionMode::Single {
            self.select_only(id);
            return;
        }

        if let Some(pos) = self.clips.iter().position(|c| *c == id) {
            self.clips.remove(pos);
            if self.last_selected == Some(id) {
                self.last_selected = self.clips.last().copied();
            }
        } else {
            self.clips.push(id);
            self.last_selected = Some(id);
        }
    }

    /// Forget a clip, e.g. after it was removed from the timeline.
    pub fn remove(&mut self, id: ClipId) {
        self.clips.retain(|c| *c != id);
        if self.last_selected == Some(id) {
            self.last_selected = self.clips.last().copied();
        }
    }

    pub fn clear(&mut self) {
        self.clips.clear();
        self.last_selected = None;
    }

    /// The authoritative clip for the current mode: the only selected clip in
    /// single mode, the last picked clip in multi mode.
    pub fn primary(&self) -> Option<ClipId> {
        match self.mode {
            SelectionMode::Single => self.clips.first().copied(),
            SelectionMode::Multi => self.last_selected,
        }
    }

    pub fn contains(&self, id: ClipId) -> bool {
        self.clips.contains(&id)
    }

    /// Selected clips in pick order.
    pub fn ids(&self) -> &[ClipId] {
        &self.clips
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}
