//! Bounded linear undo/redo history.
//!
//! Executing a new command discards the redo history. When the undo stack grows
//! past its maximum depth the oldest entry is dropped. The stack only sequences
//! commands; every state change happens inside the command itself.

use std::collections::VecDeque;

use tracing::debug;

use crate::command::Command;
use crate::core::timeline::{Timeline, TimelineError};

/// Default number of undo steps kept
pub const DEFAULT_MAX_DEPTH: usize = 100;

#[derive(Debug)]
pub struct CommandStack {
    undo_stack: VecDeque<Box<dyn Command>>, // Oldest at the front
    redo_stack: Vec<Box<dyn Command>>,
    max_depth: usize,
}

impl CommandStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Run `command` and record it.
    ///
    /// A command whose forward action fails is not recorded and the redo
    /// history is left alone.
    pub fn execute(&mut self, command: Box<dyn Command>, timeline: &mut Timeline) -> Result<(), TimelineError> {
        command.execute(timeline)?;

        self.redo_stack.clear();
        self.undo_stack.push_back(command);
        while self.undo_stack.len() > self.max_depth {
            if let Some(evicted) = self.undo_stack.pop_front() {
                debug!(label = %evicted.description(), "oldest history entry evicted");
            }
        }

        debug!(
            undo_depth = self.undo_stack.len(),
            max_depth = self.max_depth,
            "command executed"
        );
        Ok(())
    }

    /// Reverse the most recent command. Returns its description, or `None`
    /// when there is nothing to undo.
    ///
    /// If the reverse action fails (its clip is gone, or the old spot is taken)
    /// the timeline is left unchanged but the command still moves to the redo
    /// stack, so history order is preserved.
    pub fn undo(&mut self, timeline: &mut Timeline) -> Option<String> {
        let command = self.undo_stack.pop_back()?;
        let label = command.description();

        if let Err(err) = command.undo(timeline) {
            debug!(label = %label, error = %err, "undo had no effect");
        }
        debug!(label = %label, undo_remaining = self.undo_stack.len(), "undo");

        self.redo_stack.push(command);
        Some(label)
    }

    /// Re-apply the most recently undone command.
    pub fn redo(&mut self, timeline: &mut Timeline) -> Option<String> {
        let command = self.redo_stack.pop()?;
        let label = command.description();

        if let Err(err) = command.execute(timeline) {
            debug!(label = %label, error = %err, "redo had no effect");
        }
        debug!(label = %label, redo_remaining = self.redo_stack.len(), "redo");

        self.undo_stack.push_back(command);
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
        Some(label)
    }

    /// Empty both stacks (new project).
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        debug!("history cleared");
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.back().map(|c| c.description())
    }

    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.last().map(|c| c.description())
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Undo entries from oldest to newest
    pub fn undo_descriptions(&self) -> impl Iterator<Item = String> + '_ {
        self.undo_stack.iter().map(|c| c.description())
    }
}

impl Default for CommandStack {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}
