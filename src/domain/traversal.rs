//! Traversal state machine over a validated tree.
//!
//! `History` is the entire mutable state: a stack of visited step ids whose top
//! is the current step. The tree is passed in by reference and never mutated,
//! so any number of histories can walk the same tree independently.

use std::sync::Arc;

use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::domain::entities::{Step, START_ID};
use crate::domain::error::DomainError;
use crate::domain::tree::DecisionTree;

/// Stack of visited step ids, never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    stack: Vec<String>,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self {
            stack: vec![START_ID.to_string()],
        }
    }

    /// Replay a sequence of choices from `start`. Stops at the first rejected choice.
    pub fn replay<'t, I>(tree: &DecisionTree, targets: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = &'t str>,
    {
        let mut history = Self::new();
        for target in targets {
            history.choose(tree, target)?;
        }
        Ok(history)
    }

    /// Id at the top of the stack.
    pub fn current_id(&self) -> &str {
        self.stack.last().map(String::as_str).unwrap_or(START_ID)
    }

    /// The active step. Fails only when the top id no longer resolves in `tree`.
    pub fn current<'t>(&self, tree: &'t DecisionTree) -> Result<&'t Step, DomainError> {
        let id = self.current_id();
        tree.get(id)
            .ok_or_else(|| DomainError::UnknownCurrentStep(id.to_string()))
    }

    /// Move to `target` if it is a legal successor of the current step.
    /// An illegal target leaves the history untouched.
    #[instrument(level = "debug", skip(self, tree), fields(from = %self.current_id()))]
    pub fn choose<'t>(&mut self, tree: &'t DecisionTree, target: &str) -> Result<&'t Step, DomainError> {
        let current = self.current(tree)?;
        if !current.allows(target) {
            debug!("choose: rejected {} -> {}", current.id, target);
            return Err(DomainError::InvalidTransition {
                from: current.id.clone(),
                target: target.to_string(),
            });
        }
        // Validated trees make this unreachable; a swapped tree might not.
        let next = tree
            .get(target)
            .ok_or_else(|| DomainError::UnknownCurrentStep(target.to_string()))?;
        self.stack.push(target.to_string());
        Ok(next)
    }

    /// Pop one step. No-op at the entry point.
    pub fn back(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    pub fn restart(&mut self) {
        self.stack.clear();
        self.stack.push(START_ID.to_string());
    }

    /// Number of entries in the stack, for progress display.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn path(&self) -> &[String] {
        &self.stack
    }

    /// Targets the current step accepts, in declaration order.
    pub fn legal_targets<'t>(&self, tree: &'t DecisionTree) -> Result<Vec<&'t str>, DomainError> {
        Ok(self.current(tree)?.successors())
    }

    /// Whether the current step is a solution.
    pub fn is_finished(&self, tree: &DecisionTree) -> Result<bool, DomainError> {
        Ok(self.current(tree)?.is_terminal())
    }
}

/// One user's walk through a shared tree.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    tree: Arc<DecisionTree>,
    history: History,
}

impl Session {
    pub fn new(tree: Arc<DecisionTree>) -> Self {
        let id = Uuid::new_v4();
        debug!(session = %id, "session started");
        Self {
            id,
            tree,
            history: History::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn tree(&self) -> &DecisionTree {
        &self.tree
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn current(&self) -> Result<&Step, DomainError> {
        self.history.current(&self.tree)
    }

    #[instrument(level = "debug", skip(self), fields(session = %self.id))]
    pub fn choose(&mut self, target: &str) -> Result<&Step, DomainError> {
        self.history.choose(&self.tree, target)
    }

    pub fn back(&mut self) -> bool {
        self.history.back()
    }

    pub fn restart(&mut self) {
        debug!(session = %self.id, depth = self.history.depth(), "restart");
        self.history.restart();
    }

    pub fn depth(&self) -> usize {
        self.history.depth()
    }

    pub fn legal_targets(&self) -> Result<Vec<&str>, DomainError> {
        self.history.legal_targets(&self.tree)
    }

    pub fn is_finished(&self) -> Result<bool, DomainError> {
        self.history.is_finished(&self.tree)
    }

    /// Swap the tree under a running session. History is kept; if its top no
    /// longer resolves, `current()` fails until `restart()`.
    pub fn replace_tree(&mut self, tree: Arc<DecisionTree>) {
        if !tree.contains(self.history.current_id()) {
            warn!(
                session = %self.id,
                step = self.history.current_id(),
                "current step missing from replacement tree"
            );
        }
        self.tree = tree;
    }
}
