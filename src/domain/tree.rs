//! Validated decision tree: arena storage, id lookup and display.

use std::collections::{HashMap, HashSet, VecDeque};

use generational_arena::{Arena, Index};
use termtree::Tree;
use tracing::{debug, instrument};

use crate::domain::description::{non_blank, StepDescription, TreeDescription};
use crate::domain::entities::{ChoiceOption, SafetyLevel, Step, StepKind, START_ID};
use crate::domain::error::DomainError;
use crate::domain::validator::{validate, KindTag};

/// Immutable, validated decision tree.
///
/// Steps live in a flat arena and refer to each other by id, so back-references
/// (a check pointing at an earlier step) need no shared ownership. The id index
/// is built once at construction and gives O(1) lookup.
#[derive(Debug)]
pub struct DecisionTree {
    arena: Arena<Step>,
    index: HashMap<String, Index>,
    /// Arena indices in description order
    order: Vec<Index>,
    tree_id: Option<String>,
    title: Option<String>,
}

impl DecisionTree {
    /// Build a tree from a description, refusing when the validator finds defects.
    #[instrument(level = "debug", skip(desc))]
    pub fn from_description(desc: &TreeDescription) -> Result<Self, DomainError> {
        let defects = validate(desc);
        if !defects.is_empty() {
            debug!("from_description: rejected with {} defect(s)", defects.len());
            return Err(DomainError::InvalidTree(defects));
        }

        let mut arena = Arena::with_capacity(desc.steps.len());
        let mut index = HashMap::with_capacity(desc.steps.len());
        let mut order = Vec::with_capacity(desc.steps.len());
        for raw in &desc.steps {
            let step = to_step(raw)?;
            let id = step.id.clone();
            let idx = arena.insert(step);
            index.insert(id, idx);
            order.push(idx);
        }

        Ok(Self {
            arena,
            index,
            order,
            tree_id: desc.id.clone(),
            title: desc.title.clone(),
        })
    }

    pub fn get(&self, id: &str) -> Option<&Step> {
        self.index.get(id).and_then(|&idx| self.arena.get(idx))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// The entry step. Always present in a constructed tree.
    pub fn start(&self) -> Option<&Step> {
        self.get(START_ID)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Steps in description order.
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.order.iter().filter_map(|&idx| self.arena.get(idx))
    }

    pub fn tree_id(&self) -> Option<&str> {
        self.tree_id.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Ids reachable from `start` by legal transitions, in BFS order.
    pub fn reachable_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut queue = VecDeque::new();
        if let Some(start) = self.start() {
            seen.insert(start.id.as_str());
            queue.push_back(start);
        }
        while let Some(step) = queue.pop_front() {
            out.push(step.id.as_str());
            for target in step.successors() {
                if let Some(next) = self.get(target) {
                    if seen.insert(next.id.as_str()) {
                        queue.push_back(next);
                    }
                }
            }
        }
        out
    }

    /// Render the graph from `start` as a tree for display. A step seen before
    /// on the current path or elsewhere is printed as a reference, not expanded.
    pub fn to_display_tree(&self) -> Tree<String> {
        let Some(start) = self.start() else {
            return Tree::new("Empty tree".to_string());
        };
        let mut expanded = HashSet::new();
        self.display_node(start, None, &mut expanded)
    }

    fn display_node<'a>(
        &'a self,
        step: &'a Step,
        via: Option<&str>,
        expanded: &mut HashSet<&'a str>,
    ) -> Tree<String> {
        let prefix = via.map(|label| format!("{label} → ")).unwrap_or_default();
        if !expanded.insert(step.id.as_str()) {
            return Tree::new(format!("{prefix}↺ {}", step.id));
        }

        let mut root = Tree::new(format!("{prefix}{} ({})", step, step.safety));
        match &step.kind {
            StepKind::Question { options } => {
                for option in options {
                    if let Some(next) = self.get(&option.target) {
                        root.push(self.display_node(next, Some(option.label.as_str()), expanded));
                    }
                }
            }
            StepKind::Check { next: Some(next), .. } => {
                if let Some(next) = self.get(next) {
                    root.push(self.display_node(next, Some("continue"), expanded));
                }
            }
            StepKind::Check { next: None, .. } => {}
            StepKind::Solution { action, .. } => {
                root.push(Tree::new(format!("⇒ {action}")));
            }
        }
        root
    }
}

/// Convert an already-validated step description.
fn to_step(raw: &StepDescription) -> Result<Step, DomainError> {
    let invalid = |reason: &str| DomainError::MalformedStep {
        id: raw.id.clone().unwrap_or_default(),
        reason: reason.to_string(),
    };

    let id = raw.id().ok_or_else(|| invalid("missing id"))?.to_string();
    let text = non_blank(raw.text.as_deref())
        .ok_or_else(|| invalid("missing text"))?
        .to_string();
    let safety = match raw.safety_level.as_deref() {
        Some(level) => level
            .parse::<SafetyLevel>()
            .map_err(|_| invalid("invalid safety level"))?,
        None => SafetyLevel::default(),
    };
    let kind = match raw.kind.as_deref().and_then(KindTag::parse) {
        Some(KindTag::Question) => StepKind::Question {
            options: raw
                .options
                .iter()
                .flatten()
                .map(|o| ChoiceOption {
                    label: o.label.clone().unwrap_or_default(),
                    target: o.target_id.clone().unwrap_or_default(),
                })
                .collect(),
        },
        Some(KindTag::Check) => StepKind::Check {
            instructions: non_blank(raw.instructions.as_deref()).map(str::to_string),
            next: raw.target_id.clone(),
        },
        Some(KindTag::Solution) => StepKind::Solution {
            action: raw.action.clone().unwrap_or_default(),
            details: non_blank(raw.details.as_deref()).map(str::to_string),
        },
        None => return Err(invalid("invalid kind")),
    };

    Ok(Step {
        id,
        text,
        safety,
        kind,
    })
}
