//! Structural validation of tree descriptions.
//!
//! `validate` aggregates every defect in one pass; it never stops at the first.
//! Defects come out in a stable order: id defects, the start check, then
//! per-step defects in description order.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use thiserror::Error;
use tracing::{debug, instrument};

use crate::domain::description::{non_blank, StepDescription, TreeDescription};
use crate::domain::entities::{SafetyLevel, START_ID};

/// A structural defect that makes a tree unusable for traversal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Defect {
    #[error("missing start node: no step with id \"start\"")]
    MissingStartNode,

    #[error("duplicate id: {0}")]
    DuplicateId(String),

    #[error("missing required field: step {0}: {1}")]
    MissingRequiredField(String, String),

    #[error("dangling reference: step {0} -> {1}")]
    DanglingReference(String, String),

    #[error("invalid value: step {0}: {1} = {2:?}")]
    InvalidValue(String, String, String),
}

/// A finding that does not affect validity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    UnreachableStep(String),
    /// A step declares edges its kind does not use: any edge on a solution,
    /// `options` on a check, `targetId` on a question.
    IgnoredTransition(String),
    DuplicateOptionTarget(String, String),
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnreachableStep(id) => write!(f, "unreachable step: {id}"),
            Warning::IgnoredTransition(id) => {
                write!(f, "step {id} declares transitions that are never followed")
            }
            Warning::DuplicateOptionTarget(id, target) => {
                write!(f, "question {id} lists target {target} more than once")
            }
        }
    }
}

/// Step kinds as they appear in descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KindTag {
    Question,
    Check,
    Solution,
}

impl KindTag {
    pub(crate) fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "question" => Some(KindTag::Question),
            "check" => Some(KindTag::Check),
            "solution" => Some(KindTag::Solution),
            _ => None,
        }
    }
}

/// First occurrence of every id, by position in the description.
fn index_ids(desc: &TreeDescription) -> HashMap<&str, usize> {
    let mut index = HashMap::new();
    for (pos, step) in desc.steps.iter().enumerate() {
        if let Some(id) = step.id() {
            index.entry(id).or_insert(pos);
        }
    }
    index
}

/// Return every structural defect in `desc`. Empty means the tree is valid.
#[instrument(level = "debug", skip(desc), fields(steps = desc.steps.len()))]
pub fn validate(desc: &TreeDescription) -> Vec<Defect> {
    let mut defects = Vec::new();

    // 1. ids
    let mut seen: HashSet<&str> = HashSet::new();
    for (pos, step) in desc.steps.iter().enumerate() {
        match step.id() {
            Some(id) => {
                if !seen.insert(id) {
                    defects.push(Defect::DuplicateId(id.to_string()));
                }
            }
            None => defects.push(Defect::MissingRequiredField(
                format!("steps[{pos}]"),
                "id".to_string(),
            )),
        }
    }

    // 2. entry point
    if !seen.contains(START_ID) {
        defects.push(Defect::MissingStartNode);
    }

    // 3. + 4. fields and references, per step
    for (pos, step) in desc.steps.iter().enumerate() {
        check_step(step, &step.display_id(pos), &seen, &mut defects);
    }

    debug!("validate: {} defect(s)", defects.len());
    defects
}

fn check_step(step: &StepDescription, label: &str, ids: &HashSet<&str>, defects: &mut Vec<Defect>) {
    let missing = |field: &str| Defect::MissingRequiredField(label.to_string(), field.to_string());
    let dangling = |target: &str| Defect::DanglingReference(label.to_string(), target.to_string());

    if non_blank(step.text.as_deref()).is_none() {
        defects.push(missing("text"));
    }

    if let Some(raw) = step.safety_level.as_deref() {
        if raw.parse::<SafetyLevel>().is_err() {
            defects.push(Defect::InvalidValue(
                label.to_string(),
                "safetyLevel".to_string(),
                raw.to_string(),
            ));
        }
    }

    let Some(raw_kind) = non_blank(step.kind.as_deref()) else {
        defects.push(missing("kind"));
        return;
    };
    let Some(kind) = KindTag::parse(raw_kind) else {
        defects.push(Defect::InvalidValue(
            label.to_string(),
            "kind".to_string(),
            raw_kind.to_string(),
        ));
        return;
    };

    match kind {
        KindTag::Question => {
            let options = step.options.as_deref().unwrap_or_default();
            if options.is_empty() {
                defects.push(missing("options"));
            }
            for (i, option) in options.iter().enumerate() {
                if non_blank(option.label.as_deref()).is_none() {
                    defects.push(missing(&format!("options[{i}].label")));
                }
                match non_blank(option.target_id.as_deref()) {
                    None => defects.push(missing(&format!("options[{i}].targetId"))),
                    Some(target) if !ids.contains(target) => defects.push(dangling(target)),
                    Some(_) => {}
                }
            }
        }
        KindTag::Check => match step.target_id.as_deref() {
            Some(raw) if raw.trim().is_empty() => defects.push(missing("targetId")),
            Some(target) if !ids.contains(target) => defects.push(dangling(target)),
            _ => {}
        },
        KindTag::Solution => {
            if non_blank(step.action.as_deref()).is_none() {
                defects.push(missing("action"));
            }
        }
    }
}

/// Successors of a described step, kind by kind, as `Step::successors` sees them.
fn legal_targets(step: &StepDescription) -> Vec<&str> {
    match step.kind.as_deref().and_then(KindTag::parse) {
        Some(KindTag::Question) => step.option_targets(),
        Some(KindTag::Check) => step.next_target().into_iter().collect(),
        _ => Vec::new(),
    }
}

/// Whether a step declares edges its kind never follows.
fn has_ignored_edges(step: &StepDescription, kind: KindTag) -> bool {
    match kind {
        KindTag::Question => step.next_target().is_some(),
        KindTag::Check => !step.option_targets().is_empty(),
        KindTag::Solution => !step.declared_targets().is_empty(),
    }
}

/// Non-fatal findings: unreachable steps, edges a step's kind ignores,
/// repeated option targets.
#[instrument(level = "debug", skip(desc))]
pub fn lint(desc: &TreeDescription) -> Vec<Warning> {
    let index = index_ids(desc);
    let mut warnings = Vec::new();

    for step in &desc.steps {
        let Some(id) = step.id() else { continue };
        let Some(kind) = step.kind.as_deref().and_then(KindTag::parse) else {
            continue;
        };
        if kind == KindTag::Question {
            let mut targets = HashSet::new();
            for target in step.option_targets() {
                if !targets.insert(target) {
                    warnings.push(Warning::DuplicateOptionTarget(
                        id.to_string(),
                        target.to_string(),
                    ));
                }
            }
        }
        if has_ignored_edges(step, kind) {
            warnings.push(Warning::IgnoredTransition(id.to_string()));
        }
    }

    if let Some(&start) = index.get(START_ID) {
        let mut reached: HashSet<usize> = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(pos) = queue.pop_front() {
            for target in legal_targets(&desc.steps[pos]) {
                if let Some(&next) = index.get(target) {
                    if reached.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }
        for (id, pos) in sorted_by_position(&index) {
            if !reached.contains(&pos) {
                warnings.push(Warning::UnreachableStep(id.to_string()));
            }
        }
    }

    warnings
}

fn sorted_by_position<'a>(index: &HashMap<&'a str, usize>) -> Vec<(&'a str, usize)> {
    let mut entries: Vec<_> = index.iter().map(|(id, pos)| (*id, *pos)).collect();
    entries.sort_by_key(|(_, pos)| *pos);
    entries
}
