//! Domain entities: steps of a diagnostic tree

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Id of the step every traversal begins at.
pub const START_ID: &str = "start";

/// Advisory classification of how much care a step requires.
/// Never changes engine behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyLevel {
    /// Beginner-safe
    #[default]
    Green,
    /// Use caution
    Yellow,
    /// Professional recommended
    Red,
}

impl fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SafetyLevel::Green => "green",
            SafetyLevel::Yellow => "yellow",
            SafetyLevel::Red => "red",
        };
        write!(f, "{s}")
    }
}

impl FromStr for SafetyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "green" => Ok(SafetyLevel::Green),
            "yellow" => Ok(SafetyLevel::Yellow),
            "red" => Ok(SafetyLevel::Red),
            other => Err(other.to_string()),
        }
    }
}

/// One labeled choice of a question step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    pub label: String,
    pub target: String,
}

/// Kind-specific payload of a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepKind {
    /// Presents one or more options, each leading to another step
    Question { options: Vec<ChoiceOption> },
    /// Presents instructions and at most one successor
    Check {
        instructions: Option<String>,
        next: Option<String>,
    },
    /// Terminal step with a recommended action
    Solution {
        action: String,
        details: Option<String>,
    },
}

/// A single validated step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub id: String,
    pub text: String,
    pub safety: SafetyLevel,
    pub kind: StepKind,
}

impl Step {
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            StepKind::Question { .. } => "question",
            StepKind::Check { .. } => "check",
            StepKind::Solution { .. } => "solution",
        }
    }

    /// Declared successors in declaration order. Solutions have none, whatever
    /// the description said.
    pub fn successors(&self) -> Vec<&str> {
        match &self.kind {
            StepKind::Question { options } => options.iter().map(|o| o.target.as_str()).collect(),
            StepKind::Check { next, .. } => next.iter().map(String::as_str).collect(),
            StepKind::Solution { .. } => Vec::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, StepKind::Solution { .. })
    }

    /// Whether moving from this step to `target` is a legal transition.
    pub fn allows(&self, target: &str) -> bool {
        match &self.kind {
            StepKind::Question { options } => options.iter().any(|o| o.target == target),
            StepKind::Check { next, .. } => next.as_deref() == Some(target),
            StepKind::Solution { .. } => false,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind_name(), self.id, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> Step {
        Step {
            id: "start".into(),
            text: "Does the engine crank?".into(),
            safety: SafetyLevel::Green,
            kind: StepKind::Question {
                options: vec![
                    ChoiceOption {
                        label: "Yes".into(),
                        target: "A".into(),
                    },
                    ChoiceOption {
                        label: "No".into(),
                        target: "B".into(),
                    },
                ],
            },
        }
    }

    #[test]
    fn given_question_when_asking_allows_then_only_option_targets_are_legal() {
        let step = question();
        assert!(step.allows("A"));
        assert!(step.allows("B"));
        assert!(!step.allows("C"));
        assert_eq!(step.successors(), vec!["A", "B"]);
    }

    #[test]
    fn given_check_without_successor_when_asking_allows_then_nothing_is_legal() {
        let step = Step {
            id: "B".into(),
            text: "Check the battery".into(),
            safety: SafetyLevel::Yellow,
            kind: StepKind::Check {
                instructions: Some("Measure voltage".into()),
                next: None,
            },
        };
        assert!(!step.allows("C"));
        assert!(step.successors().is_empty());
        assert!(!step.is_terminal());
    }

    #[test]
    fn given_solution_when_asking_allows_then_it_is_a_sink() {
        let step = Step {
            id: "A".into(),
            text: "Replace the starter".into(),
            safety: SafetyLevel::Red,
            kind: StepKind::Solution {
                action: "Replace starter motor".into(),
                details: None,
            },
        };
        assert!(step.is_terminal());
        assert!(!step.allows("start"));
        assert_eq!(step.kind_name(), "solution");
    }

    #[test]
    fn given_safety_strings_when_parsing_then_accepts_any_case() {
        assert_eq!("RED".parse::<SafetyLevel>(), Ok(SafetyLevel::Red));
        assert_eq!(" yellow ".parse::<SafetyLevel>(), Ok(SafetyLevel::Yellow));
        assert_eq!("purple".parse::<SafetyLevel>(), Err("purple".to_string()));
        assert_eq!(SafetyLevel::Green.to_string(), "green");
    }
}
