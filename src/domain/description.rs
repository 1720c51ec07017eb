//! Tree description: the shape a tree is authored and transmitted in.
//!
//! Every field is optional so that a malformed step surfaces as a validation
//! defect rather than a deserialization failure of the whole file.

use serde::{Deserialize, Serialize};

/// A tree as authored: metadata plus an unordered list of steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TreeDescription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub steps: Vec<StepDescription>,
}

/// One step as authored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StepDescription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<OptionDescription>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    /// Successor of a check step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OptionDescription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
}

impl StepDescription {
    /// The id if present and non-blank.
    pub fn id(&self) -> Option<&str> {
        non_blank(self.id.as_deref())
    }

    /// Label used in defect messages: the id, or the position for anonymous steps.
    pub fn display_id(&self, position: usize) -> String {
        self.id()
            .map(str::to_string)
            .unwrap_or_else(|| format!("steps[{position}]"))
    }

    /// Non-blank option targets, in declaration order.
    pub fn option_targets(&self) -> Vec<&str> {
        self.options
            .iter()
            .flatten()
            .filter_map(|o| non_blank(o.target_id.as_deref()))
            .collect()
    }

    /// The non-blank `targetId`, the successor of a check.
    pub fn next_target(&self) -> Option<&str> {
        non_blank(self.target_id.as_deref())
    }

    /// Every outgoing target the description declares, whatever the kind.
    pub fn declared_targets(&self) -> Vec<&str> {
        let mut targets = self.option_targets();
        targets.extend(self.next_target());
        targets
    }
}

/// Builder-style constructors, used by tests and by tools that author trees.
impl StepDescription {
    pub fn question(id: &str, text: &str, options: &[(&str, &str)]) -> Self {
        Self {
            id: Some(id.into()),
            kind: Some("question".into()),
            text: Some(text.into()),
            options: Some(
                options
                    .iter()
                    .map(|(label, target)| OptionDescription {
                        label: Some((*label).into()),
                        target_id: Some((*target).into()),
                    })
                    .collect(),
            ),
            ..Default::default()
        }
    }

    pub fn check(id: &str, text: &str, next: Option<&str>) -> Self {
        Self {
            id: Some(id.into()),
            kind: Some("check".into()),
            text: Some(text.into()),
            target_id: next.map(Into::into),
            ..Default::default()
        }
    }

    pub fn solution(id: &str, text: &str, action: &str) -> Self {
        Self {
            id: Some(id.into()),
            kind: Some("solution".into()),
            text: Some(text.into()),
            action: Some(action.into()),
            ..Default::default()
        }
    }

    pub fn with_safety(mut self, level: &str) -> Self {
        self.safety_level = Some(level.into());
        self
    }
}

impl TreeDescription {
    pub fn new(steps: Vec<StepDescription>) -> Self {
        Self {
            steps,
            ..Default::default()
        }
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}
