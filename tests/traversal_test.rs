//! Traversal state machine: scenario walks and the history properties that
//! hold for any sequence of legal choices.

use std::sync::Arc;

use rstest::{fixture, rstest};

use diagtree::domain::{
    DecisionTree, DomainError, History, SafetyLevel, Session, StepDescription, StepKind,
    TreeDescription, START_ID,
};
use diagtree::util::testing::scenario_description;

#[fixture]
fn tree() -> Arc<DecisionTree> {
    Arc::new(DecisionTree::from_description(&scenario_description()).unwrap())
}

#[rstest]
fn given_new_session_when_inspecting_then_starts_at_entry_point(tree: Arc<DecisionTree>) {
    let session = Session::new(tree);

    assert_eq!(session.current().unwrap().id, START_ID);
    assert_eq!(session.depth(), 1);
    assert_eq!(session.legal_targets().unwrap(), vec!["A", "B"]);
    assert!(!session.is_finished().unwrap());
}

#[rstest]
fn given_no_branch_when_walking_to_solution_then_reports_red_terminal(tree: Arc<DecisionTree>) {
    let mut session = Session::new(tree);

    session.choose("B").unwrap();
    let step = session.choose("C").unwrap().clone();

    assert!(step.is_terminal());
    assert_eq!(step.safety, SafetyLevel::Red);
    assert!(matches!(step.kind, StepKind::Solution { .. }));
    assert_eq!(session.history().path(), ["start", "B", "C"]);
    assert!(session.legal_targets().unwrap().is_empty());
}

#[rstest]
fn given_illegal_target_when_choosing_then_state_is_unchanged(tree: Arc<DecisionTree>) {
    let mut session = Session::new(tree);
    session.choose("B").unwrap();
    let before = session.history().clone();

    let err = session.choose("A").unwrap_err();

    assert!(matches!(err, DomainError::InvalidTransition { ref from, ref target }
        if from == "B" && target == "A"));
    assert_eq!(session.history(), &before);
}

#[rstest]
fn given_solution_reached_when_choosing_then_rejects_every_target(tree: Arc<DecisionTree>) {
    let mut session = Session::new(tree);
    session.choose("A").unwrap();

    for target in ["start", "A", "B", "C"] {
        assert!(session.choose(target).is_err(), "{target} accepted");
    }
    assert_eq!(session.current().unwrap().id, "A");
}

#[rstest]
#[case::one_step(&["A"])]
#[case::two_steps(&["B", "C"])]
fn given_n_choices_when_backing_n_times_then_returns_to_start(
    tree: Arc<DecisionTree>,
    #[case] choices: &[&str],
) {
    let mut history = History::replay(&tree, choices.iter().copied()).unwrap();
    assert_eq!(history.depth(), choices.len() + 1);

    for _ in choices {
        assert!(history.back());
    }

    assert_eq!(history, History::new());
    assert!(!history.back(), "back at the entry point must be a no-op");
    assert_eq!(history.current_id(), START_ID);
}

#[rstest]
fn given_any_history_when_restarting_then_equals_fresh_history(tree: Arc<DecisionTree>) {
    let mut walked = History::replay(&tree, ["B", "C"]).unwrap();

    walked.restart();
    let once = walked.clone();
    walked.restart();

    assert_eq!(once, History::new());
    assert_eq!(walked, once);
}

#[rstest]
fn given_two_sessions_on_one_tree_when_walking_then_histories_are_independent(
    tree: Arc<DecisionTree>,
) {
    let mut first = Session::new(tree.clone());
    let mut second = Session::new(tree);

    first.choose("B").unwrap();
    second.choose("A").unwrap();
    first.choose("C").unwrap();

    assert_ne!(first.id(), second.id());
    assert_eq!(first.history().path(), ["start", "B", "C"]);
    assert_eq!(second.history().path(), ["start", "A"]);
}

#[rstest]
fn given_check_pointing_back_when_walking_then_cycle_is_traversable() {
    let desc = TreeDescription::new(vec![
        StepDescription::question("start", "Lights on?", &[("No", "fuse")]),
        StepDescription::check("fuse", "Replace the fuse and retry", Some("start")),
    ]);
    let tree = DecisionTree::from_description(&desc).unwrap();

    let history = History::replay(&tree, ["fuse", "start", "fuse"]).unwrap();

    assert_eq!(history.depth(), 4);
    assert_eq!(history.legal_targets(&tree).unwrap(), vec!["start"]);
}

#[rstest]
fn given_swapped_tree_without_current_step_when_inspecting_then_fails_until_restart(
    tree: Arc<DecisionTree>,
) {
    let mut session = Session::new(tree);
    session.choose("B").unwrap();
    let smaller = DecisionTree::from_description(&TreeDescription::new(vec![
        StepDescription::question("start", "Does it crank?", &[("Yes", "A")]),
        StepDescription::solution("A", "Fuel issue", "Check fuel pump"),
    ]))
    .unwrap();

    session.replace_tree(Arc::new(smaller));

    let err = session.current().unwrap_err();
    assert!(err.is_fatal());
    session.restart();
    assert_eq!(session.current().unwrap().id, START_ID);
}
