//! Walkthrough driven end to end from a tree file on disk

use std::io::Cursor;
use std::path::PathBuf;

use diagtree::application::services::{WalkOutcome, Walkthrough};
use diagtree::config::Settings;
use diagtree::domain::Session;
use diagtree::infrastructure::di::ServiceContainer;

fn no_crank_session() -> Session {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/resources/trees/no_crank.json");
    let container = ServiceContainer::new(Settings::default());
    Session::new(container.loader().load_tree(&path).unwrap())
}

#[test]
fn given_tree_file_when_walking_dark_dashboard_then_recommends_battery() {
    // Arrange
    let mut session = no_crank_session();
    let mut walk = Walkthrough::new(Cursor::new("2\n\n"), Vec::new());

    // Act
    let summary = walk.run(&mut session).unwrap();

    // Assert
    let output = String::from_utf8(walk.into_output()).unwrap();
    assert_eq!(summary.outcome, WalkOutcome::Solved("charge".into()));
    assert_eq!(summary.path, vec!["start", "battery", "charge"]);
    assert!(output.starts_with("== Engine does not crank =="));
    assert!(output.contains("Step 2 [yellow]: Check the battery voltage"));
    assert!(output.contains("Recommended action: Charge or replace the battery"));
}

#[test]
fn given_target_id_typed_when_walking_then_accepts_it_as_choice() {
    let mut session = no_crank_session();
    let mut walk = Walkthrough::new(Cursor::new("starter\n"), Vec::new());

    let summary = walk.run(&mut session).unwrap();

    assert_eq!(summary.outcome, WalkOutcome::Solved("starter".into()));
    assert!(session.is_finished().unwrap());
}
