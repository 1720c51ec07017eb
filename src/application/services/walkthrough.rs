//! Interactive walkthrough: a line-oriented rendering collaborator.
//!
//! Shows the current step of a `Session`, reads one command per line and
//! relays it to the engine as `choose`, `back` or `restart`.
//!
//! Commands: option number (question), `c` or empty line (check), `b` back,
//! `r` restart, `q` quit. Anything else is tried as a target id.

use std::io::{BufRead, Write};

use tracing::{debug, instrument};

use crate::domain::{DomainError, Session, Step, StepKind};
use crate::infrastructure::{InfraError, InfraResult};

/// How a walkthrough ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkOutcome {
    /// Reached a solution step
    Solved(String),
    /// User quit at the given step
    Quit(String),
    /// Input ran out at the given step
    EndOfInput(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkSummary {
    pub outcome: WalkOutcome,
    pub path: Vec<String>,
}

enum Command {
    Choose(String),
    Back,
    Restart,
    Quit,
}

pub struct Walkthrough<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Walkthrough<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Drive `session` until a solution is reached, the user quits or input ends.
    #[instrument(level = "debug", skip_all, fields(session = %session.id()))]
    pub fn run(&mut self, session: &mut Session) -> InfraResult<WalkSummary> {
        if let Some(title) = session.tree().title() {
            self.say(&format!("== {title} =="))?;
        }

        loop {
            let current = session.current().cloned();
            let step = match current {
                Ok(step) => step,
                Err(e) => {
                    self.say(&format!("{e}. Type r to start over."))?;
                    match self.read_line()? {
                        None => return Ok(summary(session, WalkOutcome::EndOfInput)),
                        Some(line) if line == "q" => return Ok(summary(session, WalkOutcome::Quit)),
                        Some(_) => session.restart(),
                    }
                    continue;
                }
            };

            self.render(&step, session.depth())?;
            if step.is_terminal() {
                return Ok(summary(session, WalkOutcome::Solved));
            }

            let Some(line) = self.read_line()? else {
                return Ok(summary(session, WalkOutcome::EndOfInput));
            };
            match parse_command(&step, &line) {
                Command::Quit => return Ok(summary(session, WalkOutcome::Quit)),
                Command::Back => {
                    if !session.back() {
                        self.say("Already at the first step.")?;
                    }
                }
                Command::Restart => session.restart(),
                Command::Choose(target) => match session.choose(&target) {
                    Ok(_) => {}
                    Err(DomainError::InvalidTransition { .. }) => {
                        debug!("walkthrough: rejected input {:?}", line);
                        self.say("Not a valid choice here, try again.")?;
                    }
                    Err(e) => self.say(&format!("{e}"))?,
                },
            }
        }
    }

    fn render(&mut self, step: &Step, depth: usize) -> InfraResult<()> {
        self.say("")?;
        self.say(&format!("Step {depth} [{}]: {}", step.safety, step.text))?;
        match &step.kind {
            StepKind::Question { options } => {
                for (i, option) in options.iter().enumerate() {
                    self.say(&format!("  {}) {}", i + 1, option.label))?;
                }
            }
            StepKind::Check { instructions, next } => {
                if let Some(instructions) = instructions {
                    self.say(&format!("  {instructions}"))?;
                }
                if next.is_some() {
                    self.say("  c) continue")?;
                } else {
                    self.say("  (no further step: b to go back, r to restart)")?;
                }
            }
            StepKind::Solution { action, details } => {
                self.say(&format!("Recommended action: {action}"))?;
                if let Some(details) = details {
                    self.say(details)?;
                }
            }
        }
        Ok(())
    }

    fn say(&mut self, line: &str) -> InfraResult<()> {
        writeln!(self.output, "{line}").map_err(|e| InfraError::io("write walkthrough", e))
    }

    fn read_line(&mut self) -> InfraResult<Option<String>> {
        write!(self.output, "> ")
            .and_then(|_| self.output.flush())
            .map_err(|e| InfraError::io("write prompt", e))?;
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|e| InfraError::io("read input", e))?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

fn parse_command(step: &Step, line: &str) -> Command {
    match line {
        "q" => return Command::Quit,
        "b" => return Command::Back,
        "r" => return Command::Restart,
        _ => {}
    }
    match &step.kind {
        StepKind::Question { options } => {
            if let Ok(n) = line.parse::<usize>() {
                if let Some(option) = n.checked_sub(1).and_then(|i| options.get(i)) {
                    return Command::Choose(option.target.clone());
                }
            }
        }
        StepKind::Check { next: Some(next), .. } if line.is_empty() || line == "c" => {
            return Command::Choose(next.clone());
        }
        _ => {}
    }
    Command::Choose(line.to_string())
}

fn summary(session: &Session, outcome: fn(String) -> WalkOutcome) -> WalkSummary {
    let history = session.history();
    WalkSummary {
        outcome: outcome(history.current_id().to_string()),
        path: history.path().to_vec(),
    }
}
