//! Line-oriented parser for protocol documents.
//!
//! ```text
//! Cardiac Arrest
//! ================================
//! 0: Unresponsive adult, no pulse.
//! # Correct answer:
//! Start compressions
//! # Wrong answers:
//! Give oral glucose
//! Wait for ALS
//! # Next state:
//! 1
//! Airway Management
//! ```
//!
//! Parsing never fails. Lines that fit nowhere are skipped, a document
//! without state headers yields an empty protocol, and a repeated state
//! id replaces the earlier block (last definition wins).
//!
//! State ids are `u32`. A prefix above `u32::MAX` is not an id: the line
//! is read as content, and in a `# Next state` section it becomes a
//! protocol name.
//!
//! The body is read by a small state machine: the current [`Section`]
//! decides what a content line means, and headers switch between sections.

use std::fs;
use std::path::Path;

use log::{debug, trace, warn};

use crate::trainer::{
    error::LoadError,
    models::{Protocol, State, Transition},
};

const CORRECT_HEADER: &str = "# Correct answer";
const WRONG_HEADER: &str = "# Wrong answer";
const NEXT_HEADER: &str = "# Next state";

/// Which part of a state block content lines currently belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    /// Takes exactly one non-blank line, then closes.
    Correct,
    /// Runs until the next header; blank lines do not close it.
    Wrong,
    /// Runs until a blank line or the next header.
    Next,
}

/// A state block whose fields are still being collected.
#[derive(Debug)]
struct StateDraft {
    id: u32,
    description: String,
    correct_answer: Option<String>,
    wrong_answers: Vec<String>,
    next_state_ids: Vec<Transition>,
}

impl StateDraft {
    fn new(id: u32, description: &str) -> Self {
        StateDraft {
            id,
            description: description.trim().to_string(),
            correct_answer: None,
            wrong_answers: Vec::new(),
            next_state_ids: Vec::new(),
        }
    }

    fn finish(self) -> State {
        State::new(self.id, self.description, self.correct_answer, self.wrong_answers, self.next_state_ids)
    }
}

/// What a single body line is, before the current section is consulted.
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Blank,
    StateHeader { id: u32, description: &'a str },
    SectionHeader(Section),
    Content(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    let line = line.trim_end();
    if line.trim().is_empty() {
        return Line::Blank;
    }
    if !line.starts_with('#') {
        if let Some((left, right)) = line.split_once(':') {
            if let Ok(id) = left.trim().parse::<u32>() {
                return Line::StateHeader { id, description: right };
            }
        }
    }
    if line.starts_with(CORRECT_HEADER) {
        Line::SectionHeader(Section::Correct)
    } else if line.starts_with(WRONG_HEADER) {
        Line::SectionHeader(Section::Wrong)
    } else if line.starts_with(NEXT_HEADER) {
        Line::SectionHeader(Section::Next)
    } else {
        Line::Content(line.trim())
    }
}

fn is_separator(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && line.chars().all(|c| c == '=')
}

// ---------------------------------------------------------------------------
// Parser state machine
// ---------------------------------------------------------------------------

struct ProtocolParser {
    protocol: Protocol,
    draft: Option<StateDraft>,
    section: Section,
}

impl ProtocolParser {
    fn new(name: &str) -> Self {
        ProtocolParser {
            protocol: Protocol::new(name.trim()),
            draft: None,
            section: Section::None,
        }
    }

    fn feed(&mut self, line_no: usize, raw: &str) {
        match classify(raw) {
            Line::Blank => {
                if self.section == Section::Next {
                    self.section = Section::None;
                }
            }
            Line::StateHeader { id, description } => {
                self.finish_state();
                self.draft = Some(StateDraft::new(id, description));
                self.section = Section::None;
            }
            Line::SectionHeader(section) => self.section = section,
            Line::Content(text) => self.content(line_no, text),
        }
    }

    fn content(&mut self, line_no: usize, text: &str) {
        let Some(draft) = self.draft.as_mut() else {
            trace!("line {line_no}: outside any state block, skipped: {text:?}");
            return;
        };
        match self.section {
            Section::None => {
                trace!("line {line_no}: no open section in state {}, skipped: {text:?}", draft.id);
            }
            Section::Correct => {
                draft.correct_answer = Some(text.to_string());
                self.section = Section::None;
            }
            Section::Wrong => draft.wrong_answers.push(text.to_string()),
            Section::Next => draft.next_state_ids.push(Transition::parse(text)),
        }
    }

    fn finish_state(&mut self) {
        let Some(draft) = self.draft.take() else {
            return;
        };
        let state = draft.finish();
        debug!(
            "protocol {:?}: state {} ({}, {} distractors, {} transitions)",
            self.protocol.name(),
            state.id(),
            state.state_type(),
            state.wrong_answers().len(),
            state.next_state_ids().len()
        );
        let id = state.id();
        if self.protocol.insert(state).is_some() {
            warn!(
                "protocol {:?}: state {} defined more than once, keeping the last definition",
                self.protocol.name(),
                id
            );
        }
    }

    fn finish(mut self) -> Protocol {
        self.finish_state();
        self.protocol
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Parse one protocol document.
pub fn parse_protocol(text: &str) -> Protocol {
    let mut lines = text.trim().lines().enumerate().peekable();
    let name = lines.next().map(|(_, l)| l).unwrap_or_default();
    let mut parser = ProtocolParser::new(name);

    while lines.next_if(|(_, l)| is_separator(l)).is_some() {}

    for (idx, line) in lines {
        parser.feed(idx + 1, line);
    }
    parser.finish()
}

/// Read and parse a protocol document from disk.
pub fn parse_protocol_file(path: impl AsRef<Path>) -> Result<Protocol, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_protocol(&text))
}
