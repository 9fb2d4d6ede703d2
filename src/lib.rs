//! # protocol_drill
//!
//! A quiz-style trainer for branching decision protocols (medical or
//! operational procedures) written as small plain-text documents.
//!
//! ## How it works
//!
//! 1. Write one document per protocol: a name line, an optional `====`
//!    separator, then numbered state blocks with `# Correct answer`,
//!    `# Wrong answers` and `# Next state` sections.
//! 2. Call [`ProtocolRepository::load`] on the directory — every `*.md`
//!    file is parsed into a [`Protocol`] graph keyed by its name.
//! 3. Drive a [`GameplayEngine`] over the repository: `start_game`,
//!    `current_options`, `submit_answer`, `advance`. Each call returns
//!    what happened as a [`GameEvent`] for the presentation layer.
//!
//! ## Key features
//!
//! - **Forgiving parser**: malformed lines are skipped, never reported.
//! - **Cross-protocol jumps**: a next-state line that is not a number
//!   names another protocol, entered at its state `0`.
//! - **Deterministic when asked**: `SessionConfig::default().with_seed(42)`
//!   reproduces branch choices and option order.
//!
//! ## Quick start
//!
//! ```rust
//! use protocol_drill::{parse_protocol, GameEvent, GameplayEngine, ProtocolRepository, SessionConfig};
//!
//! let doc = "\
//! Choking Adult
//! ====
//! 0: Adult clutching throat, cannot speak.
//! ## Correct answer:
//! Give back blows
//! ## Wrong answers:
//! Offer water
//! ## Next state:
//! 1
//!
//! 1: Object expelled.
//! ";
//! let repo: ProtocolRepository = [parse_protocol(doc)].into_iter().collect();
//! let mut engine = GameplayEngine::with_config(&repo, &SessionConfig::default().with_seed(1));
//!
//! if let GameEvent::StateChanged(state) = engine.start_game("Choking Adult").unwrap() {
//!     println!("Q: {}", state.description());
//! }
//! let options = engine.current_options();
//! assert_eq!(options.len(), 2);
//! engine.submit_answer("Give back blows").unwrap();
//! assert!(engine.advance().unwrap().is_complete());
//! assert_eq!(engine.score().to_string(), "1 / 1 (100%)");
//! ```

pub mod trainer;

// Convenience re-exports so callers can use `protocol_drill::GameplayEngine`
// directly without reaching into `trainer::`.
pub use trainer::{
    parse_protocol, parse_protocol_file, AnswerFeedback, GameError, GameEvent, GameObserver,
    GameplayEngine, Grade, LoadError, Phase, Protocol, ProtocolRepository, Score, SessionConfig,
    State, StateType, Transition,
};
