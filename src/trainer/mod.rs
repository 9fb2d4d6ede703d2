//! Core trainer — protocol documents, their parsed graphs, and gameplay.
//!
//! ## Module overview
//!
//! | Module       | Purpose |
//! |--------------|---------|
//! | `models`     | `State`, `Protocol`, transition targets and randomized sampling |
//! | `parser`     | Plain-text protocol documents → `Protocol` |
//! | `repository` | Loads every document in a directory, keyed by protocol name |
//! | `gameplay`   | `GameplayEngine` — walks the graph, keeps score, emits events |
//! | `scoring`    | Score counters and the results-screen grade |
//! | `config`     | `SessionConfig` (RNG seed, distractor count) |
//! | `view`       | JSON shapes handed to a presentation layer |
//! | `error`      | `GameError`, `LoadError` |

pub mod config;
pub mod error;
pub mod gameplay;
pub mod models;
pub mod parser;
pub mod repository;
pub mod scoring;
pub mod view;

// Re-export the public API surface so callers can use
// `trainer::GameplayEngine` without reaching into sub-modules.
pub use config::SessionConfig;
pub use error::{GameError, LoadError};
pub use gameplay::{AnswerFeedback, GameEvent, GameObserver, GameplayEngine, Phase};
pub use models::{Protocol, State, StateType, Transition, DEFAULT_DISTRACTORS, INITIAL_STATE_ID};
pub use parser::{parse_protocol, parse_protocol_file};
pub use repository::ProtocolRepository;
pub use scoring::{Grade, Score};
