//! Turn-by-turn play over a [`ProtocolRepository`].
//!
//! Every operation runs to completion and returns what happened as a
//! [`GameEvent`] (or an [`AnswerFeedback`] for answers) instead of calling
//! back into the presentation layer. Callers that prefer callbacks can
//! forward events to a [`GameObserver`] with [`GameEvent::dispatch`].
//!
//! Missing data in the graph (a dangling state id, an unknown protocol
//! name, a protocol without state 0) ends the session through
//! [`GameEvent::GameComplete`] with no final state. Only misuse of the
//! engine is reported as a [`GameError`].

use log::{debug, info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::trainer::{
    config::SessionConfig,
    error::GameError,
    models::{Protocol, State, StateType, Transition, DEFAULT_DISTRACTORS},
    repository::ProtocolRepository,
    scoring::Score,
};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent<'a> {
    /// Play entered a live INTRO or QUESTION state.
    StateChanged(&'a State),
    /// A question was answered; carries the new totals.
    ScoreUpdated(Score),
    /// The session ended. `final_state` is `None` when play stopped on a
    /// missing state or protocol rather than on a FINAL state.
    GameComplete {
        final_state: Option<&'a State>,
        score: Score,
    },
}

impl<'a> GameEvent<'a> {
    pub fn is_complete(&self) -> bool {
        matches!(self, GameEvent::GameComplete { .. })
    }

    /// Forward this event to the matching observer callback.
    pub fn dispatch<O: GameObserver + ?Sized>(&self, observer: &mut O) {
        match *self {
            GameEvent::StateChanged(state) => observer.on_state_changed(state),
            GameEvent::ScoreUpdated(score) => observer.on_score_updated(score),
            GameEvent::GameComplete { final_state, score } => observer.on_game_complete(final_state, score),
        }
    }
}

/// Callback-style consumer of [`GameEvent`]s.
pub trait GameObserver {
    fn on_state_changed(&mut self, _state: &State) {}
    fn on_score_updated(&mut self, _score: Score) {}
    fn on_game_complete(&mut self, _final_state: Option<&State>, _score: Score) {}
}

/// Result of [`GameplayEngine::submit_answer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerFeedback<'a> {
    pub is_correct: bool,
    pub correct_answer: &'a str,
    pub score: Score,
}

impl<'a> AnswerFeedback<'a> {
    pub fn event(&self) -> GameEvent<'a> {
        GameEvent::ScoreUpdated(self.score)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No game has been started.
    Idle,
    InProgress,
    /// A terminal condition was reached; only `start_game` continues.
    Complete,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Session<'a> {
    protocol: &'a Protocol,
    /// `None` only when the entry protocol had no initial state.
    state: Option<&'a State>,
    score: Score,
    complete: bool,
}

/// Walks protocol graphs one state at a time and keeps the score.
///
/// The engine only borrows the repository, so any number of engines can
/// play over the same loaded protocols.
#[derive(Debug)]
pub struct GameplayEngine<'a, R = StdRng> {
    protocols: &'a ProtocolRepository,
    rng: R,
    distractors: usize,
    session: Option<Session<'a>>,
    last_started: Option<&'a str>,
}

impl<'a> GameplayEngine<'a, StdRng> {
    /// Engine seeded from OS entropy with default settings.
    pub fn new(protocols: &'a ProtocolRepository) -> Self {
        Self::with_config(protocols, &SessionConfig::default())
    }

    pub fn with_config(protocols: &'a ProtocolRepository, config: &SessionConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None       => StdRng::from_entropy(),
        };
        let mut engine = Self::with_rng(protocols, rng);
        engine.distractors = config.distractors;
        engine
    }
}

impl<'a, R: Rng> GameplayEngine<'a, R> {
    /// Engine drawing all randomness from `rng`.
    pub fn with_rng(protocols: &'a ProtocolRepository, rng: R) -> Self {
        GameplayEngine {
            protocols,
            rng,
            distractors: DEFAULT_DISTRACTORS,
            session: None,
            last_started: None,
        }
    }

    pub fn protocols(&self) -> &'a ProtocolRepository {
        self.protocols
    }

    pub fn phase(&self) -> Phase {
        match &self.session {
            None => Phase::Idle,
            Some(s) if s.complete => Phase::Complete,
            Some(_) => Phase::InProgress,
        }
    }

    pub fn current_protocol(&self) -> Option<&'a Protocol> {
        self.session.as_ref().map(|s| s.protocol)
    }

    pub fn current_state(&self) -> Option<&'a State> {
        self.session.as_ref().and_then(|s| s.state)
    }

    pub fn score(&self) -> Score {
        self.session.as_ref().map(|s| s.score).unwrap_or_default()
    }

    pub fn current_correct_answer(&self) -> Option<&'a str> {
        self.current_state().and_then(State::correct_answer)
    }

    /// Begin a fresh session at the named protocol's initial state.
    ///
    /// An unknown name clears any running session.
    pub fn start_game(&mut self, protocol_name: &str) -> Result<GameEvent<'a>, GameError> {
        let protocols = self.protocols;
        let Some((name, protocol)) = protocols.protocols().get_key_value(protocol_name) else {
            self.session = None;
            return Err(GameError::UnknownProtocol(protocol_name.to_string()));
        };

        info!("starting protocol {:?}", name);
        self.last_started = Some(name.as_str());
        self.session = Some(Session {
            protocol,
            state: None,
            score: Score::default(),
            complete: false,
        });

        match protocol.initial_state() {
            Some(state) => Ok(self.enter(protocol, state)),
            None => {
                warn!("protocol {:?} has no initial state", name);
                Ok(self.complete(None))
            }
        }
    }

    /// Play the protocol the last session was started with again.
    pub fn restart(&mut self) -> Result<GameEvent<'a>, GameError> {
        let name = self.last_started.ok_or(GameError::NoActiveSession)?;
        self.start_game(name)
    }

    /// Check `answer` against the current question and update the score.
    ///
    /// Only QUESTION states accept answers; anywhere else the call is
    /// rejected and the score is left alone.
    pub fn submit_answer(&mut self, answer: &str) -> Result<AnswerFeedback<'a>, GameError> {
        let session = self.session.as_mut().ok_or(GameError::NoActiveSession)?;
        if session.complete {
            return Err(GameError::SessionComplete);
        }
        let state = session.state.ok_or(GameError::SessionComplete)?;
        let correct_answer = match (state.state_type(), state.correct_answer()) {
            (StateType::Question, Some(correct)) => correct,
            _ => return Err(GameError::NotAQuestion { state_id: state.id() }),
        };

        let is_correct = answer == correct_answer;
        session.score.record(is_correct);
        debug!(
            "state {}: answered {} ({})",
            state.id(),
            if is_correct { "correctly" } else { "incorrectly" },
            session.score
        );
        Ok(AnswerFeedback {
            is_correct,
            correct_answer,
            score: session.score,
        })
    }

    /// Follow one randomly chosen transition out of the current state.
    pub fn advance(&mut self) -> Result<GameEvent<'a>, GameError> {
        let session = self.session.as_ref().ok_or(GameError::NoActiveSession)?;
        if session.complete {
            return Err(GameError::SessionComplete);
        }
        let protocol = session.protocol;
        let current = session.state.ok_or(GameError::SessionComplete)?;

        let Some(target) = current.random_next_state_id_with(&mut self.rng) else {
            return Ok(self.complete(Some(current)));
        };

        match target {
            Transition::SameProtocol(id) => match protocol.state(*id) {
                Some(next) => Ok(self.enter(protocol, next)),
                None => {
                    warn!(
                        "protocol {:?}: state {} points at missing state {}",
                        protocol.name(),
                        current.id(),
                        id
                    );
                    Ok(self.complete(None))
                }
            },
            Transition::OtherProtocol(name) => {
                let protocols = self.protocols;
                match protocols.get(name) {
                    Some(other) => match other.initial_state() {
                        Some(next) => {
                            debug!("hopping from {:?} to {:?}", protocol.name(), other.name());
                            Ok(self.enter(other, next))
                        }
                        None => {
                            warn!("protocol {:?} has no initial state", other.name());
                            Ok(self.complete(None))
                        }
                    },
                    None => {
                        warn!(
                            "protocol {:?}: state {} points at unknown protocol {:?}",
                            protocol.name(),
                            current.id(),
                            name
                        );
                        Ok(self.complete(None))
                    }
                }
            }
        }
    }

    /// Shuffled options for the current question, using the engine's RNG.
    /// Empty outside a live QUESTION state.
    pub fn current_options(&mut self) -> Vec<String> {
        if self.phase() != Phase::InProgress {
            return Vec::new();
        }
        match self.current_state() {
            Some(state) => state.shuffled_options_with(self.distractors, &mut self.rng),
            None => Vec::new(),
        }
    }

    fn enter(&mut self, protocol: &'a Protocol, state: &'a State) -> GameEvent<'a> {
        if let Some(session) = self.session.as_mut() {
            session.protocol = protocol;
            session.state = Some(state);
        }
        debug!("protocol {:?}: entered state {} ({})", protocol.name(), state.id(), state.state_type());
        if state.is_final() {
            self.complete(Some(state))
        } else {
            GameEvent::StateChanged(state)
        }
    }

    fn complete(&mut self, final_state: Option<&'a State>) -> GameEvent<'a> {
        let score = match self.session.as_mut() {
            Some(session) => {
                session.complete = true;
                session.score
            }
            None => Score::default(),
        };
        info!("game complete: {}", score);
        GameEvent::GameComplete { final_state, score }
    }
}
