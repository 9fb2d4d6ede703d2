use std::collections::BTreeMap;
use std::fmt;

use rand::seq::{index, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of distractors shown next to the correct answer.
pub const DEFAULT_DISTRACTORS: usize = 3;

// ---------------------------------------------------------------------------
// Transition targets
// ---------------------------------------------------------------------------

/// One entry of a state's "Next state" list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transition {
    /// A state id inside the protocol currently being played.
    SameProtocol(u32),
    /// The name of another protocol, entered at its initial state.
    OtherProtocol(String),
}

impl Transition {
    /// Integer-looking lines are local ids, everything else names a protocol.
    ///
    /// Ids are `u32`: a number above `u32::MAX` does not fit and is kept
    /// as a protocol name.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match text.parse::<u32>() {
            Ok(id) => Transition::SameProtocol(id),
            Err(_) => Transition::OtherProtocol(text.to_string()),
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::SameProtocol(id) => write!(f, "{}", id),
            Transition::OtherProtocol(name) => write!(f, "{}", name),
        }
    }
}

// ---------------------------------------------------------------------------
// States
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateType {
    /// Prompt with a single "next" action.
    Intro,
    /// Prompt with a correct answer and a distractor pool.
    Question,
    /// Terminal summary, no outgoing transitions.
    Final,
}

impl StateType {
    /// FINAL iff there are no transitions, else QUESTION iff an answer exists.
    pub fn derive(has_correct_answer: bool, has_transitions: bool) -> Self {
        if !has_transitions {
            StateType::Final
        } else if has_correct_answer {
            StateType::Question
        } else {
            StateType::Intro
        }
    }
}

impl fmt::Display for StateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateType::Intro    => write!(f, "intro"),
            StateType::Question => write!(f, "question"),
            StateType::Final    => write!(f, "final"),
        }
    }
}

/// One node of a protocol graph. Immutable once built; the type is
/// derived from the answer and transition fields in [`State::new`].
///
/// Deserializing goes through [`State::new`] as well, so a stored
/// `state_type` is ignored and derived again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StateRecord")]
pub struct State {
    id: u32,
    description: String,
    state_type: StateType,
    correct_answer: Option<String>,
    wrong_answers: Vec<String>,
    next_state_ids: Vec<Transition>,
}

impl State {
    pub fn new(
        id: u32,
        description: impl Into<String>,
        correct_answer: Option<String>,
        wrong_answers: Vec<String>,
        next_state_ids: Vec<Transition>,
    ) -> Self {
        let state_type = StateType::derive(correct_answer.is_some(), !next_state_ids.is_empty());
        // Only questions carry an answer.
        let correct_answer = correct_answer.filter(|_| state_type == StateType::Question);
        State {
            id,
            description: description.into(),
            state_type,
            correct_answer,
            wrong_answers,
            next_state_ids,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn state_type(&self) -> StateType {
        self.state_type
    }

    pub fn correct_answer(&self) -> Option<&str> {
        self.correct_answer.as_deref()
    }

    pub fn wrong_answers(&self) -> &[String] {
        &self.wrong_answers
    }

    pub fn next_state_ids(&self) -> &[Transition] {
        &self.next_state_ids
    }

    pub fn is_final(&self) -> bool {
        self.state_type == StateType::Final
    }

    /// Up to `n` distractors drawn without replacement.
    ///
    /// A pool of `n` or fewer entries is returned whole, in file order.
    pub fn sample_wrong_answers(&self, n: usize) -> Vec<String> {
        self.sample_wrong_answers_with(n, &mut rand::thread_rng())
    }

    pub fn sample_wrong_answers_with<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<String> {
        if self.wrong_answers.len() <= n {
            return self.wrong_answers.clone();
        }
        index::sample(rng, self.wrong_answers.len(), n)
            .into_iter()
            .map(|i| self.wrong_answers[i].clone())
            .collect()
    }

    /// The correct answer plus up to three distractors, shuffled.
    /// Empty when the state has no correct answer.
    pub fn shuffled_options(&self) -> Vec<String> {
        self.shuffled_options_with(DEFAULT_DISTRACTORS, &mut rand::thread_rng())
    }

    pub fn shuffled_options_with<R: Rng + ?Sized>(&self, distractors: usize, rng: &mut R) -> Vec<String> {
        let Some(correct) = &self.correct_answer else {
            return Vec::new();
        };
        let mut options = Vec::with_capacity(1 + distractors.min(self.wrong_answers.len()));
        options.push(correct.clone());
        options.extend(self.sample_wrong_answers_with(distractors, rng));
        options.shuffle(rng);
        options
    }

    /// A uniformly chosen transition, or `None` for a FINAL state.
    pub fn random_next_state_id(&self) -> Option<&Transition> {
        self.random_next_state_id_with(&mut rand::thread_rng())
    }

    pub fn random_next_state_id_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Transition> {
        self.next_state_ids.choose(rng)
    }
}

/// Serialized shape of a [`State`] without the derived type.
#[derive(Deserialize)]
struct StateRecord {
    id: u32,
    #[serde(default)]
    description: String,
    #[serde(default)]
    correct_answer: Option<String>,
    #[serde(default)]
    wrong_answers: Vec<String>,
    #[serde(default)]
    next_state_ids: Vec<Transition>,
}

impl From<StateRecord> for State {
    fn from(r: StateRecord) -> Self {
        State::new(r.id, r.description, r.correct_answer, r.wrong_answers, r.next_state_ids)
    }
}

// ---------------------------------------------------------------------------
// Protocols
// ---------------------------------------------------------------------------

/// Id of the state every protocol is entered at.
pub const INITIAL_STATE_ID: u32 = 0;

/// A named graph of states keyed by id.
///
/// On deserialization each state is filed under its own `id`; the map
/// keys in the input are not trusted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ProtocolRecord")]
pub struct Protocol {
    name: String,
    states: BTreeMap<u32, State>,
}

impl Protocol {
    pub fn new(name: impl Into<String>) -> Self {
        Protocol { name: name.into(), states: BTreeMap::new() }
    }

    /// Add a state. An existing state with the same id is replaced and
    /// handed back, so callers can report the overwrite.
    pub fn insert(&mut self, state: State) -> Option<State> {
        self.states.insert(state.id, state)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn states(&self) -> &BTreeMap<u32, State> {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The state with id 0, if the document defined one.
    pub fn initial_state(&self) -> Option<&State> {
        self.states.get(&INITIAL_STATE_ID)
    }

    pub fn state(&self, id: u32) -> Option<&State> {
        self.states.get(&id)
    }
}

#[derive(Deserialize)]
struct ProtocolRecord {
    name: String,
    #[serde(default)]
    states: BTreeMap<u32, State>,
}

impl From<ProtocolRecord> for Protocol {
    fn from(r: ProtocolRecord) -> Self {
        let mut protocol = Protocol::new(r.name);
        for state in r.states.into_values() {
            protocol.insert(state);
        }
        protocol
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn question(wrong: &[&str]) -> State {
        State::new(
            1,
            "Patient is not breathing.",
            Some("Start CPR".into()),
            strings(wrong),
            vec![Transition::SameProtocol(2)],
        )
    }

    #[test]
    fn state_type_is_derived_from_fields() {
        let fin = State::new(9, "Done", Some("ignored".into()), vec!["x".into()], vec![]);
        assert_eq!(fin.state_type(), StateType::Final);
        assert_eq!(fin.correct_answer(), None);
        assert!(fin.shuffled_options().is_empty());

        let intro = State::new(0, "Scene", None, vec![], vec![Transition::SameProtocol(1)]);
        assert_eq!(intro.state_type(), StateType::Intro);

        assert_eq!(question(&["a"]).state_type(), StateType::Question);
    }

    #[test]
    fn transition_parse_prefers_integers() {
        assert_eq!(Transition::parse(" 12 "), Transition::SameProtocol(12));
        assert_eq!(Transition::parse("Cardiac Arrest"), Transition::OtherProtocol("Cardiac Arrest".into()));
        assert_eq!(Transition::parse("-1"), Transition::OtherProtocol("-1".into()));
    }

    #[test]
    fn small_pool_is_returned_whole() {
        let s = question(&["a", "b"]);
        assert_eq!(s.sample_wrong_answers(3), strings(&["a", "b"]));
        assert_eq!(s.sample_wrong_answers(2), strings(&["a", "b"]));
    }

    #[test]
    fn large_pool_is_sampled_without_replacement() {
        let s = question(&["a", "b", "c", "d", "e", "f"]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let mut picked = s.sample_wrong_answers_with(3, &mut rng);
            assert_eq!(picked.len(), 3);
            picked.sort();
            picked.dedup();
            assert_eq!(picked.len(), 3, "sample repeated an entry");
        }
    }

    #[test]
    fn options_hold_correct_answer_once() {
        let s = question(&["a", "b", "c", "d", "e"]);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let opts = s.shuffled_options_with(DEFAULT_DISTRACTORS, &mut rng);
            assert_eq!(opts.len(), 4);
            assert_eq!(opts.iter().filter(|o| *o == "Start CPR").count(), 1);
        }
    }

    #[test]
    fn distractors_are_chosen_evenly() {
        let wrong = ["a", "b", "c", "d", "e"];
        let s = question(&wrong);
        let mut rng = StdRng::seed_from_u64(1234);
        let trials = 5000;
        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..trials {
            for opt in s.shuffled_options_with(DEFAULT_DISTRACTORS, &mut rng) {
                *counts.entry(opt).or_default() += 1;
            }
        }
        // Each distractor should show up in about 3/5 of the rounds.
        let expected = trials * 3 / 5;
        for w in wrong {
            let n = counts.get(w).copied().unwrap_or(0);
            assert!(
                n > expected * 85 / 100 && n < expected * 115 / 100,
                "distractor {w} picked {n} times, expected about {expected}"
            );
        }
        assert_eq!(counts["Start CPR"], trials);
    }

    #[test]
    fn correct_answer_position_varies() {
        let s = question(&["a", "b", "c"]);
        let mut rng = StdRng::seed_from_u64(99);
        let mut positions = [0usize; 4];
        for _ in 0..400 {
            let opts = s.shuffled_options_with(DEFAULT_DISTRACTORS, &mut rng);
            let pos = opts.iter().position(|o| o == "Start CPR").unwrap();
            positions[pos] += 1;
        }
        assert!(positions.iter().all(|&n| n > 50), "skewed positions: {positions:?}");
    }

    #[test]
    fn single_distractor_gives_two_options() {
        let opts = question(&["Check pulse"]).shuffled_options();
        assert_eq!(opts.len(), 2);
        assert!(opts.contains(&"Start CPR".to_string()));
        assert!(opts.contains(&"Check pulse".to_string()));
    }

    #[test]
    fn options_are_empty_without_correct_answer() {
        let intro = State::new(0, "Scene", None, strings(&["x"]), vec![Transition::SameProtocol(1)]);
        assert!(intro.shuffled_options().is_empty());
    }

    #[test]
    fn random_next_state_covers_all_branches() {
        let s = State::new(
            0,
            "Fork",
            None,
            vec![],
            vec![Transition::SameProtocol(1), Transition::OtherProtocol("B".into())],
        );
        let mut rng = StdRng::seed_from_u64(5);
        let mut seen_local = false;
        let mut seen_other = false;
        for _ in 0..100 {
            match s.random_next_state_id_with(&mut rng) {
                Some(Transition::SameProtocol(1)) => seen_local = true,
                Some(Transition::OtherProtocol(name)) if name == "B" => seen_other = true,
                other => panic!("unexpected transition {other:?}"),
            }
        }
        assert!(seen_local && seen_other);

        let fin = State::new(3, "End", None, vec![], vec![]);
        assert_eq!(fin.random_next_state_id(), None);
    }

    #[test]
    fn deserialized_state_type_is_derived_again() {
        let json = r#"{
            "id": 4,
            "description": "tampered",
            "state_type": "Final",
            "correct_answer": null,
            "wrong_answers": [],
            "next_state_ids": [{ "SameProtocol": 1 }]
        }"#;
        let s: State = serde_json::from_str(json).unwrap();
        assert_eq!(s.state_type(), StateType::Intro);
        assert_eq!(s.next_state_ids(), &[Transition::SameProtocol(1)]);
    }

    #[test]
    fn serialized_state_reads_back_equal() {
        let s = question(&["a", "b"]);
        let back: State = serde_json::from_str(&serde_json::to_string(&s).unwrap()).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn deserialized_protocol_files_states_by_their_own_id() {
        let json = r#"{
            "name": "Keys",
            "states": { "7": { "id": 0, "description": "start" } }
        }"#;
        let p: Protocol = serde_json::from_str(json).unwrap();
        assert_eq!(p.initial_state().map(State::description), Some("start"));
        assert!(p.state(7).is_none());
    }

    #[test]
    fn oversized_id_is_kept_as_a_name() {
        assert_eq!(Transition::parse("4294967295"), Transition::SameProtocol(u32::MAX));
        assert_eq!(Transition::parse("4294967296"), Transition::OtherProtocol("4294967296".into()));
    }

    #[test]
    fn protocol_lookups() {
        let mut p = Protocol::new("Airway");
        assert!(p.initial_state().is_none());
        p.insert(State::new(0, "Start", None, vec![], vec![Transition::SameProtocol(1)]));
        p.insert(State::new(1, "End", None, vec![], vec![]));
        assert_eq!(p.initial_state().map(State::id), Some(0));
        assert_eq!(p.state(1).map(State::description), Some("End"));
        assert!(p.state(2).is_none());
    }

    #[test]
    fn protocol_insert_reports_overwrite() {
        let mut p = Protocol::new("Dup");
        assert!(p.insert(State::new(0, "first", None, vec![], vec![])).is_none());
        let old = p.insert(State::new(0, "second", None, vec![], vec![]));
        assert_eq!(old.map(|s| s.description().to_string()), Some("first".into()));
        assert_eq!(p.len(), 1);
        assert_eq!(p.initial_state().map(State::description), Some("second"));
    }
}
