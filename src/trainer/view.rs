use serde_json::{json, Value};

use crate::trainer::{
    models::{State, StateType},
    scoring::Score,
};

/// Shown on the results screen when play ended without a FINAL state.
pub const DEFAULT_COMPLETE_TEXT: &str = "Protocol complete!";
/// Shown instead of a grade when no question was asked.
pub const NO_QUESTIONS_TEXT: &str = "This protocol had no questions.";

/// Action the client should offer for a state.
fn action_str(state_type: StateType) -> &'static str {
    match state_type {
        StateType::Question => "answer",
        StateType::Intro    => "next",
        StateType::Final    => "finish",
    }
}

/// Numbered option list, 1-based to match keyboard shortcuts.
fn numbered_options(options: &[String]) -> Value {
    Value::Array(
        options
            .iter()
            .enumerate()
            .map(|(i, text)| json!({ "key": i + 1, "text": text }))
            .collect(),
    )
}

/// Map a live state plus its shuffled options to the JSON the game screen renders.
pub fn state_view(state: &State, options: &[String]) -> Value {
    json!({
        "id": state.id(),
        "description": state.description(),
        "kind": state.state_type().to_string(),
        "action": action_str(state.state_type()),
        "options": numbered_options(options),
    })
}

/// Map the end of a session to the JSON the results screen renders.
pub fn results_view(final_state: Option<&State>, score: Score) -> Value {
    let description = final_state
        .map(State::description)
        .unwrap_or(DEFAULT_COMPLETE_TEXT);
    let message = score.grade().map(|g| g.message()).unwrap_or(NO_QUESTIONS_TEXT);
    json!({
        "description": description,
        "correct": score.correct,
        "total": score.total,
        "score": score.to_string(),
        "percentage": score.rounded_percentage(),
        "message": message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trainer::models::Transition;

    #[test]
    fn question_view_lists_numbered_options() {
        let s = State::new(
            4,
            "Airway blocked",
            Some("Head tilt".into()),
            vec!["Wait".into()],
            vec![Transition::SameProtocol(5)],
        );
        let opts = vec!["Wait".to_string(), "Head tilt".to_string()];
        let v = state_view(&s, &opts);
        assert_eq!(v["id"], 4);
        assert_eq!(v["kind"], "question");
        assert_eq!(v["action"], "answer");
        assert_eq!(v["options"][0]["key"], 1);
        assert_eq!(v["options"][1]["text"], "Head tilt");
    }

    #[test]
    fn intro_view_has_next_action() {
        let s = State::new(0, "Scene", None, vec![], vec![Transition::SameProtocol(1)]);
        let v = state_view(&s, &[]);
        assert_eq!(v["action"], "next");
        assert_eq!(v["options"], json!([]));
    }

    #[test]
    fn results_view_with_final_state() {
        let fin = State::new(9, "Patient handed over.", None, vec![], vec![]);
        let v = results_view(Some(&fin), Score { correct: 9, total: 10 });
        assert_eq!(v["description"], "Patient handed over.");
        assert_eq!(v["score"], "9 / 10 (90%)");
        assert_eq!(v["percentage"], 90.0);
        assert_eq!(v["message"], "Excellent! Great job!");
    }

    #[test]
    fn final_view_has_finish_action() {
        let fin = State::new(2, "Handover", None, vec![], vec![]);
        let v = state_view(&fin, &[]);
        assert_eq!(v["kind"], "final");
        assert_eq!(v["action"], "finish");
    }

    #[test]
    fn results_view_score_and_percentage_agree() {
        let v = results_view(None, Score { correct: 1, total: 8 });
        assert_eq!(v["score"], "1 / 8 (13%)");
        assert_eq!(v["percentage"], 13.0);
    }

    #[test]
    fn results_view_without_questions_or_final_state() {
        let v = results_view(None, Score::default());
        assert_eq!(v["description"], DEFAULT_COMPLETE_TEXT);
        assert_eq!(v["score"], "No questions");
        assert_eq!(v["percentage"], Value::Null);
        assert_eq!(v["message"], NO_QUESTIONS_TEXT);
    }
}
