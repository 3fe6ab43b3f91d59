use std::collections::BTreeMap;

use super::super::domain::AnswerValue;
use super::questions::{AdmissionQuestion, QuestionKind};
use super::QuestionScore;

/// Score one question in [0, 1].
///
/// Multi-choice answers lose a full correct option's worth for every wrong selection:
/// `max(0, (correct - incorrect) / |key|)`. Answers of the wrong shape score zero.
pub(crate) fn question_score(question: &AdmissionQuestion, answer: Option<&AnswerValue>) -> f64 {
    match (question.kind, answer) {
        (QuestionKind::SingleChoice { correct }, Some(AnswerValue::Single(value))) => {
            if value == correct {
                1.0
            } else {
                0.0
            }
        }
        (QuestionKind::MultipleChoice { correct }, Some(AnswerValue::Multiple(selected))) => {
            if correct.is_empty() {
                return 0.0;
            }
            let correct_count = selected
                .iter()
                .filter(|option| correct.iter().any(|key| *key == option.as_str()))
                .count() as f64;
            let incorrect_count = selected.len() as f64 - correct_count;
            ((correct_count - incorrect_count) / correct.len() as f64).clamp(0.0, 1.0)
        }
        _ => 0.0,
    }
}

pub(crate) fn is_answered(question: &AdmissionQuestion, answer: Option<&AnswerValue>) -> bool {
    match (question.kind, answer) {
        (QuestionKind::SingleChoice { .. }, Some(AnswerValue::Single(value))) => !value.is_empty(),
        (QuestionKind::MultipleChoice { .. }, Some(AnswerValue::Multiple(values))) => {
            !values.is_empty()
        }
        _ => false,
    }
}

pub(crate) fn score_answers(
    questions: &[AdmissionQuestion],
    answers: &BTreeMap<String, AnswerValue>,
) -> (Vec<QuestionScore>, u8) {
    if questions.is_empty() {
        return (Vec::new(), 0);
    }

    let breakdown: Vec<QuestionScore> = questions
        .iter()
        .map(|question| QuestionScore {
            question_id: question.id,
            score: question_score(question, answers.get(question.id)),
        })
        .collect();

    let sum: f64 = breakdown.iter().map(|entry| entry.score).sum();
    let percent = (100.0 * sum / questions.len() as f64).round();
    (breakdown, percent.clamp(0.0, 100.0) as u8)
}
