use super::common::*;
use std::collections::BTreeMap;

use crate::workflows::verification::admission::{
    AdmissionScoringEngine, AdmissionVerdict, ADMISSION_QUESTIONS, PASS_THRESHOLD,
};
use crate::workflows::verification::domain::AnswerValue;

fn engine() -> AdmissionScoringEngine {
    AdmissionScoringEngine::default()
}

fn multi_score(selected: &[&str]) -> f64 {
    let question = &ADMISSION_QUESTIONS[3];
    let mut answers = BTreeMap::new();
    answers.insert(question.id.to_string(), multi_choice(selected));
    engine()
        .score(&answers)
        .breakdown
        .into_iter()
        .find(|entry| entry.question_id == question.id)
        .expect("multi-choice question scored")
        .score
}

#[test]
fn perfect_answers_score_one_hundred() {
    let outcome = engine().score(&perfect_answers());

    assert_eq!(outcome.score, 100);
    assert_eq!(outcome.verdict, AdmissionVerdict::Passed);
    assert!(outcome.breakdown.iter().all(|entry| entry.score == 1.0));
}

#[test]
fn empty_answers_score_zero() {
    let outcome = engine().score(&BTreeMap::new());

    assert_eq!(outcome.score, 0);
    assert_eq!(outcome.verdict, AdmissionVerdict::NeedsReview);
    assert!(!engine().is_complete(&BTreeMap::new()));
}

#[test]
fn multi_choice_penalises_wrong_selections() {
    let options = ADMISSION_QUESTIONS[3].options;
    let correct = ADMISSION_QUESTIONS[3].correct_options();
    let distractor = options
        .iter()
        .copied()
        .find(|option| !correct.contains(option))
        .expect("distractor present");

    assert_eq!(multi_score(&correct), 1.0);

    let two_right_one_wrong = multi_score(&[correct[0], correct[1], distractor]);
    assert!((two_right_one_wrong - 1.0 / 3.0).abs() < 1e-9);

    assert_eq!(multi_score(&[correct[0], distractor]), 0.0);
    assert_eq!(multi_score(&[distractor]), 0.0);

    let everything = multi_score(options);
    assert!((everything - 2.0 / 3.0).abs() < 1e-9);
}

#[test]
fn one_wrong_single_choice_scores_seventy_five() {
    let outcome = engine().score(&three_quarter_answers());

    assert_eq!(outcome.score, 75);
    assert!(outcome.score >= PASS_THRESHOLD);
}

#[test]
fn wrong_shape_answers_count_as_unanswered() {
    let mut answers = perfect_answers();
    let multi = ADMISSION_QUESTIONS[3].id;
    answers.insert(
        multi.to_string(),
        AnswerValue::Single(ADMISSION_QUESTIONS[3].options[0].to_string()),
    );

    assert_eq!(engine().unanswered(&answers), vec![multi]);
    assert_eq!(engine().score(&answers).score, 75);
}

#[test]
fn verdict_threshold_is_inclusive() {
    assert_eq!(AdmissionVerdict::for_score(PASS_THRESHOLD), AdmissionVerdict::Passed);
    assert_eq!(
        AdmissionVerdict::for_score(PASS_THRESHOLD - 1),
        AdmissionVerdict::NeedsReview
    );
    assert_eq!(AdmissionVerdict::NeedsReview.label(), "Needs Review");
}
