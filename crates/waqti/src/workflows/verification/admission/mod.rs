mod policy;
mod questions;
mod rules;

pub use policy::{AdmissionVerdict, PASS_THRESHOLD};
pub use questions::{AdmissionQuestion, QuestionKind, ADMISSION_QUESTIONS};

use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::AnswerValue;

/// Pure scorer over a fixed question bank.
#[derive(Debug, Clone)]
pub struct AdmissionScoringEngine {
    questions: Vec<AdmissionQuestion>,
}

impl Default for AdmissionScoringEngine {
    fn default() -> Self {
        Self::new(ADMISSION_QUESTIONS.to_vec())
    }
}

impl AdmissionScoringEngine {
    pub fn new(questions: Vec<AdmissionQuestion>) -> Self {
        Self { questions }
    }

    pub fn questions(&self) -> &[AdmissionQuestion] {
        &self.questions
    }

    pub fn question(&self, id: &str) -> Option<&AdmissionQuestion> {
        self.questions.iter().find(|question| question.id == id)
    }

    /// Every question needs a non-empty answer of the right shape before scoring.
    pub fn is_complete(&self, answers: &BTreeMap<String, AnswerValue>) -> bool {
        self.questions
            .iter()
            .all(|question| rules::is_answered(question, answers.get(question.id)))
    }

    pub fn unanswered(&self, answers: &BTreeMap<String, AnswerValue>) -> Vec<&'static str> {
        self.questions
            .iter()
            .filter(|question| !rules::is_answered(question, answers.get(question.id)))
            .map(|question| question.id)
            .collect()
    }

    pub fn score(&self, answers: &BTreeMap<String, AnswerValue>) -> AdmissionOutcome {
        let (breakdown, score) = rules::score_answers(&self.questions, answers);
        AdmissionOutcome {
            score,
            verdict: AdmissionVerdict::for_score(score),
            breakdown,
        }
    }
}

/// Contribution of one question, kept for transparency in review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionScore {
    pub question_id: &'static str,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdmissionOutcome {
    pub score: u8,
    pub verdict: AdmissionVerdict,
    pub breakdown: Vec<QuestionScore>,
}
