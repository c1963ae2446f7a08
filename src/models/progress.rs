// src/models/progress.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Partial answers of the attempt in progress, kept so the student can
/// leave the answering page and come back without losing anything.
///
/// Keys are 0-based question indices. Quiz answers hold the selected
/// option id, essay answers the written text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    #[serde(default)]
    pub user_answers: BTreeMap<usize, String>,
    #[serde(default)]
    pub current_question_index: usize,
}

impl ProgressSnapshot {
    /// Stores the answer for `index` and makes it the current question.
    /// A blank answer removes the entry.
    pub fn record(&mut self, index: usize, answer: String, total: usize) -> Result<(), AppError> {
        if index >= total {
            return Err(AppError::BadRequest(format!(
                "Question index {} is out of range (0..{})",
                index, total
            )));
        }

        if answer.trim().is_empty() {
            self.user_answers.remove(&index);
        } else {
            self.user_answers.insert(index, answer);
        }
        self.current_question_index = index;
        Ok(())
    }

    pub fn answer(&self, index: usize) -> Option<&str> {
        self.user_answers.get(&index).map(String::as_str)
    }

    pub fn answered_count(&self) -> usize {
        self.user_answers.len()
    }

    /// Snapshot written when leaving the review page: resume on the last question.
    pub fn rewind_to_last(&mut self, total: usize) {
        self.current_question_index = total.saturating_sub(1);
    }

    pub fn clear(&mut self) {
        self.user_answers.clear();
        self.current_question_index = 0;
    }
}
