// src/models/assessment.rs

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether an assessment is a multiple-choice quiz or an essay.
/// Serialized as `Quiz` / `Essay`, the label pages show as the module type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssessmentKind {
    Quiz,
    Essay,
}

impl AssessmentKind {
    /// Lower-case noun used inside sentences ("submit your quiz").
    pub fn noun(&self) -> &'static str {
        match self {
            AssessmentKind::Quiz => "quiz",
            AssessmentKind::Essay => "essay",
        }
    }
}

impl fmt::Display for AssessmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssessmentKind::Quiz => f.write_str("Quiz"),
            AssessmentKind::Essay => f.write_str("Essay"),
        }
    }
}

/// One choice of a quiz question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(alias = "text")]
    pub question_text: String,
    #[serde(default)]
    pub options: Vec<AnswerOption>,
}

/// Quiz definition as served by the remote API under the `assignment` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAssignment {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    pub title: String,
    /// Module password. Emptied once the assessment is sealed by the gate.
    #[serde(default)]
    pub password: String,
    /// Minutes; absent or 0 means no limit.
    #[serde(default)]
    pub time_limit: Option<u32>,
    #[serde(default)]
    pub guidelines: Vec<String>,
    #[serde(default)]
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EssayQuestion {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(alias = "text")]
    pub question_text: String,
    /// The model answer.
    #[serde(default)]
    pub answer: String,
}

/// Essay definition as served by the remote API under the `essayAssignment` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EssayAssignment {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub time_limit: Option<u32>,
    #[serde(default)]
    pub guidelines: Vec<String>,
    #[serde(default)]
    pub questions: Vec<EssayQuestion>,
}

/// Response envelope of `GET /api/v1/{id}`.
#[derive(Debug, Deserialize)]
pub struct QuizEnvelope {
    pub assignment: Option<QuizAssignment>,
}

/// Response envelope of `GET /api/v1/essay/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EssayEnvelope {
    pub essay_assignment: Option<EssayAssignment>,
}

/// A resolved assessment. Lookups return `Option<Assessment>`, `None`
/// meaning the id names neither a quiz nor an essay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Assessment {
    Quiz(QuizAssignment),
    Essay(EssayAssignment),
}

impl Assessment {
    pub fn kind(&self) -> AssessmentKind {
        match self {
            Assessment::Quiz(_) => AssessmentKind::Quiz,
            Assessment::Essay(_) => AssessmentKind::Essay,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Assessment::Quiz(q) => &q.title,
            Assessment::Essay(e) => &e.title,
        }
    }

    pub fn guidelines(&self) -> &[String] {
        match self {
            Assessment::Quiz(q) => &q.guidelines,
            Assessment::Essay(e) => &e.guidelines,
        }
    }

    /// Time limit in minutes, 0 when none is set.
    pub fn time_limit(&self) -> u32 {
        match self {
            Assessment::Quiz(q) => q.time_limit.unwrap_or(0),
            Assessment::Essay(e) => e.time_limit.unwrap_or(0),
        }
    }

    pub fn question_count(&self) -> usize {
        match self {
            Assessment::Quiz(q) => q.questions.len(),
            Assessment::Essay(e) => e.questions.len(),
        }
    }

    /// Moves the password out, leaving an empty string behind.
    pub fn take_password(&mut self) -> String {
        match self {
            Assessment::Quiz(q) => std::mem::take(&mut q.password),
            Assessment::Essay(e) => std::mem::take(&mut e.password),
        }
    }

    /// Questions stripped of correctness flags and model answers.
    pub fn public_questions(&self) -> Vec<PublicQuestion> {
        match self {
            Assessment::Quiz(q) => q
                .questions
                .iter()
                .map(|question| PublicQuestion {
                    id: question.id.clone(),
                    question_text: question.question_text.clone(),
                    options: Some(
                        question
                            .options
                            .iter()
                            .map(|o| PublicOption {
                                id: o.id.clone(),
                                text: o.text.clone(),
                            })
                            .collect(),
                    ),
                })
                .collect(),
            Assessment::Essay(e) => e
                .questions
                .iter()
                .map(|question| PublicQuestion {
                    id: question.id.clone(),
                    question_text: question.question_text.clone(),
                    options: None,
                })
                .collect(),
        }
    }
}

/// DTO for sending a question to the answering page (excludes answers).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    pub id: String,
    pub question_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<PublicOption>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicOption {
    pub id: String,
    pub text: String,
}

/// Human-readable time limit, e.g. "1 hour 30 minutes".
pub fn format_time_limit(minutes: u32) -> String {
    if minutes == 0 {
        return "No time limit".to_string();
    }

    let hours = minutes / 60;
    let mins = minutes % 60;
    let plural = |n: u32| if n > 1 { "s" } else { "" };

    if hours > 0 {
        if mins > 0 {
            format!("{} hour{} {} minute{}", hours, plural(hours), mins, plural(mins))
        } else {
            format!("{} hour{}", hours, plural(hours))
        }
    } else {
        format!("{} minute{}", mins, plural(mins))
    }
}
