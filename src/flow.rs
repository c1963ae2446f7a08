// src/flow.rs

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::assessment::AssessmentKind;

/// Steps of one assessment attempt, in the order a student walks them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    ModuleAccess,
    Guidelines,
    Answering,
    SubmissionReview,
    Scoring,
    CorrectAnswers,
    Feedback,
    Completed,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Step::ModuleAccess => "module access",
            Step::Guidelines => "guidelines",
            Step::Answering => "answering",
            Step::SubmissionReview => "submission review",
            Step::Scoring => "scoring",
            Step::CorrectAnswers => "correct answers",
            Step::Feedback => "feedback",
            Step::Completed => "completed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// The password gate has not been passed yet.
    NotUnlocked,
    InvalidStep { action: &'static str, step: Step },
    NoGuidelines,
    /// `confirm` arrived without a preceding `initiate`.
    ConfirmationRequired,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionError::NotUnlocked => f.write_str("Enter the module password first"),
            TransitionError::InvalidStep { action, step } => {
                write!(f, "Cannot {} during the {} step", action, step)
            }
            TransitionError::NoGuidelines => f.write_str("No guidelines available"),
            TransitionError::ConfirmationRequired => f.write_str("Confirm the submission first"),
        }
    }
}

impl std::error::Error for TransitionError {}

/// State machine for a single assessment attempt.
///
/// ModuleAccess -> Guidelines -> Answering -> SubmissionReview -> Scoring
/// -> (CorrectAnswers for quizzes) -> Feedback -> Completed.
/// SubmissionReview can fall back to Answering. Nothing else moves backwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentFlow {
    step: Step,
    kind: AssessmentKind,
    confirm_pending: bool,
}

impl AssessmentFlow {
    pub fn new(kind: AssessmentKind) -> Self {
        Self {
            step: Step::ModuleAccess,
            kind,
            confirm_pending: false,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn kind(&self) -> AssessmentKind {
        self.kind
    }

    pub fn is_unlocked(&self) -> bool {
        self.step != Step::ModuleAccess
    }

    pub fn is_confirm_pending(&self) -> bool {
        self.confirm_pending
    }

    /// Fails unless the flow sits exactly at `wanted`.
    pub fn require(&self, wanted: Step, action: &'static str) -> Result<(), TransitionError> {
        if self.step == wanted {
            Ok(())
        } else if self.step == Step::ModuleAccess {
            Err(TransitionError::NotUnlocked)
        } else {
            Err(TransitionError::InvalidStep {
                action,
                step: self.step,
            })
        }
    }

    /// Fails unless the flow has reached `earliest` or any later step.
    pub fn require_reached(&self, earliest: Step, action: &'static str) -> Result<(), TransitionError> {
        if self.step >= earliest {
            Ok(())
        } else if self.step == Step::ModuleAccess {
            Err(TransitionError::NotUnlocked)
        } else {
            Err(TransitionError::InvalidStep {
                action,
                step: self.step,
            })
        }
    }

    /// Password matched.
    pub fn unlock(&mut self) -> Result<Step, TransitionError> {
        if self.step != Step::ModuleAccess {
            return Err(TransitionError::InvalidStep {
                action: "enter the module",
                step: self.step,
            });
        }
        self.step = Step::Guidelines;
        Ok(self.step)
    }

    pub fn accept_guidelines(&mut self, guideline_count: usize) -> Result<Step, TransitionError> {
        self.require(Step::Guidelines, "accept the guidelines")?;
        if guideline_count == 0 {
            return Err(TransitionError::NoGuidelines);
        }
        self.step = Step::Answering;
        Ok(self.step)
    }

    pub fn begin_review(&mut self) -> Result<Step, TransitionError> {
        self.require(Step::Answering, "review the submission")?;
        self.step = Step::SubmissionReview;
        Ok(self.step)
    }

    /// "Go back" from the review page; closes any open confirm dialog.
    pub fn return_to_answering(&mut self) -> Result<Step, TransitionError> {
        self.require(Step::SubmissionReview, "go back to the questions")?;
        self.confirm_pending = false;
        self.step = Step::Answering;
        Ok(self.step)
    }

    pub fn initiate_submission(&mut self) -> Result<(), TransitionError> {
        self.require(Step::SubmissionReview, "submit")?;
        self.confirm_pending = true;
        Ok(())
    }

    pub fn cancel_submission(&mut self) -> Result<(), TransitionError> {
        self.require(Step::SubmissionReview, "cancel the submission")?;
        self.confirm_pending = false;
        Ok(())
    }

    /// Consumes the open confirm dialog. The flow stays at review until
    /// [`AssessmentFlow::record_score`] is called with a server score.
    pub fn confirm_submission(&mut self) -> Result<(), TransitionError> {
        self.require(Step::SubmissionReview, "submit")?;
        if !self.confirm_pending {
            return Err(TransitionError::ConfirmationRequired);
        }
        self.confirm_pending = false;
        Ok(())
    }

    pub fn record_score(&mut self) -> Result<Step, TransitionError> {
        self.require(Step::SubmissionReview, "record a score")?;
        self.step = Step::Scoring;
        Ok(self.step)
    }

    /// Quizzes show their correct answers first; essays go straight to feedback.
    pub fn continue_from_score(&mut self) -> Result<Step, TransitionError> {
        self.require(Step::Scoring, "leave the score page")?;
        self.step = match self.kind {
            AssessmentKind::Quiz => Step::CorrectAnswers,
            AssessmentKind::Essay => Step::Feedback,
        };
        Ok(self.step)
    }

    pub fn finish_correct_answers(&mut self) -> Result<Step, TransitionError> {
        self.require(Step::CorrectAnswers, "leave the correct answers")?;
        self.step = Step::Feedback;
        Ok(self.step)
    }

    /// Feedback submitted or skipped.
    pub fn finish_feedback(&mut self) -> Result<Step, TransitionError> {
        self.require(Step::Feedback, "finish feedback")?;
        self.step = Step::Completed;
        Ok(self.step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_review(kind: AssessmentKind) -> AssessmentFlow {
        let mut flow = AssessmentFlow::new(kind);
        flow.unlock().unwrap();
        flow.accept_guidelines(3).unwrap();
        flow.begin_review().unwrap();
        flow
    }

    #[test]
    fn quiz_walks_through_correct_answers() {
        let mut flow = at_review(AssessmentKind::Quiz);
        flow.initiate_submission().unwrap();
        flow.confirm_submission().unwrap();
        assert_eq!(flow.record_score().unwrap(), Step::Scoring);
        assert_eq!(flow.continue_from_score().unwrap(), Step::CorrectAnswers);
        assert_eq!(flow.finish_correct_answers().unwrap(), Step::Feedback);
        assert_eq!(flow.finish_feedback().unwrap(), Step::Completed);
    }

    #[test]
    fn essay_skips_correct_answers() {
        let mut flow = at_review(AssessmentKind::Essay);
        flow.initiate_submission().unwrap();
        flow.confirm_submission().unwrap();
        flow.record_score().unwrap();
        assert_eq!(flow.continue_from_score().unwrap(), Step::Feedback);
        assert!(flow.finish_correct_answers().is_err());
    }

    #[test]
    fn empty_guidelines_block_acceptance() {
        let mut flow = AssessmentFlow::new(AssessmentKind::Quiz);
        flow.unlock().unwrap();
        assert_eq!(flow.accept_guidelines(0), Err(TransitionError::NoGuidelines));
        assert_eq!(flow.step(), Step::Guidelines);
        assert_eq!(flow.accept_guidelines(1).unwrap(), Step::Answering);
    }

    #[test]
    fn locked_flow_reports_not_unlocked() {
        let mut flow = AssessmentFlow::new(AssessmentKind::Quiz);
        assert!(!flow.is_unlocked());
        assert_eq!(flow.accept_guidelines(2), Err(TransitionError::NotUnlocked));
        assert_eq!(
            flow.require_reached(Step::Guidelines, "view the guidelines"),
            Err(TransitionError::NotUnlocked)
        );
    }

    #[test]
    fn confirm_requires_initiate() {
        let mut flow = at_review(AssessmentKind::Quiz);
        assert_eq!(flow.confirm_submission(), Err(TransitionError::ConfirmationRequired));

        flow.initiate_submission().unwrap();
        flow.cancel_submission().unwrap();
        assert!(!flow.is_confirm_pending());
        assert_eq!(flow.confirm_submission(), Err(TransitionError::ConfirmationRequired));
    }

    #[test]
    fn confirm_does_not_advance_by_itself() {
        let mut flow = at_review(AssessmentKind::Quiz);
        flow.initiate_submission().unwrap();
        flow.confirm_submission().unwrap();
        assert_eq!(flow.step(), Step::SubmissionReview);
        assert!(!flow.is_confirm_pending());
    }

    #[test]
    fn going_back_closes_the_dialog() {
        let mut flow = at_review(AssessmentKind::Essay);
        flow.initiate_submission().unwrap();
        assert_eq!(flow.return_to_answering().unwrap(), Step::Answering);
        assert!(!flow.is_confirm_pending());
        assert_eq!(flow.begin_review().unwrap(), Step::SubmissionReview);
    }

    #[test]
    fn unlock_only_from_module_access() {
        let mut flow = AssessmentFlow::new(AssessmentKind::Quiz);
        flow.unlock().unwrap();
        assert!(matches!(
            flow.unlock(),
            Err(TransitionError::InvalidStep { step: Step::Guidelines, .. })
        ));
    }

    #[test]
    fn require_reached_accepts_later_steps() {
        let mut flow = at_review(AssessmentKind::Quiz);
        flow.initiate_submission().unwrap();
        flow.confirm_submission().unwrap();
        flow.record_score().unwrap();
        flow.continue_from_score().unwrap();
        assert!(flow.require_reached(Step::Scoring, "view the score").is_ok());
        assert!(flow.require(Step::Scoring, "view the score").is_err());
    }
}
