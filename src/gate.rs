// src/gate.rs

use serde::{Deserialize, Serialize};

use crate::{
    client::AssessmentApi,
    error::AppError,
    models::assessment::{Assessment, AssessmentKind},
    storage::SessionState,
    utils::hash::{hash_password, verify_password},
};

/// An assessment whose password has been replaced by an argon2 hash.
/// The plaintext password never reaches session storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedAssessment {
    assessment: Assessment,
    password_hash: String,
}

impl SealedAssessment {
    pub fn seal(mut assessment: Assessment) -> Result<Self, AppError> {
        let password = assessment.take_password();
        let password_hash = hash_password(&password)?;
        Ok(Self {
            assessment,
            password_hash,
        })
    }

    pub fn assessment(&self) -> &Assessment {
        &self.assessment
    }

    /// Exact, case-sensitive comparison with the fetched password.
    pub fn matches(&self, candidate: &str) -> Result<bool, AppError> {
        verify_password(candidate, &self.password_hash)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleView {
    pub title: String,
    pub module_type: AssessmentKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Granted,
    Denied,
}

/// Mounts the module page: records the id, then loads and seals the assessment.
///
/// The id is recorded even when the lookup fails or the password is never
/// entered; callers persist the session regardless of the result.
pub async fn open_module(
    session: &mut SessionState,
    api: &dyn AssessmentApi,
    id: &str,
) -> Result<ModuleView, AppError> {
    session.record_module(id);

    let assessment = api
        .lookup(id)
        .await
        .map_err(|e| e.upstream_context("Failed to load module information"))?;

    let Some(assessment) = assessment else {
        session.clear_assessment();
        return Err(AppError::NotFound("Module not found".to_string()));
    };

    let view = ModuleView {
        title: assessment.title().to_string(),
        module_type: assessment.kind(),
    };
    session.load_assessment(SealedAssessment::seal(assessment)?);

    Ok(view)
}

/// Checks a password attempt. Any number of attempts is allowed.
pub fn enter(session: &mut SessionState, id: &str, candidate: &str) -> Result<GateOutcome, AppError> {
    let (sealed, flow) = session.active_mut(id)?;

    if !sealed.matches(candidate)? {
        return Ok(GateOutcome::Denied);
    }

    flow.unlock()?;
    Ok(GateOutcome::Granted)
}
