// src/models/user.rs

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::AppError;
use crate::utils::validation::field_messages;

static REGISTRATION_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^EG/\d{4}/\d{4}$").expect("valid registration number regex"));

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// A signed-in student as returned by the remote API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    pub name: String,

    /// Index number, e.g. `EG/2019/1234`.
    #[serde(default)]
    pub registration_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Sign-up form as posted by the browser.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignUpForm {
    #[serde(default)]
    #[validate(custom(function = validate_name))]
    pub name: String,

    #[serde(default)]
    #[validate(custom(function = validate_email))]
    pub email: String,

    #[serde(default)]
    #[validate(custom(function = validate_registration_number))]
    pub registration_number: String,

    #[serde(default)]
    #[validate(custom(function = validate_new_password))]
    pub password: String,

    #[serde(default)]
    pub confirm_password: String,
}

impl SignUpForm {
    /// Runs every field rule and reports the first failure of each field.
    pub fn check(&self) -> Result<(), AppError> {
        let mut fields = match self.validate() {
            Ok(()) => Default::default(),
            Err(errors) => field_messages(&errors),
        };

        if self.confirm_password.is_empty() {
            fields.insert("confirmPassword".to_string(), "Please confirm your password".to_string());
        } else if self.password != self.confirm_password {
            fields.insert("confirmPassword".to_string(), "Passwords do not match".to_string());
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(fields))
        }
    }

    pub fn into_request(self) -> RegistrationRequest {
        RegistrationRequest {
            name: self.name,
            email: self.email,
            password: self.password,
            registration_number: self.registration_number,
        }
    }
}

/// Sign-in form as posted by the browser.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignInForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Index number is required"))]
    pub registration_number: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    /// Keeps the session past the default token lifetime.
    #[serde(default)]
    pub remember_me: bool,
}

impl SignInForm {
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()
            .map_err(|errors| AppError::Validation(field_messages(&errors)))
    }

    pub fn to_request(&self) -> LoginRequest {
        LoginRequest {
            registration_number: self.registration_number.clone(),
            password: self.password.clone(),
        }
    }
}

/// Body of `POST /api/v1/login-user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub registration_number: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    pub access_token: Option<String>,
    pub user: Option<User>,
    pub message: Option<String>,
}

/// Body of `POST /api/v1/registration`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub registration_number: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    #[serde(default)]
    pub success: bool,
    pub activation_token: Option<String>,
    pub message: Option<String>,
}

/// Successful sign-in as seen by the portal.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub access_token: String,
    pub user: User,
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Length as the browser form counts it, in UTF-16 code units.
fn utf16_len(value: &str) -> usize {
    value.encode_utf16().count()
}

fn validate_registration_number(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(invalid("required", "Index number is required"));
    }
    if !REGISTRATION_NUMBER.is_match(value) {
        return Err(invalid("format", "Please enter a valid format (EG/XXXX/XXXX)"));
    }
    Ok(())
}

fn validate_name(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(invalid("required", "Name is required"));
    }
    if utf16_len(value) < 2 {
        return Err(invalid("length", "Name must be at least 2 characters"));
    }
    Ok(())
}

fn validate_email(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(invalid("required", "Email is required"));
    }
    if !EMAIL.is_match(value) {
        return Err(invalid("format", "Please enter a valid email address"));
    }
    Ok(())
}

fn validate_new_password(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(invalid("required", "Password is required"));
    }
    if utf16_len(value) < 6 {
        return Err(invalid("length", "Password must be at least 6 characters"));
    }
    Ok(())
}
