//! Sign-in and registration forms, shared by the login page and the CLI.

use api::{LoginRequest, RegisterRequest};
use serde_json::{Map, Value, json};

use crate::form::{FormField, FormSchema, SelectOption, Submission};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Account roles offered at registration, `(value, label)`.
pub const ROLES: [(&str, &str); 7] = [
    ("admin", "Administrator"),
    ("directeur", "Director"),
    ("secretaire", "Secretary"),
    ("comptable", "Accountant"),
    ("ingenieur", "Engineer"),
    ("technicien", "Technician"),
    ("chef_chantier", "Site manager"),
];

pub const DEFAULT_ROLE: &str = "admin";

pub fn sign_in_schema() -> FormSchema {
    FormSchema::new(vec![
        FormField::email("email", "Email").required(),
        FormField::password("password", "Password").required(),
    ])
    .description("Chantier back office")
}

pub fn register_schema() -> FormSchema {
    let roles = ROLES
        .iter()
        .map(|(value, label)| SelectOption::new(*value, *label))
        .collect();
    FormSchema::new(vec![
        FormField::text("nom", "Last name").required(),
        FormField::text("prenom", "First name").required(),
        FormField::email("email", "Email").required(),
        FormField::text("telephone", "Phone"),
        FormField::select("role", "Role", roles).required(),
        FormField::password("password", "Password")
            .required()
            .validator(|value, _| {
                (value.as_text().chars().count() < MIN_PASSWORD_LEN).then(|| {
                    format!("Password must be at least {MIN_PASSWORD_LEN} characters")
                })
            }),
        FormField::password("confirmPassword", "Confirm password")
            .required()
            .validator(|value, all| {
                let password = all.get("password").map(|p| p.as_text().into_owned());
                (password.as_deref() != Some(value.as_text().as_ref()))
                    .then(|| "Passwords do not match".to_string())
            }),
    ])
    .description("Create an account")
}

/// Values a fresh registration form opens with.
pub fn register_defaults() -> Option<Map<String, Value>> {
    json!({ "role": DEFAULT_ROLE }).as_object().cloned()
}

fn text(submission: &Submission, name: &str) -> String {
    submission
        .get(name)
        .map(|v| v.as_text().trim().to_string())
        .unwrap_or_default()
}

pub fn login_request(submission: &Submission) -> LoginRequest {
    LoginRequest {
        email: text(submission, "email"),
        password: submission
            .get("password")
            .map(|v| v.as_text().into_owned())
            .unwrap_or_default(),
    }
}

/// The confirmation never leaves the form; a blank phone is omitted.
pub fn register_request(submission: &Submission) -> RegisterRequest {
    let telephone = text(submission, "telephone");
    RegisterRequest {
        nom: text(submission, "nom"),
        prenom: text(submission, "prenom"),
        email: text(submission, "email"),
        password: submission
            .get("password")
            .map(|v| v.as_text().into_owned())
            .unwrap_or_default(),
        role: text(submission, "role"),
        telephone: (!telephone.is_empty()).then_some(telephone),
    }
}
