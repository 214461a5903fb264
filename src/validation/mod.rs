//! Sanitization and field validation for portfolio DTOs.
//!
//! Sanitization shapes the raw body into the canonical DTO and never fails;
//! validation reports every violated constraint in one pass and never writes
//! a response — the handler decides the status code.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use crate::models::envelope::ValidationError;
use crate::models::portfolio::{CreatePortfolio, RawPortfolio, UpdatePortfolio};

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex compiles"));

/// Brazilian landline/mobile: 2-digit area code (optionally parenthesized),
/// 8 or 9 digit number, optional dash before the last 4 digits.
static PHONE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\(?[1-9]{2}\)? ?(?:[2-8]|9[1-9])[0-9]{3}-?[0-9]{4}$")
        .expect("phone regex compiles")
});

const MSG_NAME: &str = "Nome deve ter entre 2 e 100 caracteres";
const MSG_EMAIL: &str = "Email deve ter um formato válido";
const MSG_PHONE: &str = "Telefone deve ter um formato válido (ex: (11) 99999-9999)";
const MSG_SKILLS: &str = "Habilidades devem ter entre 3 e 500 caracteres";
const MSG_DESCRIPTION: &str = "Descrição deve ter no máximo 1000 caracteres";
const MSG_EXPERIENCE: &str = "Experiência deve ter no máximo 2000 caracteres";
const MSG_EDUCATION: &str = "Educação deve ter no máximo 1000 caracteres";
const MSG_ID: &str = "ID deve ser um número positivo";

// ── Field validators ──

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Embedded whitespace is stripped before matching, so "(11) 99999-9999" and
/// "(11)99999-9999" are both accepted.
pub fn is_valid_phone(phone: &str) -> bool {
    let stripped: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    PHONE_REGEX.is_match(&stripped)
}

pub fn is_valid_name(name: &str) -> bool {
    let len = name.trim().chars().count();
    (2..=100).contains(&len)
}

pub fn is_valid_skills(skills: &str) -> bool {
    let len = skills.trim().chars().count();
    (3..=500).contains(&len)
}

pub fn is_valid_description(description: &str) -> bool {
    description.trim().chars().count() <= 1000
}

pub fn is_valid_experience(experience: &str) -> bool {
    experience.trim().chars().count() <= 2000
}

pub fn is_valid_education(education: &str) -> bool {
    education.trim().chars().count() <= 1000
}

/// Parse a path segment as a portfolio id. `None` for anything that is not a
/// positive integer.
pub fn parse_id(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok().filter(|id| *id > 0)
}

// ── Sanitization ──

/// Shape an untyped body into the canonical create DTO. Required fields
/// default to an empty string when missing so that validation, not
/// sanitization, reports the error; optional fields trimming to empty become
/// absent. Idempotent and infallible.
pub fn sanitize_portfolio_data(raw: &RawPortfolio) -> CreatePortfolio {
    CreatePortfolio {
        name: trim_required(raw.name.as_deref()),
        email: trim_optional(raw.email.as_deref()),
        phone: trim_optional(raw.phone.as_deref()),
        skills: trim_required(raw.skills.as_deref()),
        description: trim_optional(raw.description.as_deref()),
        experience: trim_optional(raw.experience.as_deref()),
        education: trim_optional(raw.education.as_deref()),
    }
}

/// Shape an update body: supplied fields are trimmed, omitted fields stay
/// omitted (an omitted field means "no change").
pub fn sanitize_update_portfolio(id: i32, raw: &RawPortfolio) -> UpdatePortfolio {
    let trim = |value: Option<&str>| value.map(|s| s.trim().to_string());
    UpdatePortfolio {
        id,
        name: trim(raw.name.as_deref()),
        email: trim(raw.email.as_deref()),
        phone: trim(raw.phone.as_deref()),
        skills: trim(raw.skills.as_deref()),
        description: trim(raw.description.as_deref()),
        experience: trim(raw.experience.as_deref()),
        education: trim(raw.education.as_deref()),
    }
}

fn trim_required(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or("").to_string()
}

fn trim_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ── DTO validation ──

/// Check every constraint on a create DTO and return all violations at once.
/// `name` and `skills` are always checked; optional fields only when present.
pub fn validate_create_portfolio(data: &CreatePortfolio) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if !is_valid_name(&data.name) {
        errors.push(violation("name", MSG_NAME, json!(data.name)));
    }

    if let Some(email) = data.email.as_deref() {
        if !email.is_empty() && !is_valid_email(email) {
            errors.push(violation("email", MSG_EMAIL, json!(email)));
        }
    }

    if let Some(phone) = data.phone.as_deref() {
        if !phone.is_empty() && !is_valid_phone(phone) {
            errors.push(violation("phone", MSG_PHONE, json!(phone)));
        }
    }

    if !is_valid_skills(&data.skills) {
        errors.push(violation("skills", MSG_SKILLS, json!(data.skills)));
    }

    if let Some(description) = data.description.as_deref() {
        if !description.is_empty() && !is_valid_description(description) {
            errors.push(violation("description", MSG_DESCRIPTION, json!(description)));
        }
    }

    if let Some(experience) = data.experience.as_deref() {
        if !experience.is_empty() && !is_valid_experience(experience) {
            errors.push(violation("experience", MSG_EXPERIENCE, json!(experience)));
        }
    }

    if let Some(education) = data.education.as_deref() {
        if !education.is_empty() && !is_valid_education(education) {
            errors.push(violation("education", MSG_EDUCATION, json!(education)));
        }
    }

    errors
}

/// Check an update DTO. The id must be positive; every other field is
/// validated only if supplied. A supplied-but-empty `name`/`skills` is
/// rejected, while supplied-but-empty optional fields are left to the store
/// layer (they clear the column).
pub fn validate_update_portfolio(data: &UpdatePortfolio) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if data.id <= 0 {
        errors.push(violation("id", MSG_ID, json!(data.id)));
    }

    if let Some(name) = data.name.as_deref() {
        if !is_valid_name(name) {
            errors.push(violation("name", MSG_NAME, json!(name)));
        }
    }

    if let Some(email) = data.email.as_deref() {
        if !email.is_empty() && !is_valid_email(email) {
            errors.push(violation("email", MSG_EMAIL, json!(email)));
        }
    }

    if let Some(phone) = data.phone.as_deref() {
        if !phone.is_empty() && !is_valid_phone(phone) {
            errors.push(violation("phone", MSG_PHONE, json!(phone)));
        }
    }

    if let Some(skills) = data.skills.as_deref() {
        if !is_valid_skills(skills) {
            errors.push(violation("skills", MSG_SKILLS, json!(skills)));
        }
    }

    if let Some(description) = data.description.as_deref() {
        if !description.is_empty() && !is_valid_description(description) {
            errors.push(violation("description", MSG_DESCRIPTION, json!(description)));
        }
    }

    if let Some(experience) = data.experience.as_deref() {
        if !experience.is_empty() && !is_valid_experience(experience) {
            errors.push(violation("experience", MSG_EXPERIENCE, json!(experience)));
        }
    }

    if let Some(education) = data.education.as_deref() {
        if !education.is_empty() && !is_valid_education(education) {
            errors.push(violation("education", MSG_EDUCATION, json!(education)));
        }
    }

    errors
}

fn violation(field: &'static str, message: &'static str, value: serde_json::Value) -> ValidationError {
    ValidationError {
        field,
        message,
        value: Some(value),
    }
}
