//! Required-field validation

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

/// Fields that must be present and non-empty
pub const REQUIRED_FIELDS: [&str; 3] = ["name", "email", "message"];

/// A submission that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    /// `None` when absent or empty
    pub phone: Option<String>,
    pub message: String,
}

/// Names of the required fields a submission lacked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFields(pub Vec<&'static str>);

impl Display for MissingFields {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "missing required fields: {}", self.0.join(", "))
    }
}

fn non_empty(fields: &HashMap<String, String>, key: &str) -> Option<String> {
    fields.get(key).filter(|v| !v.is_empty()).cloned()
}

/// Check the parsed field map for `name`, `email` and `message`.
pub fn validate(fields: &HashMap<String, String>) -> Result<ContactForm, MissingFields> {
    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .into_iter()
        .filter(|key| non_empty(fields, key).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(MissingFields(missing));
    }

    Ok(ContactForm {
        name: fields["name"].clone(),
        email: fields["email"].clone(),
        phone: non_empty(fields, "phone"),
        message: fields["message"].clone(),
    })
}
