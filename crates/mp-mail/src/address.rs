//! Email addresses as callers send them: `"Name <a@b.c>"`, `"a@b.c"`, or
//! `{ "email": "a@b.c", "name": "Name" }`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MailError;

/// A validated address with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mailbox {
    pub email: String,
    pub name: Option<String>,
}

impl Mailbox {
    pub fn new(email: &str, name: Option<&str>) -> Result<Self, MailError> {
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(MailError::Validation(format!(
                "invalid email address: {email}"
            )));
        }
        let name = name
            .map(|n| n.trim().trim_matches('"').trim())
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        Ok(Self {
            email: email.to_string(),
            name,
        })
    }
}

impl FromStr for Mailbox {
    type Err = MailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match (s.rfind('<'), s.ends_with('>')) {
            (Some(open), true) => {
                let email = &s[open + 1..s.len() - 1];
                Mailbox::new(email, Some(&s[..open]))
            }
            (None, false) => Mailbox::new(s, None),
            _ => Err(MailError::Validation(format!("invalid address: {s}"))),
        }
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} <{}>", self.email),
            None => f.write_str(&self.email),
        }
    }
}

/// Minimal structural check: one `@`, a non-empty local part, a dotted
/// domain, and no whitespace or angle brackets.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(|c| c.is_whitespace() || c == '<' || c == '>' || c == ',') {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// One address in any accepted wire form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AddressInput {
    Text(String),
    Object {
        email: String,
        #[serde(default)]
        name: Option<String>,
    },
}

impl AddressInput {
    pub fn to_mailbox(&self) -> Result<Mailbox, MailError> {
        match self {
            AddressInput::Text(s) => s.parse(),
            AddressInput::Object { email, name } => Mailbox::new(email, name.as_deref()),
        }
    }
}

/// A single recipient or a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    One(AddressInput),
    Many(Vec<AddressInput>),
}

impl Recipients {
    pub fn to_mailboxes(&self) -> Result<Vec<Mailbox>, MailError> {
        let list = match self {
            Recipients::One(a) => vec![a.to_mailbox()?],
            Recipients::Many(all) => all
                .iter()
                .map(AddressInput::to_mailbox)
                .collect::<Result<Vec<_>, _>>()?,
        };
        if list.is_empty() {
            return Err(MailError::Validation("at least one recipient is required".to_string()));
        }
        Ok(list)
    }
}
