//! The email record searched by the CLI and the agent tool.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::traits::Record;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub id: String,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Record for Email {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Searchable projection of an email: sender, recipient, subject and body.
pub fn email_text(email: &Email) -> String {
    format!("{} {} {} {}", email.from, email.to, email.subject, email.body)
}

/// Read a JSON array of emails.
pub fn load_emails(path: &Path) -> Result<Vec<Email>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::NotFound(format!("email file {}", path.display())));
        }
        Err(e) => return Err(Error::Operation(format!("reading {}: {}", path.display(), e))),
    };
    serde_json::from_str(&content)
        .map_err(|e| Error::Operation(format!("parsing {}: {}", path.display(), e)))
}
