//! `searchEmails`: the engine exposed as a callable tool for a conversational
//! agent. Arguments arrive as JSON; results are the matching emails.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use mailsearch_core::email::{email_text, Email};
use mailsearch_core::error::{Error, Result};
use mailsearch_core::types::{SearchQuery, MISSING_QUERY_MESSAGE};

use crate::HybridSearchEngine;

pub const TOOL_NAME: &str = "searchEmails";
pub const TOOL_DESCRIPTION: &str = "Searches through the user's emails using semantic similarity and keyword \
matching. Returns up to 10 most relevant emails matching the query.";
pub const DEFAULT_TOOL_LIMIT: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchEmailsInput {
    /// Exact words to match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    /// Natural-language description of what to find.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl SearchEmailsInput {
    pub fn into_query(self) -> Result<SearchQuery> {
        SearchQuery::new(self.query, self.keywords)
    }
}

/// Error payload returned to the agent in place of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolFailure {
    pub error: &'static str,
    pub message: String,
}

impl From<&Error> for ToolFailure {
    fn from(err: &Error) -> Self {
        let kind = match err {
            Error::Validation(_) => "validation",
            Error::Provider(_) => "provider",
            _ => "internal",
        };
        Self { error: kind, message: err.to_string() }
    }
}

pub struct SearchEmailsTool<'e> {
    engine: &'e HybridSearchEngine,
    limit: usize,
}

impl<'e> SearchEmailsTool<'e> {
    pub fn new(engine: &'e HybridSearchEngine) -> Self {
        Self { engine, limit: DEFAULT_TOOL_LIMIT }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn name(&self) -> &'static str {
        TOOL_NAME
    }

    pub fn description(&self) -> &'static str {
        TOOL_DESCRIPTION
    }

    /// JSON Schema of the accepted arguments.
    pub fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "keywords": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Exact words to look for in sender, recipient, subject and body."
                },
                "query": {
                    "type": "string",
                    "description": "Natural-language description of the emails to find."
                }
            },
            "additionalProperties": false,
            "description": MISSING_QUERY_MESSAGE
        })
    }

    pub async fn execute(&self, input: SearchEmailsInput, emails: &[Email]) -> Result<Vec<Email>> {
        let query = input.into_query()?;
        let ranked = self.engine.search(&query, emails, email_text, self.limit).await?;
        Ok(ranked.into_iter().map(|r| r.item.clone()).collect())
    }

    /// Run the tool on raw JSON arguments and render the agent-facing result:
    /// an array of emails, or a [`ToolFailure`] object.
    pub async fn call(&self, args: Value, emails: &[Email]) -> Value {
        let outcome = match serde_json::from_value::<SearchEmailsInput>(args) {
            Ok(input) => self.execute(input, emails).await,
            Err(e) => Err(Error::Validation(format!("invalid arguments: {e}"))),
        };
        match outcome {
            Ok(found) => json!(found),
            Err(err) => json!(ToolFailure::from(&err)),
        }
    }
}
