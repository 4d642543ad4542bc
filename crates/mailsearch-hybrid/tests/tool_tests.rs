mod common;

use std::sync::Arc;

use common::{email, VocabProvider};
use mailsearch_core::types::MISSING_QUERY_MESSAGE;
use mailsearch_embed::HashingEmbedder;
use mailsearch_hybrid::tool::{SearchEmailsTool, DEFAULT_TOOL_LIMIT, TOOL_NAME};
use mailsearch_hybrid::{HybridSearchEngine, SearchEmailsInput};
use serde_json::json;
use tempfile::TempDir;

fn inbox() -> Vec<mailsearch_core::email::Email> {
    vec![
        email("m1", "Quarterly budget", "Attached is the quarterly budget report."),
        email("m2", "Lunch", "Any lunch plans on Friday?"),
        email("m3", "Alert", "Budget overrun alert for the offsite."),
    ]
}

#[test]
fn schema_describes_both_optional_arguments() {
    let root = TempDir::new().unwrap();
    let engine = HybridSearchEngine::new(Arc::new(HashingEmbedder::new(64)), root.path());
    let tool = SearchEmailsTool::new(&engine);

    assert_eq!(tool.name(), TOOL_NAME);
    assert!(tool.description().contains("Returns up to 10"));
    let schema = tool.input_schema();
    assert_eq!(schema["properties"]["keywords"]["type"], "array");
    assert_eq!(schema["properties"]["query"]["type"], "string");
    assert!(schema.get("required").is_none());
}

#[tokio::test]
async fn execute_returns_matching_emails() {
    let root = TempDir::new().unwrap();
    let engine = HybridSearchEngine::new(Arc::new(VocabProvider::budget()), root.path());
    let tool = SearchEmailsTool::new(&engine);
    let emails = inbox();

    let input = SearchEmailsInput { keywords: Some(vec!["budget".into()]), query: Some("budget".into()) };
    let found = tool.execute(input, &emails).await.unwrap();
    let ids: Vec<&str> = found.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids.len(), 3);
    assert_eq!(ids[2], "m2");
}

#[tokio::test]
async fn execute_caps_results_at_ten() {
    let root = TempDir::new().unwrap();
    let engine = HybridSearchEngine::new(Arc::new(HashingEmbedder::new(64)), root.path());
    let tool = SearchEmailsTool::new(&engine);
    let emails: Vec<_> = (0..25).map(|i| email(&format!("m{i}"), "status", &format!("weekly status update {i}"))).collect();

    let input = SearchEmailsInput { keywords: None, query: Some("status update".into()) };
    let found = tool.execute(input, &emails).await.unwrap();
    assert_eq!(found.len(), DEFAULT_TOOL_LIMIT);

    let input = SearchEmailsInput { keywords: Some(vec!["weekly".into()]), query: None };
    let found = tool.with_limit(3).execute(input, &emails).await.unwrap();
    assert_eq!(found.len(), 3);
}

#[tokio::test]
async fn call_reports_validation_failures_as_json() {
    let root = TempDir::new().unwrap();
    let provider = Arc::new(VocabProvider::budget());
    let engine = HybridSearchEngine::new(provider.clone(), root.path());
    let tool = SearchEmailsTool::new(&engine);

    let out = tool.call(json!({}), &inbox()).await;
    assert_eq!(out["error"], "validation");
    assert!(out["message"].as_str().unwrap().contains(MISSING_QUERY_MESSAGE));

    let out = tool.call(json!({ "keywords": "budget" }), &inbox()).await;
    assert_eq!(out["error"], "validation");
    assert_eq!(provider.calls(), 0);

    let out = tool.call(json!({ "keywords": ["overrun"] }), &inbox()).await;
    assert_eq!(out[0]["id"], "m3");
    assert_eq!(out[0]["subject"], "Alert");
}
