//! Interpretation of provider replies and HTTP errors.

use assessrec_core::{Category, RecommendError, RequiredCategories};

/// Field holding the category labels in a classifier reply.
pub const CATEGORIES_FIELD: &str = "test_types_needed";

/// Extract the required categories from a model reply.
///
/// The reply may wrap the JSON object in prose or code fences; the outermost
/// `{ ... }` span is parsed. Labels are matched by code or full name, unknown
/// labels are dropped, and repeats keep their first position.
///
/// # Errors
///
/// Returns [`RecommendError::Classifier`] if no JSON object is found, the
/// field is missing, or no label is recognized.
pub fn parse_categories(reply: &str) -> Result<RequiredCategories, RecommendError> {
    let object = outermost_object(reply)
        .ok_or_else(|| RecommendError::Classifier("reply contains no JSON object".into()))?;
    let value: serde_json::Value = serde_json::from_str(object)
        .map_err(|e| RecommendError::Classifier(format!("reply is not valid JSON: {e}")))?;
    let labels = value
        .get(CATEGORIES_FIELD)
        .and_then(|v| v.as_array())
        .ok_or_else(|| {
            RecommendError::Classifier(format!("reply has no `{CATEGORIES_FIELD}` array"))
        })?;

    let categories = RequiredCategories::new(labels.iter().filter_map(|label| {
        let text = label.as_str()?;
        let category = Category::parse_label(text);
        if category.is_none() {
            tracing::debug!(label = text, "dropping unknown category label");
        }
        category
    }));

    if categories.is_empty() {
        return Err(RecommendError::Classifier(
            "reply names no known categories".into(),
        ));
    }
    Ok(categories)
}

fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Map an HTTP error status from `provider` to a classifier error.
pub fn map_http_error(provider: &str, status: reqwest::StatusCode, body: &str) -> RecommendError {
    let message = extract_error_message(body);
    match status.as_u16() {
        401 | 403 => {
            RecommendError::Classifier(format!("{provider} authentication failed: {message}"))
        }
        429 => RecommendError::Classifier(format!("{provider} rate limited: {message}")),
        code => RecommendError::Classifier(format!("{provider} HTTP {code}: {message}")),
    }
}

/// Extract an error message from a provider error response body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_string())
}
