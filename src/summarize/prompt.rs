//! Prompt construction for document summaries.

use crate::analyze::truncate_for_summary;

/// Instructions sent as the system prompt.
pub fn system_prompt() -> &'static str {
    "You are summarizing a document for someone who has not read it. \
     Write a one-sentence overview followed by up to five bullet points \
     with the most important facts, decisions or figures.\n\n\
     Rules:\n\
     - Keep the total summary under 200 words.\n\
     - Only use information present in the document.\n\
     - Use plain text only. No markdown headers.\n\
     - Start bullet points with a dash (-)."
}

/// Builds the user message: document name, keyword hints, then the
/// (possibly truncated) text.
pub fn user_content(filename: &str, text: &str, keywords: &[String], max_chars: usize) -> String {
    let mut content = format!("Document: {filename}\n");
    if !keywords.is_empty() {
        content.push_str(&format!("Frequent terms: {}\n", keywords.join(", ")));
    }
    content.push('\n');
    content.push_str(&truncate_for_summary(text, max_chars));
    content
}
