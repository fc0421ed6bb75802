//! The prompt-rendering contract.
//!
//! Rendering is out of scope for this crate; callers bring their own
//! template engine and plug it in through [`PromptTemplate`]. Any
//! `Fn(&HashMap<String, String>) -> Vec<ChatMessage>` closure qualifies.

use std::collections::HashMap;

use crate::chat::ChatMessage;

/// Renders a transcript from named input values.
///
/// Rendering must be pure: the runner calls it twice per run (real and
/// censored input) and expects both transcripts to have the same shape.
pub trait PromptTemplate: Send + Sync {
    /// Produces the messages for `values`.
    fn render(&self, values: &HashMap<String, String>) -> Vec<ChatMessage>;
}

impl<F> PromptTemplate for F
where
    F: Fn(&HashMap<String, String>) -> Vec<ChatMessage> + Send + Sync,
{
    fn render(&self, values: &HashMap<String, String>) -> Vec<ChatMessage> {
        self(values)
    }
}
