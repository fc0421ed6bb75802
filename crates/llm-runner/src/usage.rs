//! Token usage accounting.
//!
//! Every [`ChatResponse`](crate::ChatResponse) carries a [`Usage`] record
//! counting prompt and completion tokens. The tool loop sums them across
//! all requests of a run and reports the total in
//! [`ToolLoopResult::total_usage`](crate::tool::ToolLoopResult::total_usage).

use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Token counts for a single request/response pair.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens consumed by the prompt (transcript + tool definitions).
    pub input_tokens: u64,
    /// Tokens produced by the model's response.
    pub output_tokens: u64,
}

impl Usage {
    /// Creates a usage record from prompt and completion token counts.
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Sum of input and output tokens.
    pub fn total(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

impl Add for Usage {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += &rhs;
        self
    }
}

impl AddAssign for Usage {
    fn add_assign(&mut self, rhs: Self) {
        *self += &rhs;
    }
}

impl AddAssign<&Usage> for Usage {
    /// Adds another `Usage` in place with saturating arithmetic.
    fn add_assign(&mut self, rhs: &Self) {
        self.input_tokens = self.input_tokens.saturating_add(rhs.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(rhs.output_tokens);
    }
}
