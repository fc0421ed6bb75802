//! Model identifiers.

/// `OpenAI` chat models.
pub mod openai {
    /// GPT-4o mini, July 2024 snapshot.
    pub const GPT_4O_MINI_07_18: &str = "gpt-4o-mini-2024-07-18";
    /// GPT-4o, May 2024 snapshot.
    pub const GPT_4O_2024_05_13: &str = "gpt-4o-2024-05-13";
    /// GPT-4o, August 2024 snapshot. The runner's default model.
    pub const GPT_4O_2024_08_06: &str = "gpt-4o-2024-08-06";
    /// GPT-4.1, April 2025 snapshot.
    pub const GPT_4_1_2025_04_14: &str = "gpt-4.1-2025-04-14";
}

/// Anthropic chat models.
pub mod anthropic {
    /// Claude 3.7 Sonnet.
    pub const CLAUDE_3_7_SONNET_02_19: &str = "claude-3-7-sonnet-20250219";
    /// Claude 3.5 Sonnet, June 2024.
    pub const CLAUDE_3_5_SONNET_06_20: &str = "claude-3-5-sonnet-20240620";
    /// Claude 3.5 Sonnet, October 2024.
    pub const CLAUDE_3_5_SONNET_10_22: &str = "claude-3-5-sonnet-20241022";
    /// Claude 3.5 Haiku.
    pub const CLAUDE_3_5_HAIKU_10_22: &str = "claude-3-5-haiku-20241022";
}
