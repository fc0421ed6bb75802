//! Redaction of private prompt inputs.
//!
//! The runner renders the prompt twice: once from the real input for the
//! model, once from a censored copy for the tracer. A [`Censor`] produces
//! that copy.

use std::collections::HashMap;

/// Produces the traced copy of a prompt input given the names of the
/// private variables.
pub type Censor = fn(&HashMap<String, String>, &[String]) -> HashMap<String, String>;

/// Replaces every private value with a `{name}` placeholder.
///
/// Private names absent from `values` are inserted with their placeholder,
/// so the redacted prompt always renders.
///
/// ```rust
/// use std::collections::HashMap;
/// use llm_runner::censor::censor_prompt;
///
/// let values = HashMap::from([
///     ("code".to_owned(), "fn main() {}".to_owned()),
///     ("lang".to_owned(), "rust".to_owned()),
/// ]);
/// let censored = censor_prompt(&values, &["code".to_owned()]);
/// assert_eq!(censored["code"], "{code}");
/// assert_eq!(censored["lang"], "rust");
/// ```
pub fn censor_prompt(values: &HashMap<String, String>, private: &[String]) -> HashMap<String, String> {
    let mut censored = values.clone();
    for name in private {
        censored.insert(name.clone(), format!("{{{name}}}"));
    }
    censored
}

/// Returns the values unchanged.
pub fn do_not_censor_prompt(
    values: &HashMap<String, String>,
    _private: &[String],
) -> HashMap<String, String> {
    values.clone()
}

/// Picks the censor for a caller that may or may not store code.
pub fn select_censor_function(code_storage_allowed: bool) -> Censor {
    if code_storage_allowed {
        do_not_censor_prompt
    } else {
        censor_prompt
    }
}
