use crate::output::Output;
use color_eyre::Result;
use dialoguer::{Confirm, Input};

/// Prompt for a string value with optional default
pub fn prompt_string(prompt: &str, default: Option<&str>) -> Result<String> {
    let mut input_builder = Input::<String>::new().with_prompt(prompt).allow_empty(true);

    if let Some(default_value) = default {
        input_builder = input_builder.default(default_value.to_string());
    }

    input_builder
        .interact()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read input: {}", e))
}

/// Prompt repeatedly until `validate` accepts the input. Rejections are
/// reported through the output handler and the prompt is shown again.
pub fn prompt_validated(
    prompt: &str,
    default: Option<&str>,
    output: &Output,
    validate: fn(&str) -> Result<(), &'static str>,
) -> Result<String> {
    loop {
        let input = prompt_string(prompt, default)?;
        match validate(&input) {
            Ok(()) => return Ok(input),
            Err(reason) => output.error(format!("Validation error: {}", reason)),
        }
    }
}

/// Prompt for yes/no with optional default
pub fn prompt_yes_no(prompt: &str, default: Option<bool>) -> Result<bool> {
    let mut confirm_builder = Confirm::new().with_prompt(prompt);

    if let Some(default_value) = default {
        confirm_builder = confirm_builder.default(default_value);
    }

    confirm_builder
        .interact()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read confirmation: {}", e))
}
