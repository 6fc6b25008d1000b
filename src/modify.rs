use serde::Serialize;
use tracing::{debug, warn};

use crate::error::PromptsmithError;
use crate::oracle::PromptOracle;
use crate::options::ModificationRequest;
use crate::prompts::{
    CREATIVE_IMPROVE_DIRECTIVE, EXPLICIT_INSTRUCTION_LABEL, ORIGINAL_PROMPT_LABEL,
    RETURN_ONLY_PROMPT_DIRECTIVE, REWRITE_SYSTEM_INSTRUCTION,
};

/// The two texts sent to the model for one rewrite
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModificationInstruction {
    pub system: String,
    pub user: String,
}

/// Construct the rewrite instruction for a request.
///
/// The same request always yields the same text. Fails with `Validation`
/// when the base prompt is blank.
pub fn build_instruction(
    request: &ModificationRequest,
) -> Result<ModificationInstruction, PromptsmithError> {
    build_instruction_with_system(request, REWRITE_SYSTEM_INSTRUCTION)
}

/// [`build_instruction`] with a caller-supplied system instruction
pub fn build_instruction_with_system(
    request: &ModificationRequest,
    system_instruction: &str,
) -> Result<ModificationInstruction, PromptsmithError> {
    if request.original_prompt.trim().is_empty() {
        return Err(PromptsmithError::Validation(
            "original prompt must not be empty".to_string(),
        ));
    }

    let mut user = format!(
        "{}: \"{}\"\n\n",
        ORIGINAL_PROMPT_LABEL, request.original_prompt
    );

    match request.mode.instruction() {
        Some(instruction) => {
            user.push_str(&format!(
                "{}: \"{}\"\n",
                EXPLICIT_INSTRUCTION_LABEL, instruction
            ));
        }
        None => {
            user.push_str(CREATIVE_IMPROVE_DIRECTIVE);
            user.push('\n');
        }
    }

    for directive in request.active_directives() {
        user.push_str(directive);
    }

    user.push('\n');
    user.push_str(RETURN_ONLY_PROMPT_DIRECTIVE);

    Ok(ModificationInstruction {
        system: system_instruction.to_string(),
        user,
    })
}

/// Validate, build the instruction and issue exactly one rewrite call.
///
/// The model output is returned untouched.
pub async fn submit_modification(
    oracle: &dyn PromptOracle,
    request: &ModificationRequest,
) -> Result<String, PromptsmithError> {
    submit_modification_with_system(oracle, request, REWRITE_SYSTEM_INSTRUCTION).await
}

/// [`submit_modification`] with a caller-supplied system instruction
pub async fn submit_modification_with_system(
    oracle: &dyn PromptOracle,
    request: &ModificationRequest,
    system_instruction: &str,
) -> Result<String, PromptsmithError> {
    let instruction = build_instruction_with_system(request, system_instruction)?;
    debug!(
        directives = request.active_directives().len(),
        "submitting prompt modification"
    );

    oracle
        .rewrite_text(&instruction.system, &instruction.user)
        .await
        .inspect_err(|e| warn!(error = %e, "prompt modification failed"))
}
