//! Prompt modification tests
use promptsmith::prompts::*;
use promptsmith::{
    build_instruction, submit_modification, AspectRatio, Consistency, FacialExpression,
    FocalLength, MockOracle, ModificationMode, ModificationRequest, OracleCall, Promptsmith,
    PromptsmithError, QualityOption, VisualStyle,
};
use std::sync::Arc;

const CATEGORY_PHRASES: [&str; 13] = [
    QUALITY_8K_CINEMATIC_DIRECTIVE,
    ASPECT_PORTRAIT_DIRECTIVE,
    ASPECT_LANDSCAPE_DIRECTIVE,
    STYLE_REALISTIC_PHOTOGRAPHY_DIRECTIVE,
    FOCAL_10MM_DIRECTIVE,
    FOCAL_25MM_DIRECTIVE,
    FOCAL_35MM_DIRECTIVE,
    EXPRESSION_FEAR_DIRECTIVE,
    EXPRESSION_ANGER_DIRECTIVE,
    EXPRESSION_JOY_DIRECTIVE,
    EXPRESSION_CRYING_DIRECTIVE,
    EXPRESSION_PAIN_DIRECTIVE,
    CONSISTENCY_ABSOLUTE_DIRECTIVE,
];

// ============================================================================
// Instruction construction
// ============================================================================

#[test]
fn test_plain_prompt_has_no_category_phrases() {
    let instruction = build_instruction(&ModificationRequest::new("a cat")).unwrap();

    assert!(instruction.user.contains("a cat"));
    assert!(instruction.user.contains(CREATIVE_IMPROVE_DIRECTIVE));
    assert!(instruction.user.ends_with(RETURN_ONLY_PROMPT_DIRECTIVE));
    assert!(!instruction.user.contains(EXPLICIT_INSTRUCTION_LABEL));
    for phrase in CATEGORY_PHRASES {
        assert!(
            !instruction.user.contains(phrase),
            "unexpected phrase {:?}",
            phrase
        );
    }
}

#[test]
fn test_portrait_and_joy() {
    let request = ModificationRequest::new("a cat")
        .with_aspect_ratio(Some(AspectRatio::Portrait))
        .with_facial_expression(Some(FacialExpression::ExaggeratedJoy));

    let user = build_instruction(&request).unwrap().user;

    let portrait = user.find(ASPECT_PORTRAIT_DIRECTIVE).unwrap();
    let joy = user.find(EXPRESSION_JOY_DIRECTIVE).unwrap();
    assert!(portrait < joy);
    assert!(user.contains("a cat"));
    assert!(user.contains(CREATIVE_IMPROVE_DIRECTIVE));

    let others = CATEGORY_PHRASES
        .iter()
        .filter(|p| **p != ASPECT_PORTRAIT_DIRECTIVE && **p != EXPRESSION_JOY_DIRECTIVE);
    for phrase in others {
        assert!(!user.contains(phrase), "unexpected phrase {:?}", phrase);
    }
}

#[test]
fn test_every_category_active() {
    let request = ModificationRequest::new("a knight")
        .with_instruction("add rain")
        .with_quality(Some(QualityOption::EightKCinematicLighting))
        .with_aspect_ratio(Some(AspectRatio::Landscape))
        .with_style(Some(VisualStyle::RealisticPhotography))
        .with_focal_length(Some(FocalLength::Mm25))
        .with_facial_expression(Some(FacialExpression::ExaggeratedAnger))
        .with_consistency(Some(Consistency::Absolute));

    let user = build_instruction(&request).unwrap().user;

    let expected = format!(
        "原始提示词: \"a knight\"\n\n具体修改指令: \"add rain\"\n{}{}{}{}{}{}\n{}",
        QUALITY_8K_CINEMATIC_DIRECTIVE,
        ASPECT_LANDSCAPE_DIRECTIVE,
        STYLE_REALISTIC_PHOTOGRAPHY_DIRECTIVE,
        FOCAL_25MM_DIRECTIVE,
        EXPRESSION_ANGER_DIRECTIVE,
        CONSISTENCY_ABSOLUTE_DIRECTIVE,
        RETURN_ONLY_PROMPT_DIRECTIVE,
    );
    assert_eq!(user, expected);
}

#[test]
fn test_same_input_same_instruction() {
    let request = ModificationRequest::new("a lighthouse at dusk")
        .with_focal_length(Some(FocalLength::Mm10))
        .with_consistency(Some(Consistency::Absolute));

    assert_eq!(
        build_instruction(&request).unwrap(),
        build_instruction(&request.clone()).unwrap()
    );
}

#[test]
fn test_creative_mode_ignores_instruction_text() {
    let explicit = ModificationRequest::new("a cat").with_instruction("make it blue");
    let creative = explicit.clone().with_mode(ModificationMode::Creative);

    let user = build_instruction(&creative).unwrap().user;
    assert!(!user.contains("make it blue"));
    assert_eq!(user, build_instruction(&ModificationRequest::new("a cat")).unwrap().user);
}

#[test]
fn test_blank_prompt_is_rejected() {
    for prompt in ["", "   ", "\n\t"] {
        let result = build_instruction(&ModificationRequest::new(prompt));
        assert!(matches!(result, Err(PromptsmithError::Validation(_))));
    }
}

#[test]
fn test_request_deserializes_from_json() {
    let request: ModificationRequest = serde_json::from_str(
        r#"{
            "original_prompt": "a cat",
            "mode": { "mode": "explicit", "instruction": "at night" },
            "aspect_ratio": "portrait",
            "focal_length": "35mm",
            "facial_expression": "exaggerated_joy"
        }"#,
    )
    .unwrap();

    assert_eq!(
        request,
        ModificationRequest::new("a cat")
            .with_instruction("at night")
            .with_aspect_ratio(Some(AspectRatio::Portrait))
            .with_focal_length(Some(FocalLength::Mm35))
            .with_facial_expression(Some(FacialExpression::ExaggeratedJoy))
    );
}

// ============================================================================
// Submission
// ============================================================================

#[tokio::test]
async fn test_empty_prompt_makes_no_call() {
    let oracle = MockOracle::new();

    let result = submit_modification(&oracle, &ModificationRequest::new("  ")).await;

    assert!(matches!(result, Err(PromptsmithError::Validation(_))));
    assert_eq!(oracle.call_count().await, 0);
}

#[tokio::test]
async fn test_submission_sends_built_instruction_once() {
    let oracle = MockOracle::new().with_text_response("  雨夜中的骑士, 8K  \n");
    let request = ModificationRequest::new("a knight")
        .with_quality(Some(QualityOption::EightKCinematicLighting));

    let result = submit_modification(&oracle, &request).await.unwrap();

    // Model output is passed through untouched
    assert_eq!(result, "  雨夜中的骑士, 8K  \n");

    let expected = build_instruction(&request).unwrap();
    assert_eq!(
        oracle.calls().await,
        vec![OracleCall::RewriteText {
            system: expected.system,
            user: expected.user,
        }]
    );
}

#[tokio::test]
async fn test_oracle_failure_propagates() {
    let oracle = MockOracle::new().with_failure("service unavailable");

    let result = submit_modification(&oracle, &ModificationRequest::new("a cat")).await;

    match result {
        Err(PromptsmithError::LlmError(msg)) => assert!(msg.contains("service unavailable")),
        other => panic!("expected LlmError, got {:?}", other),
    }
    assert_eq!(oracle.call_count().await, 1);
}

#[tokio::test]
async fn test_facade_modify() {
    let oracle = Arc::new(MockOracle::new().with_text_response("改写后的提示词"));
    let app = Promptsmith::new(oracle.clone());

    let result = app.modify(&ModificationRequest::new("a cat")).await.unwrap();

    assert_eq!(result, "改写后的提示词");
    assert_eq!(oracle.call_count().await, 1);
}

#[tokio::test]
async fn test_facade_uses_configured_system_instruction() {
    let oracle = Arc::new(MockOracle::new());
    let app = Promptsmith::new(oracle.clone()).with_system_instruction("你是一名分镜编辑。");
    let request = ModificationRequest::new("a cat").with_instruction("at dawn");

    app.modify(&request).await.unwrap();

    assert_eq!(
        oracle.calls().await,
        vec![OracleCall::RewriteText {
            system: "你是一名分镜编辑。".to_string(),
            user: build_instruction(&request).unwrap().user,
        }]
    );
}

#[test]
fn test_default_facade_system_instruction() {
    let app = Promptsmith::new(Arc::new(MockOracle::new()));
    assert_eq!(app.system_instruction(), REWRITE_SYSTEM_INSTRUCTION);
}
