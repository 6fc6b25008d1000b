//! Inputs to a prompt modification: the base prompt, the modification mode and
//! the six independent toggle categories.
//!
//! Every category is an `Option`; `None` means "unspecified" and contributes
//! nothing to the constructed instruction.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::prompts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum QualityOption {
    /// 8K resolution with cinematic lighting
    #[value(name = "8k")]
    EightKCinematicLighting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AspectRatio {
    /// 9:16
    Portrait,
    /// 16:9
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum VisualStyle {
    #[value(name = "realistic")]
    RealisticPhotography,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum FocalLength {
    #[serde(rename = "10mm")]
    #[value(name = "10mm")]
    Mm10,
    #[serde(rename = "25mm")]
    #[value(name = "25mm")]
    Mm25,
    #[serde(rename = "35mm")]
    #[value(name = "35mm")]
    Mm35,
}

/// Exaggerated expression for a facial close-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FacialExpression {
    #[value(name = "fear")]
    ExaggeratedFear,
    #[value(name = "anger")]
    ExaggeratedAnger,
    #[value(name = "joy")]
    ExaggeratedJoy,
    #[value(name = "crying")]
    ExaggeratedCrying,
    #[value(name = "pain")]
    ExaggeratedPain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Consistency {
    /// Characters and scenes stay identical across shots
    Absolute,
}

/// A toggle value that maps to one fixed directive phrase
pub trait Directive {
    fn directive(&self) -> &'static str;
}

impl Directive for QualityOption {
    fn directive(&self) -> &'static str {
        match self {
            QualityOption::EightKCinematicLighting => QUALITY_8K_CINEMATIC_DIRECTIVE,
        }
    }
}

impl Directive for AspectRatio {
    fn directive(&self) -> &'static str {
        match self {
            AspectRatio::Portrait => ASPECT_PORTRAIT_DIRECTIVE,
            AspectRatio::Landscape => ASPECT_LANDSCAPE_DIRECTIVE,
        }
    }
}

impl Directive for VisualStyle {
    fn directive(&self) -> &'static str {
        match self {
            VisualStyle::RealisticPhotography => STYLE_REALISTIC_PHOTOGRAPHY_DIRECTIVE,
        }
    }
}

impl Directive for FocalLength {
    fn directive(&self) -> &'static str {
        match self {
            FocalLength::Mm10 => FOCAL_10MM_DIRECTIVE,
            FocalLength::Mm25 => FOCAL_25MM_DIRECTIVE,
            FocalLength::Mm35 => FOCAL_35MM_DIRECTIVE,
        }
    }
}

impl Directive for FacialExpression {
    fn directive(&self) -> &'static str {
        match self {
            FacialExpression::ExaggeratedFear => EXPRESSION_FEAR_DIRECTIVE,
            FacialExpression::ExaggeratedAnger => EXPRESSION_ANGER_DIRECTIVE,
            FacialExpression::ExaggeratedJoy => EXPRESSION_JOY_DIRECTIVE,
            FacialExpression::ExaggeratedCrying => EXPRESSION_CRYING_DIRECTIVE,
            FacialExpression::ExaggeratedPain => EXPRESSION_PAIN_DIRECTIVE,
        }
    }
}

impl Directive for Consistency {
    fn directive(&self) -> &'static str {
        match self {
            Consistency::Absolute => CONSISTENCY_ABSOLUTE_DIRECTIVE,
        }
    }
}

/// How the base prompt should be changed
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "instruction")]
pub enum ModificationMode {
    /// No specific instruction; the model improves the prompt creatively
    #[default]
    Creative,
    /// Apply the given instruction text
    Explicit(String),
}

impl ModificationMode {
    /// The trimmed explicit instruction, if there is a non-empty one
    pub fn instruction(&self) -> Option<&str> {
        match self {
            ModificationMode::Explicit(text) => {
                let text = text.trim();
                (!text.is_empty()).then_some(text)
            }
            ModificationMode::Creative => None,
        }
    }
}

/// One prompt modification submission
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModificationRequest {
    pub original_prompt: String,
    #[serde(default)]
    pub mode: ModificationMode,
    #[serde(default)]
    pub quality: Option<QualityOption>,
    #[serde(default)]
    pub aspect_ratio: Option<AspectRatio>,
    #[serde(default)]
    pub style: Option<VisualStyle>,
    #[serde(default)]
    pub focal_length: Option<FocalLength>,
    #[serde(default)]
    pub facial_expression: Option<FacialExpression>,
    #[serde(default)]
    pub consistency: Option<Consistency>,
}

impl ModificationRequest {
    pub fn new(original_prompt: impl Into<String>) -> Self {
        Self {
            original_prompt: original_prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.mode = ModificationMode::Explicit(instruction.into());
        self
    }

    pub fn with_mode(mut self, mode: ModificationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_quality(mut self, quality: Option<QualityOption>) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: Option<AspectRatio>) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn with_style(mut self, style: Option<VisualStyle>) -> Self {
        self.style = style;
        self
    }

    pub fn with_focal_length(mut self, focal_length: Option<FocalLength>) -> Self {
        self.focal_length = focal_length;
        self
    }

    pub fn with_facial_expression(mut self, expression: Option<FacialExpression>) -> Self {
        self.facial_expression = expression;
        self
    }

    pub fn with_consistency(mut self, consistency: Option<Consistency>) -> Self {
        self.consistency = consistency;
        self
    }

    /// Directive phrases of every active category, in fixed category order
    pub fn active_directives(&self) -> Vec<&'static str> {
        let categories: [Option<&dyn Directive>; 6] = [
            self.quality.as_ref().map(|v| v as &dyn Directive),
            self.aspect_ratio.as_ref().map(|v| v as &dyn Directive),
            self.style.as_ref().map(|v| v as &dyn Directive),
            self.focal_length.as_ref().map(|v| v as &dyn Directive),
            self.facial_expression.as_ref().map(|v| v as &dyn Directive),
            self.consistency.as_ref().map(|v| v as &dyn Directive),
        ];

        categories
            .into_iter()
            .flatten()
            .map(|category| category.directive())
            .collect()
    }
}
