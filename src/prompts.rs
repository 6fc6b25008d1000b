//! Fixed instruction texts sent to the model.
//!
//! The tool produces Chinese-language generation prompts, so every instruction
//! and directive phrase below is written in Chinese. Changing any of these
//! strings changes the constructed instructions byte for byte.

/// Captioning instruction sent alongside every image in a reverse-prompt request.
///
/// Asks for a concise, high quality prompt that would let a generative art
/// model recreate the image, without meta commentary about source or quality.
pub const REVERSE_PROMPT_INSTRUCTION: &str = "详细描述这张图片，包括元素、构图、光照和风格。为生成式AI艺术模型生成一个简洁、高质量、富有创意的中文提示词，该提示词可以重现这张图片或类似的图片。提示词应适合生成写实或艺术风格的图片。不要包含任何关于图片来源或质量的元信息，只需提供提示词本身。";

/// System instruction for prompt rewriting.
pub const REWRITE_SYSTEM_INSTRUCTION: &str = "你是一位专业的AI提示词工程师，擅长提炼和优化图片生成提示词。你的目标是根据质量、长宽比和风格的具体指令，修改给定的提示词。生成一个改进后的中文提示词。";

/// Label in front of the quoted base prompt.
pub const ORIGINAL_PROMPT_LABEL: &str = "原始提示词";

/// Label in front of the quoted explicit modification instruction.
pub const EXPLICIT_INSTRUCTION_LABEL: &str = "具体修改指令";

/// Used when no explicit instruction is given.
pub const CREATIVE_IMPROVE_DIRECTIVE: &str = "创造性地优化此提示词。";

/// Always the last line of a rewrite instruction.
pub const RETURN_ONLY_PROMPT_DIRECTIVE: &str =
    "仅提供优化后的提示词，不包含任何额外的对话文本或解释。";

// Quality
pub const QUALITY_8K_CINEMATIC_DIRECTIVE: &str = "确保输出提示词包含8K分辨率和电影打光效果。";

// Aspect ratio
pub const ASPECT_PORTRAIT_DIRECTIVE: &str = "建议使用9:16（肖像）长宽比。";
pub const ASPECT_LANDSCAPE_DIRECTIVE: &str = "建议使用16:9（横向）长宽比。";

// Style
pub const STYLE_REALISTIC_PHOTOGRAPHY_DIRECTIVE: &str = "建议使用写实写真风格。";

// Focal length
pub const FOCAL_10MM_DIRECTIVE: &str = "使用10mm焦距。";
pub const FOCAL_25MM_DIRECTIVE: &str = "使用25mm焦距。";
pub const FOCAL_35MM_DIRECTIVE: &str = "使用35mm焦距。";

// Facial close-up
pub const EXPRESSION_FEAR_DIRECTIVE: &str = "面部特写，表情夸张恐惧。";
pub const EXPRESSION_ANGER_DIRECTIVE: &str = "面部特写，表情夸张愤怒。";
pub const EXPRESSION_JOY_DIRECTIVE: &str = "面部特写，表情夸张喜悦。";
pub const EXPRESSION_CRYING_DIRECTIVE: &str = "面部特写，表情夸张流泪。";
pub const EXPRESSION_PAIN_DIRECTIVE: &str = "面部特写，表情夸张痛苦。";

/// Shot-to-shot consistency of characters and scenes.
pub const CONSISTENCY_ABSOLUTE_DIRECTIVE: &str =
    "保持人物、动物、角色和场景的绝对一致性，并确保每个镜头能够自然衔接前后画面。";
