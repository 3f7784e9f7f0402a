/// 投稿须知，必须全部勾选才能继续
pub const SUBMISSION_REQUIREMENTS: [&str; 5] = [
    "This is original work and has not been published elsewhere.",
    "The manuscript is not currently under consideration by another journal.",
    "The submission follows the recommended formatting and style guidelines.",
    "The research meets all applicable ethical standards.",
    "I agree to the terms and conditions of submission.",
];

/// 是否为固定列表中的某一条
pub fn is_known_requirement(text: &str) -> bool {
    SUBMISSION_REQUIREMENTS.contains(&text)
}
