use clap::ValueEnum;
use passgenius::{DerivationError, GenerationMode};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Zh,
}

pub struct Messages {
    pub master_prompt: &'static str,
    pub salt_prompt: &'static str,
    pub error_title: &'static str,
    pub empty_fields: &'static str,
    pub generation_failed: &'static str,
    pub unexpected_error: &'static str,
    pub copied_title: &'static str,
    pub copied_description: &'static str,
    pub not_saved: &'static str,
    pub settings: &'static str,
    pub mode: &'static str,
    pub year_suffix: &'static str,
    pub underscore_wrap: &'static str,
    pub length: &'static str,
    pub char_unit: &'static str,
    pub chars_unit: &'static str,
    pub on: &'static str,
    pub off: &'static str,
}

const EN: Messages = Messages {
    master_prompt: "Master password",
    salt_prompt: "Salt / keyword",
    error_title: "Error",
    empty_fields: "Password and salt fields cannot be empty.",
    generation_failed: "Generation failed",
    unexpected_error: "An unexpected error occurred during password generation.",
    copied_title: "Copied!",
    copied_description: "Password copied to clipboard.",
    not_saved: "It is not saved anywhere.",
    settings: "Settings",
    mode: "Type",
    year_suffix: "Year",
    underscore_wrap: "Wrap",
    length: "Length",
    char_unit: "char",
    chars_unit: "chars",
    on: "on",
    off: "off",
};

const ZH: Messages = Messages {
    master_prompt: "主密码",
    salt_prompt: "盐值 / 关键词",
    error_title: "错误",
    empty_fields: "密码和盐值不能为空。",
    generation_failed: "生成失败",
    unexpected_error: "生成密码时发生意外错误。",
    copied_title: "已复制！",
    copied_description: "密码已复制到剪贴板。",
    not_saved: "密码不会被保存。",
    settings: "设置",
    mode: "类型",
    year_suffix: "年份",
    underscore_wrap: "下划线",
    length: "长度",
    char_unit: "个字符",
    chars_unit: "个字符",
    on: "开",
    off: "关",
};

impl Locale {
    pub fn messages(&self) -> &'static Messages {
        match self {
            Self::En => &EN,
            Self::Zh => &ZH,
        }
    }

    pub fn mode_label(&self, mode: GenerationMode) -> &'static str {
        match (self, mode) {
            (Self::En, GenerationMode::General) => "General",
            (Self::En, GenerationMode::SixDigit) => "6 digit",
            (Self::En, GenerationMode::EightDigit) => "8 digit",
            (Self::Zh, GenerationMode::General) => "通用",
            (Self::Zh, GenerationMode::SixDigit) => "6位数字",
            (Self::Zh, GenerationMode::EightDigit) => "8位数字",
        }
    }

    pub fn clipboard_hold_notice(&self, seconds: u64) -> String {
        match self {
            Self::En => format!(
                "Keeping the password on the clipboard for {seconds}s (Ctrl-C to stop)..."
            ),
            Self::Zh => format!("密码将在剪贴板中保留 {seconds} 秒（按 Ctrl-C 停止）……"),
        }
    }

    /// Title and guidance for a failed derivation.
    pub fn describe_error(&self, err: &DerivationError) -> (&'static str, String) {
        let m = self.messages();
        match (self, err) {
            (_, DerivationError::EmptyInput) => (m.error_title, m.empty_fields.to_string()),
            (Self::En, DerivationError::InsufficientDigits { required, .. }) => (
                m.generation_failed,
                format!("Could not find {required} digits in the hash. Try a different salt."),
            ),
            (Self::Zh, DerivationError::InsufficientDigits { required, .. }) => (
                m.generation_failed,
                format!("无法在哈希中找到 {required} 位数字，请尝试其他盐值。"),
            ),
            (_, DerivationError::Unexpected(_)) => (m.error_title, m.unexpected_error.to_string()),
        }
    }
}
