//! Language routing for recognition requests.
//!
//! `auto` leaves the recognition service unconstrained. An explicit code is normalized to its
//! primary subtag and paired with a short prompt that nudges the model toward that language.
//! Chinese variants all collapse to `zh`.

use std::fmt;

/// Language setting for a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Language {
    /// Let the recognition service detect the spoken language.
    #[default]
    Auto,

    /// A normalized primary language code (e.g. `"en"`, `"zh"`).
    Code(String),
}

/// Language fields attached to each recognition request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestLanguage {
    pub language: Option<String>,
    pub prompt: Option<String>,
}

const CHINESE_ALIASES: &[&str] = &["cmn", "chinese", "mandarin"];

impl Language {
    /// Parse a user-supplied language setting.
    ///
    /// Empty input and `auto` (any case) map to [`Language::Auto`].
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase().replace('_', "-");
        if normalized.is_empty() || normalized == "auto" {
            return Self::Auto;
        }

        let primary = normalized
            .split('-')
            .next()
            .unwrap_or(normalized.as_str())
            .to_owned();

        if primary == "zh" || CHINESE_ALIASES.contains(&primary.as_str()) {
            return Self::Code("zh".to_owned());
        }

        Self::Code(primary)
    }

    /// The code sent to the recognition service, or `None` for auto-detection.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Auto => None,
            Self::Code(code) => Some(code),
        }
    }

    /// Build the language hint and disambiguation prompt for a recognition request.
    pub fn request(&self) -> RequestLanguage {
        match self {
            Self::Auto => RequestLanguage::default(),
            Self::Code(code) => RequestLanguage {
                language: Some(code.clone()),
                prompt: Some(hint_for(code)),
            },
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code().unwrap_or("auto"))
    }
}

impl std::str::FromStr for Language {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

fn hint_for(code: &str) -> String {
    let hint = match code {
        "zh" => "以下是普通话的句子，请使用简体中文。",
        "en" => "The following is a recording in English.",
        "ja" => "以下は日本語の音声です。",
        "ko" => "다음은 한국어 음성입니다.",
        "es" => "La siguiente grabación está en español.",
        "fr" => "L'enregistrement suivant est en français.",
        "de" => "Die folgende Aufnahme ist auf Deutsch.",
        "pt" => "A gravação a seguir está em português.",
        "ru" => "Следующая запись на русском языке.",
        other => return format!("The following recording is in the language with code '{other}'."),
    };
    hint.to_owned()
}
