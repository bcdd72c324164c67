use serde::{Deserialize, Serialize};

/// How aggressively free text is canonicalized before comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizeMode {
    /// Trim, lower-case, collapse whitespace.
    #[default]
    Basic,
    /// Basic, plus `,` `.` `-` `'` `’` treated as whitespace.
    Strict,
}

impl std::fmt::Display for NormalizeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Basic => write!(f, "basic"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Normalizer {
    mode: NormalizeMode,
}

impl Normalizer {
    pub fn new(mode: NormalizeMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> NormalizeMode {
        self.mode
    }

    /// Canonical comparison form of `text`. Absent or blank input yields "".
    pub fn normalize(&self, text: Option<&str>) -> String {
        let Some(text) = text else {
            return String::new();
        };

        let lowered = text.to_lowercase();
        let mut out = String::with_capacity(lowered.len());
        for word in lowered
            .split(|c: char| c.is_whitespace() || (self.mode == NormalizeMode::Strict && is_separator(c)))
            .filter(|w| !w.is_empty())
        {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(word);
        }
        out
    }
}

fn is_separator(c: char) -> bool {
    matches!(c, ',' | '.' | '-' | '\'' | '\u{2019}')
}

/// Basic-mode normalization.
pub fn normalize(text: Option<&str>) -> String {
    Normalizer::default().normalize(text)
}
