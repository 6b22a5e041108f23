/// Camera-stored position, addressed by an opaque token.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Preset {
    pub token: String,
    pub name: String,
}

impl Preset {
    pub fn new(token: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            name: name.into(),
        }
    }
}

/// Outcome of saving a preset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresetToken {
    Assigned(String),
    /// The camera accepted the request but returned no identifier.
    Missing,
}

impl PresetToken {
    pub fn token(&self) -> &str {
        match self {
            Self::Assigned(token) => token,
            Self::Missing => "",
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl From<Option<String>> for PresetToken {
    fn from(token: Option<String>) -> Self {
        match token {
            Some(token) if !token.trim().is_empty() => Self::Assigned(token),
            _ => Self::Missing,
        }
    }
}
