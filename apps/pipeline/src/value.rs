use std::fmt;

/// The state carried from stage to stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// No input was given.
    Absent,
    Text(String),
    Integer(i64),
    Flag(bool),
}

impl Value {
    /// Short description of the shape, used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Absent => "an absent value",
            Self::Text(_) => "text",
            Self::Integer(_) => "an integer",
            Self::Flag(_) => "a flag",
        }
    }
}

impl From<Option<&str>> for Value {
    fn from(input: Option<&str>) -> Self {
        input.map_or(Self::Absent, |text| Self::Text(text.to_owned()))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("null"),
            Self::Text(text) => write!(f, "{text:?}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Flag(flag) => write!(f, "{flag}"),
        }
    }
}
