use unicode_segmentation::UnicodeSegmentation;

const MAX_CHAR_LENGHT: usize = 64;

/// Short free-text field (names, company, country).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    /// Required field: must hold something other than whitespace.
    pub fn parse(value: String) -> Result<Label, String> {
        if value.trim().is_empty() {
            return Err(format!("'{}' must not be blank", value));
        }

        Self::parse_blankable(value)
    }

    pub fn parse_blankable(value: String) -> Result<Label, String> {
        if value.graphemes(true).count() > MAX_CHAR_LENGHT {
            return Err(format!(
                "'{}' is longer than {} characters",
                value, MAX_CHAR_LENGHT
            ));
        }

        Ok(Self(value))
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl AsRef<str> for Label {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
