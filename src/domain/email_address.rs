use validator::validate_email;

#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(email: String) -> Result<EmailAddress, String> {
        let is_valid_email = validate_email(&email);

        if !is_valid_email {
            return Err(format!("{} email is not valid", email));
        }

        Ok(Self(email))
    }

    /// Client contact emails may be left blank by the provider.
    pub fn parse_optional(email: String) -> Result<Option<EmailAddress>, String> {
        if email.trim().is_empty() {
            return Ok(None);
        }

        Self::parse(email).map(Some)
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
