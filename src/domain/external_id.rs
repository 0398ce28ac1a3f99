/// Identifier issued by Campaign Monitor for clients and lists.
///
/// The provider always hands out 32 character ids, any other length is rejected
/// whatever its content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct ExternalId(String);

const EXTERNAL_ID_LENGTH: usize = 32;

impl ExternalId {
    pub fn parse(id: String) -> Result<ExternalId, String> {
        if id.chars().count() != EXTERNAL_ID_LENGTH {
            return Err(format!("{} is not a valid external ID", id));
        }

        Ok(Self(id))
    }
}

impl AsRef<str> for ExternalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExternalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
