use serde::Deserialize;

/// The `[drove]` section of a configuration file.
///
/// ```ini
/// [drove]
/// endpoint = https://drove.example.com
/// auth_header = O-Bearer some-token
/// insecure = false
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DroveConfigSection {
    pub endpoint: String,
    #[serde(default)]
    pub auth_header: Option<String>,
    /// Kept as text; see [`parse_insecure`].
    #[serde(default)]
    pub insecure: Option<String>,
}

impl DroveConfigSection {
    /// The configured auth header, ignoring an empty value.
    #[must_use]
    pub fn auth_header(&self) -> Option<&str> {
        self.auth_header
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    #[must_use]
    pub fn is_insecure(&self) -> bool {
        self.insecure.as_deref().is_some_and(parse_insecure)
    }
}

/// Only the literal `true` (any case, surrounding whitespace ignored) enables
/// insecure mode. Anything else, including `yes` or `1`, keeps verification on.
#[must_use]
pub fn parse_insecure(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}
