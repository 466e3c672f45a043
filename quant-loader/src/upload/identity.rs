//! Identity of the uploading principal

/// Name of the user performing an upload, without any domain qualifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal(String);

impl Principal {
    /// Strip a `DOMAIN\` prefix, e.g. `CORP\alice` becomes `alice`.
    /// `None` when nothing is left to stamp into `update_user`.
    pub fn new(raw: &str) -> Option<Self> {
        let name = raw.rsplit('\\').next().unwrap_or(raw).trim();
        if name.is_empty() {
            return None;
        }
        Some(Self(name.to_string()))
    }

    /// Current OS user from `USERNAME` (Windows) or `USER`
    pub fn from_env() -> Option<Self> {
        ["USERNAME", "USER"]
            .iter()
            .filter_map(|key| std::env::var(key).ok())
            .find_map(|v| Self::new(&v))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
