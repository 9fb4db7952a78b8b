//! Whether raw diagnostic text may reach the screen.

/// Environment policy injected into each boundary at construction.
///
/// Only the literal environment `development` exposes diagnostics; every other
/// value (including unset) is treated as production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiagnosticsPolicy {
    Development,
    #[default]
    Production,
}

impl DiagnosticsPolicy {
    #[must_use]
    pub fn from_environment(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("development") {
            Self::Development
        } else {
            Self::Production
        }
    }

    #[must_use]
    pub const fn exposes_diagnostics(self) -> bool {
        matches!(self, Self::Development)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}
