//! Target version and Ghost compatibility for a release draft.

/// Compatibility floor used when the override does not name one.
pub const DEFAULT_COMPATIBLE_WITH_GHOST: &str = "2.10.0";

/// Left in the draft body for the maintainer to fill in when no override is given.
pub const SHIPS_WITH_GHOST_PLACEHOLDER: &str = "{version}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub new_version: String,
    pub ships_with_ghost: String,
    pub compatible_with_ghost: String,
}

impl VersionInfo {
    /// Build from the target version and an optional `"<ships>,<compatible>"` override.
    ///
    /// Returns `None` when the target version is missing or blank.
    pub fn derive(new_version: Option<&str>, ghost_override: Option<&str>) -> Option<Self> {
        let new_version = new_version.map(str::trim).filter(|v| !v.is_empty())?;
        let (ships_with_ghost, compatible_with_ghost) = parse_ghost_override(ghost_override);

        Some(Self {
            new_version: new_version.to_string(),
            ships_with_ghost,
            compatible_with_ghost,
        })
    }

    /// First paragraph of the release body
    pub fn compatibility_header(&self) -> String {
        format!(
            "**Ships with Ghost {} Compatible with Ghost >= {}**",
            self.ships_with_ghost, self.compatible_with_ghost
        )
    }
}

fn parse_ghost_override(ghost_override: Option<&str>) -> (String, String) {
    let Some(value) = ghost_override.filter(|v| !v.trim().is_empty()) else {
        return (
            SHIPS_WITH_GHOST_PLACEHOLDER.to_string(),
            DEFAULT_COMPATIBLE_WITH_GHOST.to_string(),
        );
    };

    let mut parts = value.split(',').map(str::trim);
    let ships = parts.next().unwrap_or_default().to_string();
    let compatible = parts
        .next()
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_COMPATIBLE_WITH_GHOST)
        .to_string();

    (ships, compatible)
}
