//! Mapbox rendering configuration, supplied through the process environment.

use crate::CompassError;

pub const STYLE_ENV: &str = "MAPBOX_STYLE";
pub const TOKEN_ENV: &str = "MAPBOX_KEY";

#[derive(Clone, Debug)]
pub struct MapboxConfig {
    pub style: String,
    pub access_token: String,
}

impl MapboxConfig {
    pub fn new(style: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            access_token: access_token.into(),
        }
    }

    /// Read both secrets from the environment. Either one missing is fatal
    /// to startup; there is no degraded mode without a map.
    pub fn from_env() -> Result<Self, CompassError> {
        let style = std::env::var(STYLE_ENV).map_err(|_| CompassError::MissingConfig(STYLE_ENV))?;
        let access_token =
            std::env::var(TOKEN_ENV).map_err(|_| CompassError::MissingConfig(TOKEN_ENV))?;
        Ok(Self {
            style,
            access_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment mutation is process-global, so the whole round trip lives
    // in one test.
    #[test]
    fn from_env_requires_both_secrets() {
        std::env::remove_var(STYLE_ENV);
        std::env::remove_var(TOKEN_ENV);
        assert!(matches!(
            MapboxConfig::from_env(),
            Err(CompassError::MissingConfig(STYLE_ENV))
        ));

        std::env::set_var(STYLE_ENV, "mapbox://styles/reviewer/custom");
        assert!(matches!(
            MapboxConfig::from_env(),
            Err(CompassError::MissingConfig(TOKEN_ENV))
        ));

        std::env::set_var(TOKEN_ENV, "pk.test-token");
        let config = MapboxConfig::from_env().unwrap();
        assert_eq!(config.style, "mapbox://styles/reviewer/custom");
        assert_eq!(config.access_token, "pk.test-token");

        std::env::remove_var(STYLE_ENV);
        std::env::remove_var(TOKEN_ENV);
    }
}
