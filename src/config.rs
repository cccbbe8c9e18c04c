use std::fmt;
use std::str::FromStr;

/// How a rook's first move affects its colour's castling rights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CastlingPolicy {
    /// Separate king, short-rook and long-rook flags.
    #[default]
    Independent,
    /// Any rook move also sets the king-moved flag, forfeiting both castles.
    Coarse,
}

impl FromStr for CastlingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "independent" => Ok(CastlingPolicy::Independent),
            "coarse" => Ok(CastlingPolicy::Coarse),
            other => Err(format!("unknown castling policy: '{other}'")),
        }
    }
}

impl fmt::Display for CastlingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CastlingPolicy::Independent => write!(f, "independent"),
            CastlingPolicy::Coarse => write!(f, "coarse"),
        }
    }
}

/// Rules configuration parsed from environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RulesConfig {
    /// Castling-rights bookkeeping for rook moves.
    pub castling_policy: CastlingPolicy,
}

impl RulesConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        RulesConfig {
            castling_policy: std::env::var("CHESS_CASTLING_POLICY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = RulesConfig::default();
        assert_eq!(config.castling_policy, CastlingPolicy::Independent);
    }

    #[test]
    fn from_env_defaults() {
        // Without setting env vars, should fall back to defaults
        let config = RulesConfig::from_env();
        assert_eq!(config.castling_policy, CastlingPolicy::Independent);
    }

    #[test]
    fn parse_policy() {
        assert_eq!("coarse".parse::<CastlingPolicy>(), Ok(CastlingPolicy::Coarse));
        assert_eq!(
            " Independent ".parse::<CastlingPolicy>(),
            Ok(CastlingPolicy::Independent)
        );
        assert!("strict".parse::<CastlingPolicy>().is_err());
        assert_eq!(CastlingPolicy::Coarse.to_string(), "coarse");
    }
}
