//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::arena::{ArenaConfig, MapTemplate};
use crate::game::difficulty::DifficultyProfile;
use crate::game::palette::{Palette, PaletteError};
use crate::game::ports::Position;
use crate::game::round::RoundSettings;
use crate::game::session::SessionSettings;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Allowed client origins for CORS; any origin when empty
    pub client_origins: Vec<String>,

    /// Lobby / round timing and difficulty
    pub session: SessionSettings,
    /// Playfield layout and spawn points
    pub arena: ArenaConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup (environment, tests)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(&lookup);

        // Render-style PORT wins over SERVER_ADDR
        let server_addr = match vars.get("PORT") {
            Some(port) => format!("0.0.0.0:{}", port),
            None => vars
                .get("SERVER_ADDR")
                .unwrap_or_else(|| "0.0.0.0:8080".to_string()),
        };

        let client_origins = vars
            .get("CLIENT_ORIGIN")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,
            log_level: vars.get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            client_origins,
            session: session_settings(&vars)?,
            arena: arena_config(&vars)?,
        })
    }
}

fn session_settings(vars: &Vars<'_>) -> Result<SessionSettings, ConfigError> {
    let defaults = DifficultyProfile::default();
    let difficulty = DifficultyProfile {
        start_fraction: vars.fraction("START_TARGET_FRACTION", defaults.start_fraction)?,
        fraction_decrease_per_round: vars
            .fraction("FRACTION_DECREASE_PER_ROUND", defaults.fraction_decrease_per_round)?,
        min_fraction: vars.fraction("MIN_TARGET_FRACTION", defaults.min_fraction)?,
        initial_interval: vars.seconds("INITIAL_TARGET_INTERVAL", defaults.initial_interval)?,
        min_interval: vars.seconds("MIN_TARGET_INTERVAL", defaults.min_interval)?,
        interval_decrease: vars.seconds("INTERVAL_DECREASE", defaults.interval_decrease)?,
    };
    if difficulty.initial_interval.is_zero()
        || difficulty.min_interval.is_zero()
        || difficulty.min_interval > difficulty.initial_interval
    {
        return Err(ConfigError::Invalid("MIN_TARGET_INTERVAL"));
    }

    let palette = match vars.get("PALETTE") {
        Some(raw) => Palette::parse(&raw)?,
        None => Palette::default(),
    };
    // Non-target pads and consecutive targets need a second color
    if palette.len() < 2 {
        return Err(ConfigError::Invalid("PALETTE"));
    }

    let round_defaults = RoundSettings::default();
    let session_defaults = SessionSettings::default();
    Ok(SessionSettings {
        round: RoundSettings {
            palette,
            difficulty,
            settle_delay: vars.seconds("PLACEMENT_SETTLE_DELAY", round_defaults.settle_delay)?,
            end_on_last_survivor: vars
                .parse("END_ON_LAST_SURVIVOR", round_defaults.end_on_last_survivor)?,
        },
        intermission_secs: vars.parse("INTERMISSION_DURATION", session_defaults.intermission_secs)?,
        post_round_delay: vars.seconds("POST_ROUND_DELAY", session_defaults.post_round_delay)?,
        seed: vars
            .get("ROUND_SEED")
            .map(|s| s.parse().map_err(|_| ConfigError::Invalid("ROUND_SEED")))
            .transpose()?,
    })
}

fn arena_config(vars: &Vars<'_>) -> Result<ArenaConfig, ConfigError> {
    let defaults = ArenaConfig::default();
    let template_defaults = MapTemplate::default();

    let template = match vars.get("ARENA_TEMPLATE").as_deref() {
        None | Some("grid") => Some(MapTemplate {
            rows: vars.parse("ARENA_ROWS", template_defaults.rows)?,
            cols: vars.parse("ARENA_COLS", template_defaults.cols)?,
            pad_size: vars.parse("PAD_SIZE", template_defaults.pad_size)?,
            pad_gap: vars.parse("PAD_GAP", template_defaults.pad_gap)?,
            screens: vars.parse("ARENA_SCREENS", template_defaults.screens)?,
        }),
        Some("none") => None,
        Some(_) => return Err(ConfigError::Invalid("ARENA_TEMPLATE")),
    };

    Ok(ArenaConfig {
        template,
        lobby_spawn: vars.spawn("LOBBY_SPAWN", defaults.lobby_spawn)?,
        loser_spawn: vars.spawn("LOSER_SPAWN", defaults.loser_spawn)?,
    })
}

struct Vars<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Vars<'_> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    fn parse<T: FromStr>(&self, key: &'static str, default: T) -> Result<T, ConfigError> {
        match self.get(key) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
            None => Ok(default),
        }
    }

    fn fraction(&self, key: &'static str, default: f64) -> Result<f64, ConfigError> {
        let value: f64 = self.parse(key, default)?;
        if (0.0..=1.0).contains(&value) {
            Ok(value)
        } else {
            Err(ConfigError::Invalid(key))
        }
    }

    fn seconds(&self, key: &'static str, default: Duration) -> Result<Duration, ConfigError> {
        let secs: f64 = self.parse(key, default.as_secs_f64())?;
        Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::Invalid(key))
    }

    /// `x,y,z`, or `none` to disable the destination
    fn spawn(
        &self,
        key: &'static str,
        default: Option<Position>,
    ) -> Result<Option<Position>, ConfigError> {
        let Some(raw) = self.get(key) else {
            return Ok(default);
        };
        if raw.trim().eq_ignore_ascii_case("none") {
            return Ok(None);
        }

        let coords = raw
            .split(',')
            .map(|c| c.trim().parse::<f32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ConfigError::Invalid(key))?;
        match coords[..] {
            [x, y, z] => Ok(Some(Position::new(x, y, z))),
            _ => Err(ConfigError::Invalid(key)),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,

    #[error("Invalid PALETTE: {0}")]
    Palette(#[from] PaletteError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.server_addr.port(), 8080);
        assert_eq!(config.log_level, "info");
        assert!(config.client_origins.is_empty());
        assert_eq!(config.session, SessionSettings::default());
        assert_eq!(config.arena, ArenaConfig::default());
    }

    #[test]
    fn overrides() {
        let config = load(&[
            ("PORT", "9000"),
            ("START_TARGET_FRACTION", "0.5"),
            ("INITIAL_TARGET_INTERVAL", "3.5"),
            ("INTERMISSION_DURATION", "4"),
            ("END_ON_LAST_SURVIVOR", "true"),
            ("ROUND_SEED", "42"),
            ("PALETTE", "Black=000000,White=FFFFFF"),
            ("ARENA_ROWS", "3"),
            ("LOSER_SPAWN", "none"),
            ("LOBBY_SPAWN", "1, 2, 3"),
            ("CLIENT_ORIGIN", "http://a.test, http://b.test"),
        ])
        .unwrap();

        let session = &config.session;
        assert_eq!(config.server_addr.port(), 9000);
        assert_eq!(session.round.difficulty.start_fraction, 0.5);
        assert_eq!(session.round.difficulty.initial_interval, Duration::from_millis(3500));
        assert_eq!(session.intermission_secs, 4);
        assert!(session.round.end_on_last_survivor);
        assert_eq!(session.seed, Some(42));
        assert_eq!(session.round.palette.len(), 2);
        assert_eq!(config.arena.template.as_ref().unwrap().rows, 3);
        assert_eq!(config.arena.loser_spawn, None);
        assert_eq!(config.arena.lobby_spawn, Some(Position::new(1.0, 2.0, 3.0)));
        assert_eq!(config.client_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn template_can_be_disabled() {
        let config = load(&[("ARENA_TEMPLATE", "none")]).unwrap();
        assert!(config.arena.template.is_none());
        assert!(matches!(
            load(&[("ARENA_TEMPLATE", "hex")]),
            Err(ConfigError::Invalid("ARENA_TEMPLATE"))
        ));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            load(&[("MIN_TARGET_FRACTION", "1.5")]),
            Err(ConfigError::Invalid("MIN_TARGET_FRACTION"))
        ));
        assert!(matches!(
            load(&[("MIN_TARGET_INTERVAL", "0")]),
            Err(ConfigError::Invalid("MIN_TARGET_INTERVAL"))
        ));
        assert!(matches!(
            load(&[("LOBBY_SPAWN", "1,2")]),
            Err(ConfigError::Invalid("LOBBY_SPAWN"))
        ));
        assert!(matches!(
            load(&[("MIN_TARGET_INTERVAL", "6")]),
            Err(ConfigError::Invalid("MIN_TARGET_INTERVAL"))
        ));
        assert!(matches!(
            load(&[("INITIAL_TARGET_INTERVAL", "1.5")]),
            Err(ConfigError::Invalid("MIN_TARGET_INTERVAL"))
        ));
        assert!(matches!(
            load(&[("PALETTE", "Red=FF0000")]),
            Err(ConfigError::Invalid("PALETTE"))
        ));
        assert!(matches!(load(&[("PALETTE", ",")]), Err(ConfigError::Palette(_))));
        assert!(matches!(
            load(&[("SERVER_ADDR", "nowhere")]),
            Err(ConfigError::InvalidAddress)
        ));
    }
}
