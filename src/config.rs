use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_DATA_PATH: &str = "prizes_data.json";
pub const DEFAULT_BACKUP_COOLDOWN_SECS: u64 = 60;
pub const DEFAULT_COMMAND_PREFIX: &str = "!";

// Where the durable record gets mirrored after each save.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BackupDestination {
    Channel(u64),
    User(u64),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub data_path: PathBuf,
    pub backup_destination: Option<BackupDestination>,
    pub backup_cooldown: Duration,
    pub command_prefix: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Builds the configuration from an arbitrary key-value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = match lookup("DISCORD_TOKEN") {
            Some(token) if !token.trim().is_empty() => token,
            _ => {
                let message = "Expected a DISCORD_TOKEN in the environment".to_string();
                return Err(Error::Config(message));
            }
        };

        let data_path = lookup("PRIZES_DATA_PATH")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

        let backup_channel = parse_id(&lookup, "BACKUP_CHANNEL_ID")?;
        let backup_user = parse_id(&lookup, "BACKUP_USER_ID")?;
        let backup_destination = match (backup_channel, backup_user) {
            (Some(channel_id), _) => Some(BackupDestination::Channel(channel_id)),
            (None, Some(user_id)) => Some(BackupDestination::User(user_id)),
            (None, None) => None,
        };

        let cooldown_secs = match lookup("BACKUP_COOLDOWN_SECS") {
            Some(value) => value.trim().parse::<u64>().map_err(|_| {
                Error::Config(format!("BACKUP_COOLDOWN_SECS must be a number, got \"{}\"", value))
            })?,
            None => DEFAULT_BACKUP_COOLDOWN_SECS,
        };

        let command_prefix = lookup("COMMAND_PREFIX")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_COMMAND_PREFIX.to_string());

        Ok(Config {
            token,
            data_path,
            backup_destination,
            backup_cooldown: Duration::from_secs(cooldown_secs),
            command_prefix,
        })
    }
}

fn parse_id<F>(lookup: &F, key: &str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => match value.trim().parse::<u64>() {
            Ok(id) if id > 0 => Ok(Some(id)),
            _ => Err(Error::Config(format!("{} must be a Discord id, got \"{}\"", key, value))),
        },
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    use crate::config::{BackupDestination, Config};
    use crate::error::Error;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, Error> {
        let values = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<String, String>>();
        Config::from_lookup(|key| values.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("DISCORD_TOKEN", "secret")]).unwrap();

        assert_eq!(config.token, "secret");
        assert_eq!(config.data_path, PathBuf::from("prizes_data.json"));
        assert_eq!(config.backup_destination, None);
        assert_eq!(config.backup_cooldown, Duration::from_secs(60));
        assert_eq!(config.command_prefix, "!");
    }

    #[test]
    fn test_get_error_for_missing_token() {
        let result = config_from(&[]);
        assert_eq!(
            result.unwrap_err(),
            Error::Config("Expected a DISCORD_TOKEN in the environment".to_string())
        );
    }

    #[test]
    fn test_channel_destination_wins_over_user() {
        let config = config_from(&[
            ("DISCORD_TOKEN", "secret"),
            ("BACKUP_CHANNEL_ID", "100"),
            ("BACKUP_USER_ID", "200"),
        ])
        .unwrap();

        assert_eq!(config.backup_destination, Some(BackupDestination::Channel(100)));
    }

    #[test]
    fn test_user_destination() {
        let config =
            config_from(&[("DISCORD_TOKEN", "secret"), ("BACKUP_USER_ID", "200")]).unwrap();

        assert_eq!(config.backup_destination, Some(BackupDestination::User(200)));
    }

    #[test]
    fn test_get_error_for_invalid_backup_id() {
        let result = config_from(&[("DISCORD_TOKEN", "secret"), ("BACKUP_CHANNEL_ID", "abc")]);
        assert_eq!(
            result.unwrap_err(),
            Error::Config("BACKUP_CHANNEL_ID must be a Discord id, got \"abc\"".to_string())
        );
    }

    #[test]
    fn test_custom_cooldown() {
        let config =
            config_from(&[("DISCORD_TOKEN", "secret"), ("BACKUP_COOLDOWN_SECS", "5")]).unwrap();

        assert_eq!(config.backup_cooldown, Duration::from_secs(5));
    }
}
