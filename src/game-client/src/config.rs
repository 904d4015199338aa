use std::path::PathBuf;

use clap::Parser;
use common::model::{game::GameType, messages::RoomId};
use tracing::Level;

use crate::strategy::StrategyKind;

/// Where the game server listens.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub secure: bool,
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl Endpoint {
    pub fn url(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        format!(
            "{}://{}:{}/{}",
            scheme,
            self.host,
            self.port,
            self.path.trim_start_matches('/')
        )
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Endpoint {
            secure: false,
            host: "localhost".to_owned(),
            port: 8000,
            path: "ws".to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: Endpoint,
    pub game: GameType,
    // Join this room directly instead of matchmaking by game type
    pub room: Option<RoomId>,
    pub identity_file: PathBuf,
    pub player: Option<String>,
    pub agent: Option<StrategyKind>,
    pub log_level: Level,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            endpoint: Endpoint::default(),
            game: GameType::default(),
            room: None,
            identity_file: PathBuf::from("gamehub_identity.json"),
            player: None,
            agent: None,
            log_level: Level::INFO,
        }
    }
}

/// Command line for the game client. Every flag falls back to an environment variable.
#[derive(Debug, Parser)]
#[command(name = "game-client", about = "Console client for gamehub card and board games")]
pub struct Args {
    #[arg(long, env = "GAMEHUB_HOST", default_value = "localhost")]
    pub host: String,
    #[arg(long, env = "GAMEHUB_PORT", default_value_t = 8000)]
    pub port: u16,
    #[arg(long, env = "GAMEHUB_PATH", default_value = "ws")]
    pub path: String,
    #[arg(long)]
    pub secure: bool,
    #[arg(long, env = "GAMEHUB_GAME", default_value = "chinese_poker")]
    pub game: GameType,
    #[arg(long)]
    pub room: Option<String>,
    #[arg(long, env = "GAMEHUB_IDENTITY", default_value = "gamehub_identity.json")]
    pub identity_file: PathBuf,
    #[arg(long, env = "GAMEHUB_PLAYER")]
    pub player: Option<String>,
    /// Play automatically with this strategy
    #[arg(long, value_enum)]
    pub agent: Option<StrategyKind>,
    #[arg(long, env = "GAMEHUB_LOG", default_value = "info")]
    pub log_level: Level,
}

impl From<Args> for ClientConfig {
    fn from(args: Args) -> Self {
        ClientConfig {
            endpoint: Endpoint {
                secure: args.secure,
                host: args.host,
                port: args.port,
                path: args.path,
            },
            game: args.game,
            room: args.room.map(RoomId),
            identity_file: args.identity_file,
            player: args.player,
            agent: args.agent,
            log_level: args.log_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoint() {
        assert_eq!(Endpoint::default().url(), "ws://localhost:8000/ws");
        let endpoint = Endpoint {
            secure: true,
            host: "games.example".into(),
            port: 443,
            path: "/socket".into(),
        };
        assert_eq!(endpoint.url(), "wss://games.example:443/socket");
    }

    #[test]
    fn args_become_config() {
        let args = Args::parse_from([
            "game-client",
            "--host",
            "10.0.0.2",
            "--port",
            "8765",
            "--game",
            "rps",
            "--room",
            "1",
            "--agent",
            "random",
            "--log-level",
            "debug",
        ]);
        let config = ClientConfig::from(args);
        assert_eq!(config.endpoint.url(), "ws://10.0.0.2:8765/ws");
        assert_eq!(config.game, GameType::RockPaperScissors);
        assert_eq!(config.room, Some(RoomId::from("1")));
        assert_eq!(config.agent, Some(StrategyKind::Random));
        assert_eq!(config.log_level, Level::DEBUG);
    }
}
