use std::str::FromStr;

use common::{
    error::ClientError,
    model::{game::Selection, messages::RoomId},
};

/// One line of console input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login(String),
    Logout,
    // Join by game type, or a specific room
    Join(Option<RoomId>),
    // Indices into the local hand
    Play(Vec<usize>),
    Select(Selection),
    Cell(u8),
    Quit,
}

impl FromStr for Command {
    type Err = ClientError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(ClientError::InvalidCommand("empty command".into()));
        };
        let rest: Vec<&str> = words.collect();
        let invalid = |reason: &str| ClientError::InvalidCommand(format!("{}: {}", line.trim(), reason));

        match verb.to_ascii_lowercase().as_str() {
            "login" => match rest.as_slice() {
                [player_id] => Ok(Command::Login((*player_id).to_owned())),
                _ => Err(invalid("usage: login <player id>")),
            },
            "logout" => Ok(Command::Logout),
            "join" => match rest.as_slice() {
                [] => Ok(Command::Join(None)),
                [room] => Ok(Command::Join(Some(RoomId::from(*room)))),
                _ => Err(invalid("usage: join [room]")),
            },
            "play" => {
                let indices = rest
                    .iter()
                    .map(|word| word.parse::<usize>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| invalid("card indices must be numbers"))?;
                if indices.is_empty() {
                    return Err(invalid("usage: play <index>..."));
                }
                Ok(Command::Play(indices))
            }
            "rock" | "paper" | "scissors" => Ok(Command::Select(verb.parse()?)),
            "cell" => match rest.as_slice() {
                [cell] => cell
                    .parse()
                    .map(Command::Cell)
                    .map_err(|_| invalid("cell must be 0-8")),
                _ => Err(invalid("usage: cell <0-8>")),
            },
            "quit" | "exit" => Ok(Command::Quit),
            _ => Err(invalid("unknown command")),
        }
    }
}
