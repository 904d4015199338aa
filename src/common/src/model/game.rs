use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    #[default]
    ChinesePoker,
    RockPaperScissors,
    TicTacToe,
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameType::ChinesePoker => "chinese_poker",
            GameType::RockPaperScissors => "rock_paper_scissors",
            GameType::TicTacToe => "tic_tac_toe",
        };
        f.write_str(name)
    }
}

impl FromStr for GameType {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chinese_poker" | "poker" => Ok(GameType::ChinesePoker),
            "rock_paper_scissors" | "rps" => Ok(GameType::RockPaperScissors),
            "tic_tac_toe" | "ttt" => Ok(GameType::TicTacToe),
            other => Err(ClientError::InvalidCommand(format!("unknown game type {other}"))),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Selection {
    Rock,
    Paper,
    Scissors,
}

impl Selection {
    pub const ALL: [Selection; 3] = [Selection::Rock, Selection::Paper, Selection::Scissors];
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Selection::Rock => "ROCK",
            Selection::Paper => "PAPER",
            Selection::Scissors => "SCISSORS",
        };
        f.write_str(name)
    }
}

impl FromStr for Selection {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rock" => Ok(Selection::Rock),
            "paper" => Ok(Selection::Paper),
            "scissors" => Ok(Selection::Scissors),
            other => Err(ClientError::InvalidCommand(format!("unknown selection {other}"))),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suit {
    #[serde(rename = "d")]
    Diamonds,
    #[serde(rename = "c")]
    Clubs,
    #[serde(rename = "h")]
    Hearts,
    #[serde(rename = "s")]
    Spades,
}

impl Suit {
    pub fn symbol(&self) -> char {
        match self {
            Suit::Diamonds => '♦',
            Suit::Clubs => '♣',
            Suit::Hearts => '♥',
            Suit::Spades => '♠',
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Card {
    pub rank: String,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: impl Into<String>, suit: Suit) -> Self {
        Card {
            rank: rank.into(),
            suit,
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit.symbol())
    }
}

/// Game-specific body of a `MAKE_MOVE` request. Each shape is keyed by a distinct field, so the
/// wire form carries no extra tag.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Move {
    Cards { cards: Vec<Card> },
    Selection { selection: Selection },
    Cell { cell_index: u8 },
}

impl Move {
    pub const CELLS: u8 = 9;

    /// Resolve hand indices picked by the player into the cards themselves.
    pub fn from_hand(hand: &[Card], indices: &[usize]) -> Result<Self, ClientError> {
        let mut cards = Vec::with_capacity(indices.len());
        for (position, &index) in indices.iter().enumerate() {
            if indices[..position].contains(&index) {
                return Err(ClientError::InvalidCommand(format!(
                    "card {index} is selected more than once"
                )));
            }
            let card = hand.get(index).ok_or_else(|| {
                ClientError::InvalidCommand(format!("no card at index {index}"))
            })?;
            cards.push(card.clone());
        }
        if cards.is_empty() {
            return Err(ClientError::InvalidCommand("select at least one card".into()));
        }
        Ok(Move::Cards { cards })
    }

    pub fn cell(cell_index: u8) -> Result<Self, ClientError> {
        if cell_index >= Self::CELLS {
            return Err(ClientError::InvalidCommand(format!(
                "cell {cell_index} is off the board"
            )));
        }
        Ok(Move::Cell { cell_index })
    }

    /// Whether this move shape belongs to the given game.
    pub fn fits(&self, game: GameType) -> bool {
        matches!(
            (self, game),
            (Move::Cards { .. }, GameType::ChinesePoker)
                | (Move::Selection { .. }, GameType::RockPaperScissors)
                | (Move::Cell { .. }, GameType::TicTacToe)
        )
    }
}
