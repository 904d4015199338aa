use clap::ValueEnum;
use common::model::{
    game::{GameType, Move, Selection},
    messages::Player,
};
use rand::{seq::IndexedRandom, Rng};

use crate::{projection::board, state::LocalState};

/// Picks the next move for an unattended client. Returns `None` when it has nothing to play.
pub trait Strategy: Send {
    fn make_move(&self, game: GameType, state: &LocalState) -> Option<Move>;
}

fn free_cells(players: &[Player]) -> Vec<u8> {
    board(players)
        .iter()
        .enumerate()
        .filter(|(_, mark)| mark.is_none())
        .map(|(cell, _)| cell as u8)
        .collect()
}

// Trivial strategies: always the same selection, otherwise the first legal-looking option
pub struct Fixed(pub Selection);
impl Strategy for Fixed {
    fn make_move(&self, game: GameType, state: &LocalState) -> Option<Move> {
        match game {
            GameType::RockPaperScissors => Some(Move::Selection { selection: self.0 }),
            GameType::TicTacToe => {
                let cell = *free_cells(state.players.as_deref()?).first()?;
                Some(Move::Cell { cell_index: cell })
            }
            GameType::ChinesePoker => {
                let card = state.my_cards.as_deref()?.first()?.clone();
                Some(Move::Cards { cards: vec![card] })
            }
        }
    }
}

// Random
pub struct RandomMove;
impl Strategy for RandomMove {
    fn make_move(&self, game: GameType, state: &LocalState) -> Option<Move> {
        let mut rng = rand::rng();
        match game {
            GameType::RockPaperScissors => Some(Move::Selection {
                selection: *Selection::ALL.choose(&mut rng)?,
            }),
            GameType::TicTacToe => {
                let cell = *free_cells(state.players.as_deref()?).choose(&mut rng)?;
                Some(Move::Cell { cell_index: cell })
            }
            GameType::ChinesePoker => {
                let hand = state.my_cards.as_deref()?;
                if hand.is_empty() {
                    return None;
                }
                let card = hand[rng.random_range(0..hand.len())].clone();
                Some(Move::Cards { cards: vec![card] })
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyKind {
    Rock,
    Paper,
    Scissors,
    Random,
}

impl StrategyKind {
    pub fn build(self) -> Box<dyn Strategy> {
        match self {
            StrategyKind::Rock => Box::new(Fixed(Selection::Rock)),
            StrategyKind::Paper => Box::new(Fixed(Selection::Paper)),
            StrategyKind::Scissors => Box::new(Fixed(Selection::Scissors)),
            StrategyKind::Random => Box::new(RandomMove),
        }
    }
}

#[cfg(test)]
mod tests {
    use common::model::game::{Card, Suit};

    use super::*;

    fn tic_tac_toe(x: Vec<u8>, o: Vec<u8>) -> LocalState {
        let mut first = Player::new("x");
        first.selections = Some(x);
        let mut second = Player::new("o");
        second.selections = Some(o);
        LocalState {
            players: Some(vec![first, second]),
            ..LocalState::default()
        }
    }

    #[test]
    fn fixed_plays_its_selection() {
        let played = Fixed(Selection::Scissors).make_move(GameType::RockPaperScissors, &LocalState::default());
        assert_eq!(
            played,
            Some(Move::Selection {
                selection: Selection::Scissors
            })
        );
    }

    #[test]
    fn fixed_takes_first_free_cell() {
        let state = tic_tac_toe(vec![0, 1], vec![2]);
        assert_eq!(
            Fixed(Selection::Rock).make_move(GameType::TicTacToe, &state),
            Some(Move::Cell { cell_index: 3 })
        );
        let full = tic_tac_toe(vec![0, 1, 5, 6, 8], vec![2, 3, 4, 7]);
        assert_eq!(Fixed(Selection::Rock).make_move(GameType::TicTacToe, &full), None);
    }

    #[test]
    fn poker_plays_a_card_from_hand() {
        let hand = vec![Card::new("4", Suit::Hearts), Card::new("9", Suit::Clubs)];
        let state = LocalState {
            my_cards: Some(hand.clone()),
            ..LocalState::default()
        };
        assert_eq!(
            Fixed(Selection::Rock).make_move(GameType::ChinesePoker, &state),
            Some(Move::Cards {
                cards: vec![hand[0].clone()]
            })
        );
        let Some(Move::Cards { cards }) = RandomMove.make_move(GameType::ChinesePoker, &state) else {
            panic!("Expected a card");
        };
        assert!(hand.contains(&cards[0]));
        assert_eq!(
            RandomMove.make_move(GameType::ChinesePoker, &LocalState::default()),
            None
        );
    }

    #[test]
    fn random_cell_is_free() {
        let state = tic_tac_toe(vec![0, 1, 5, 6], vec![2, 3, 4, 7]);
        for _ in 0..10 {
            assert_eq!(
                RandomMove.make_move(GameType::TicTacToe, &state),
                Some(Move::Cell { cell_index: 8 })
            );
        }
    }
}
