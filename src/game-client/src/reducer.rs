use common::{
    model::{
        game::{Card, GameType, Move, Selection},
        messages::{PlayerId, PrivateView, RoomId, ServerMessage, SharedView, Status},
    },
    websocket::Inbound,
};
use tracing::{debug, warn};

use crate::{context::GameContext, state::LocalState};

/// A pure state transition. Applying the same transition to the same state always produces the
/// same result, so a log of transitions replays to the same state.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Login(PlayerId),
    Logout,
    // Replace the status message and nothing else
    Notice(String),
    RoomJoined {
        room_id: RoomId,
        player_ids: Vec<PlayerId>,
    },
    // Chinese poker lifecycle step
    Status {
        status: Status,
        view: SharedView,
    },
    ReplaceCards(Vec<Card>),
    RpsSelection(Selection),
    RpsView(SharedView),
    TicTacToeView(SharedView),
    // A move left the client; a selection counts as made until the round result clears it
    MoveSent(Move),
}

impl Transition {
    pub fn apply(&self, state: &LocalState) -> LocalState {
        let mut next = state.clone();
        match self {
            Transition::Login(player_id) => {
                next.player_id = Some(player_id.clone());
            }
            Transition::Logout => {
                next.player_id = None;
            }
            Transition::Notice(text) => {
                next.status_msg = Some(text.clone());
            }
            Transition::RoomJoined {
                room_id,
                player_ids,
            } => {
                next.room_id = Some(room_id.clone());
                next.roster = Some(player_ids.clone());
                next.status_msg = Some(if player_ids.is_empty() {
                    format!("Joined room {}", room_id)
                } else {
                    format!("{} joined the game", player_ids.join(", "))
                });
            }
            Transition::Status { status, view } => return poker_status(state, status, view),
            Transition::ReplaceCards(cards) => {
                next.my_cards = Some(cards.clone());
            }
            Transition::RpsSelection(selection) => {
                next.my_selection = Some(*selection);
                next.status_msg = Some(format!("Your selection: {}", selection));
                next.awaiting_move = false;
            }
            Transition::RpsView(view) => {
                next.players = view.players.clone();
                if let Some(result) = &view.result {
                    next.my_selection = None;
                    next.status_msg = Some(outcome(result.winner.as_deref()));
                    next.awaiting_move = false;
                } else if next.my_selection.is_some() || has_selected(&next) {
                    next.status_msg =
                        Some("Waiting for other players to make their move".to_owned());
                    next.awaiting_move = false;
                } else {
                    next.status_msg = Some("Make your move".to_owned());
                    next.awaiting_move = true;
                }
            }
            Transition::TicTacToeView(view) => {
                next.players = view.players.clone();
                next.current_player_id = view.current_player_id.clone();
                if view.is_over {
                    next.status_msg = Some(outcome(view.winner.as_deref()));
                    next.awaiting_move = false;
                } else if next.is_current_player() {
                    next.status_msg = Some("Make your move".to_owned());
                    next.awaiting_move = true;
                } else {
                    next.status_msg = Some(format!(
                        "Waiting for {} to make their move",
                        view.current_player_id.as_deref().unwrap_or("the other player")
                    ));
                    next.awaiting_move = false;
                }
            }
            Transition::MoveSent(value) => {
                if let Move::Selection { selection } = value {
                    next.my_selection = Some(*selection);
                }
                next.awaiting_move = false;
            }
        }
        next
    }
}

// The shared view says the local player already locked in a selection
fn has_selected(state: &LocalState) -> bool {
    let Some(player_id) = state.player_id.as_deref() else {
        return false;
    };
    state
        .players
        .iter()
        .flatten()
        .any(|player| player.player_id == player_id && player.selected == Some(true))
}

fn outcome(winner: Option<&str>) -> String {
    match winner {
        Some(winner) => format!("{} wins!", winner),
        None => "It's a tie!".to_owned(),
    }
}

// One arm per lifecycle status; each replaces exactly the fields that status carries.
fn poker_status(state: &LocalState, status: &Status, view: &SharedView) -> LocalState {
    let mut next = state.clone();
    let current = view.current_player_id.clone();
    match status {
        Status::StartGame => {
            next.status_msg = Some("Game started".to_owned());
            next.players = view.players.clone();
        }
        Status::StartMatch => {
            next.status_msg = Some("Match started".to_owned());
        }
        Status::DealCards => {
            next.status_msg = Some("Dealing cards".to_owned());
            next.players = view.players.clone();
        }
        Status::StartRound => {
            next.status_msg = Some("Round started".to_owned());
            next.current_player_id = current;
            next.move_history = view.move_history.clone();
        }
        Status::StartTurn => {
            next.status_msg = Some(match &current {
                Some(player) => format!("{}'s turn", player),
                None => "Turn started".to_owned(),
            });
            next.current_player_id = current;
        }
        Status::AwaitPlayerAction => {
            next.current_player_id = current;
            if next.is_current_player() {
                next.status_msg = Some("Make your move".to_owned());
            } else {
                next.status_msg = Some(format!(
                    "Awaiting {}'s move",
                    next.current_player_id.as_deref().unwrap_or("the next player")
                ));
            }
        }
        Status::EndTurn => {
            next.status_msg = Some(match &current {
                Some(player) => format!("{} ended their turn", player),
                None => "Turn ended".to_owned(),
            });
            next.players = view.players.clone();
            next.move_history = view.move_history.clone();
        }
        Status::EndRound | Status::EndMatch => {
            next.status_msg = Some(
                if *status == Status::EndRound {
                    "Round ended"
                } else {
                    "Match ended"
                }
                .to_owned(),
            );
            next.players = view.players.clone();
            next.move_history = view.move_history.clone();
            next.current_player_id = current;
        }
        Status::UpdatePoints => {
            next.status_msg = Some("Points updated".to_owned());
            next.players = view.players.clone();
            next.current_player_id = current;
            next.my_cards = Some(Vec::new());
        }
        Status::EndGame => {
            next.status_msg = Some("Game over".to_owned());
            next.players = view.players.clone();
        }
        Status::Unrecognized(_) => return next,
    }
    next.awaiting_move = *status == Status::AwaitPlayerAction && next.is_current_player();
    next
}

/// Turns inbound frames into transitions for one game.
pub struct Reducer {
    game: GameType,
    context: GameContext,
}

impl Reducer {
    pub fn new(game: GameType, context: GameContext) -> Self {
        Reducer { game, context }
    }

    /// Transitions for one inbound frame, in the order they must be applied. Decode failures
    /// become a status notice; unknown message types and statuses produce nothing.
    pub fn reduce(&self, inbound: &Inbound) -> Vec<Transition> {
        match inbound {
            Ok(message) => self.reduce_message(message),
            Err(e) => {
                warn!("Could not decode server message: {}", e);
                vec![Transition::Notice(e.to_string())]
            }
        }
    }

    fn reduce_message(&self, message: &ServerMessage) -> Vec<Transition> {
        match message {
            ServerMessage::Error { error } => {
                debug!("Server error: {}", error);
                vec![Transition::Notice(error.clone())]
            }
            ServerMessage::PlayerJoined {
                room_id,
                player_ids,
            } => {
                self.context.set_room(room_id.clone());
                vec![Transition::RoomJoined {
                    room_id: room_id.clone(),
                    player_ids: player_ids.clone(),
                }]
            }
            ServerMessage::GameState {
                shared_view,
                private_view,
            } => self.reduce_game_state(shared_view.as_ref(), private_view.as_ref()),
            ServerMessage::Unrecognized { message_type } => {
                warn!("Ignoring message of unrecognized type {}", message_type);
                vec![]
            }
        }
    }

    fn reduce_game_state(
        &self,
        shared_view: Option<&SharedView>,
        private_view: Option<&PrivateView>,
    ) -> Vec<Transition> {
        let mut transitions = vec![];
        match self.game {
            GameType::ChinesePoker => {
                if let Some(view) = shared_view {
                    match &view.status {
                        Some(Status::Unrecognized(status)) => {
                            warn!("Ignoring unrecognized status {}", status)
                        }
                        Some(status) => transitions.push(Transition::Status {
                            status: status.clone(),
                            view: view.clone(),
                        }),
                        None => warn!("Ignoring shared view without a status"),
                    }
                }
            }
            GameType::RockPaperScissors => {
                if let Some(view) = shared_view {
                    transitions.push(Transition::RpsView(view.clone()));
                }
                if let Some(selection) = private_view.and_then(|view| view.selection) {
                    transitions.push(Transition::RpsSelection(selection));
                }
            }
            GameType::TicTacToe => {
                if let Some(view) = shared_view {
                    transitions.push(Transition::TicTacToeView(view.clone()));
                }
            }
        }
        // A private hand always replaces the previous one, whatever the shared view says
        if let Some(cards) = private_view.and_then(|view| view.cards.clone()) {
            transitions.push(Transition::ReplaceCards(cards));
        }
        transitions
    }
}
