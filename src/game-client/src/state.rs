use common::model::{
    game::{Card, Selection},
    messages::{Player, PlayerId, RoomId},
};
use serde_json::Value;

/// Everything the client knows about its session. `None` means "not known yet", which is not
/// the same as empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalState {
    pub player_id: Option<PlayerId>,
    pub room_id: Option<RoomId>,
    pub status_msg: Option<String>,
    // Player ids from the last room update
    pub roster: Option<Vec<PlayerId>>,
    pub players: Option<Vec<Player>>,
    pub current_player_id: Option<PlayerId>,
    pub my_cards: Option<Vec<Card>>,
    pub move_history: Option<Vec<Value>>,
    pub my_selection: Option<Selection>,
    // The last view asked the local player to act and no move has been sent since
    pub awaiting_move: bool,
}

impl LocalState {
    pub fn is_current_player(&self) -> bool {
        matches!(
            (&self.player_id, &self.current_player_id),
            (Some(me), Some(current)) if me == current
        )
    }
}
