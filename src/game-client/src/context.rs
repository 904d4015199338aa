use std::sync::{Arc, PoisonError, RwLock};

use common::{
    error::{ClientError, Result},
    model::messages::RoomId,
};
use tracing::debug;

/// Room the client is currently seated in, shared between the reducer (which learns it) and the
/// dispatcher (which needs it for every move).
#[derive(Debug, Clone, Default)]
pub struct GameContext {
    room_id: Arc<RwLock<Option<RoomId>>>,
}

impl GameContext {
    pub fn room_id(&self) -> Option<RoomId> {
        self.room_id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn require_room(&self) -> Result<RoomId> {
        self.room_id().ok_or(ClientError::NotInRoom)
    }

    pub fn set_room(&self, room_id: RoomId) {
        let mut current = self.room_id.write().unwrap_or_else(PoisonError::into_inner);
        if current.as_ref() != Some(&room_id) {
            debug!("Entered room {}", room_id);
        }
        *current = Some(room_id);
    }

    /// Forget the room, e.g. when a new join is requested.
    pub fn clear(&self) {
        *self.room_id.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
