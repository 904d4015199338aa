use common::{
    error::Result,
    model::{
        game::{GameType, Move},
        messages::{ClientRequest, Envelope, RoomId},
    },
    websocket::EnvelopeSink,
};
use tracing::info;

use crate::{context::GameContext, identity::IdentityProvider};

#[derive(Debug, Clone, PartialEq)]
pub enum JoinTarget {
    ByType(GameType),
    Room(RoomId),
}

/// Builds outbound envelopes from local intents. Never waits for a reply: the room id comes
/// back later through the reducer.
pub struct ActionDispatcher<S: EnvelopeSink> {
    sink: S,
    context: GameContext,
}

impl<S: EnvelopeSink> ActionDispatcher<S> {
    pub fn new(sink: S, context: GameContext) -> Self {
        ActionDispatcher { sink, context }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Ask to be seated. Any previous room is forgotten until the server confirms the new one.
    pub fn join_game(&self, identity: &IdentityProvider, target: &JoinTarget) -> Result<Envelope> {
        let player_id = identity.require()?;
        let request = match target {
            JoinTarget::ByType(game_type) => ClientRequest::JoinGameByType {
                game_type: *game_type,
            },
            JoinTarget::Room(room_id) => ClientRequest::JoinGameById {
                room_id: room_id.clone(),
            },
        };
        self.context.clear();
        let envelope = Envelope { player_id, request };
        self.sink.send(&envelope)?;
        info!("Requested to join {:?}", target);
        Ok(envelope)
    }

    /// Send a move for the current room. Fails with `NotInRoom` before the server has confirmed
    /// a room.
    pub fn make_move(&self, identity: &IdentityProvider, value: Move) -> Result<Envelope> {
        let player_id = identity.require()?;
        let room_id = self.context.require_room()?;
        let envelope = Envelope {
            player_id,
            request: ClientRequest::MakeMove { room_id, value },
        };
        self.sink.send(&envelope)?;
        Ok(envelope)
    }
}
