use common::{
    error::{ClientError, Result},
    model::{
        game::{GameType, Move},
        messages::RoomId,
    },
    websocket::{EnvelopeSink, Inbound},
};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::{
    command::Command,
    context::GameContext,
    dispatcher::{ActionDispatcher, JoinTarget},
    identity::IdentityProvider,
    reducer::{Reducer, Transition},
    state::LocalState,
    store::{RenderSink, StateStore},
    strategy::Strategy,
};

/// One player's connection to one game: ties the reducer, store and dispatcher together and
/// handles inbound messages and local commands strictly one at a time.
pub struct Session<S: EnvelopeSink> {
    game: GameType,
    store: StateStore,
    reducer: Reducer,
    dispatcher: ActionDispatcher<S>,
    identity: IdentityProvider,
    context: GameContext,
    agent: Option<Box<dyn Strategy>>,
    room: Option<RoomId>,
}

impl<S: EnvelopeSink> Session<S> {
    pub fn new(game: GameType, sink: S, identity: IdentityProvider) -> Self {
        let context = GameContext::default();
        let mut store = StateStore::new();
        if let Some(player_id) = identity.player_id() {
            store.dispatch(&[Transition::Login(player_id)]);
        }
        Session {
            game,
            store,
            reducer: Reducer::new(game, context.clone()),
            dispatcher: ActionDispatcher::new(sink, context.clone()),
            identity,
            context,
            agent: None,
            room: None,
        }
    }

    /// Play automatically whenever the server waits on this player.
    pub fn with_agent(mut self, strategy: Box<dyn Strategy>) -> Self {
        self.agent = Some(strategy);
        self
    }

    /// Join this room instead of asking for any room of the game type.
    pub fn with_room(mut self, room: Option<RoomId>) -> Self {
        self.room = room;
        self
    }

    pub fn subscribe(&mut self, sink: impl RenderSink + Send + 'static) {
        self.store.subscribe(sink);
    }

    pub fn state(&self) -> &LocalState {
        self.store.state()
    }

    pub fn context(&self) -> &GameContext {
        &self.context
    }

    pub fn sink(&self) -> &S {
        self.dispatcher.sink()
    }

    pub fn handle_inbound(&mut self, inbound: Inbound) {
        let transitions = self.reducer.reduce(&inbound);
        self.store.dispatch(&transitions);
        self.autoplay();
    }

    /// Parse and run one console line. Returns false once the session should end.
    pub fn handle_line(&mut self, line: &str) -> bool {
        match line.parse::<Command>() {
            Ok(command) => self.handle_command(command),
            Err(e) => {
                self.notify(&e);
                true
            }
        }
    }

    /// Returns false once the session should end.
    pub fn handle_command(&mut self, command: Command) -> bool {
        debug!("command: {:?}", command);
        match self.execute(command) {
            Ok(keep_going) => keep_going,
            Err(e) => {
                self.notify(&e);
                true
            }
        }
    }

    fn execute(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Login(player_id) => {
                let player_id = self.identity.login(&player_id)?;
                self.store.dispatch(&[Transition::Login(player_id)]);
            }
            Command::Logout => {
                self.identity.logout()?;
                self.store.dispatch(&[Transition::Logout]);
            }
            Command::Join(room) => {
                let target = match room.or_else(|| self.room.clone()) {
                    Some(room) => JoinTarget::Room(room),
                    None => JoinTarget::ByType(self.game),
                };
                self.dispatcher.join_game(&self.identity, &target)?;
                self.store
                    .dispatch(&[Transition::Notice(format!("Joining {}...", self.game))]);
            }
            Command::Play(indices) => {
                let hand = self.store.state().my_cards.clone().unwrap_or_default();
                self.send_move(Move::from_hand(&hand, &indices)?)?;
            }
            Command::Select(selection) => self.send_move(Move::Selection { selection })?,
            Command::Cell(cell) => self.send_move(Move::cell(cell)?)?,
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    fn send_move(&mut self, value: Move) -> Result<()> {
        if !value.fits(self.game) {
            return Err(ClientError::InvalidCommand(format!(
                "that move is not part of {}",
                self.game
            )));
        }
        self.dispatcher.make_move(&self.identity, value.clone())?;
        self.store.dispatch(&[Transition::MoveSent(value)]);
        Ok(())
    }

    fn autoplay(&mut self) {
        let value = match &self.agent {
            Some(strategy) if self.store.state().awaiting_move => {
                strategy.make_move(self.game, self.store.state())
            }
            _ => return,
        };
        let Some(value) = value else {
            warn!("Agent has no move to make");
            return;
        };
        info!("Agent plays {:?}", value);
        if let Err(e) = self.send_move(value) {
            self.notify(&e);
        }
    }

    fn notify(&mut self, error: &ClientError) {
        warn!("{}", error);
        self.store.dispatch(&[Transition::Notice(error.to_string())]);
    }

    /// Process inbound frames and console lines until the server goes away, the player quits or
    /// shutdown is signalled.
    pub async fn run(
        mut self,
        mut inbound: mpsc::UnboundedReceiver<Inbound>,
        mut lines: mpsc::Receiver<String>,
        mut shutdown_receiver: broadcast::Receiver<()>,
    ) {
        info!("Session started for {}", self.game);
        let mut console_open = true;
        loop {
            tokio::select! {
                message = inbound.recv() => {
                    let Some(message) = message else {
                        info!("Server connection closed");
                        break;
                    };
                    self.handle_inbound(message);
                }
                line = lines.recv(), if console_open => {
                    let Some(line) = line else {
                        // End of input quits, unless an agent is playing
                        if self.agent.is_none() {
                            break;
                        }
                        console_open = false;
                        continue;
                    };
                    if !self.handle_line(&line) {
                        break;
                    }
                }
                _ = shutdown_receiver.recv() => {
                    break;
                }
            }
        }
        info!("Session ended");
    }
}
