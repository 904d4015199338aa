use std::{fs, time::Duration};

use common::{
    model::game::{GameType, Selection},
    test::{init_logging, MockServer},
    websocket::{EnvelopeSink, SessionChannel},
};
use serde::Deserialize;
use serde_json::Value;
use tokio::time::{sleep, timeout};
use tracing::info;

use crate::{
    identity::{IdentityProvider, MemoryStore},
    session::Session,
    strategy::Strategy,
};

/// Expected values for a subset of the local state. Missing fields are not checked.
#[derive(Deserialize, Debug)]
struct StateCheck {
    player_id: Option<String>,
    room_id: Option<String>,
    current_player_id: Option<String>,
    // Number of cards in hand
    my_cards: Option<usize>,
    my_selection: Option<Selection>,
    awaiting_move: Option<bool>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Event {
    // Console input from the player
    Command { line: String },
    // The client must send exactly this
    ServerReceive { request: Value },
    ServerPush { message: Value },
    ServerPushRaw { text: String },
    ExpectStatus { text: String },
    ExpectStatusPrefix { prefix: String },
    ExpectState(StateCheck),
    ExpectSilence,
    Comment { text: String },
}

/// Scripted conversation between one client session and a stand-in server, loaded from JSON.
#[derive(Deserialize)]
pub struct TestCase {
    sequence: Vec<Event>,
}

impl TestCase {
    pub fn load(file_path: String, replacements: Vec<(impl ToString, impl ToString)>) -> Self {
        let mut text = fs::read_to_string(file_path).expect("Unable to read file");
        for (from, to) in replacements {
            let from = &format!("${{{}}}", from.to_string());
            text = text.replace(from, &to.to_string());
        }
        serde_json::from_str(&text).expect("Could not parse test case")
    }

    pub async fn run(&self, game: GameType, agent: Option<Box<dyn Strategy>>) {
        init_logging();
        let timeout_len = Duration::from_millis(500);
        let server = MockServer::bind().await;
        let url = server.url();
        let (channel, mut connection) = tokio::join!(SessionChannel::connect(&url), server.accept());
        let channel = channel.expect("Failed to connect to mock server");
        let mut inbound = channel.subscribe_channel();

        let mut session = Session::new(game, channel, IdentityProvider::new(MemoryStore::default()));
        if let Some(agent) = agent {
            session = session.with_agent(agent);
        }

        for event in self.sequence.iter() {
            match event {
                Event::Command { line } => {
                    session.handle_line(line);
                }
                Event::ServerReceive { request } => connection.expect_json(request).await,
                Event::ServerPush { message } => {
                    connection.push_json(message).await;
                    let frame = timeout(timeout_len, inbound.recv())
                        .await
                        .unwrap_or_else(|e| panic!("Timeout ({:?}) waiting for {}", e, message))
                        .expect("Inbound channel closed");
                    session.handle_inbound(frame);
                }
                Event::ServerPushRaw { text } => {
                    connection.push(text).await;
                    let frame = timeout(timeout_len, inbound.recv())
                        .await
                        .unwrap_or_else(|e| panic!("Timeout ({:?}) waiting for {}", e, text))
                        .expect("Inbound channel closed");
                    session.handle_inbound(frame);
                }
                Event::ExpectStatus { text } => {
                    assert_eq!(session.state().status_msg.as_deref(), Some(text.as_str()));
                }
                Event::ExpectStatusPrefix { prefix } => {
                    let status = session.state().status_msg.clone().unwrap_or_default();
                    assert!(
                        status.starts_with(prefix.as_str()),
                        "status {:?} should start with {:?}",
                        status,
                        prefix
                    );
                }
                Event::ExpectState(check) => Self::check_state(&session, check),
                Event::ExpectSilence => {
                    sleep(Duration::from_millis(50)).await;
                    connection.expect_silence();
                }
                Event::Comment { text } => {
                    info!("Comment: {:}", text)
                }
            }
        }
        connection.close().await;
    }

    fn check_state<S: EnvelopeSink>(session: &Session<S>, check: &StateCheck) {
        let state = session.state();
        if let Some(player_id) = &check.player_id {
            assert_eq!(state.player_id.as_ref(), Some(player_id));
        }
        if let Some(room_id) = &check.room_id {
            assert_eq!(state.room_id.as_ref().map(|room| room.0.as_str()), Some(room_id.as_str()));
            assert_eq!(session.context().room_id(), state.room_id);
        }
        if let Some(current) = &check.current_player_id {
            assert_eq!(state.current_player_id.as_ref(), Some(current));
        }
        if let Some(count) = check.my_cards {
            assert_eq!(state.my_cards.as_ref().map(Vec::len), Some(count));
        }
        if let Some(selection) = check.my_selection {
            assert_eq!(state.my_selection, Some(selection));
        }
        if let Some(awaiting) = check.awaiting_move {
            assert_eq!(state.awaiting_move, awaiting);
        }
    }
}
