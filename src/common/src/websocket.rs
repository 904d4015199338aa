use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
};

use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::{
    error::{ClientError, Result},
    model::messages::{Envelope, ServerMessage},
};

/// One decoded inbound frame, or the reason it could not be decoded.
pub type Inbound = Result<ServerMessage>;

type Subscriber = Box<dyn Fn(&Inbound) + Send + Sync>;

// Frames kept for a subscriber that has not registered yet; older ones are dropped first
const BACKLOG_LIMIT: usize = 256;

/// Anything an [`Envelope`] can be written to.
pub trait EnvelopeSink {
    fn send(&self, envelope: &Envelope) -> Result<()>;
}

#[derive(Default)]
struct Subscribers {
    handlers: Vec<Subscriber>,
    // Frames that arrived before anyone subscribed
    backlog: VecDeque<Inbound>,
}

impl Subscribers {
    fn deliver(&mut self, inbound: Inbound) {
        if self.handlers.is_empty() {
            if self.backlog.len() == BACKLOG_LIMIT {
                warn!("No subscriber yet, dropping oldest buffered frame");
                self.backlog.pop_front();
            }
            self.backlog.push_back(inbound);
            return;
        }
        for handler in self.handlers.iter() {
            handler(&inbound);
        }
    }
}

/// The single connection to the game server.
///
/// Inbound frames are decoded on a reader task and handed to every subscriber in arrival order.
/// Outbound envelopes are serialized and queued for a writer task; once the connection is gone
/// they are dropped with a warning. There is no retry or reconnect.
pub struct SessionChannel {
    url: String,
    to_socket: mpsc::UnboundedSender<String>,
    subscribers: Arc<Mutex<Subscribers>>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl SessionChannel {
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, _) = connect_async(url)
            .await
            .map_err(|e| ClientError::Connection(format!("{}: {}", url, e)))?;
        info!("Connected to server {}", url);

        let (mut ws_sender, mut ws_receiver) = stream.split();
        let (to_socket, mut from_session) = mpsc::unbounded_channel::<String>();
        let subscribers: Arc<Mutex<Subscribers>> = Arc::default();

        let writer = tokio::spawn(async move {
            while let Some(body) = from_session.recv().await {
                if let Err(e) = ws_sender.send(Message::Text(body)).await {
                    warn!("Connection is closed, dropping outbound messages: {}", e);
                    return;
                }
            }
            // Session dropped its handle
            let _ = ws_sender.close().await;
        });

        let reader_subscribers = subscribers.clone();
        let reader = tokio::spawn(async move {
            while let Some(frame) = ws_receiver.next().await {
                let inbound = match frame {
                    Ok(Message::Text(text)) => {
                        debug!("msg: {}", text);
                        ServerMessage::decode(&text)
                    }
                    Ok(Message::Binary(_)) => {
                        Err(ClientError::Protocol("received a non-text frame".into()))
                    }
                    Ok(Message::Close(frame)) => {
                        info!("Server closed the connection: {:?}", frame);
                        break;
                    }
                    Ok(_) => continue,
                    Err(e) => {
                        warn!("Connection error: {}", e);
                        break;
                    }
                };
                reader_subscribers
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .deliver(inbound);
            }
            info!("Stopped reading from server");
            // Dropping the handlers closes any forwarding channels
            reader_subscribers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .handlers
                .clear();
        });

        Ok(SessionChannel {
            url: url.to_owned(),
            to_socket,
            subscribers,
            reader,
            writer,
        })
    }

    /// Register a handler for every inbound frame. Handlers run on the reader task, one frame at
    /// a time, in registration order. The first subscriber also receives any frames that arrived
    /// before it registered.
    pub fn subscribe<F>(&self, handler: F)
    where
        F: Fn(&Inbound) + Send + Sync + 'static,
    {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if subscribers.handlers.is_empty() {
            for inbound in subscribers.backlog.drain(..) {
                handler(&inbound);
            }
        }
        subscribers.handlers.push(Box::new(handler));
    }

    /// Subscribe by forwarding every frame into a channel.
    pub fn subscribe_channel(&self) -> mpsc::UnboundedReceiver<Inbound> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribe(move |inbound| {
            // Receiver gone means the consumer stopped listening
            let _ = sender.send(inbound.clone());
        });
        receiver
    }

    /// Serialize and queue any message for the server.
    pub fn send_json<T: Serialize>(&self, body: &T) -> Result<()> {
        let text = serde_json::to_string(body)?;
        debug!("send: {}", text);
        if self.to_socket.send(text).is_err() {
            warn!("Connection to {} is closed, message dropped", self.url);
        }
        Ok(())
    }

    pub async fn close(self) {
        let SessionChannel {
            to_socket,
            reader,
            writer,
            ..
        } = self;
        drop(to_socket);
        let _ = writer.await;
        reader.abort();
    }
}

impl EnvelopeSink for SessionChannel {
    fn send(&self, envelope: &Envelope) -> Result<()> {
        self.send_json(envelope)
    }
}
