use std::io::{self, BufRead, Write};

use clap::Parser;
use common::{error::Result, utility::create_shutdown_channel, websocket::SessionChannel};
use game_client::{
    config::{Args, ClientConfig},
    identity::{FileStore, IdentityProvider},
    render::ConsoleRenderer,
    session::Session,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tracing::{error, info};

const HELP: &str =
    "Commands: login <id> | logout | join [room] | play <index>... | rock | paper | scissors | cell <0-8> | quit";

#[tokio::main]
async fn main() {
    let config = ClientConfig::from(Args::parse());
    tracing_subscriber::fmt()
        .with_line_number(true)
        .with_file(true)
        .with_max_level(config.log_level)
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(config).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn prompt_player_id() -> Option<String> {
    print!("Player id: ");
    io::stdout().flush().ok()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer).ok()?;
    Some(answer)
}

async fn run(config: ClientConfig) -> Result<()> {
    let mut identity = IdentityProvider::new(FileStore::open(&config.identity_file)?);
    match (&config.player, config.agent) {
        (Some(player_id), _) => {
            identity.login(player_id)?;
        }
        (None, Some(_)) if identity.player_id().is_none() => {
            identity.guest()?;
        }
        (None, Some(_)) => {}
        (None, None) => {
            if identity.resolve(prompt_player_id)?.is_none() {
                info!("Not logged in, use `login <id>` before joining");
            }
        }
    }

    let channel = SessionChannel::connect(&config.endpoint.url()).await?;
    let inbound = channel.subscribe_channel();

    let mut session = Session::new(config.game, channel, identity).with_room(config.room.clone());
    if let Some(kind) = config.agent {
        info!("Playing unattended with {:?}", kind);
        session = session.with_agent(kind.build());
    }
    session.subscribe(ConsoleRenderer::stdout());

    let (line_sender, lines) = mpsc::channel::<String>(16);
    if config.agent.is_some() {
        // Agents seat themselves; the console stays available for quit
        let _ = line_sender.send("join".to_owned()).await;
    } else {
        println!("{}", HELP);
    }
    tokio::spawn(async move {
        let mut stdin = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = stdin.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            if line_sender.send(line).await.is_err() {
                break;
            }
        }
    });

    let shutdown_receiver = create_shutdown_channel().await;
    session.run(inbound, lines, shutdown_receiver).await;
    Ok(())
}
