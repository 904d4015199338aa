use std::io::{self, Write};

use common::{error::ClientError, model::game::Card};
use tracing::warn;

use crate::{
    projection::{board, project_state, Anchor, Mark, TableView},
    state::LocalState,
    store::RenderSink,
};

/// Plain text renderer. Redraws the whole table on every snapshot.
pub struct ConsoleRenderer<W: Write> {
    out: W,
}

impl ConsoleRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        ConsoleRenderer { out: io::stdout() }
    }
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W) -> Self {
        ConsoleRenderer { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, state: &LocalState) -> io::Result<()> {
        writeln!(self.out, "----")?;
        if let Some(status) = &state.status_msg {
            writeln!(self.out, "{}", status)?;
        }

        match project_state(state) {
            Ok(Some(table)) => self.draw_table(&table)?,
            Ok(None) => {}
            Err(ClientError::PlayerNotFound(player_id)) => {
                // Spectating, or the local id is stale; show the raw order instead
                warn!("{} is not at this table", player_id);
                for player in state.players.iter().flatten() {
                    writeln!(self.out, "  {} - {} pts", player.player_id, player.num_points)?;
                }
            }
            Err(e) => warn!("Could not lay out table: {}", e),
        }

        if let Some(players) = state.players.as_deref() {
            if players.iter().any(|player| player.selections.is_some()) {
                self.draw_board(&board(players))?;
            }
        }

        if let Some(cards) = &state.my_cards {
            writeln!(self.out, "Hand: {}", hand(cards))?;
        }
        if let Some(selection) = state.my_selection {
            writeln!(self.out, "Selected: {}", selection)?;
        }
        self.out.flush()
    }

    fn draw_table(&mut self, table: &TableView) -> io::Result<()> {
        for seat in table.seats.iter() {
            let active = matches!(table.active, Some(marker) if marker.offset == seat.slot);
            let position = match table
                .active
                .filter(|_| active)
                .and_then(|marker| marker.anchor)
            {
                Some(anchor) => format!(" <- {}", anchor_name(anchor)),
                None if active => " <-".to_owned(),
                None => String::new(),
            };
            match seat.card_backs {
                Some(backs) => writeln!(
                    self.out,
                    "  {} [{}]{}",
                    seat.label(),
                    "#".repeat(backs as usize),
                    position
                )?,
                None => writeln!(self.out, "  {} (you){}", seat.label(), position)?,
            }
        }
        if table.can_move {
            writeln!(self.out, "Your turn")?;
        }
        Ok(())
    }

    fn draw_board(&mut self, cells: &[Option<Mark>; 9]) -> io::Result<()> {
        for row in cells.chunks(3) {
            let line: Vec<String> = row
                .iter()
                .map(|cell| match cell {
                    Some(Mark::X) => "X".to_owned(),
                    Some(Mark::O) => "O".to_owned(),
                    None => ".".to_owned(),
                })
                .collect();
            writeln!(self.out, "  {}", line.join(" "))?;
        }
        Ok(())
    }
}

fn anchor_name(anchor: Anchor) -> &'static str {
    match anchor {
        Anchor::Bottom => "bottom",
        Anchor::Left => "left",
        Anchor::Top => "top",
        Anchor::Right => "right",
    }
}

fn hand(cards: &[Card]) -> String {
    if cards.is_empty() {
        return "(empty)".to_owned();
    }
    cards
        .iter()
        .enumerate()
        .map(|(index, card)| format!("{}:{}", index, card))
        .collect::<Vec<_>>()
        .join(" ")
}

impl<W: Write> RenderSink for ConsoleRenderer<W> {
    fn render(&mut self, state: &LocalState) {
        if let Err(e) = self.draw(state) {
            warn!("Failed to render: {}", e);
        }
    }
}
