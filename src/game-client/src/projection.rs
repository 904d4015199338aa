//! Seat rotation: turns the server's absolute player order into a layout where the local player
//! always sits in slot 0 at the bottom of the table and opponents follow clockwise.

use common::{
    error::{ClientError, Result},
    model::messages::Player,
};

use crate::state::LocalState;

/// Fixed screen positions around the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Bottom,
    Left,
    Top,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Seat {
    pub slot: usize,
    pub player_id: String,
    pub num_points: i64,
    // Face-down cards to draw; the local seat shows its real hand instead
    pub card_backs: Option<u32>,
}

impl Seat {
    pub fn label(&self) -> String {
        format!("{} - {} pts", self.player_id, self.num_points)
    }
}

/// Where the active-player marker goes, relative to the local player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveMarker {
    pub offset: usize,
    pub anchor: Option<Anchor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    // Ordered by slot
    pub seats: Vec<Seat>,
    pub active: Option<ActiveMarker>,
    pub can_move: bool,
}

pub fn seat_offset(players: &[Player], player_id: &str) -> Result<usize> {
    players
        .iter()
        .position(|player| player.player_id == player_id)
        .ok_or_else(|| ClientError::PlayerNotFound(player_id.to_owned()))
}

/// Relative slot of the player at absolute `index`, given the local player's `offset`.
pub fn seat_slot(index: usize, len: usize, offset: usize) -> usize {
    (index + len - offset) % len
}

/// Screen anchor for a relative offset. Only tables of three or four get rotated anchors; two
/// player games keep a fixed layout.
pub fn anchor(offset: usize, len: usize) -> Option<Anchor> {
    let anchors: &[Anchor] = match len {
        4 => &[Anchor::Bottom, Anchor::Left, Anchor::Top, Anchor::Right],
        3 => &[Anchor::Bottom, Anchor::Left, Anchor::Right],
        _ => return None,
    };
    anchors.get(offset).copied()
}

/// Project an absolute player list around `player_id`. `Ok(None)` when there is nothing to
/// seat yet; [`ClientError::PlayerNotFound`] when the local player is not at the table.
pub fn project(
    player_id: &str,
    players: &[Player],
    current_player_id: Option<&str>,
) -> Result<Option<TableView>> {
    if players.is_empty() {
        return Ok(None);
    }
    let len = players.len();
    let offset = seat_offset(players, player_id)?;

    let mut seats: Vec<Seat> = players
        .iter()
        .enumerate()
        .map(|(index, player)| {
            let slot = seat_slot(index, len, offset);
            Seat {
                slot,
                player_id: player.player_id.clone(),
                num_points: player.num_points,
                card_backs: (slot > 0).then_some(player.num_cards),
            }
        })
        .collect();
    seats.sort_by_key(|seat| seat.slot);

    let active = current_player_id
        .and_then(|current| seat_offset(players, current).ok())
        .map(|current| {
            let relative = (current + len - offset) % len;
            ActiveMarker {
                offset: relative,
                anchor: anchor(relative, len),
            }
        });
    let can_move = matches!(active, Some(ActiveMarker { offset: 0, .. }));

    Ok(Some(TableView {
        seats,
        active,
        can_move,
    }))
}

pub fn project_state(state: &LocalState) -> Result<Option<TableView>> {
    let Some(players) = state.players.as_deref() else {
        return Ok(None);
    };
    project(
        state.player_id.as_deref().unwrap_or_default(),
        players,
        state.current_player_id.as_deref(),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    X,
    O,
}

/// Tic-tac-toe board: the first player's cells are X, the second's O.
pub fn board(players: &[Player]) -> [Option<Mark>; 9] {
    let mut cells = [None; 9];
    for (player, mark) in players.iter().zip([Mark::X, Mark::O]) {
        for &cell in player.selections.iter().flatten() {
            if let Some(slot) = cells.get_mut(cell as usize) {
                *slot = Some(mark);
            }
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(ids: &[&str]) -> Vec<Player> {
        ids.iter()
            .map(|id| Player {
                num_cards: 13,
                ..Player::new(*id)
            })
            .collect()
    }

    #[test]
    fn slots_are_a_permutation_with_local_player_first() {
        for len in 1..=4 {
            for offset in 0..len {
                let mut slots: Vec<usize> = (0..len).map(|i| seat_slot(i, len, offset)).collect();
                assert_eq!(seat_slot(offset, len, offset), 0);
                slots.sort();
                assert_eq!(slots, (0..len).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn four_player_active_marker_on_top() {
        let players = table(&["A", "B", "C", "D"]);
        let view = project("A", &players, Some("C")).unwrap().unwrap();
        assert_eq!(
            view.active,
            Some(ActiveMarker {
                offset: 2,
                anchor: Some(Anchor::Top)
            })
        );
        assert!(!view.can_move);
        let ids: Vec<&str> = view.seats.iter().map(|seat| seat.player_id.as_str()).collect();
        assert_eq!(ids, ["A", "B", "C", "D"]);
    }

    #[test]
    fn rotation_puts_local_player_at_the_bottom() {
        let players = table(&["A", "B", "C", "D"]);
        let view = project("C", &players, Some("C")).unwrap().unwrap();
        let ids: Vec<&str> = view.seats.iter().map(|seat| seat.player_id.as_str()).collect();
        assert_eq!(ids, ["C", "D", "A", "B"]);
        assert_eq!(view.seats[0].card_backs, None);
        assert_eq!(view.seats[1].card_backs, Some(13));
        assert_eq!(
            view.active,
            Some(ActiveMarker {
                offset: 0,
                anchor: Some(Anchor::Bottom)
            })
        );
        assert!(view.can_move);

        let view = project("C", &players, Some("B")).unwrap().unwrap();
        assert_eq!(view.active.unwrap().anchor, Some(Anchor::Right));
        let view = project("C", &players, Some("D")).unwrap().unwrap();
        assert_eq!(view.active.unwrap().anchor, Some(Anchor::Left));
    }

    #[test]
    fn two_player_games_have_no_anchor() {
        let players = table(&["X", "O"]);
        let view = project("O", &players, Some("O")).unwrap().unwrap();
        assert_eq!(
            view.active,
            Some(ActiveMarker {
                offset: 0,
                anchor: None
            })
        );
        assert!(view.can_move);
        let view = project("O", &players, Some("X")).unwrap().unwrap();
        assert_eq!(view.active.unwrap().offset, 1);
        assert!(!view.can_move);
    }

    #[test]
    fn missing_local_player_degrades() {
        let players = table(&["A", "B"]);
        assert_eq!(
            project("Z", &players, None),
            Err(ClientError::PlayerNotFound("Z".into()))
        );
        assert_eq!(project("A", &[], None), Ok(None));
    }

    #[test]
    fn unknown_current_player_disables_moves() {
        let players = table(&["A", "B", "C"]);
        let view = project("A", &players, Some("Q")).unwrap().unwrap();
        assert_eq!(view.active, None);
        assert!(!view.can_move);
    }

    #[test]
    fn project_state_needs_players() {
        let state = LocalState {
            player_id: Some("A".into()),
            ..LocalState::default()
        };
        assert_eq!(project_state(&state), Ok(None));
        let state = LocalState {
            players: Some(table(&["A"])),
            ..state
        };
        let view = project_state(&state).unwrap().unwrap();
        assert_eq!(view.seats[0].label(), "A - 0 pts");
    }

    #[test]
    fn board_marks_each_player() {
        let mut x = Player::new("x");
        x.selections = Some(vec![0, 4, 8]);
        let mut o = Player::new("o");
        o.selections = Some(vec![2, 12]);
        let cells = board(&[x, o]);
        assert_eq!(cells[0], Some(Mark::X));
        assert_eq!(cells[2], Some(Mark::O));
        assert_eq!(cells[1], None);
        assert_eq!(cells.iter().flatten().count(), 4);
    }
}
