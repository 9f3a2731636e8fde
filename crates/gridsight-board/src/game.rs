//! Turn-taking on top of board observations.
//!
//! [`GameMachine::step`] is a pure transition function: the caller owns the
//! [`Phase`], feeds it every settled board observation and carries out the
//! returned [`Command`]. Move choice for the robot is left to the caller.

use crate::reconcile::{reconcile_states, Reconciliation};
use crate::state::BoardState;
use gridsight_core::Cell;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Suggested pause between a change being seen and it being trusted, so a
/// hand still over the board is not read as a move.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(1500);

/// Row, column and diagonal index triples.
pub const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win(Cell),
    Draw,
}

/// Finished-game result, or `None` while the game is still open.
pub fn outcome(board: &BoardState) -> Option<Outcome> {
    for [a, b, c] in WIN_LINES {
        let v = board[a];
        if !v.is_empty() && v == board[b] && v == board[c] {
            return Some(Outcome::Win(v));
        }
    }
    if empty_cells(board).is_empty() {
        Some(Outcome::Draw)
    } else {
        None
    }
}

pub fn empty_cells(board: &BoardState) -> Vec<usize> {
    board
        .cells()
        .iter()
        .enumerate()
        .filter_map(|(i, c)| c.is_empty().then_some(i))
        .collect()
}

pub fn piece_count(board: &BoardState, color: Cell) -> usize {
    board.count(color)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Human,
    Robot,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Human => Side::Robot,
            Side::Robot => Side::Human,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    pub human: Cell,
    pub robot: Cell,
    pub first: Side,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            human: Cell::Black,
            robot: Cell::White,
            first: Side::Human,
        }
    }
}

impl GameRules {
    pub fn color(&self, side: Side) -> Cell {
        match side {
            Side::Human => self.human,
            Side::Robot => self.robot,
        }
    }

    /// Side to move on `board`, from the piece counts. `None` if the counts
    /// cannot arise from alternating play.
    pub fn side_to_move(&self, board: &BoardState) -> Option<Side> {
        let first = board.count(self.color(self.first));
        let second = board.count(self.color(self.first.other()));
        match first.checked_sub(second)? {
            0 => Some(self.first),
            1 => Some(self.first.other()),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    /// No trusted board yet.
    AwaitingBoard,
    ToMove {
        side: Side,
        board: BoardState,
    },
    /// A piece was slid; waiting for the robot to put it back.
    Correcting {
        resume: Side,
        expected: BoardState,
        from: usize,
        to: usize,
    },
    Finished {
        board: BoardState,
        outcome: Outcome,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    BoardObserved(BoardState),
    Reset,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Robot's turn: pick a cell for `color` on `board` and place a piece there.
    ChooseMove { board: BoardState, color: Cell },
    MovePiece { from: usize, to: usize },
    /// The observation cannot be interpreted; ask the human to fix the board.
    Recheck { changes: usize },
    Announce(Outcome),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub phase: Phase,
    pub command: Option<Command>,
}

impl Transition {
    fn stay(phase: &Phase) -> Self {
        Self {
            phase: phase.clone(),
            command: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GameMachine {
    pub rules: GameRules,
}

impl GameMachine {
    pub fn new(rules: GameRules) -> Self {
        Self { rules }
    }

    pub fn step(&self, phase: &Phase, event: Event) -> Transition {
        let board = match event {
            Event::Reset => {
                return Transition {
                    phase: Phase::AwaitingBoard,
                    command: None,
                }
            }
            Event::BoardObserved(board) => board,
        };

        match phase {
            Phase::AwaitingBoard => match self.rules.side_to_move(&board) {
                Some(side) => self.advance(side, board),
                None => {
                    log::warn!("piece counts on {board} do not fit alternating play");
                    Transition {
                        phase: Phase::AwaitingBoard,
                        command: Some(Command::Recheck { changes: 0 }),
                    }
                }
            },
            Phase::ToMove { side, board: prev } => match reconcile_states(prev, &board) {
                Reconciliation::NoChange => Transition::stay(phase),
                Reconciliation::SinglePlacement { cell }
                    if board[cell] == self.rules.color(*side) =>
                {
                    self.advance(side.other(), board)
                }
                Reconciliation::SinglePlacement { cell } => {
                    log::warn!("cell {cell} got {} but {:?} is to move", board[cell], side);
                    Transition {
                        phase: phase.clone(),
                        command: Some(Command::Recheck { changes: 1 }),
                    }
                }
                Reconciliation::CorrectiveMove { from, to } => Transition {
                    phase: Phase::Correcting {
                        resume: *side,
                        expected: *prev,
                        from,
                        to,
                    },
                    command: Some(Command::MovePiece { from, to }),
                },
                Reconciliation::Ambiguous { changes } => Transition {
                    phase: phase.clone(),
                    command: Some(Command::Recheck { changes }),
                },
            },
            Phase::Correcting {
                resume, expected, ..
            } => {
                if board == *expected {
                    self.resume(*resume, board)
                } else {
                    Transition::stay(phase)
                }
            }
            Phase::Finished { .. } => Transition::stay(phase),
        }
    }

    /// Enter `ToMove { side, board }`, or `Finished` if the board is decided.
    fn advance(&self, side: Side, board: BoardState) -> Transition {
        if let Some(result) = outcome(&board) {
            return Transition {
                phase: Phase::Finished {
                    board,
                    outcome: result,
                },
                command: Some(Command::Announce(result)),
            };
        }
        self.resume(side, board)
    }

    fn resume(&self, side: Side, board: BoardState) -> Transition {
        let command = (side == Side::Robot).then_some(Command::ChooseMove {
            board,
            color: self.rules.robot,
        });
        Transition {
            phase: Phase::ToMove { side, board },
            command,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(s: &str) -> BoardState {
        s.parse().unwrap()
    }

    fn observe(m: &GameMachine, phase: &Phase, s: &str) -> Transition {
        m.step(phase, Event::BoardObserved(board(s)))
    }

    #[test]
    fn outcome_detects_lines_and_draws() {
        assert_eq!(outcome(&board("BBB.WW...")), Some(Outcome::Win(Cell::Black)));
        assert_eq!(outcome(&board("W.B.WB..W")), Some(Outcome::Win(Cell::White)));
        assert_eq!(outcome(&board("BWBBWWWBB")), Some(Outcome::Draw));
        assert_eq!(outcome(&board("B...W....")), None);
        assert_eq!(empty_cells(&board("BWBBWWWB.")), vec![8]);
        assert_eq!(piece_count(&board("BWBBWWWB."), Cell::White), 4);
    }

    #[test]
    fn side_to_move_follows_counts() {
        let rules = GameRules::default();
        assert_eq!(rules.side_to_move(&BoardState::EMPTY), Some(Side::Human));
        assert_eq!(rules.side_to_move(&board("B........")), Some(Side::Robot));
        assert_eq!(rules.side_to_move(&board("B...W....")), Some(Side::Human));
        assert_eq!(rules.side_to_move(&board("BB.......")), None);
        assert_eq!(rules.side_to_move(&board("W........")), None);
    }

    #[test]
    fn human_then_robot_turns() {
        let m = GameMachine::default();
        let t = observe(&m, &Phase::AwaitingBoard, ".........");
        assert_eq!(
            t.phase,
            Phase::ToMove {
                side: Side::Human,
                board: BoardState::EMPTY
            }
        );
        assert_eq!(t.command, None);

        let t = observe(&m, &t.phase, "....B....");
        assert_eq!(
            t.command,
            Some(Command::ChooseMove {
                board: board("....B...."),
                color: Cell::White
            })
        );

        let t = observe(&m, &t.phase, "W...B....");
        assert_eq!(
            t.phase,
            Phase::ToMove {
                side: Side::Human,
                board: board("W...B....")
            }
        );
    }

    #[test]
    fn wrong_colour_asks_for_recheck() {
        let m = GameMachine::default();
        let start = Phase::ToMove {
            side: Side::Human,
            board: BoardState::EMPTY,
        };
        let t = observe(&m, &start, "....W....");
        assert_eq!(t.phase, start);
        assert_eq!(t.command, Some(Command::Recheck { changes: 1 }));
    }

    #[test]
    fn slide_is_corrected_then_play_resumes() {
        let m = GameMachine::default();
        let start = Phase::ToMove {
            side: Side::Human,
            board: board("....W...."),
        };
        let t = observe(&m, &start, "........W");
        assert_eq!(t.command, Some(Command::MovePiece { from: 8, to: 4 }));

        let still_off = observe(&m, &t.phase, "........W");
        assert_eq!(still_off.phase, t.phase);
        assert_eq!(still_off.command, None);

        let back = observe(&m, &t.phase, "....W....");
        assert_eq!(back.phase, start);
    }

    #[test]
    fn winning_placement_finishes_the_game() {
        let m = GameMachine::default();
        let start = Phase::ToMove {
            side: Side::Human,
            board: board("BB.WW...."),
        };
        let t = observe(&m, &start, "BBBWW....");
        assert_eq!(t.command, Some(Command::Announce(Outcome::Win(Cell::Black))));
        assert!(matches!(t.phase, Phase::Finished { .. }));
        assert_eq!(observe(&m, &t.phase, ".........").phase, t.phase);
        assert_eq!(m.step(&t.phase, Event::Reset).phase, Phase::AwaitingBoard);
    }

    #[test]
    fn ambiguous_change_keeps_phase() {
        let m = GameMachine::default();
        let start = Phase::ToMove {
            side: Side::Human,
            board: BoardState::EMPTY,
        };
        let t = observe(&m, &start, "BB.......");
        assert_eq!(t.phase, start);
        assert_eq!(t.command, Some(Command::Recheck { changes: 2 }));
    }
}
