//! Interpreting the difference between two consecutive board observations.

use crate::state::{BoardState, InvalidLength};
use gridsight_core::Cell;
use serde::{Deserialize, Serialize};

/// One cell whose value differs between two observations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellChange {
    pub index: usize,
    pub before: Cell,
    pub after: Cell,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reconciliation {
    NoChange,
    /// A piece appeared on a previously empty cell.
    SinglePlacement { cell: usize },
    /// A piece slid from one cell to another. `from` is where it sits now and
    /// `to` is the cell it left, so moving `from -> to` undoes the slide.
    CorrectiveMove { from: usize, to: usize },
    /// Anything else; the caller must not act on it.
    Ambiguous { changes: usize },
}

/// Cells that differ between `prev` and `curr`, in index order.
pub fn diff_cells(prev: &BoardState, curr: &BoardState) -> Vec<CellChange> {
    prev.cells()
        .iter()
        .zip(curr.cells())
        .enumerate()
        .filter(|(_, (b, a))| b != a)
        .map(|(index, (&before, &after))| CellChange {
            index,
            before,
            after,
        })
        .collect()
}

/// Classify the change between two nine-cell observations.
pub fn reconcile(prev: &[Cell], curr: &[Cell]) -> Result<Reconciliation, InvalidLength> {
    let prev = BoardState::try_from(prev)?;
    let curr = BoardState::try_from(curr)?;
    Ok(reconcile_states(&prev, &curr))
}

pub(crate) fn reconcile_states(prev: &BoardState, curr: &BoardState) -> Reconciliation {
    let changes = diff_cells(prev, curr);
    match changes.as_slice() {
        [] => Reconciliation::NoChange,
        [c] if c.before.is_empty() => Reconciliation::SinglePlacement { cell: c.index },
        [a, b] => match (vacated_and_filled(a, b), vacated_and_filled(b, a)) {
            (Some(m), _) | (_, Some(m)) => m,
            _ => Reconciliation::Ambiguous { changes: 2 },
        },
        _ => Reconciliation::Ambiguous {
            changes: changes.len(),
        },
    }
}

fn vacated_and_filled(left: &CellChange, landed: &CellChange) -> Option<Reconciliation> {
    let piece = left.before;
    let is_slide = !piece.is_empty()
        && left.after.is_empty()
        && landed.before.is_empty()
        && landed.after == piece;
    is_slide.then_some(Reconciliation::CorrectiveMove {
        from: landed.index,
        to: left.index,
    })
}
