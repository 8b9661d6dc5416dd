//! Block grid with per-column gravity.

use std::collections::BTreeMap;

use blockfire_core::{
    BlockColor, BlockId, BlockSnapshot, CellCoord, Event, LevelData, GRID_COLUMNS, MAX_GRID_ROWS,
};
use tracing::{debug, info};

#[derive(Clone, Copy, Debug)]
struct Block {
    color: BlockColor,
    cell: CellCoord,
}

/// Dense cell table plus the block registry that owns every live block.
#[derive(Clone, Debug)]
pub(crate) struct Grid {
    columns: u32,
    rows: u32,
    cells: Vec<Option<BlockId>>,
    blocks: BTreeMap<BlockId, Block>,
    total: u32,
    destroyed: u32,
    cleared_reported: bool,
}

impl Grid {
    pub(crate) fn empty() -> Self {
        Self {
            columns: GRID_COLUMNS,
            rows: 0,
            cells: Vec::new(),
            blocks: BTreeMap::new(),
            total: 0,
            destroyed: 0,
            cleared_reported: false,
        }
    }

    /// Fills every cell from the level layout. Block ids follow row-major order.
    pub(crate) fn from_level(level: &LevelData) -> Self {
        let columns = GRID_COLUMNS;
        let rows = level.grid_rows().min(MAX_GRID_ROWS);
        let capacity = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        let mut grid = Self {
            columns,
            rows,
            cells: vec![None; capacity],
            blocks: BTreeMap::new(),
            total: 0,
            destroyed: 0,
            cleared_reported: false,
        };

        let mut next_id = 0;
        for row in 0..rows {
            for column in 0..columns {
                let cell = CellCoord::new(column, row);
                let id = BlockId::new(next_id);
                next_id += 1;
                if let Some(index) = grid.index(cell) {
                    grid.cells[index] = Some(id);
                    let _ = grid.blocks.insert(
                        id,
                        Block {
                            color: level.block_at(column, row),
                            cell,
                        },
                    );
                }
            }
        }
        grid.total = u32::try_from(grid.blocks.len()).unwrap_or(u32::MAX);
        grid
    }

    pub(crate) const fn rows(&self) -> u32 {
        self.rows
    }

    pub(crate) const fn columns(&self) -> u32 {
        self.columns
    }

    pub(crate) const fn total_blocks(&self) -> u32 {
        self.total
    }

    pub(crate) const fn destroyed_count(&self) -> u32 {
        self.destroyed
    }

    pub(crate) fn remaining(&self) -> u32 {
        self.total.saturating_sub(self.destroyed)
    }

    pub(crate) fn is_cleared(&self) -> bool {
        self.destroyed >= self.total
    }

    /// Block resting in the cell. Out-of-range cells read as empty.
    pub(crate) fn get(&self, cell: CellCoord) -> Option<BlockSnapshot> {
        let index = self.index(cell)?;
        let id = self.cells.get(index).copied().flatten()?;
        self.block(id)
    }

    /// Live snapshot of the block, or `None` once it has been destroyed.
    pub(crate) fn block(&self, id: BlockId) -> Option<BlockSnapshot> {
        self.blocks.get(&id).map(|block| BlockSnapshot {
            id,
            color: block.color,
            cell: block.cell,
        })
    }

    /// Blocks currently resting on row zero in column order.
    pub(crate) fn bottom_row(&self) -> Vec<BlockSnapshot> {
        (0..self.columns)
            .filter_map(|column| self.get(CellCoord::new(column, 0)))
            .collect()
    }

    /// Every live block in identifier order.
    pub(crate) fn snapshots(&self) -> Vec<BlockSnapshot> {
        self.blocks
            .iter()
            .map(|(id, block)| BlockSnapshot {
                id: *id,
                color: block.color,
                cell: block.cell,
            })
            .collect()
    }

    /// Destroys the block in the cell, settles its column and reports a clear
    /// once the last block is gone.
    pub(crate) fn remove(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) -> Option<BlockSnapshot> {
        let Some(index) = self.index(cell) else {
            debug!(column = cell.column(), row = cell.row(), "ignoring removal outside the grid");
            return None;
        };
        let Some(id) = self.cells[index].take() else {
            debug!(column = cell.column(), row = cell.row(), "ignoring removal of an empty cell");
            return None;
        };
        let block = self.blocks.remove(&id)?;

        self.destroyed = self.destroyed.saturating_add(1);
        out_events.push(Event::BlockDestroyed {
            block: id,
            cell,
            color: block.color,
        });

        self.apply_gravity(cell.column(), out_events);

        if self.is_cleared() && !self.cleared_reported {
            self.cleared_reported = true;
            info!(destroyed = self.destroyed, "grid cleared");
            out_events.push(Event::LevelCleared {
                destroyed: self.destroyed,
            });
        }

        Some(BlockSnapshot {
            id,
            color: block.color,
            cell,
        })
    }

    /// Pulls the nearest block above every empty cell down into it.
    pub(crate) fn apply_gravity(&mut self, column: u32, out_events: &mut Vec<Event>) {
        if column >= self.columns {
            return;
        }

        for row in 0..self.rows {
            let to = CellCoord::new(column, row);
            let Some(to_index) = self.index(to) else {
                continue;
            };
            if self.cells[to_index].is_some() {
                continue;
            }

            let source = (row + 1..self.rows)
                .map(|above| CellCoord::new(column, above))
                .find_map(|from| {
                    let index = self.index(from)?;
                    self.cells[index].map(|id| (from, index, id))
                });
            let Some((from, from_index, id)) = source else {
                break;
            };

            self.cells[to_index] = self.cells[from_index].take();
            if let Some(block) = self.blocks.get_mut(&id) {
                block.cell = to;
            }
            out_events.push(Event::BlockMoved { block: id, from, to });
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(rows: &[&str]) -> LevelData {
        LevelData::from_symbols(rows, 3).expect("valid level")
    }

    fn assert_settled(grid: &Grid) {
        for column in 0..grid.columns() {
            let mut seen_gap = false;
            for row in 0..grid.rows() {
                let occupied = grid.get(CellCoord::new(column, row)).is_some();
                assert!(
                    !(seen_gap && occupied),
                    "column {column} has a block above a gap at row {row}"
                );
                seen_gap |= !occupied;
            }
        }
    }

    #[test]
    fn remove_empties_cell_and_counts_once() {
        let mut grid = Grid::from_level(&level(&["YYYYYYYYYY"]));
        let mut events = Vec::new();
        let cell = CellCoord::new(4, 0);

        let removed = grid.remove(cell, &mut events);

        assert_eq!(removed.map(|block| block.cell), Some(cell));
        assert!(grid.get(cell).is_none());
        assert_eq!(grid.destroyed_count(), 1);
        assert!(grid.remove(cell, &mut events).is_none());
        assert_eq!(grid.destroyed_count(), 1);
    }

    #[test]
    fn removal_outside_grid_is_ignored() {
        let mut grid = Grid::from_level(&level(&["YYYYYYYYYY"]));
        let mut events = Vec::new();

        assert!(grid.remove(CellCoord::new(10, 0), &mut events).is_none());
        assert!(grid.remove(CellCoord::new(0, 1), &mut events).is_none());
        assert!(grid.get(CellCoord::new(0, 7)).is_none());
        assert!(events.is_empty());
        assert_eq!(grid.destroyed_count(), 0);
    }

    #[test]
    fn gravity_drops_column_and_reports_moves() {
        let mut grid = Grid::from_level(&level(&["YYYYYYYYYY", "BBBBBBBBBB", "RRRRRRRRRR"]));
        let mut events = Vec::new();
        let blue = grid.get(CellCoord::new(2, 1)).expect("blue block");
        let red = grid.get(CellCoord::new(2, 2)).expect("red block");

        let _ = grid.remove(CellCoord::new(2, 0), &mut events);

        assert_eq!(grid.get(CellCoord::new(2, 0)).map(|b| b.id), Some(blue.id));
        assert_eq!(grid.get(CellCoord::new(2, 1)).map(|b| b.id), Some(red.id));
        assert!(grid.get(CellCoord::new(2, 2)).is_none());
        assert_eq!(
            grid.block(blue.id).map(|b| b.cell),
            Some(CellCoord::new(2, 0))
        );
        assert_eq!(
            &events[1..],
            &[
                Event::BlockMoved {
                    block: blue.id,
                    from: CellCoord::new(2, 1),
                    to: CellCoord::new(2, 0),
                },
                Event::BlockMoved {
                    block: red.id,
                    from: CellCoord::new(2, 2),
                    to: CellCoord::new(2, 1),
                },
            ]
        );
    }

    #[test]
    fn columns_stay_settled_under_scattered_removals() {
        let mut grid = Grid::from_level(&level(&[
            "YBRYBRYBRY",
            "BRYBRYBRYB",
            "RYBRYBRYBR",
            "YYBBRRYYBB",
            "RRYYBBRRYY",
        ]));
        let mut events = Vec::new();
        let mut state = 0x9e37_79b9_u32;

        for _ in 0..30 {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let column = (state >> 8) % GRID_COLUMNS;
            let row = (state >> 20) % grid.rows();
            let _ = grid.remove(CellCoord::new(column, row), &mut events);
            assert_settled(&grid);
        }

        let live = u32::try_from(grid.snapshots().len()).expect("fits");
        assert_eq!(live, grid.remaining());
    }

    #[test]
    fn clearing_last_block_reports_once() {
        let mut grid = Grid::from_level(&level(&["YYYYYYYYYY"]));
        let mut events = Vec::new();

        for _ in 0..GRID_COLUMNS {
            let target = grid.bottom_row()[0].cell;
            let _ = grid.remove(target, &mut events);
        }

        let clears: Vec<_> = events
            .iter()
            .filter(|event| matches!(event, Event::LevelCleared { .. }))
            .collect();
        assert_eq!(clears, vec![&Event::LevelCleared { destroyed: 10 }]);
        assert!(grid.is_cleared());
        assert_eq!(grid.remaining(), 0);
    }
}
