use rand::Rng;
use segregation_core::CellCoord;

/// Unordered pool of unoccupied cells supporting uniform random draws.
///
/// `slots` maps every grid index to the position of that cell inside `cells`,
/// which keeps claims and releases constant time.
#[derive(Clone, Debug)]
pub(crate) struct FreeCellPool {
    columns: u32,
    rows: u32,
    cells: Vec<CellCoord>,
    slots: Vec<Option<usize>>,
}

impl FreeCellPool {
    /// Creates a pool containing every cell of the grid.
    pub(crate) fn full(columns: u32, rows: u32) -> Self {
        let capacity = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        let mut pool = Self {
            columns,
            rows,
            cells: Vec::with_capacity(capacity),
            slots: vec![None; capacity],
        };
        for column in 0..columns {
            for row in 0..rows {
                let _ = pool.release(CellCoord::new(column, row));
            }
        }
        pool
    }

    /// Removes and returns a cell chosen uniformly from the current pool.
    pub(crate) fn draw<R: Rng>(&mut self, rng: &mut R) -> Option<CellCoord> {
        if self.cells.is_empty() {
            return None;
        }
        let position = rng.gen_range(0..self.cells.len());
        Some(self.remove_at(position))
    }

    /// Removes a specific cell from the pool, reporting whether it was present.
    pub(crate) fn claim(&mut self, cell: CellCoord) -> bool {
        match self.slot(cell) {
            Some(position) => {
                let _ = self.remove_at(position);
                true
            }
            None => false,
        }
    }

    /// Returns a cell to the pool, reporting whether it was absent before.
    pub(crate) fn release(&mut self, cell: CellCoord) -> bool {
        let Some(index) = cell.index_in(self.columns, self.rows) else {
            return false;
        };
        if self.slots[index].is_some() {
            return false;
        }
        self.slots[index] = Some(self.cells.len());
        self.cells.push(cell);
        true
    }

    pub(crate) fn contains(&self, cell: CellCoord) -> bool {
        self.slot(cell).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.iter().copied()
    }

    fn slot(&self, cell: CellCoord) -> Option<usize> {
        cell.index_in(self.columns, self.rows).and_then(|index| self.slots[index])
    }

    fn remove_at(&mut self, position: usize) -> CellCoord {
        let cell = self.cells.swap_remove(position);
        if let Some(index) = cell.index_in(self.columns, self.rows) {
            self.slots[index] = None;
        }
        if let Some(moved) = self.cells.get(position).copied() {
            if let Some(index) = moved.index_in(self.columns, self.rows) {
                self.slots[index] = Some(position);
            }
        }
        cell
    }
}
