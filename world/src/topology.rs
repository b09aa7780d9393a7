//! Row-major index arithmetic for square grids.

use maze_runner_core::{CellCoord, CellIndex, MazeError, Side};

/// Dimensions of a square grid and the only place neighbours are resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Topology {
    rows: u32,
    len: usize,
}

impl Topology {
    /// Returns `None` when the grid would be empty or its cell count overflows.
    pub(crate) fn new(rows: u32) -> Option<Self> {
        let width = usize::try_from(rows).ok()?;
        let len = width.checked_mul(width)?;
        if len == 0 {
            return None;
        }

        Some(Self { rows, len })
    }

    pub(crate) const fn rows(&self) -> u32 {
        self.rows
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn check(&self, index: CellIndex) -> Result<(), MazeError> {
        if index.get() < self.len {
            Ok(())
        } else {
            Err(MazeError::InvalidIndex {
                index: index.get(),
                len: self.len,
            })
        }
    }

    pub(crate) fn coord(&self, index: CellIndex) -> CellCoord {
        let width = self.width();
        // Both parts are below `rows`, which came from a u32.
        CellCoord::new((index.get() / width) as u32, (index.get() % width) as u32)
    }

    pub(crate) fn index_of(&self, coord: CellCoord) -> Option<CellIndex> {
        if coord.row() >= self.rows || coord.column() >= self.rows {
            return None;
        }

        let row = usize::try_from(coord.row()).ok()?;
        let column = usize::try_from(coord.column()).ok()?;
        Some(CellIndex::new(row * self.width() + column))
    }

    /// Neighbour across `side`, or `None` when the step leaves the grid.
    pub(crate) fn neighbour(&self, index: CellIndex, side: Side) -> Option<CellIndex> {
        debug_assert!(
            index.get() < self.len,
            "neighbour lookup requires a valid index"
        );
        let coord = self.coord(index);
        let (row_offset, column_offset) = side.offset();
        let row = u32::try_from(i64::from(coord.row()) + row_offset).ok()?;
        let column = u32::try_from(i64::from(coord.column()) + column_offset).ok()?;
        self.index_of(CellCoord::new(row, column))
    }

    /// In-bounds neighbours in wall-index order.
    pub(crate) fn neighbours(self, index: CellIndex) -> impl Iterator<Item = (Side, CellIndex)> {
        Side::ALL
            .into_iter()
            .filter_map(move |side| self.neighbour(index, side).map(|next| (side, next)))
    }

    fn width(&self) -> usize {
        self.len / self.rows as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_grids() {
        assert_eq!(Topology::new(0), None);
        assert_eq!(Topology::new(1).map(|topology| topology.len()), Some(1));
    }

    #[test]
    fn index_round_trips_through_coordinates() {
        let topology = Topology::new(16).expect("valid grid");
        let coord = topology.coord(CellIndex::new(37));
        assert_eq!(coord, CellCoord::new(2, 5));
        assert_eq!(topology.index_of(coord), Some(CellIndex::new(37)));
    }

    #[test]
    fn neighbours_follow_direction_vectors() {
        let topology = Topology::new(4).expect("valid grid");
        let centre = CellIndex::new(5);
        let expected = [
            (Side::Top, 1),
            (Side::Bottom, 9),
            (Side::Left, 4),
            (Side::Right, 6),
        ];
        for (side, index) in expected {
            assert_eq!(topology.neighbour(centre, side), Some(CellIndex::new(index)));
        }
    }

    #[test]
    fn boundary_steps_have_no_neighbour() {
        let topology = Topology::new(4).expect("valid grid");
        assert_eq!(topology.neighbour(CellIndex::new(0), Side::Top), None);
        assert_eq!(topology.neighbour(CellIndex::new(0), Side::Left), None);
        assert_eq!(topology.neighbour(CellIndex::new(3), Side::Right), None);
        assert_eq!(topology.neighbour(CellIndex::new(15), Side::Bottom), None);
        // Stepping right from the end of a row must not wrap onto the next row.
        assert_eq!(topology.neighbour(CellIndex::new(7), Side::Right), None);

        let corner: Vec<Side> = topology
            .neighbours(CellIndex::new(15))
            .map(|(side, _)| side)
            .collect();
        assert_eq!(corner, vec![Side::Top, Side::Left]);
    }

    #[test]
    fn check_reports_out_of_range_indices() {
        let topology = Topology::new(2).expect("valid grid");
        assert_eq!(topology.check(CellIndex::new(3)), Ok(()));
        assert_eq!(
            topology.check(CellIndex::new(4)),
            Err(MazeError::InvalidIndex { index: 4, len: 4 })
        );
    }
}
