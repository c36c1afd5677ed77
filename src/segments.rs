//! Segment geometry: every line of four cells that can win the game.
//!
//! A [`SegmentIndex`] is computed once per grid size and shared read-only by
//! every board of that size. It holds the full list of segments plus a reverse
//! index from each cell to the segments passing through it, so that end
//! detection after a move only looks at a handful of lines instead of all of
//! them.
//!
//! Cells are addressed column-major: `index = col * rows + row`, row 0 being
//! the bottom of a column.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use log::{debug, warn};

use crate::constants::SEGMENT_LEN;

/// Errors raised while setting up the grid geometry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    #[error("grid dimensions must be positive (got {cols}x{rows})")]
    ZeroDimension { cols: usize, rows: usize },
}

/// The four line directions a segment can run in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Horizontal,
    Vertical,
    /// Bottom-left to top-right.
    DiagonalUp,
    /// Top-left to bottom-right.
    DiagonalDown,
}

impl Direction {
    /// Enumeration order of the segment list.
    pub const ALL: [Direction; 4] = [
        Direction::Horizontal,
        Direction::Vertical,
        Direction::DiagonalUp,
        Direction::DiagonalDown,
    ];

    /// Offset (columns, rows) between consecutive cells of a segment.
    pub const fn step(self) -> (isize, isize) {
        match self {
            Direction::Horizontal => (1, 0),
            Direction::Vertical => (0, 1),
            Direction::DiagonalUp => (1, 1),
            Direction::DiagonalDown => (1, -1),
        }
    }
}

/// A cell coordinate on the grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Coord {
    pub col: usize,
    pub row: usize,
}

impl Coord {
    pub const fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    /// Column-major index of this cell on a grid with `rows` rows.
    #[inline]
    pub const fn index(self, rows: usize) -> usize {
        self.col * rows + self.row
    }
}

/// Four cells in a straight line, entirely inside the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub direction: Direction,
    pub cells: [Coord; SEGMENT_LEN],
}

impl Segment {
    /// The segment starting at `start` and running along `direction`, or
    /// `None` if it would leave a `cols x rows` grid.
    pub fn starting_at(
        start: Coord,
        direction: Direction,
        cols: usize,
        rows: usize,
    ) -> Option<Segment> {
        let (dc, dr) = direction.step();
        let mut cells = [start; SEGMENT_LEN];
        for (k, cell) in cells.iter_mut().enumerate() {
            let k = k as isize;
            let col = start.col.checked_add_signed(dc * k)?;
            let row = start.row.checked_add_signed(dr * k)?;
            if col >= cols || row >= rows {
                return None;
            }
            *cell = Coord::new(col, row);
        }
        Some(Segment { direction, cells })
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.cells.contains(&coord)
    }
}

/// Enumerate every segment of a `cols x rows` grid.
///
/// Order: by direction (see [`Direction::ALL`]), then start column, then start
/// row. Grids narrower or shorter than a segment have no segments at all.
pub fn enumerate_lines(cols: usize, rows: usize) -> Vec<Segment> {
    if cols < SEGMENT_LEN || rows < SEGMENT_LEN {
        return Vec::new();
    }

    let mut segments = Vec::new();
    for direction in Direction::ALL {
        for col in 0..cols {
            for row in 0..rows {
                if let Some(seg) = Segment::starting_at(Coord::new(col, row), direction, cols, rows)
                {
                    segments.push(seg);
                }
            }
        }
    }
    segments
}

/// For every cell (column-major), the indices into `segments` of the segments
/// containing it. Every cell gets an entry, possibly empty.
pub fn build_reverse_index(segments: &[Segment], cols: usize, rows: usize) -> Vec<Vec<usize>> {
    let mut through = vec![Vec::new(); cols * rows];
    for (i, seg) in segments.iter().enumerate() {
        for cell in seg.cells {
            through[cell.index(rows)].push(i);
        }
    }
    through
}

/// All segments of one grid size, plus the per-cell reverse index.
#[derive(Debug)]
pub struct SegmentIndex {
    cols: usize,
    rows: usize,
    segments: Vec<Segment>,
    through: Vec<Vec<usize>>,
}

/// One index per grid size, built on first use.
static SHARED: OnceLock<Mutex<HashMap<(usize, usize), Arc<SegmentIndex>>>> = OnceLock::new();

impl SegmentIndex {
    /// Build the index for a `cols x rows` grid.
    pub fn new(cols: usize, rows: usize) -> Result<Self, GeometryError> {
        validate_dimensions(cols, rows)?;

        let segments = enumerate_lines(cols, rows);
        let through = build_reverse_index(&segments, cols, rows);
        debug!(
            "built segment index for {cols}x{rows} grid: {} segments",
            segments.len()
        );
        if segments.is_empty() {
            warn!("no segment fits on a {cols}x{rows} grid, the game cannot be won");
        }

        Ok(Self {
            cols,
            rows,
            segments,
            through,
        })
    }

    /// The process-wide index for a `cols x rows` grid.
    ///
    /// The first call for a given size builds the index, later calls return
    /// the same `Arc`.
    pub fn shared(cols: usize, rows: usize) -> Result<Arc<SegmentIndex>, GeometryError> {
        let cache = SHARED.get_or_init(|| Mutex::new(HashMap::new()));
        let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(index) = cache.get(&(cols, rows)) {
            return Ok(Arc::clone(index));
        }
        let index = Arc::new(SegmentIndex::new(cols, rows)?);
        cache.insert((cols, rows), Arc::clone(&index));
        Ok(index)
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Every segment on the grid.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Indices (into [`segments`](Self::segments)) of the segments through a
    /// cell. Empty for cells outside the grid.
    pub fn segment_ids_through(&self, col: usize, row: usize) -> &[usize] {
        if col >= self.cols || row >= self.rows {
            return &[];
        }
        &self.through[Coord::new(col, row).index(self.rows)]
    }

    /// The segments passing through a cell.
    pub fn segments_through(&self, col: usize, row: usize) -> impl Iterator<Item = &Segment> + '_ {
        self.segment_ids_through(col, row)
            .iter()
            .map(move |&i| &self.segments[i])
    }
}

/// Reject grids with a zero dimension.
pub fn validate_dimensions(cols: usize, rows: usize) -> Result<(), GeometryError> {
    if cols == 0 || rows == 0 {
        return Err(GeometryError::ZeroDimension { cols, rows });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_count_default_grid() {
        // 35 horizontal + 32 vertical + 20 + 20 diagonal
        let segments = enumerate_lines(8, 7);
        assert_eq!(segments.len(), 107);

        let count = |d: Direction| segments.iter().filter(|s| s.direction == d).count();
        assert_eq!(count(Direction::Horizontal), 35);
        assert_eq!(count(Direction::Vertical), 32);
        assert_eq!(count(Direction::DiagonalUp), 20);
        assert_eq!(count(Direction::DiagonalDown), 20);
    }

    #[test]
    fn test_segment_count_standard_grid() {
        assert_eq!(enumerate_lines(7, 6).len(), 69);
    }

    #[test]
    fn test_small_grid_has_no_segments() {
        assert!(enumerate_lines(3, 7).is_empty());
        assert!(enumerate_lines(8, 3).is_empty());

        let index = SegmentIndex::new(3, 3).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.segment_ids_through(1, 1), &[] as &[usize]);
    }

    #[test]
    fn test_segments_are_straight_and_inside() {
        for seg in enumerate_lines(8, 7) {
            let (dc, dr) = seg.direction.step();
            for pair in seg.cells.windows(2) {
                assert!(pair[1].col < 8 && pair[1].row < 7);
                assert_eq!(pair[1].col as isize - pair[0].col as isize, dc);
                assert_eq!(pair[1].row as isize - pair[0].row as isize, dr);
            }
        }
    }

    #[test]
    fn test_enumeration_is_deterministic() {
        assert_eq!(enumerate_lines(8, 7), enumerate_lines(8, 7));
    }

    #[test]
    fn test_reverse_index_corner_and_center() {
        let index = SegmentIndex::new(8, 7).unwrap();
        // Bottom-left corner: one horizontal, one vertical, one diagonal
        assert_eq!(index.segment_ids_through(0, 0).len(), 3);
        // Central cell: four per direction
        assert_eq!(index.segment_ids_through(3, 3).len(), 16);
        assert!(index.segments_through(3, 3).all(|s| s.contains(Coord::new(3, 3))));
    }

    #[test]
    fn test_reverse_index_is_complete() {
        let (cols, rows) = (8, 7);
        let segments = enumerate_lines(cols, rows);
        let through = build_reverse_index(&segments, cols, rows);
        assert_eq!(through.len(), cols * rows);

        for col in 0..cols {
            for row in 0..rows {
                let cell = Coord::new(col, row);
                let expected: Vec<usize> = segments
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.contains(cell))
                    .map(|(i, _)| i)
                    .collect();
                assert_eq!(through[cell.index(rows)], expected, "cell {cell:?}");
            }
        }
    }

    #[test]
    fn test_out_of_grid_cell_has_no_segments() {
        let index = SegmentIndex::new(8, 7).unwrap();
        assert_eq!(index.segments_through(8, 0).count(), 0);
        assert_eq!(index.segments_through(0, 7).count(), 0);
    }

    #[test]
    fn test_invalid_dimensions() {
        assert_eq!(
            SegmentIndex::new(0, 7).unwrap_err(),
            GeometryError::ZeroDimension { cols: 0, rows: 7 }
        );
    }

    #[test]
    fn test_large_grid_is_accepted() {
        // Six windows per row and per column, 6 x 6 starts per diagonal direction
        let index = SegmentIndex::new(9, 9).unwrap();
        assert_eq!(index.len(), 9 * 6 * 2 + 36 * 2);
    }

    #[test]
    fn test_shared_index_is_built_once() {
        let a = SegmentIndex::shared(6, 5).unwrap();
        let b = SegmentIndex::shared(6, 5).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.cols(), 6);
        assert_eq!(a.rows(), 5);
    }
}
