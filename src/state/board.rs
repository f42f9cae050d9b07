//! Board state.
//!
//! A square grid of cells addressed as `(col, row)`, both zero-based, with
//! row 0 at the bottom:
//!
//! ```text
//! row
//!  2 | . . .
//!  1 | . . .
//!  0 | . . .
//!      0 1 2  col
//! ```
//!
//! Win detection is incremental: only the lines passing through the
//! last-played coordinate are inspected, so each check is O(size).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error::ErrorKind;

/// Value held by a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    #[default]
    Empty,
    /// Mark placed by the first seat
    MarkA,
    /// Mark placed by the second seat
    MarkB,
}

impl Cell {
    /// Wire encoding: 0 empty, 1 mark A, 2 mark B.
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::MarkA => 1,
            Self::MarkB => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Supported board sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum GridSize {
    #[default]
    Three,
    Four,
    Five,
    Six,
}

impl GridSize {
    pub const ALL: [GridSize; 4] = [Self::Three, Self::Four, Self::Five, Self::Six];

    /// Number of cells along one side.
    pub fn value(&self) -> usize {
        match self {
            Self::Three => 3,
            Self::Four => 4,
            Self::Five => 5,
            Self::Six => 6,
        }
    }
}

impl TryFrom<usize> for GridSize {
    type Error = BoardError;

    fn try_from(size: usize) -> Result<Self, Self::Error> {
        match size {
            3 => Ok(Self::Three),
            4 => Ok(Self::Four),
            5 => Ok(Self::Five),
            6 => Ok(Self::Six),
            other => Err(BoardError::InvalidConfiguration { size: other }),
        }
    }
}

impl From<GridSize> for usize {
    fn from(size: GridSize) -> Self {
        size.value()
    }
}

/// Board position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub col: usize,
    pub row: usize,
}

impl Coord {
    pub fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    /// Check if position lies on either diagonal of a board of `size`.
    pub fn is_on_diagonal(&self, size: GridSize) -> bool {
        let n = size.value();
        self.col < n && self.row < n && (self.col == self.row || self.col + self.row == n - 1)
    }
}

/// Board errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("Unsupported grid size {size}, expected 3 to 6")]
    InvalidConfiguration { size: usize },
    #[error("Coordinate ({col}, {row}) is outside a {size}x{size} grid")]
    OutOfBounds { col: usize, row: usize, size: usize },
}

impl BoardError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

/// Column-major cell matrix: `grid[col][row]`.
pub type Grid = Vec<Vec<Cell>>;

/// Every coordinate on either diagonal; the centre cell of odd boards appears twice.
pub fn diagonal_coordinates(size: GridSize) -> Vec<Coord> {
    let n = size.value();
    (0..n)
        .flat_map(|i| [Coord::new(i, i), Coord::new(i, n - 1 - i)])
        .collect()
}

/// Coordinates at the centre of the board where the diagonals cross.
///
/// One cell for odd sizes, the central 2x2 block for even sizes.
pub fn center_coordinates(size: GridSize) -> Vec<Coord> {
    let n = size.value();
    if n % 2 == 1 {
        vec![Coord::new(n / 2, n / 2)]
    } else {
        let inc = n / 2 - 1;
        vec![
            Coord::new(inc, inc),
            Coord::new(inc + 1, inc),
            Coord::new(inc, inc + 1),
            Coord::new(inc + 1, inc + 1),
        ]
    }
}

/// NxN board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: GridSize,
    cells: Grid,
}

impl Board {
    /// Create an empty board.
    pub fn new(size: GridSize) -> Self {
        let n = size.value();
        Self {
            size,
            cells: vec![vec![Cell::Empty; n]; n],
        }
    }

    /// Create an empty board from a raw side length.
    pub fn with_size(size: usize) -> Result<Self, BoardError> {
        Ok(Self::new(GridSize::try_from(size)?))
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    fn check_bounds(&self, col: usize, row: usize) -> Result<(), BoardError> {
        let n = self.size.value();
        if col >= n || row >= n {
            return Err(BoardError::OutOfBounds { col, row, size: n });
        }
        Ok(())
    }

    /// Get cell at position.
    pub fn get(&self, col: usize, row: usize) -> Result<Cell, BoardError> {
        self.check_bounds(col, row)?;
        Ok(self.cells[col][row])
    }

    /// Overwrite cell at position. Occupancy is the caller's concern.
    pub fn set(&mut self, col: usize, row: usize, value: Cell) -> Result<(), BoardError> {
        self.check_bounds(col, row)?;
        self.cells[col][row] = value;
        Ok(())
    }

    /// True when no cell is empty.
    pub fn is_full(&self) -> bool {
        self.cells
            .iter()
            .all(|column| column.iter().all(|cell| !cell.is_empty()))
    }

    /// Copy of the cell matrix.
    pub fn grid(&self) -> Grid {
        self.cells.clone()
    }

    /// Row through `(col, row)` holds one uniform mark.
    pub fn horizontal_is_winning(&self, col: usize, row: usize) -> Result<bool, BoardError> {
        let value = self.get(col, row)?;
        Ok(!value.is_empty() && self.cells.iter().all(|column| column[row] == value))
    }

    /// Column through `(col, row)` holds one uniform mark.
    pub fn vertical_is_winning(&self, col: usize, row: usize) -> Result<bool, BoardError> {
        let value = self.get(col, row)?;
        Ok(!value.is_empty() && self.cells[col].iter().all(|cell| *cell == value))
    }

    /// Diagonal from (0, 0) to (n-1, n-1).
    pub fn ascending_diagonal_is_winning(&self) -> bool {
        let first = self.cells[0][0];
        !first.is_empty() && (0..self.size.value()).all(|i| self.cells[i][i] == first)
    }

    /// Diagonal from (0, n-1) to (n-1, 0).
    pub fn descending_diagonal_is_winning(&self) -> bool {
        let n = self.size.value();
        let first = self.cells[0][n - 1];
        !first.is_empty() && (0..n).all(|i| self.cells[i][n - 1 - i] == first)
    }

    /// Check every line through `(col, row)` for a win.
    pub fn coordinate_is_winning(&self, col: usize, row: usize) -> Result<bool, BoardError> {
        self.check_bounds(col, row)?;

        if Coord::new(col, row).is_on_diagonal(self.size)
            && (self.ascending_diagonal_is_winning() || self.descending_diagonal_is_winning())
        {
            return Ok(true);
        }

        Ok(self.vertical_is_winning(col, row)? || self.horizontal_is_winning(col, row)?)
    }

    /// ASCII rendering with the top row first and a column axis underneath.
    /// Every line, the axis included, ends in `" \n"`.
    pub fn render(&self) -> String {
        let n = self.size.value();
        let mut lines: Vec<String> = (0..n)
            .rev()
            .map(|row| {
                let cells: String = (0..n)
                    .map(|col| format!("{} ", self.cells[col][row].as_u8()))
                    .collect();
                format!("{}|{}", row, cells)
            })
            .collect();

        let axis: String = (0..n).map(|col| format!("{} ", col)).collect();
        lines.push(format!("  {}x", axis));
        lines.iter().map(|line| format!("{} \n", line)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_board_is_empty() {
        for size in GridSize::ALL {
            let board = Board::new(size);
            let n = size.value();
            let grid = board.grid();
            assert_eq!(grid.len(), n);
            assert!(grid.iter().all(|column| column.len() == n));
            assert!(grid.iter().flatten().all(|cell| *cell == Cell::Empty));
            assert!(!board.is_full());
        }
    }

    #[test]
    fn test_invalid_size() {
        assert_eq!(
            Board::with_size(7),
            Err(BoardError::InvalidConfiguration { size: 7 })
        );
        assert!(Board::with_size(2).is_err());
        assert_eq!(Board::with_size(5).unwrap().size(), GridSize::Five);
    }

    #[test]
    fn test_set_and_get() {
        let mut board = Board::new(GridSize::Three);
        assert_eq!(board.get(0, 0).unwrap(), Cell::Empty);

        board.set(0, 0, Cell::MarkA).unwrap();
        board.set(2, 1, Cell::MarkB).unwrap();

        assert_eq!(board.get(0, 0).unwrap(), Cell::MarkA);
        assert_eq!(board.get(2, 1).unwrap(), Cell::MarkB);
        assert_eq!(board.get(1, 2).unwrap(), Cell::Empty);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut board = Board::new(GridSize::Three);

        let err = board.set(3, 3, Cell::MarkA).unwrap_err();
        assert_eq!(err, BoardError::OutOfBounds { col: 3, row: 3, size: 3 });
        assert_eq!(err.kind(), ErrorKind::Validation);

        assert!(board.get(0, 3).is_err());
        assert!(board.get(3, 0).is_err());
        assert!(board.coordinate_is_winning(4, 0).is_err());
    }

    #[test]
    fn test_is_full() {
        let mut board = Board::new(GridSize::Three);
        for col in 0..3 {
            for row in 0..3 {
                board.set(col, row, Cell::MarkA).unwrap();
            }
        }
        assert!(board.is_full());

        board.set(1, 1, Cell::Empty).unwrap();
        assert!(!board.is_full());
    }

    #[test]
    fn test_center_coordinates() {
        assert_eq!(center_coordinates(GridSize::Three), vec![Coord::new(1, 1)]);
        assert_eq!(center_coordinates(GridSize::Five), vec![Coord::new(2, 2)]);

        let mut four = center_coordinates(GridSize::Four);
        four.sort();
        assert_eq!(
            four,
            vec![
                Coord::new(1, 1),
                Coord::new(1, 2),
                Coord::new(2, 1),
                Coord::new(2, 2)
            ]
        );

        let six = center_coordinates(GridSize::Six);
        assert_eq!(six.len(), 4);
        assert!(six.contains(&Coord::new(2, 2)));
        assert!(six.contains(&Coord::new(3, 3)));
        assert!(six.contains(&Coord::new(3, 2)));
        assert!(six.contains(&Coord::new(2, 3)));
    }

    #[test]
    fn test_diagonal_coordinates() {
        let diag = diagonal_coordinates(GridSize::Four);
        assert_eq!(diag.len(), 8);
        assert!(diag.contains(&Coord::new(0, 0)));
        assert!(diag.contains(&Coord::new(0, 3)));
        assert!(diag.contains(&Coord::new(1, 2)));
        assert!(!diag.contains(&Coord::new(0, 1)));

        // Every centre cell lies on a diagonal
        for size in GridSize::ALL {
            for c in center_coordinates(size) {
                assert!(c.is_on_diagonal(size));
            }
        }
    }

    #[test]
    fn test_horizontal_win() {
        let mut board = Board::new(GridSize::Three);
        assert!(!board.horizontal_is_winning(0, 0).unwrap());

        for col in 0..3 {
            board.set(col, 0, Cell::MarkA).unwrap();
        }
        assert!(board.horizontal_is_winning(0, 0).unwrap());
        assert!(board.horizontal_is_winning(2, 0).unwrap());
        assert!(!board.horizontal_is_winning(0, 1).unwrap());
    }

    #[test]
    fn test_vertical_win() {
        let mut board = Board::new(GridSize::Four);
        for row in 0..3 {
            board.set(1, row, Cell::MarkB).unwrap();
        }
        assert!(!board.vertical_is_winning(1, 0).unwrap());

        board.set(1, 3, Cell::MarkB).unwrap();
        assert!(board.vertical_is_winning(1, 0).unwrap());
    }

    #[test]
    fn test_mixed_line_is_not_winning() {
        let mut board = Board::new(GridSize::Three);
        board.set(0, 0, Cell::MarkA).unwrap();
        board.set(1, 0, Cell::MarkB).unwrap();
        board.set(2, 0, Cell::MarkA).unwrap();
        assert!(!board.horizontal_is_winning(0, 0).unwrap());
    }

    #[test]
    fn test_diagonal_wins() {
        let mut board = Board::new(GridSize::Three);
        assert!(!board.ascending_diagonal_is_winning());
        assert!(!board.descending_diagonal_is_winning());

        for i in 0..3 {
            board.set(i, i, Cell::MarkA).unwrap();
        }
        assert!(board.ascending_diagonal_is_winning());
        assert!(!board.descending_diagonal_is_winning());

        let mut board = Board::new(GridSize::Five);
        for i in 0..5 {
            board.set(i, 4 - i, Cell::MarkB).unwrap();
        }
        assert!(board.descending_diagonal_is_winning());
        assert!(!board.ascending_diagonal_is_winning());
    }

    #[test]
    fn test_even_board_ascending_diagonal() {
        let mut board = Board::new(GridSize::Six);
        for i in 0..5 {
            board.set(i, i, Cell::MarkA).unwrap();
        }
        assert!(!board.ascending_diagonal_is_winning());
        assert!(!board.coordinate_is_winning(2, 2).unwrap());

        board.set(5, 5, Cell::MarkA).unwrap();
        assert!(board.ascending_diagonal_is_winning());
        assert!(!board.descending_diagonal_is_winning());
        // Both centre cells of an even board see the diagonal
        assert!(board.coordinate_is_winning(2, 2).unwrap());
        assert!(board.coordinate_is_winning(3, 3).unwrap());
        assert!(board.coordinate_is_winning(5, 5).unwrap());
    }

    #[test]
    fn test_coordinate_is_winning() {
        let mut board = Board::new(GridSize::Three);
        for i in 0..3 {
            board.set(i, 2 - i, Cell::MarkA).unwrap();
        }
        assert!(board.coordinate_is_winning(1, 1).unwrap());
        assert!(board.coordinate_is_winning(0, 2).unwrap());
        // Off-diagonal cell only sees its own row and column
        assert!(!board.coordinate_is_winning(1, 0).unwrap());
    }

    #[test]
    fn test_render() {
        let mut board = Board::new(GridSize::Three);
        board.set(0, 2, Cell::MarkA).unwrap();
        board.set(2, 0, Cell::MarkB).unwrap();

        assert_eq!(
            board.render(),
            "2|1 0 0  \n1|0 0 0  \n0|0 0 2  \n  0 1 2 x \n"
        );
        assert!(board.render().lines().all(|line| line.ends_with(' ')));
    }

    #[test]
    fn test_grid_size_serde() {
        let size: GridSize = serde_json::from_str("4").unwrap();
        assert_eq!(size, GridSize::Four);
        assert!(serde_json::from_str::<GridSize>("9").is_err());
        assert_eq!(serde_json::to_string(&GridSize::Six).unwrap(), "6");
    }
}
