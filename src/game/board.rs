use std::fmt;
use std::ops::Neg;

use super::Player;

pub const BOARD_SIZE: usize = 8;
pub const NUM_ACTIONS: usize = BOARD_SIZE * BOARD_SIZE;
pub const CORNERS: [(usize, usize); 4] = [
    (0, 0),
    (0, BOARD_SIZE - 1),
    (BOARD_SIZE - 1, 0),
    (BOARD_SIZE - 1, BOARD_SIZE - 1),
];

/// N, S, E, W, NE, NW, SE, SW as (row, col) steps.
const DIRECTIONS: [(isize, isize); 8] = [
    (-1, 0),
    (1, 0),
    (0, 1),
    (0, -1),
    (-1, 1),
    (-1, -1),
    (1, 1),
    (1, -1),
];

/// Cell contents, using the signed convention Black = +1, White = -1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i8)]
pub enum Cell {
    White = -1,
    #[default]
    Empty = 0,
    Black = 1,
}

impl Cell {
    pub fn value(self) -> i8 {
        self as i8
    }

    pub fn from_value(value: i8) -> Option<Cell> {
        match value {
            1 => Some(Cell::Black),
            -1 => Some(Cell::White),
            0 => Some(Cell::Empty),
            _ => None,
        }
    }

    fn symbol(self) -> char {
        match self {
            Cell::Black => '●',
            Cell::White => '○',
            Cell::Empty => '·',
        }
    }
}

impl Neg for Cell {
    type Output = Cell;

    fn neg(self) -> Cell {
        match self {
            Cell::Black => Cell::White,
            Cell::White => Cell::Black,
            Cell::Empty => Cell::Empty,
        }
    }
}

impl From<Player> for Cell {
    fn from(player: Player) -> Cell {
        player.to_cell()
    }
}

/// Decode an action index into (row, col). Returns `None` outside `[0, 64)`.
pub fn action_to_coords(action: usize) -> Option<(usize, usize)> {
    (action < NUM_ACTIONS).then(|| (action / BOARD_SIZE, action % BOARD_SIZE))
}

pub fn coords_to_action(row: usize, col: usize) -> usize {
    row * BOARD_SIZE + col
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// Create a board with the four center stones in place
    pub fn new() -> Self {
        let mut board = Board::empty();
        board.reset();
        board
    }

    /// Create a board with no stones at all
    pub fn empty() -> Self {
        Board {
            cells: [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Clear the board and place the starting diagonal
    pub fn reset(&mut self) {
        self.cells = [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE];
        let mid = BOARD_SIZE / 2;
        self.cells[mid - 1][mid - 1] = Cell::White;
        self.cells[mid][mid] = Cell::White;
        self.cells[mid - 1][mid] = Cell::Black;
        self.cells[mid][mid - 1] = Cell::Black;
    }

    /// Rebuild a board from a row-major signed observation
    pub fn from_observation(observation: &[i8; NUM_ACTIONS]) -> Option<Self> {
        let mut board = Board::empty();
        for (idx, &value) in observation.iter().enumerate() {
            board.cells[idx / BOARD_SIZE][idx % BOARD_SIZE] = Cell::from_value(value)?;
        }
        Some(board)
    }

    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.cells[row][col] = cell;
    }

    pub fn is_inside(row: isize, col: isize) -> bool {
        (0..BOARD_SIZE as isize).contains(&row) && (0..BOARD_SIZE as isize).contains(&col)
    }

    /// Length of the unbroken opponent run starting next to (row, col) in
    /// direction (dr, dc), counted only when it is closed by one of `own`'s
    /// stones. Zero means the direction captures nothing.
    fn capture_run(&self, own: Cell, row: usize, col: usize, (dr, dc): (isize, isize)) -> usize {
        let opponent = -own;
        let mut r = row as isize + dr;
        let mut c = col as isize + dc;
        let mut run = 0;

        while Board::is_inside(r, c) && self.cells[r as usize][c as usize] == opponent {
            run += 1;
            r += dr;
            c += dc;
        }

        if run > 0 && Board::is_inside(r, c) && self.cells[r as usize][c as usize] == own {
            run
        } else {
            0
        }
    }

    /// True if `player` may place a stone at (row, col)
    pub fn is_valid_move(&self, player: Player, row: usize, col: usize) -> bool {
        if row >= BOARD_SIZE || col >= BOARD_SIZE || self.cells[row][col] != Cell::Empty {
            return false;
        }

        let own = player.to_cell();
        DIRECTIONS
            .iter()
            .any(|&dir| self.capture_run(own, row, col, dir) > 0)
    }

    /// All legal placements for `player`, in row-major order
    pub fn valid_moves(&self, player: Player) -> Vec<(usize, usize)> {
        (0..BOARD_SIZE)
            .flat_map(|row| (0..BOARD_SIZE).map(move |col| (row, col)))
            .filter(|&(row, col)| self.is_valid_move(player, row, col))
            .collect()
    }

    pub fn has_valid_move(&self, player: Player) -> bool {
        (0..BOARD_SIZE)
            .flat_map(|row| (0..BOARD_SIZE).map(move |col| (row, col)))
            .any(|(row, col)| self.is_valid_move(player, row, col))
    }

    /// Place a stone and flip every captured run. Returns the flipped cells,
    /// or an empty list (leaving the board untouched) if the move is illegal.
    pub fn apply_move(&mut self, player: Player, row: usize, col: usize) -> Vec<(usize, usize)> {
        if !self.is_valid_move(player, row, col) {
            return Vec::new();
        }

        let own = player.to_cell();
        // Runs are measured before anything changes so each direction flips
        // exactly what the validity walk saw.
        let runs = DIRECTIONS.map(|dir| self.capture_run(own, row, col, dir));

        self.cells[row][col] = own;
        let mut flipped = Vec::new();
        for (&(dr, dc), &run) in DIRECTIONS.iter().zip(runs.iter()) {
            for step in 1..=run as isize {
                let r = (row as isize + dr * step) as usize;
                let c = (col as isize + dc * step) as usize;
                self.cells[r][c] = own;
                flipped.push((r, c));
            }
        }

        flipped
    }

    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().flatten().filter(|&&c| c == cell).count()
    }

    /// (black stones, white stones)
    pub fn score(&self) -> (usize, usize) {
        (self.count(Cell::Black), self.count(Cell::White))
    }

    pub fn stone_count(&self) -> usize {
        self.cells.iter().flatten().filter(|&&c| c != Cell::Empty).count()
    }

    pub fn corner_count(&self, cell: Cell) -> usize {
        CORNERS
            .iter()
            .filter(|&&(row, col)| self.cells[row][col] == cell)
            .count()
    }

    /// Row-major signed view of the grid
    pub fn observation(&self) -> [i8; NUM_ACTIONS] {
        let mut obs = [0i8; NUM_ACTIONS];
        for (idx, cell) in self.cells.iter().flatten().enumerate() {
            obs[idx] = cell.value();
        }
        obs
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            let line: Vec<String> = row.iter().map(|c| c.symbol().to_string()).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
