use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

// ============================================================================
// Configuration
// ============================================================================

pub const DEFAULT_FIELD_SIZE: usize = 4;
pub const SPAWN_VALUE: u32 = 2;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Left = 0,
    Up = 1,
    Right = 2,
    Down = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Up,
        Direction::Right,
        Direction::Down,
    ];

    /// Maps 0=left, 1=up, 2=right, 3=down. Returns None for anything else.
    pub fn from_index(index: u8) -> Option<Direction> {
        match index {
            0 => Some(Direction::Left),
            1 => Some(Direction::Up),
            2 => Some(Direction::Right),
            3 => Some(Direction::Down),
            _ => None,
        }
    }

    /// Counter-clockwise quarter turns that bring this direction to "left".
    fn turns(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameState {
    Playing,
    GameOver,
}

// ============================================================================
// Grid
// ============================================================================

/// Square board of tile values. 0 is an empty cell, everything else is a
/// power of two starting at 2.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    cells: Vec<Vec<u32>>,
}

impl Grid {
    pub fn new(size: usize) -> Self {
        Self {
            cells: vec![vec![0; size]; size],
        }
    }

    pub fn from_rows(rows: Vec<Vec<u32>>) -> Self {
        let size = rows.len();
        assert!(
            rows.iter().all(|row| row.len() == size),
            "grid rows must form a square"
        );
        Self { cells: rows }
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.cells[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: u32) {
        self.cells[row][col] = value;
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.cells.iter().map(|row| row.as_slice())
    }

    /// All positions currently holding 0, in row-major order.
    pub fn free_cells(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .flat_map(|(row, values)| {
                values
                    .iter()
                    .enumerate()
                    .filter(|(_, &value)| value == 0)
                    .map(move |(col, _)| (row, col))
            })
            .collect()
    }

    pub fn max_value(&self) -> u32 {
        self.cells.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Returns a copy rotated 90° counter-clockwise `turns` times.
    /// The receiver is left untouched.
    pub fn rotated(&self, turns: usize) -> Grid {
        let size = self.size();
        let mut cells = self.cells.clone();
        for _ in 0..turns % 4 {
            let mut next = vec![vec![0; size]; size];
            for (i, row) in next.iter_mut().enumerate() {
                for (j, cell) in row.iter_mut().enumerate() {
                    *cell = cells[j][size - 1 - i];
                }
            }
            cells = next;
        }
        Grid { cells }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let line = row
                .iter()
                .map(|value| value.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            write!(f, "{}", line)?;
        }
        Ok(())
    }
}

// ============================================================================
// Shift & Merge
// ============================================================================

/// Slides one row to the left: zeros drop out, each adjacent equal pair
/// merges into its sum, and the row is padded back to `size`. Merging is a
/// single left-to-right pass; a value produced by a merge is not considered
/// again within the same pass.
pub fn shift_and_merge_row(row: &[u32], size: usize) -> Vec<u32> {
    let mut tiles: Vec<u32> = row.iter().copied().filter(|&value| value != 0).collect();
    let mut i = 0;
    while i + 1 < tiles.len() {
        if tiles[i] == tiles[i + 1] {
            tiles[i] *= 2;
            tiles.remove(i + 1);
        }
        i += 1;
    }
    tiles.resize(size, 0);
    tiles
}

/// Shifts and merges the whole board towards `direction`, returning the
/// resulting grid. Rotates counter-clockwise until the requested direction
/// lines up with "left", shifts every row, then rotates back. This is the
/// only code path for all four directions.
pub fn shift_towards(grid: &Grid, direction: Direction) -> Grid {
    let size = grid.size();
    let rotated = grid.rotated(direction.turns());
    let rows = rotated
        .rows()
        .map(|row| shift_and_merge_row(row, size))
        .collect();
    Grid::from_rows(rows).rotated(4 - direction.turns())
}

// ============================================================================
// Spawn Source Trait
// ============================================================================

/// Picks which free cell receives the next spawned tile. `upper` is the
/// number of free cells; implementations return an index in `[0, upper)`.
pub trait SpawnSource {
    fn pick_index(&mut self, upper: usize) -> usize;
}

struct RandomSpawnSource;

impl SpawnSource for RandomSpawnSource {
    fn pick_index(&mut self, upper: usize) -> usize {
        rand::thread_rng().gen_range(0..upper)
    }
}

/// Seedable source for reproducible games.
pub struct SeededSpawnSource {
    rng: StdRng,
}

impl SeededSpawnSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl SpawnSource for SeededSpawnSource {
    fn pick_index(&mut self, upper: usize) -> usize {
        self.rng.gen_range(0..upper)
    }
}

pub struct SequenceSpawnSource {
    indices: Vec<usize>,
    index: usize,
}

impl SequenceSpawnSource {
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices, index: 0 }
    }
}

impl SpawnSource for SequenceSpawnSource {
    fn pick_index(&mut self, upper: usize) -> usize {
        let picked = self.indices[self.index % self.indices.len()] % upper;
        self.index += 1;
        picked
    }
}

// ============================================================================
// Game
// ============================================================================

pub struct Game {
    pub grid: Grid,
    pub field_size: usize,
    pub moves: u32,
    pub state: GameState,
    spawn_source: Box<dyn SpawnSource>,
}

impl Game {
    pub fn new() -> Self {
        Self::with_size(DEFAULT_FIELD_SIZE)
    }

    pub fn with_size(field_size: usize) -> Self {
        Self::with_source(field_size, Box::new(RandomSpawnSource))
    }

    pub fn with_source(field_size: usize, spawn_source: Box<dyn SpawnSource>) -> Self {
        let mut game = Self {
            grid: Grid::new(field_size),
            field_size,
            moves: 0,
            state: GameState::Playing,
            spawn_source,
        };
        for _ in 0..field_size / 2 {
            game.spawn_tile();
        }
        game
    }

    pub fn with_grid(grid: Grid, spawn_source: Box<dyn SpawnSource>) -> Self {
        let field_size = grid.size();
        Self {
            grid,
            field_size,
            moves: 0,
            state: GameState::Playing,
            spawn_source,
        }
    }

    pub fn free_cells(&self) -> Vec<(usize, usize)> {
        self.grid.free_cells()
    }

    /// Places a 2 on a free cell chosen by the spawn source and returns the
    /// position. Callers must make sure a free cell exists.
    pub fn spawn_tile(&mut self) -> (usize, usize) {
        let free = self.grid.free_cells();
        assert!(!free.is_empty(), "spawn_tile called on a full board");
        let (row, col) = free[self.spawn_source.pick_index(free.len())];
        self.grid.set(row, col, SPAWN_VALUE);
        (row, col)
    }

    /// True while the board has a free cell or any direction still changes it.
    pub fn has_moves_left(&self) -> bool {
        if !self.grid.free_cells().is_empty() {
            return true;
        }
        Direction::ALL
            .iter()
            .any(|&direction| shift_towards(&self.grid, direction) != self.grid)
    }

    /// Applies one turn and reports whether the game is over afterwards.
    /// A move that slides nothing still consumes the turn and spawns a tile.
    pub fn make_turn(&mut self, direction: Direction) -> bool {
        if self.state == GameState::GameOver {
            return true;
        }
        self.grid = shift_towards(&self.grid, direction);
        self.moves += 1;
        if !self.grid.free_cells().is_empty() {
            self.spawn_tile();
        }
        if !self.has_moves_left() {
            self.state = GameState::GameOver;
        }
        self.state == GameState::GameOver
    }

    pub fn is_game_over(&self) -> bool {
        self.state == GameState::GameOver
    }

    pub fn restart(&mut self) {
        self.grid = Grid::new(self.field_size);
        self.moves = 0;
        self.state = GameState::Playing;
        for _ in 0..self.field_size / 2 {
            self.spawn_tile();
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;

    pub fn grid_of(rows: &[&[u32]]) -> Grid {
        Grid::from_rows(rows.iter().map(|row| row.to_vec()).collect())
    }

    /// A board with no free cells and no adjacent equal values in any
    /// direction, i.e. no legal move anywhere.
    pub fn dead_grid(size: usize) -> Grid {
        let mut grid = Grid::new(size);
        for row in 0..size {
            for col in 0..size {
                let value = if (row + col) % 2 == 0 { 2 } else { 4 };
                grid.set(row, col, value);
            }
        }
        grid
    }
}
