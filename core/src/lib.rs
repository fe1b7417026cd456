use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use cell::*;
pub use combinatorics::*;
pub use error::*;
pub use generator::*;
pub use hints::*;
pub use payout::*;
pub use session::*;
pub use types::*;

mod cell;
mod combinatorics;
mod error;
mod generator;
mod hints;
mod payout;
mod session;
pub mod simulation;
mod types;

/// Side length of the standard square board.
pub const BOARD_SIZE: Coord = 5;

/// Shape of a round: board size, bomb count and the credits staked on it.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub bombs: CellCount,
    pub stake: Credits,
}

impl GameConfig {
    /// Round on the standard `BOARD_SIZE` board.
    pub const fn new(stake: Credits, bombs: CellCount) -> Self {
        Self {
            size: (BOARD_SIZE, BOARD_SIZE),
            bombs,
            stake,
        }
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells().saturating_sub(self.bombs)
    }

    /// Checks the round can be played by someone holding `balance` credits.
    pub fn validate(&self, balance: Credits) -> Result<()> {
        if self.size.0 == 0 || self.size.1 == 0 {
            return Err(SessionError::InvalidConfiguration("board must not be empty"));
        }
        if self.bombs == 0 {
            return Err(SessionError::InvalidConfiguration("at least one bomb is required"));
        }
        if self.bombs >= self.total_cells() {
            return Err(SessionError::InvalidConfiguration(
                "at least one cell must be safe",
            ));
        }
        if !self.stake.is_finite() || self.stake <= 0.0 {
            return Err(SessionError::InvalidConfiguration("stake must be positive"));
        }
        if self.stake > balance {
            return Err(SessionError::InvalidConfiguration(
                "stake exceeds the available balance",
            ));
        }
        Ok(())
    }
}

/// Fixed bomb placement of one round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    bomb_mask: Array2<bool>,
    bomb_count: CellCount,
}

impl MineLayout {
    pub fn from_bomb_mask(bomb_mask: Array2<bool>) -> Self {
        let bomb_count = bomb_mask
            .iter()
            .filter(|&&is_bomb| is_bomb)
            .count()
            .try_into()
            .unwrap_or(CellCount::MAX);
        Self {
            bomb_mask,
            bomb_count,
        }
    }

    pub fn from_bomb_coords(size: Coord2, bomb_coords: &[Coord2]) -> Result<Self> {
        let mut bomb_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in bomb_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(SessionError::InvalidCell);
            }
            bomb_mask[coords.to_nd_index()] = true;
        }

        Ok(Self::from_bomb_mask(bomb_mask))
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(SessionError::InvalidCell)
        }
    }

    pub fn size(&self) -> Coord2 {
        let (rows, cols) = self.bomb_mask.dim();
        (
            rows.try_into().unwrap_or(Coord::MAX),
            cols.try_into().unwrap_or(Coord::MAX),
        )
    }

    pub fn total_cells(&self) -> CellCount {
        self.bomb_mask.len().try_into().unwrap_or(CellCount::MAX)
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.bomb_count
    }

    pub fn bomb_count(&self) -> CellCount {
        self.bomb_count
    }

    pub fn contains_bomb(&self, coords: Coord2) -> bool {
        self[coords]
    }

    pub fn adjacent_bomb_count(&self, coords: Coord2) -> u8 {
        // at most 8 neighbours
        self.iter_neighbors(coords).filter(|&pos| self[pos]).count() as u8
    }

    /// Bomb positions in row-major order.
    pub fn bomb_coords(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.bomb_mask
            .indexed_iter()
            .filter(|&(_, &is_bomb)| is_bomb)
            .map(|((row, col), _)| (row as Coord, col as Coord))
    }

    pub(crate) fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.bomb_mask.iter_neighbors(coords)
    }
}

impl Index<Coord2> for MineLayout {
    type Output = bool;

    fn index(&self, (row, col): Coord2) -> &Self::Output {
        &self.bomb_mask[(row as usize, col as usize)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_bad_rounds() {
        let invalid = |config: GameConfig, balance| {
            matches!(
                config.validate(balance),
                Err(SessionError::InvalidConfiguration(_))
            )
        };

        assert!(invalid(GameConfig::new(10.0, 0), 100.0));
        assert!(invalid(GameConfig::new(10.0, 25), 100.0));
        assert!(invalid(GameConfig::new(0.0, 3), 100.0));
        assert!(invalid(GameConfig::new(-1.0, 3), 100.0));
        assert!(invalid(GameConfig::new(f64::NAN, 3), 100.0));
        assert!(invalid(GameConfig::new(101.0, 3), 100.0));

        assert_eq!(GameConfig::new(100.0, 24).validate(100.0), Ok(()));
        assert_eq!(GameConfig::new(1.0, 1).validate(1.0), Ok(()));
    }

    #[test]
    fn layout_counts_and_neighbors() {
        let layout = MineLayout::from_bomb_coords((5, 5), &[(0, 0), (1, 1), (4, 4)]).unwrap();

        assert_eq!(layout.bomb_count(), 3);
        assert_eq!(layout.safe_cell_count(), 22);
        assert_eq!(layout.adjacent_bomb_count((0, 1)), 2);
        assert_eq!(layout.adjacent_bomb_count((3, 3)), 1);
        assert_eq!(layout.adjacent_bomb_count((2, 4)), 0);
        assert_eq!(
            layout.bomb_coords().collect::<Vec<_>>(),
            vec![(0, 0), (1, 1), (4, 4)]
        );
    }

    #[test]
    fn layout_rejects_out_of_bounds_bombs() {
        assert_eq!(
            MineLayout::from_bomb_coords((5, 5), &[(5, 0)]),
            Err(SessionError::InvalidCell)
        );
    }
}
