use ndarray::Array2;

use super::*;

/// Uniform bomb placement: draw a cell, retry when it already holds a bomb.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomLayoutGenerator {
    seed: u64,
}

impl RandomLayoutGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl LayoutGenerator for RandomLayoutGenerator {
    fn generate(self, config: &GameConfig) -> MineLayout {
        use rand::prelude::*;

        let total_cells = config.total_cells();
        let (rows, cols) = config.size;
        let mut bomb_mask: Array2<bool> = Array2::default(config.size.to_nd_index());

        // rejection sampling never terminates on a board with no free cell left
        let bombs = if config.bombs > total_cells {
            log::warn!(
                "Board cannot hold {} bombs, capping at {}",
                config.bombs,
                total_cells
            );
            total_cells
        } else {
            config.bombs
        };

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut placed = 0;
        while placed < bombs {
            let coords: Coord2 = (rng.random_range(0..rows), rng.random_range(0..cols));
            let cell = &mut bomb_mask[coords.to_nd_index()];
            if !*cell {
                *cell = true;
                placed += 1;
            }
        }

        log::trace!("Placed {} bombs with seed {}", placed, self.seed);
        MineLayout::from_bomb_mask(bomb_mask)
    }
}
