use crate::*;
pub use random::*;

mod random;

pub trait LayoutGenerator {
    fn generate(self, config: &GameConfig) -> MineLayout;
}

/// A prepared layout is its own generator, used to replay known boards.
impl LayoutGenerator for MineLayout {
    fn generate(self, config: &GameConfig) -> MineLayout {
        if self.size() != config.size || self.bomb_count() != config.bombs {
            log::warn!(
                "Prepared layout {:?} with {} bombs does not match requested {:?} with {}",
                self.size(),
                self.bomb_count(),
                config.size,
                config.bombs
            );
        }
        self
    }
}
