//! Collision layers.
//!
//! Each body carries a layer; a symmetric boolean matrix decides which
//! layer pairs may collide at all. The matrix is configured at setup and
//! consulted before the narrow phase.

/// Collision layer of a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layer {
    #[default]
    None,
    Player,
    Ball,
    Wall,
    MiddleWall,
    Door,
}

impl Layer {
    pub const COUNT: usize = 6;

    #[inline]
    fn index(self) -> usize {
        match self {
            Layer::None => 0,
            Layer::Player => 1,
            Layer::Ball => 2,
            Layer::Wall => 3,
            Layer::MiddleWall => 4,
            Layer::Door => 5,
        }
    }
}

/// Symmetric boolean matrix over layer pairs. Everything collides with
/// everything until told otherwise.
#[derive(Debug, Clone)]
pub struct LayerCollisionMatrix {
    collide: [[bool; Layer::COUNT]; Layer::COUNT],
}

impl Default for LayerCollisionMatrix {
    fn default() -> Self {
        Self {
            collide: [[true; Layer::COUNT]; Layer::COUNT],
        }
    }
}

impl LayerCollisionMatrix {
    /// Set both triangles at once; the matrix stays symmetric by
    /// construction.
    pub fn set_collision(&mut self, a: Layer, b: Layer, value: bool) {
        self.collide[a.index()][b.index()] = value;
        self.collide[b.index()][a.index()] = value;
    }

    #[inline]
    pub fn has_collision(&self, a: Layer, b: Layer) -> bool {
        self.collide[a.index()][b.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_all_colliding() {
        let matrix = LayerCollisionMatrix::default();
        assert!(matrix.has_collision(Layer::Player, Layer::Ball));
        assert!(matrix.has_collision(Layer::None, Layer::None));
    }

    #[test]
    fn symmetry_holds_for_every_pair() {
        let mut matrix = LayerCollisionMatrix::default();
        matrix.set_collision(Layer::Ball, Layer::MiddleWall, false);
        matrix.set_collision(Layer::Wall, Layer::Door, false);

        let layers = [
            Layer::None,
            Layer::Player,
            Layer::Ball,
            Layer::Wall,
            Layer::MiddleWall,
            Layer::Door,
        ];
        for a in layers {
            for b in layers {
                assert_eq!(matrix.has_collision(a, b), matrix.has_collision(b, a));
            }
        }
        assert!(!matrix.has_collision(Layer::MiddleWall, Layer::Ball));
    }
}
