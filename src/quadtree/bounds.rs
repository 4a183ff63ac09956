use super::{NodeIdx, Universe};

/// Inclusive bounding box; `y` grows southwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl Bounds {
    pub fn width(&self) -> u64 {
        (self.right as i128 - self.left as i128 + 1) as u64
    }

    pub fn height(&self) -> u64 {
        (self.bottom as i128 - self.top as i128 + 1) as u64
    }
}

const MASK_LEFT: u8 = 1;
const MASK_TOP: u8 = 2;
const MASK_RIGHT: u8 = 4;
const MASK_BOTTOM: u8 = 8;
const MASK_ALL: u8 = MASK_LEFT | MASK_TOP | MASK_RIGHT | MASK_BOTTOM;

// Wide box used while searching; roots may be larger than i64 allows.
struct Extent {
    left: i128,
    top: i128,
    right: i128,
    bottom: i128,
}

fn saturate(value: i128) -> i64 {
    value.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

impl Universe {
    /// Tight bounding box of all alive cells; all zeros if there are none.
    pub fn get_root_bounds(&self) -> Bounds {
        let root = self.mem.get(self.root);
        if root.population == 0 {
            return Bounds::default();
        }
        let mut extent = Extent {
            left: i128::MAX,
            top: i128::MAX,
            right: i128::MIN,
            bottom: i128::MIN,
        };
        let offset = 1i128 << (root.level - 1);
        self.node_get_boundary(self.root, -offset, -offset, MASK_ALL, &mut extent);
        Bounds {
            left: saturate(extent.left),
            top: saturate(extent.top),
            right: saturate(extent.right),
            bottom: saturate(extent.bottom),
        }
    }

    /// `find_mask` holds the sides this node may still improve.
    fn node_get_boundary(
        &self,
        idx: NodeIdx,
        left: i128,
        top: i128,
        find_mask: u8,
        extent: &mut Extent,
    ) {
        let n = self.mem.get(idx);
        if n.population == 0 || find_mask == 0 {
            return;
        }
        if n.is_leaf() {
            extent.left = extent.left.min(left);
            extent.right = extent.right.max(left);
            extent.top = extent.top.min(top);
            extent.bottom = extent.bottom.max(top);
            return;
        }

        let size = 1i128 << n.level;
        if left >= extent.left
            && left + size - 1 <= extent.right
            && top >= extent.top
            && top + size - 1 <= extent.bottom
        {
            // already inside the box found so far
            return;
        }

        let populated = |x: NodeIdx| self.mem.get(x).population != 0;
        let [mut find_nw, mut find_ne, mut find_sw, mut find_se] = [find_mask; 4];
        if populated(n.nw) {
            find_ne &= !MASK_LEFT;
            find_sw &= !MASK_TOP;
            find_se &= !(MASK_LEFT | MASK_TOP);
        }
        if populated(n.ne) {
            find_nw &= !MASK_RIGHT;
            find_se &= !MASK_TOP;
            find_sw &= !(MASK_RIGHT | MASK_TOP);
        }
        if populated(n.sw) {
            find_se &= !MASK_LEFT;
            find_nw &= !MASK_BOTTOM;
            find_ne &= !(MASK_LEFT | MASK_BOTTOM);
        }
        if populated(n.se) {
            find_sw &= !MASK_RIGHT;
            find_ne &= !MASK_BOTTOM;
            find_nw &= !(MASK_RIGHT | MASK_BOTTOM);
        }

        let half = size / 2;
        self.node_get_boundary(n.nw, left, top, find_nw, extent);
        self.node_get_boundary(n.ne, left + half, top, find_ne, extent);
        self.node_get_boundary(n.sw, left, top + half, find_sw, extent);
        self.node_get_boundary(n.se, left + half, top + half, find_se, extent);
    }

    /// Coordinates of every alive cell, in quadtree order.
    pub fn live_cells(&self) -> Vec<(i64, i64)> {
        let mut result = Vec::new();
        let offset = 1i128 << (self.root_level() - 1);
        self.collect_cells(self.root, -offset, -offset, &mut result);
        result
    }

    fn collect_cells(&self, idx: NodeIdx, left: i128, top: i128, result: &mut Vec<(i64, i64)>) {
        let n = self.mem.get(idx);
        if n.population == 0 {
            return;
        }
        if n.is_leaf() {
            result.push((saturate(left), saturate(top)));
            return;
        }
        let half = 1i128 << (n.level - 1);
        for (i, child) in n.parts().into_iter().enumerate() {
            let (dx, dy) = ((i & 1) as i128, (i >> 1) as i128);
            self.collect_cells(child, left + half * dx, top + half * dy, result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    const SEED: u64 = 42;

    fn brute_bounds(cells: &[(i64, i64)]) -> Bounds {
        let xs = cells.iter().map(|c| c.0).collect::<Vec<_>>();
        let ys = cells.iter().map(|c| c.1).collect::<Vec<_>>();
        crate::get_bounds(&xs, &ys)
    }

    #[test]
    fn test_empty_bounds() {
        let universe = Universe::new();
        assert_eq!(universe.get_root_bounds(), Bounds::default());
        assert!(universe.live_cells().is_empty());
    }

    #[test]
    fn test_single_cell() {
        let mut universe = Universe::new();
        universe.set_bit(-7, 12, true);
        assert_eq!(
            universe.get_root_bounds(),
            Bounds {
                left: -7,
                top: 12,
                right: -7,
                bottom: 12
            }
        );
        assert_eq!(universe.live_cells(), vec![(-7, 12)]);
    }

    #[test]
    fn test_random_bounds() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(SEED);
        for _ in 0..20 {
            let mut universe = Universe::new();
            let n = rng.gen_range(1..30);
            for _ in 0..n {
                universe.set_bit(rng.gen_range(-100..100), rng.gen_range(-100..100), true);
            }
            let cells = universe.live_cells();
            assert_eq!(cells.len() as u64, universe.population());
            assert_eq!(universe.get_root_bounds(), brute_bounds(&cells));
            universe.next_generation(false);
            let cells = universe.live_cells();
            if !cells.is_empty() {
                assert_eq!(universe.get_root_bounds(), brute_bounds(&cells));
            }
        }
    }

    #[test]
    fn test_width_height() {
        let b = Bounds {
            left: -2,
            top: 0,
            right: 2,
            bottom: 0,
        };
        assert_eq!((b.width(), b.height()), (5, 1));
    }
}
