use super::{Bounds, MemoryManager, NodeIdx, Universe, MAX_FIELD_LEVEL};
use ahash::AHashMap;

/// Smallest box containing every point; all zeros for an empty field.
pub fn get_bounds(field_x: &[i64], field_y: &[i64]) -> Bounds {
    assert_eq!(
        field_x.len(),
        field_y.len(),
        "coordinate arrays differ in length"
    );
    if field_x.is_empty() {
        return Bounds::default();
    }
    let mut bounds = Bounds {
        left: field_x[0],
        top: field_y[0],
        right: field_x[0],
        bottom: field_y[0],
    };
    for (&x, &y) in field_x.iter().zip(field_y) {
        bounds.left = bounds.left.min(x);
        bounds.right = bounds.right.max(x);
        bounds.top = bounds.top.min(y);
        bounds.bottom = bounds.bottom.max(y);
    }
    bounds
}

pub fn move_field(field_x: &mut [i64], field_y: &mut [i64], dx: i64, dy: i64) {
    for x in field_x.iter_mut() {
        *x += dx;
    }
    for y in field_y.iter_mut() {
        *y += dy;
    }
}

/// Shift the field so that its bounding box is centered on the origin.
/// `bounds` is updated accordingly.
pub fn make_center(field_x: &mut [i64], field_y: &mut [i64], bounds: &mut Bounds) {
    let offset_x = -((bounds.right - bounds.left) / 2) - bounds.left;
    let offset_y = -((bounds.bottom - bounds.top) / 2) - bounds.top;
    move_field(field_x, field_y, offset_x, offset_y);
    bounds.left += offset_x;
    bounds.right += offset_x;
    bounds.top += offset_y;
    bounds.bottom += offset_y;
}

/// Level of the smallest origin-centered square containing `bounds`; at least 3.
pub fn get_level_from_bounds(bounds: &Bounds) -> u32 {
    let max = [bounds.left, bounds.top, bounds.right, bounds.bottom]
        .into_iter()
        .map(|c| if c >= 0 { c as u64 + 1 } else { c.unsigned_abs() })
        .fold(4, u64::max);
    max.next_power_of_two().trailing_zeros() + 1
}

pub(super) fn level_for_point(x: i64, y: i64) -> u32 {
    get_level_from_bounds(&Bounds {
        left: x,
        top: y,
        right: x,
        bottom: y,
    })
}

/// Move the entries whose `test` coordinate has `mask` clear to the front.
/// Returns the number of such entries.
fn partition(test: &mut [i64], other: &mut [i64], mask: i64) -> usize {
    let (mut i, mut j) = (0, test.len());
    while i < j {
        if test[i] & mask == 0 {
            i += 1;
        } else {
            j -= 1;
            test.swap(i, j);
            other.swap(i, j);
        }
    }
    i
}

/// Sparse quadtree of a coordinate field, built before any node is interned.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FieldTree {
    #[default]
    Empty,
    Alive,
    Node(Box<[FieldTree; 4]>),
}

impl FieldTree {
    /// Tree of level `level` holding points of an origin-centered field.
    pub fn from_field(field_x: &[i64], field_y: &[i64], level: u32) -> Self {
        assert_eq!(
            field_x.len(),
            field_y.len(),
            "coordinate arrays differ in length"
        );
        assert!(level >= 1);
        let mut tree = FieldTree::Empty;
        for (&x, &y) in field_x.iter().zip(field_y) {
            tree.insert(x, y, level);
        }
        tree
    }

    fn insert(&mut self, mut x: i64, mut y: i64, level: u32) {
        let mut node = self;
        for j in (0..level - 1).rev() {
            let offset = 1 << j;
            let q = quadrant_index(x, y);
            x += if x < 0 { offset } else { -offset };
            y += if y < 0 { offset } else { -offset };
            node = node.child_mut(q);
        }
        *node.child_mut(quadrant_index(x, y)) = FieldTree::Alive;
    }

    fn child_mut(&mut self, q: usize) -> &mut FieldTree {
        if *self == FieldTree::Empty {
            *self = FieldTree::Node(Box::default());
        }
        match self {
            FieldTree::Node(children) => &mut children[q],
            _ => unreachable!("alive cells only appear at the bottom"),
        }
    }
}

fn quadrant_index(x: i64, y: i64) -> usize {
    (x >= 0) as usize | ((y >= 0) as usize) << 1
}

impl Universe {
    /// Replace the pattern by the given cells.
    ///
    /// The slices are reordered (coordinates are left unchanged). `bounds`,
    /// if given, must contain every cell; otherwise it is computed.
    pub fn setup_field(
        &mut self,
        field_x: &mut [i64],
        field_y: &mut [i64],
        bounds: Option<Bounds>,
    ) {
        assert_eq!(
            field_x.len(),
            field_y.len(),
            "coordinate arrays differ in length"
        );
        let bounds = bounds.unwrap_or_else(|| get_bounds(field_x, field_y));
        let level = get_level_from_bounds(&bounds);
        assert!(
            level <= MAX_FIELD_LEVEL,
            "field needs level {}, at most {} is supported",
            level,
            MAX_FIELD_LEVEL
        );

        // all coordinates become non-negative, so a node of level `k` splits on bit `k-1`
        let offset = 1 << (level - 1);
        move_field(field_x, field_y, offset, offset);
        let root = self.setup_field_recurse(field_x, field_y, level);
        move_field(field_x, field_y, -offset, -offset);

        self.replace_root(root);
    }

    /// Node of level `level` holding the given non-negative, level-aligned cells.
    pub(crate) fn setup_field_recurse(
        &mut self,
        field_x: &mut [i64],
        field_y: &mut [i64],
        level: u32,
    ) -> NodeIdx {
        if field_x.is_empty() {
            return self.mem.find_or_create_blank(level);
        }
        if level == 2 {
            return self.level2_setup(field_x, field_y);
        }
        let level = level - 1;
        let mask = 1 << level;

        let part_s = partition(field_y, field_x, mask);
        let (north_x, south_x) = field_x.split_at_mut(part_s);
        let (north_y, south_y) = field_y.split_at_mut(part_s);
        let part_ne = partition(north_x, north_y, mask);
        let part_se = partition(south_x, south_y, mask);
        let (nw_x, ne_x) = north_x.split_at_mut(part_ne);
        let (nw_y, ne_y) = north_y.split_at_mut(part_ne);
        let (sw_x, se_x) = south_x.split_at_mut(part_se);
        let (sw_y, se_y) = south_y.split_at_mut(part_se);

        let nw = self.setup_field_recurse(nw_x, nw_y, level);
        let ne = self.setup_field_recurse(ne_x, ne_y, level);
        let sw = self.setup_field_recurse(sw_x, sw_y, level);
        let se = self.setup_field_recurse(se_x, se_y, level);
        self.mem.find_or_create_node(nw, ne, sw, se)
    }

    fn level2_setup(&mut self, field_x: &[i64], field_y: &[i64]) -> NodeIdx {
        let cells = field_x
            .iter()
            .zip(field_y)
            .fold(0u16, |acc, (&x, &y)| acc | 1 << ((y & 3) << 2 | (x & 3)));
        if let Some(idx) = self.mem.find_level2(cells) {
            return idx;
        }
        let cell = |x: u16, y: u16| MemoryManager::leaf(cells >> (y << 2 | x) & 1 != 0);
        let nw = self
            .mem
            .find_or_create_node(cell(0, 0), cell(1, 0), cell(0, 1), cell(1, 1));
        let ne = self
            .mem
            .find_or_create_node(cell(2, 0), cell(3, 0), cell(2, 1), cell(3, 1));
        let sw = self
            .mem
            .find_or_create_node(cell(0, 2), cell(1, 2), cell(0, 3), cell(1, 3));
        let se = self
            .mem
            .find_or_create_node(cell(2, 2), cell(3, 2), cell(2, 3), cell(3, 3));
        let idx = self.mem.find_or_create_node(nw, ne, sw, se);
        self.mem.remember_level2(cells, idx);
        idx
    }

    /// Node of level `level` built from a sparse field tree.
    pub fn setup_field_from_tree(&mut self, tree: &FieldTree, level: u32) -> NodeIdx {
        match tree {
            FieldTree::Empty => self.mem.find_or_create_blank(level),
            FieldTree::Alive => {
                assert_eq!(level, 0, "alive cells only appear at the bottom");
                NodeIdx::ALIVE
            }
            FieldTree::Node(children) => {
                let [nw, ne, sw, se] = children
                    .each_ref()
                    .map(|child| self.setup_field_from_tree(child, level - 1));
                self.mem.find_or_create_node(nw, ne, sw, se)
            }
        }
    }

    /// Replace the pattern by a metapattern: every cell of the origin-centered
    /// field becomes a copy of `on`'s pattern, every other cell of its
    /// bounding square a copy of `off`'s. Both metacells are taken from the
    /// roots of the given universes and padded to a common level.
    pub fn setup_meta(
        &mut self,
        off: &Universe,
        on: &Universe,
        field_x: &[i64],
        field_y: &[i64],
        bounds: Bounds,
    ) {
        let mut off_cell = self.import_tree(off, off.root, &mut AHashMap::new());
        let mut on_cell = self.import_tree(on, on.root, &mut AHashMap::new());
        while self.mem.get(off_cell).level < self.mem.get(on_cell).level {
            off_cell = self.expand_universe(off_cell);
        }
        while self.mem.get(on_cell).level < self.mem.get(off_cell).level {
            on_cell = self.expand_universe(on_cell);
        }

        let level = get_level_from_bounds(&bounds);
        let tree = FieldTree::from_field(field_x, field_y, level);
        let root = self.setup_meta_from_tree(&tree, level, on_cell, off_cell);
        self.replace_root(root);
    }

    fn setup_meta_from_tree(
        &mut self,
        tree: &FieldTree,
        level: u32,
        on: NodeIdx,
        off: NodeIdx,
    ) -> NodeIdx {
        match tree {
            FieldTree::Alive => on,
            FieldTree::Empty => {
                let mut dead = off;
                for _ in 0..level {
                    dead = self.mem.find_or_create_node(dead, dead, dead, dead);
                }
                dead
            }
            FieldTree::Node(children) => {
                let [nw, ne, sw, se] = children
                    .each_ref()
                    .map(|child| self.setup_meta_from_tree(child, level - 1, on, off));
                self.mem.find_or_create_node(nw, ne, sw, se)
            }
        }
    }

    /// Copy a subtree of another universe into this one.
    fn import_tree(
        &mut self,
        other: &Universe,
        idx: NodeIdx,
        imported: &mut AHashMap<NodeIdx, NodeIdx>,
    ) -> NodeIdx {
        let n = other.mem.get(idx);
        if n.is_leaf() {
            return idx;
        }
        if let Some(&result) = imported.get(&idx) {
            return result;
        }
        let [nw, ne, sw, se] = n.parts().map(|x| self.import_tree(other, x, imported));
        let result = self.mem.find_or_create_node(nw, ne, sw, se);
        imported.insert(idx, result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_bounds() {
        let level = |left, top, right, bottom| {
            get_level_from_bounds(&Bounds {
                left,
                top,
                right,
                bottom,
            })
        };
        assert_eq!(level(0, 0, 0, 0), 3);
        assert_eq!(level(-4, -4, 3, 3), 3);
        assert_eq!(level(-5, 0, 0, 0), 4);
        assert_eq!(level(0, 0, 4, 0), 4);
        assert_eq!(level(0, 0, 7, 0), 4);
        assert_eq!(level(0, 0, 8, 0), 5);
        assert_eq!(level(i64::MIN, 0, i64::MAX, 0), 64);
    }

    #[test]
    fn test_bounds_and_center() {
        let mut xs = vec![3, 7, 5];
        let mut ys = vec![-2, 0, 4];
        let mut bounds = get_bounds(&xs, &ys);
        assert_eq!(
            bounds,
            Bounds {
                left: 3,
                top: -2,
                right: 7,
                bottom: 4
            }
        );
        make_center(&mut xs, &mut ys, &mut bounds);
        assert_eq!(
            bounds,
            Bounds {
                left: -2,
                top: -3,
                right: 2,
                bottom: 3
            }
        );
        assert_eq!(xs, vec![-2, 2, 0]);
        assert_eq!(ys, vec![-3, -1, 3]);
        assert_eq!(get_bounds(&[], &[]), Bounds::default());

        // odd extents round towards the east and south
        let (mut xs, mut ys) = (vec![0, 1], vec![0, 0]);
        let mut bounds = get_bounds(&xs, &ys);
        make_center(&mut xs, &mut ys, &mut bounds);
        assert_eq!(xs, vec![0, 1]);
    }

    #[test]
    fn test_partition() {
        let mut test = vec![5, 1, 4, 6, 0, 7];
        let mut other = vec![0, 1, 2, 3, 4, 5];
        let split = partition(&mut test, &mut other, 4);
        assert_eq!(split, 2);
        assert!(test[..split].iter().all(|x| x & 4 == 0));
        assert!(test[split..].iter().all(|x| x & 4 != 0));
        for (t, o) in test.iter().zip(other.iter()) {
            assert_eq!([5, 1, 4, 6, 0, 7][*o as usize], *t);
        }
    }

    #[test]
    fn test_setup_field() {
        let mut universe = Universe::new();
        let cells = [(0, 0), (-1, -1), (5, -9), (-20, 13), (3, 3), (3, 3)];
        let mut xs = cells.iter().map(|c| c.0).collect::<Vec<_>>();
        let mut ys = cells.iter().map(|c| c.1).collect::<Vec<_>>();
        universe.setup_field(&mut xs, &mut ys, None);
        assert_eq!(universe.population(), 5);
        assert_eq!(universe.root_level(), 6);
        for (x, y) in cells {
            assert!(universe.get_bit(x, y));
        }
        assert!(!universe.get_bit(1, 0));
        // coordinates are kept, order is not
        let mut back = xs.into_iter().zip(ys).collect::<Vec<_>>();
        back.sort_unstable();
        let mut cells = cells.to_vec();
        cells.sort_unstable();
        assert_eq!(back, cells);
    }

    #[test]
    fn test_field_tree() {
        let xs = [0, -1, 2];
        let ys = [0, -1, -3];
        let tree = FieldTree::from_field(&xs, &ys, 3);
        let mut universe = Universe::new();
        let idx = universe.setup_field_from_tree(&tree, 3);
        universe.replace_root(idx);
        assert_eq!(universe.population(), 3);
        for (x, y) in xs.into_iter().zip(ys) {
            assert!(universe.get_bit(x, y));
        }
        assert_eq!(FieldTree::from_field(&[], &[], 3), FieldTree::Empty);
    }

    #[test]
    fn test_setup_meta() {
        let off = Universe::new();
        let mut on = Universe::new();
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            on.set_bit(x, y, true);
        }
        let (xs, ys) = ([0, 1], [0, 0]);
        let mut universe = Universe::new();
        universe.setup_meta(&off, &on, &xs, &ys, get_bounds(&xs, &ys));
        // 3 levels of metapattern over 3 levels of metacell
        assert_eq!(universe.root_level(), 6);
        assert_eq!(universe.population(), 8);
        for (x, y) in [(4, 4), (5, 5), (12, 4), (13, 5)] {
            assert!(universe.get_bit(x, y));
        }
        universe.next_generation(true);
        assert_eq!(universe.population(), 8);
    }
}
