/// Index of a node inside the [`MemoryManager`](super::MemoryManager) arena.
///
/// Indices are renumbered by every garbage collection, so an index must not
/// be kept across public [`Universe`](super::Universe) operations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(pub(super) u32);

impl NodeIdx {
    /// The dead leaf. Never collected.
    pub const DEAD: NodeIdx = NodeIdx(0);
    /// The alive leaf. Never collected.
    pub const ALIVE: NodeIdx = NodeIdx(1);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuadTreeNode {
    pub nw: NodeIdx,
    pub ne: NodeIdx,
    pub sw: NodeIdx,
    pub se: NodeIdx,
    /// 0 for leaves; a node of level `k` covers a `2^k` square
    pub level: u32,
    /// number of alive cells, saturating
    pub population: u64,
    /// center half advanced by `2^step` generations
    pub gen_cache: Option<NodeIdx>,
    /// center half advanced by `2^(level-2)` generations
    pub quick_cache: Option<NodeIdx>,
}

impl QuadTreeNode {
    pub(super) fn leaf(alive: bool) -> Self {
        Self {
            nw: NodeIdx::DEAD,
            ne: NodeIdx::DEAD,
            sw: NodeIdx::DEAD,
            se: NodeIdx::DEAD,
            level: 0,
            population: alive as u64,
            gen_cache: None,
            quick_cache: None,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.level == 0
    }

    #[inline]
    pub fn parts(&self) -> [NodeIdx; 4] {
        [self.nw, self.ne, self.sw, self.se]
    }

    /// Multiply-xor dispersion of the four child indices.
    #[inline]
    pub fn hash(nw: NodeIdx, ne: NodeIdx, sw: NodeIdx, se: NodeIdx) -> u64 {
        const K: u64 = 0x517c_c1b7_2722_0a95;
        let h = [nw, ne, sw, se]
            .into_iter()
            .fold(0u64, |h, x| (h.rotate_left(5) ^ x.0 as u64).wrapping_mul(K));
        h ^ (h >> 32)
    }
}
