use super::{NodeIdx, QuadTreeNode};
use crate::{ConfigSnapshot, NiceInt};
use ahash::AHashMap;
use std::collections::HashMap;
use std::hash::{BuildHasherDefault, Hash, Hasher};

/// Key of the canonical table: children in nw, ne, sw, se order.
#[derive(Clone, Copy, PartialEq, Eq)]
struct NodeKey([NodeIdx; 4]);

impl Hash for NodeKey {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        let [nw, ne, sw, se] = self.0;
        state.write_u64(QuadTreeNode::hash(nw, ne, sw, se));
    }
}

/// Passes the precomputed node hash straight through.
#[derive(Default)]
struct NodeHasher {
    h: u64,
}

impl Hasher for NodeHasher {
    #[inline(always)]
    fn finish(&self) -> u64 {
        self.h
    }
    #[inline(always)]
    fn write_u64(&mut self, x: u64) {
        self.h = x
    }
    #[inline(always)]
    fn write(&mut self, _input: &[u8]) {
        unimplemented!()
    }
}

type NodeHasherBuilder = BuildHasherDefault<NodeHasher>;

/// Hash-consing arena for quadtree nodes.
///
/// Every combination of four children exists at most once, so two nodes are
/// equal iff their indices are equal. Leaves are stored at indices 0 (dead)
/// and 1 (alive) and survive every collection.
pub struct MemoryManager {
    // all allocated nodes; position is the node's index
    nodes: Vec<QuadTreeNode>,
    // canonical table: children -> index
    hashtable: HashMap<NodeKey, NodeIdx, NodeHasherBuilder>,
    // empty trees by level
    blank_nodes: Vec<NodeIdx>,
    // level-2 nodes by their 16-bit cell mask
    level2_nodes: AHashMap<u16, NodeIdx>,
    capacity_log2: u32,
    max_capacity_log2: u32,
    load_factor_percent: u32,
    gc_threshold: usize,
    // how many times nodes were found
    pub hits: u64,
    // how many times nodes were inserted
    pub misses: u64,
    pub gc_runs: u64,
    pub last_gc_freed: usize,
}

impl MemoryManager {
    /// Create a new store tuned by the process-wide configuration.
    pub fn new() -> Self {
        Self::with_config(crate::get_config())
    }

    pub fn with_config(config: ConfigSnapshot) -> Self {
        assert!(
            config.memory_manager_cap_log2 <= config.memory_manager_max_cap_log2,
            "initial capacity exceeds the ceiling"
        );
        assert!(
            config.memory_manager_max_cap_log2 < 32,
            "u32 is insufficient"
        );
        assert!(
            (1..=100).contains(&config.gc_load_factor_percent),
            "load factor must be a percentage"
        );
        let capacity = 1usize << config.memory_manager_cap_log2;
        let mut nodes = Vec::with_capacity(capacity);
        nodes.push(QuadTreeNode::leaf(false));
        nodes.push(QuadTreeNode::leaf(true));
        let mut result = Self {
            nodes,
            hashtable: HashMap::with_capacity_and_hasher(capacity, NodeHasherBuilder::default()),
            blank_nodes: vec![NodeIdx::DEAD],
            level2_nodes: AHashMap::new(),
            capacity_log2: config.memory_manager_cap_log2,
            max_capacity_log2: config.memory_manager_max_cap_log2,
            load_factor_percent: config.gc_load_factor_percent,
            gc_threshold: 0,
            hits: 0,
            misses: 0,
            gc_runs: 0,
            last_gc_freed: 0,
        };
        result.gc_threshold = result.capacity_threshold();
        result
    }

    #[inline]
    pub fn get(&self, idx: NodeIdx) -> &QuadTreeNode {
        &self.nodes[idx.index()]
    }

    #[inline]
    pub fn leaf(alive: bool) -> NodeIdx {
        if alive {
            NodeIdx::ALIVE
        } else {
            NodeIdx::DEAD
        }
    }

    /// Number of nodes in the arena, leaves included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[QuadTreeNode] {
        &self.nodes
    }

    pub fn capacity(&self) -> usize {
        1 << self.capacity_log2
    }

    /// True once the live-node count went past the collection threshold.
    pub fn needs_gc(&self) -> bool {
        self.nodes.len() > self.gc_threshold
    }

    fn capacity_threshold(&self) -> usize {
        self.capacity() * self.load_factor_percent as usize / 100
    }

    /// Find a node with the given children; if it is not present, it is created.
    ///
    /// All four children must share the same level.
    pub fn find_or_create_node(
        &mut self,
        nw: NodeIdx,
        ne: NodeIdx,
        sw: NodeIdx,
        se: NodeIdx,
    ) -> NodeIdx {
        let key = NodeKey([nw, ne, sw, se]);
        if let Some(&idx) = self.hashtable.get(&key) {
            self.hits += 1;
            return idx;
        }
        self.misses += 1;

        let [a, b, c, d] = key.0.map(|x| *self.get(x));
        assert!(
            a.level == b.level && a.level == c.level && a.level == d.level,
            "children of a node must share the same level"
        );
        let idx = NodeIdx(u32::try_from(self.nodes.len()).expect("u32 is insufficient"));
        self.nodes.push(QuadTreeNode {
            nw,
            ne,
            sw,
            se,
            level: a.level + 1,
            population: a
                .population
                .saturating_add(b.population)
                .saturating_add(c.population)
                .saturating_add(d.population),
            gen_cache: None,
            quick_cache: None,
        });
        self.hashtable.insert(key, idx);
        idx
    }

    /// Returns the node of the given level with no alive cells.
    pub fn find_or_create_blank(&mut self, level: u32) -> NodeIdx {
        while self.blank_nodes.len() <= level as usize {
            let t = *self.blank_nodes.last().unwrap();
            let blank = self.find_or_create_node(t, t, t, t);
            self.blank_nodes.push(blank);
        }
        self.blank_nodes[level as usize]
    }

    pub(super) fn find_level2(&self, cells: u16) -> Option<NodeIdx> {
        self.level2_nodes.get(&cells).copied()
    }

    pub(super) fn remember_level2(&mut self, cells: u16, idx: NodeIdx) {
        self.level2_nodes.insert(cells, idx);
    }

    #[inline]
    pub(super) fn set_gen_cache(&mut self, idx: NodeIdx, result: NodeIdx) {
        self.nodes[idx.index()].gen_cache = Some(result);
    }

    #[inline]
    pub(super) fn set_quick_cache(&mut self, idx: NodeIdx, result: NodeIdx) {
        self.nodes[idx.index()].quick_cache = Some(result);
    }

    /// Forget memoized results: `gen_cache` always, `quick_cache` if `also_quick`.
    pub fn clear_cache(&mut self, also_quick: bool) {
        for n in self.nodes.iter_mut() {
            n.gen_cache = None;
            if also_quick {
                n.quick_cache = None;
            }
        }
    }

    /// Rebuild the arena keeping only nodes reachable from `roots`
    /// through children and both caches.
    ///
    /// Survivors get fresh sequential indices (children before parents) and
    /// `roots` is rewritten in place. Any other index becomes invalid.
    pub fn collect(&mut self, roots: &mut [NodeIdx]) {
        let old = std::mem::take(&mut self.nodes);
        self.capacity_log2 = (self.capacity_log2 + 1).min(self.max_capacity_log2);
        let capacity = self.capacity();
        self.nodes = Vec::with_capacity(capacity);
        self.nodes.push(QuadTreeNode::leaf(false));
        self.nodes.push(QuadTreeNode::leaf(true));
        self.hashtable = HashMap::with_capacity_and_hasher(capacity, NodeHasherBuilder::default());
        self.blank_nodes.truncate(1);
        self.level2_nodes.clear();

        let mut remap = vec![None; old.len()];
        remap[NodeIdx::DEAD.index()] = Some(NodeIdx::DEAD);
        remap[NodeIdx::ALIVE.index()] = Some(NodeIdx::ALIVE);
        for root in roots.iter_mut() {
            *root = self.relocate(*root, &old, &mut remap);
        }

        self.gc_runs += 1;
        self.last_gc_freed = old.len() - self.nodes.len();
        self.gc_threshold = self.capacity_threshold().max(self.nodes.len() * 2);
    }

    fn relocate(
        &mut self,
        idx: NodeIdx,
        old: &[QuadTreeNode],
        remap: &mut [Option<NodeIdx>],
    ) -> NodeIdx {
        if let Some(moved) = remap[idx.index()] {
            return moved;
        }
        let n = old[idx.index()];
        let [nw, ne, sw, se] = n.parts().map(|x| self.relocate(x, old, remap));
        let gen_cache = n.gen_cache.map(|x| self.relocate(x, old, remap));
        let quick_cache = n.quick_cache.map(|x| self.relocate(x, old, remap));

        let moved = NodeIdx(self.nodes.len() as u32);
        self.nodes.push(QuadTreeNode {
            nw,
            ne,
            sw,
            se,
            gen_cache,
            quick_cache,
            ..n
        });
        self.hashtable.insert(NodeKey([nw, ne, sw, se]), moved);
        remap[idx.index()] = Some(moved);
        moved
    }

    pub fn bytes_total(&self) -> usize {
        self.nodes.capacity() * std::mem::size_of::<QuadTreeNode>()
            + self.hashtable.capacity() * (std::mem::size_of::<(NodeKey, NodeIdx)>() + 1)
    }

    pub fn stats_fast(&self) -> String {
        let mut s = String::new();
        s += &format!(
            "memory consumption: {} KB\n",
            NiceInt::from_usize(self.bytes_total() >> 10)
        );
        s += &format!(
            "nodes / capacity / gc threshold: {} / {} / {}\n",
            NiceInt::from_usize(self.nodes.len()),
            NiceInt::from_usize(self.capacity()),
            NiceInt::from_usize(self.gc_threshold),
        );
        s += &format!(
            "hashtable misses / hits: {} / {}\n",
            NiceInt::from(self.misses),
            NiceInt::from(self.hits),
        );
        s += &format!(
            "collections: {}, freed by last: {}\n",
            NiceInt::from(self.gc_runs),
            NiceInt::from_usize(self.last_gc_freed),
        );
        s
    }
}

impl Default for MemoryManager {
    fn default() -> Self {
        Self::new()
    }
}
