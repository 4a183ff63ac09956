use super::{field::level_for_point, pow2, MemoryManager, NodeIdx, QuadTreeNode, MAX_LEVEL};
use crate::{ConfigSnapshot, NiceInt, Rule};

#[derive(Clone, Copy, Debug)]
struct RewindState {
    root: NodeIdx,
    generation: u64,
}

/// An unbounded Life-like universe driven by Hashlife.
///
/// The root node is centered on the origin: a root of level `k` covers
/// `[-2^(k-1), 2^(k-1))` on both axes, with `y` growing southwards.
pub struct Universe {
    pub(super) root: NodeIdx,
    rewind: Option<RewindState>,
    pub(super) generation: u64,
    pub(super) step: u32,
    pub(super) rule: Rule,
    pub(super) mem: MemoryManager,
    config: ConfigSnapshot,
}

impl Universe {
    /// Empty universe with rule B3/S23, tuned by the process-wide configuration.
    pub fn new() -> Self {
        Self::with_config(crate::get_config())
    }

    pub fn with_config(config: ConfigSnapshot) -> Self {
        let mut mem = MemoryManager::with_config(config);
        let root = mem.find_or_create_blank(3);
        Self {
            root,
            rewind: None,
            generation: 0,
            step: 0,
            rule: Rule::CONWAY,
            mem,
            config,
        }
    }

    /// Drop the pattern, the rewind state and every stored node.
    /// Rule and step are kept.
    pub fn clear_pattern(&mut self) {
        self.mem = MemoryManager::with_config(self.config);
        self.root = self.mem.find_or_create_blank(3);
        self.rewind = None;
        self.generation = 0;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn rule(&self) -> Rule {
        self.rule
    }

    pub fn population(&self) -> u64 {
        self.mem.get(self.root).population
    }

    pub fn root_level(&self) -> u32 {
        self.mem.get(self.root).level
    }

    pub fn memory(&self) -> &MemoryManager {
        &self.mem
    }

    /// Advance single calls by `2^step` generations from now on.
    pub fn set_step(&mut self, step: u32) {
        assert!(step <= MAX_LEVEL - 3, "step {} is too large", step);
        if step != self.step {
            self.step = step;
            self.mem.clear_cache(false);
        }
    }

    /// Set the rule from survival and birth neighbour-count masks (bits 0..=8).
    ///
    /// Panics on B0 (bit 0 of `birth`), which this engine cannot simulate.
    pub fn set_rules(&mut self, survive: u16, birth: u16) {
        let rule = Rule::new(survive, birth);
        if rule != self.rule {
            self.rule = rule;
            self.mem.clear_cache(true);
        }
    }

    pub fn set_rule(&mut self, rule: Rule) {
        self.set_rules(rule.survive, rule.birth);
    }

    pub fn save_rewind_state(&mut self) {
        self.rewind = Some(RewindState {
            root: self.root,
            generation: self.generation,
        });
    }

    /// Go back to the last saved state. Returns `false` if nothing was saved.
    pub fn restore_rewind_state(&mut self) -> bool {
        let Some(state) = self.rewind else {
            return false;
        };
        self.root = state.root;
        self.generation = state.generation;
        self.garbage_collect();
        true
    }

    pub fn has_rewind_state(&self) -> bool {
        self.rewind.is_some()
    }

    pub fn get_bit(&self, x: i64, y: i64) -> bool {
        if level_for_point(x, y) > self.root_level() {
            return false;
        }
        let mut node = *self.mem.get(self.root);
        let (mut x, mut y) = (x as i128, y as i128);
        loop {
            if node.population == 0 {
                return false;
            }
            if node.is_leaf() {
                return true;
            }
            let (q, dx, dy) = quadrant(&node, x, y);
            node = *self.mem.get(node.parts()[q]);
            x += dx;
            y += dy;
        }
    }

    pub fn set_bit(&mut self, x: i64, y: i64, living: bool) {
        let level = level_for_point(x, y);
        if living {
            while self.root_level() < level {
                self.root = self.expand_universe(self.root);
            }
        } else if level > self.root_level() {
            return;
        }
        self.root = self.node_set_bit(self.root, x as i128, y as i128, living);
        self.garbage_collect();
    }

    fn node_set_bit(&mut self, idx: NodeIdx, x: i128, y: i128, living: bool) -> NodeIdx {
        let node = *self.mem.get(idx);
        if node.is_leaf() {
            return MemoryManager::leaf(living);
        }
        let (q, dx, dy) = quadrant(&node, x, y);
        let mut parts = node.parts();
        parts[q] = self.node_set_bit(parts[q], x + dx, y + dy, living);
        let [nw, ne, sw, se] = parts;
        self.mem.find_or_create_node(nw, ne, sw, se)
    }

    /// Collect garbage now, regardless of the threshold.
    pub fn run_gc(&mut self) {
        let mut roots = vec![self.root];
        if let Some(state) = self.rewind {
            roots.push(state.root);
        }
        self.mem.collect(&mut roots);
        self.root = roots[0];
        if let Some(state) = self.rewind.as_mut() {
            state.root = roots[1];
        }
    }

    /// Safe point: no index other than the roots is alive here.
    pub(super) fn garbage_collect(&mut self) {
        if self.mem.needs_gc() {
            self.run_gc();
        }
    }

    pub(crate) fn node(&self, idx: NodeIdx) -> &QuadTreeNode {
        self.mem.get(idx)
    }

    pub(crate) fn root(&self) -> NodeIdx {
        self.root
    }

    pub(crate) fn empty_tree(&mut self, level: u32) -> NodeIdx {
        self.mem.find_or_create_blank(level)
    }

    pub(crate) fn create_tree(
        &mut self,
        nw: NodeIdx,
        ne: NodeIdx,
        sw: NodeIdx,
        se: NodeIdx,
    ) -> NodeIdx {
        self.mem.find_or_create_node(nw, ne, sw, se)
    }

    /// Replace the whole pattern by `root`, keeping it at level 3 or more.
    pub(crate) fn replace_root(&mut self, mut root: NodeIdx) {
        while self.mem.get(root).level < 3 {
            root = self.expand_universe(root);
        }
        self.root = root;
        self.generation = 0;
        self.garbage_collect();
    }

    pub fn statistics(&self) -> String {
        let mut s = "Engine: Hashlife\n".to_string();
        s += &format!("Rule: {}\n", self.rule);
        s += &format!("Root level: {}\n", self.root_level());
        s += &format!(
            "Generation: {} (step 2^{})\n",
            NiceInt::from(self.generation),
            self.step
        );
        s += &format!("Population: {}\n", NiceInt::from(self.population()));
        s += &self.mem.stats_fast();
        s
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self::new()
    }
}

/// Child holding `(x, y)` and the shift into that child's frame.
fn quadrant(node: &QuadTreeNode, x: i128, y: i128) -> (usize, i128, i128) {
    let offset = (1i128 << node.level) >> 2;
    match (x < 0, y < 0) {
        (true, true) => (0, offset, offset),
        (false, true) => (1, -offset, offset),
        (true, false) => (2, offset, -offset),
        (false, false) => (3, -offset, -offset),
    }
}
