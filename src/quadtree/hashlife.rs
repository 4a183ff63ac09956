use super::{pow2, MemoryManager, NodeIdx, Universe, MAX_LEVEL};

/// Number of alive neighbours of the center (bit 5) of a 3x3 window packed
/// into 11 bits with a row stride of 4.
const NEIGHBOURS_COUNT: [u8; 1 << 11] = {
    let mut table = [0; 1 << 11];
    let mut mask = 0;
    while mask < table.len() {
        table[mask] = (mask & 0x757).count_ones() as u8;
        mask += 1;
    }
    table
};

impl Universe {
    /// Next state of the center cell of a 3x3 window.
    #[inline]
    fn eval_mask(&self, bitmask: u16) -> NodeIdx {
        let rule = if bitmask & 1 << 5 != 0 {
            self.rule.survive
        } else {
            self.rule.birth
        };
        let neighbours = NEIGHBOURS_COUNT[(bitmask & 0x7FF) as usize];
        MemoryManager::leaf(rule >> neighbours & 1 != 0)
    }

    /// Center 2x2 of a 4x4 node advanced by one generation.
    fn level2_next(&mut self, idx: NodeIdx) -> NodeIdx {
        let n = *self.mem.get(idx);
        let [nw, ne, sw, se] = n.parts().map(|x| *self.mem.get(x));
        let bit = |x: NodeIdx| self.mem.get(x).population as u16;
        // row-major, bit 15 is the north-west corner
        let bitmask = bit(nw.nw) << 15
            | bit(nw.ne) << 14
            | bit(ne.nw) << 13
            | bit(ne.ne) << 12
            | bit(nw.sw) << 11
            | bit(nw.se) << 10
            | bit(ne.sw) << 9
            | bit(ne.se) << 8
            | bit(sw.nw) << 7
            | bit(sw.ne) << 6
            | bit(se.nw) << 5
            | bit(se.ne) << 4
            | bit(sw.sw) << 3
            | bit(sw.se) << 2
            | bit(se.sw) << 1
            | bit(se.se);
        let [r_nw, r_ne, r_sw, r_se] =
            [bitmask >> 5, bitmask >> 4, bitmask >> 1, bitmask].map(|m| self.eval_mask(m));
        self.mem.find_or_create_node(r_nw, r_ne, r_sw, r_se)
    }

    /// Node made of the inner corners of four adjacent nodes.
    fn centered(&mut self, nw: NodeIdx, ne: NodeIdx, sw: NodeIdx, se: NodeIdx) -> NodeIdx {
        let (nw, ne, sw, se) = (
            self.mem.get(nw).se,
            self.mem.get(ne).sw,
            self.mem.get(sw).ne,
            self.mem.get(se).nw,
        );
        self.mem.find_or_create_node(nw, ne, sw, se)
    }

    /// Center half of a node advanced by `2^step` generations.
    ///
    /// The node's level must be at least `step + 2`.
    pub(super) fn next_gen(&mut self, idx: NodeIdx) -> NodeIdx {
        let n = *self.mem.get(idx);
        if let Some(cache) = n.gen_cache {
            return cache;
        }
        if n.level == 2 || self.step + 2 == n.level {
            return self.quick_next_gen(idx);
        }

        let [nwnw, nwne, nwsw, nwse] = self.mem.get(n.nw).parts();
        let [nenw, nene, nesw, nese] = self.mem.get(n.ne).parts();
        let [swnw, swne, swsw, swse] = self.mem.get(n.sw).parts();
        let [senw, sene, sesw, sese] = self.mem.get(n.se).parts();

        // nine overlapping windows, each one level below the children
        let t00 = self.centered(nwnw, nwne, nwsw, nwse);
        let t01 = self.centered(nwne, nenw, nwse, nesw);
        let t02 = self.centered(nenw, nene, nesw, nese);
        let t10 = self.centered(nwsw, nwse, swnw, swne);
        let t11 = self.centered(nwse, nesw, swne, senw);
        let t12 = self.centered(nesw, nese, senw, sene);
        let t20 = self.centered(swnw, swne, swsw, swse);
        let t21 = self.centered(swne, senw, swse, sesw);
        let t22 = self.centered(senw, sene, sesw, sese);

        let q00 = self.mem.find_or_create_node(t00, t01, t10, t11);
        let q01 = self.mem.find_or_create_node(t01, t02, t11, t12);
        let q10 = self.mem.find_or_create_node(t10, t11, t20, t21);
        let q11 = self.mem.find_or_create_node(t11, t12, t21, t22);
        let [s00, s01, s10, s11] = [q00, q01, q10, q11].map(|x| self.next_gen(x));

        let result = self.mem.find_or_create_node(s00, s01, s10, s11);
        self.mem.set_gen_cache(idx, result);
        result
    }

    /// Center half of a node advanced by `2^(level-2)` generations.
    pub(super) fn quick_next_gen(&mut self, idx: NodeIdx) -> NodeIdx {
        let n = *self.mem.get(idx);
        if let Some(cache) = n.quick_cache {
            return cache;
        }
        if n.level == 2 {
            let result = self.level2_next(idx);
            self.mem.set_quick_cache(idx, result);
            return result;
        }

        let [t00, t01, t02, t10, t11, t12, t20, t21, t22] = self.quick_windows(idx);

        // second stage
        let q00 = self.mem.find_or_create_node(t00, t01, t10, t11);
        let q01 = self.mem.find_or_create_node(t01, t02, t11, t12);
        let q10 = self.mem.find_or_create_node(t10, t11, t20, t21);
        let q11 = self.mem.find_or_create_node(t11, t12, t21, t22);
        let [s00, s01, s10, s11] = [q00, q01, q10, q11].map(|x| self.quick_next_gen(x));

        let result = self.mem.find_or_create_node(s00, s01, s10, s11);
        self.mem.set_quick_cache(idx, result);
        result
    }

    /// The nine overlapping nodes of the children's level, row by row, each
    /// advanced by `2^(level-3)` generations.
    fn quick_windows(&mut self, idx: NodeIdx) -> [NodeIdx; 9] {
        let n = *self.mem.get(idx);
        let [_, nwne, nwsw, nwse] = self.mem.get(n.nw).parts();
        let [nenw, nene, nesw, nese] = self.mem.get(n.ne).parts();
        let [swnw, swne, swsw, swse] = self.mem.get(n.sw).parts();
        let [senw, sene, sesw, _] = self.mem.get(n.se).parts();

        let windows = [
            n.nw,
            self.mem.find_or_create_node(nwne, nenw, nwse, nesw),
            n.ne,
            self.mem.find_or_create_node(nwsw, nwse, swnw, swne),
            self.mem.find_or_create_node(nwse, nesw, swne, senw),
            self.mem.find_or_create_node(nesw, nese, senw, sene),
            n.sw,
            self.mem.find_or_create_node(swne, senw, swse, sesw),
            n.se,
        ];
        windows.map(|x| self.quick_next_gen(x))
    }

    /// Center half of a node advanced by `2^(level-3)` generations.
    ///
    /// Half the jump of `quick_next_gen`, so a pattern in the central quarter
    /// stays inside the result even when it spreads at c.
    fn half_quick_next_gen(&mut self, idx: NodeIdx) -> NodeIdx {
        let [t00, t01, t02, t10, t11, t12, t20, t21, t22] = self.quick_windows(idx);
        let nw = self.centered(t00, t01, t10, t11);
        let ne = self.centered(t01, t02, t11, t12);
        let sw = self.centered(t10, t11, t20, t21);
        let se = self.centered(t11, t12, t21, t22);
        self.mem.find_or_create_node(nw, ne, sw, se)
    }

    /// Same content one level up, surrounded by an empty border.
    pub(super) fn expand_universe(&mut self, idx: NodeIdx) -> NodeIdx {
        let n = *self.mem.get(idx);
        assert!(
            n.level < MAX_LEVEL,
            "universe cannot grow beyond level {}",
            MAX_LEVEL
        );
        let t = self.mem.find_or_create_blank(n.level - 1);
        let nw = self.mem.find_or_create_node(t, t, t, n.nw);
        let ne = self.mem.find_or_create_node(t, t, n.ne, t);
        let sw = self.mem.find_or_create_node(t, n.sw, t, t);
        let se = self.mem.find_or_create_node(n.se, t, t, t);
        self.mem.find_or_create_node(nw, ne, sw, se)
    }

    /// True if every alive cell lies in the central quarter of the root,
    /// judged by comparing each quadrant with its innermost grandchild.
    fn has_blank_frame(&self, idx: NodeIdx) -> bool {
        let n = self.mem.get(idx);
        let inner = |quadrant: NodeIdx, pick: fn(&[NodeIdx; 4]) -> NodeIdx| {
            let child = pick(&self.mem.get(quadrant).parts());
            pick(&self.mem.get(child).parts())
        };
        let pop = |x: NodeIdx| self.mem.get(x).population;
        pop(n.nw) == pop(inner(n.nw, |p| p[3]))
            && pop(n.ne) == pop(inner(n.ne, |p| p[2]))
            && pop(n.sw) == pop(inner(n.sw, |p| p[1]))
            && pop(n.se) == pop(inner(n.se, |p| p[0]))
    }

    /// Advance the universe.
    ///
    /// With `is_single` the generation grows by `2^step`, otherwise by
    /// `2^(root_level-2)` after the root has been grown as needed.
    pub fn next_generation(&mut self, is_single: bool) {
        let mut root = self.root;
        while (is_single && self.mem.get(root).level < self.step + 3) || !self.has_blank_frame(root)
        {
            root = self.expand_universe(root);
        }

        if is_single {
            self.generation = self.generation.saturating_add(pow2(self.step));
            root = self.next_gen(root);
        } else if self.rule.birth & 0b110 != 0 {
            // births on one or two neighbours spread at c
            root = self.expand_universe(root);
            let level = self.mem.get(root).level;
            self.generation = self.generation.saturating_add(pow2(level - 3));
            root = self.half_quick_next_gen(root);
        } else {
            let level = self.mem.get(root).level;
            self.generation = self.generation.saturating_add(pow2(level - 2));
            root = self.quick_next_gen(root);
        }
        while self.mem.get(root).level < 3 {
            root = self.expand_universe(root);
        }

        self.root = root;
        self.garbage_collect();
    }
}
