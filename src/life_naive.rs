use crate::Rule;
use ahash::{AHashMap, AHashSet};

/// Straightforward simulator on an unbounded plane, used as a reference.
pub struct NaiveLife {
    cells: AHashSet<(i64, i64)>,
    rule: Rule,
}

impl NaiveLife {
    pub fn new(rule: Rule) -> Self {
        Self {
            cells: AHashSet::new(),
            rule,
        }
    }

    pub fn from_cells(cells: impl IntoIterator<Item = (i64, i64)>, rule: Rule) -> Self {
        Self {
            cells: cells.into_iter().collect(),
            rule,
        }
    }

    pub fn get(&self, x: i64, y: i64) -> bool {
        self.cells.contains(&(x, y))
    }

    pub fn set(&mut self, x: i64, y: i64, value: bool) {
        if value {
            self.cells.insert((x, y));
        } else {
            self.cells.remove(&(x, y));
        }
    }

    pub fn population(&self) -> usize {
        self.cells.len()
    }

    fn count_neibs(&self) -> AHashMap<(i64, i64), u8> {
        let mut neibs = AHashMap::with_capacity(self.cells.len() * 8);
        for &(x, y) in self.cells.iter() {
            for dy in -1..=1 {
                for dx in -1..=1 {
                    if dx != 0 || dy != 0 {
                        *neibs.entry((x + dx, y + dy)).or_insert(0) += 1;
                    }
                }
            }
        }
        neibs
    }

    pub fn update(&mut self, generations: u64) {
        for _ in 0..generations {
            let neibs = self.count_neibs();
            let mut next: AHashSet<(i64, i64)> = neibs
                .iter()
                .filter(|(cell, &n)| {
                    let mask = if self.cells.contains(*cell) {
                        self.rule.survive
                    } else {
                        self.rule.birth
                    };
                    mask >> n & 1 != 0
                })
                .map(|(&cell, _)| cell)
                .collect();
            if self.rule.survive & 1 != 0 {
                // isolated cells are absent from `neibs`
                next.extend(self.cells.iter().filter(|c| !neibs.contains_key(*c)));
            }
            self.cells = next;
        }
    }

    /// Alive cells, sorted.
    pub fn get_cells(&self) -> Vec<(i64, i64)> {
        let mut result = self.cells.iter().copied().collect::<Vec<_>>();
        result.sort_unstable();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blinker() {
        let mut life = NaiveLife::from_cells([(-1, 0), (0, 0), (1, 0)], Rule::CONWAY);
        life.update(1);
        assert_eq!(life.get_cells(), vec![(0, -1), (0, 0), (0, 1)]);
        life.update(1);
        assert_eq!(life.get_cells(), vec![(-1, 0), (0, 0), (1, 0)]);
    }

    #[test]
    fn test_survival_without_neighbours() {
        let mut life = NaiveLife::from_cells([(5, 5)], Rule::new(1, 0));
        life.update(3);
        assert!(life.get(5, 5));
        assert_eq!(life.population(), 1);
        life.set(5, 5, false);
        assert_eq!(life.population(), 0);
    }
}
