use super::{parse_comments, Pattern};
use crate::{NodeIdx, PatternError, Rule, Universe};
use ahash::AHashMap;
use std::fmt::Write;

/// Level of the 8x8 leaves of the macrocell format.
const LEAF_LEVEL: u32 = 3;

/// Replace the universe's pattern with a macrocell (`[M2]`) file.
///
/// Returns the comment metadata. A `#R` line sets the universe's rule.
/// A missing `[M2]` identifier, a file without nodes or an invalid rule are
/// reported as errors before the universe is touched; a structurally broken
/// node list panics.
pub fn load_macrocell(universe: &mut Universe, text: &str) -> Result<Pattern, PatternError> {
    let text = text.replace('\r', "");
    let (first, rest) = text.split_once('\n').unwrap_or((text.as_str(), ""));
    if !first.starts_with("[M2]") {
        return Err(PatternError::NotMacrocell);
    }
    let (pattern, tree) = parse_comments(rest, '#');
    let rule = pattern.rule_text.as_deref().map(Rule::parse).transpose()?;
    if tree.lines().all(str::is_empty) {
        return Err(PatternError::EmptyMacrocell);
    }

    universe.clear_pattern();
    if let Some(rule) = rule {
        universe.set_rule(rule);
    }

    // code 0 is the empty tree of the parent's child level
    let mut nodes = vec![NodeIdx::DEAD];
    for line in tree.lines() {
        match line.chars().next() {
            None => {}
            Some('$' | '.' | '*') => {
                let (mut xs, mut ys) = leaf_cells(line);
                let node = universe.setup_field_recurse(&mut xs, &mut ys, LEAF_LEVEL);
                nodes.push(node);
            }
            Some(_) => {
                let node = parse_node(universe, &nodes, line);
                nodes.push(node);
            }
        }
    }

    let root = *nodes.last().unwrap();
    universe.replace_root(root);
    Ok(pattern)
}

fn leaf_cells(line: &str) -> (Vec<i64>, Vec<i64>) {
    let (mut xs, mut ys) = (vec![], vec![]);
    let (mut x, mut y) = (0, 0);
    for c in line.chars() {
        match c {
            '$' => {
                x = 0;
                y += 1;
                assert!(y <= 8, "macrocell leaf has more than 8 rows");
            }
            '.' => x += 1,
            '*' => {
                assert!(x < 8 && y < 8, "macrocell leaf cell out of range");
                xs.push(x);
                ys.push(y);
                x += 1;
            }
            _ => panic!("unexpected character {:?} in macrocell leaf", c),
        }
        assert!(x <= 8, "macrocell leaf has more than 8 columns");
    }
    (xs, ys)
}

fn parse_node(universe: &mut Universe, nodes: &[NodeIdx], line: &str) -> NodeIdx {
    let parts = line
        .split(' ')
        .map(|s| {
            s.parse::<usize>()
                .unwrap_or_else(|_| panic!("invalid macrocell node line {:?}", line))
        })
        .collect::<Vec<_>>();
    let [level, codes @ ..] = &parts[..] else {
        panic!("invalid macrocell node line {:?}", line);
    };
    assert_eq!(codes.len(), 4, "macrocell node needs four children");
    let level = *level as u32;
    assert!(level > LEAF_LEVEL, "macrocell node level must exceed the leaf level");

    let mut children = [NodeIdx::DEAD; 4];
    for (child, &code) in children.iter_mut().zip(codes) {
        *child = if code == 0 {
            universe.empty_tree(level - 1)
        } else {
            assert!(code < nodes.len(), "macrocell node refers to a later node");
            nodes[code]
        };
        assert_eq!(
            universe.node(*child).level,
            level - 1,
            "macrocell child has the wrong level"
        );
    }
    let [nw, ne, sw, se] = children;
    universe.create_tree(nw, ne, sw, se)
}

/// Serialize the universe's pattern in macrocell format.
///
/// Shared subtrees are written once and empty subtrees as `0`.
pub fn save_macrocell(universe: &Universe) -> Result<String, PatternError> {
    if universe.population() == 0 {
        return Err(PatternError::BlankPattern);
    }
    let mut result = "[M2] (quadlife)\n".to_string();
    writeln!(result, "#R {}", universe.rule()).unwrap();
    let mut codes = AHashMap::new();
    write_node(universe, universe.root(), &mut codes, &mut result);
    Ok(result)
}

/// Returns the node's code, writing it and its descendants first.
fn write_node(
    universe: &Universe,
    idx: NodeIdx,
    codes: &mut AHashMap<NodeIdx, usize>,
    result: &mut String,
) -> usize {
    let n = universe.node(idx);
    if n.population == 0 {
        return 0;
    }
    if let Some(&code) = codes.get(&idx) {
        return code;
    }

    if n.level == LEAF_LEVEL {
        let mut rows = [0u8; 8];
        fill_rows(universe, idx, 0, 0, &mut rows);
        let mut line = String::new();
        for row in rows {
            for x in 0..8 - row.leading_zeros() {
                line.push(if row >> x & 1 != 0 { '*' } else { '.' });
            }
            line.push('$');
        }
        while line.ends_with("$$") {
            line.pop();
        }
        result.push_str(&line);
    } else {
        let [nw, ne, sw, se] = n.parts().map(|x| write_node(universe, x, codes, result));
        write!(result, "{} {} {} {} {}", n.level, nw, ne, sw, se).unwrap();
    }
    result.push('\n');

    let code = codes.len() + 1;
    codes.insert(idx, code);
    code
}

fn fill_rows(universe: &Universe, idx: NodeIdx, x: u32, y: u32, rows: &mut [u8; 8]) {
    let n = universe.node(idx);
    if n.population == 0 {
        return;
    }
    if n.is_leaf() {
        rows[y as usize] |= 1 << x;
        return;
    }
    let half = 1 << (n.level - 1);
    fill_rows(universe, n.nw, x, y, rows);
    fill_rows(universe, n.ne, x + half, y, rows);
    fill_rows(universe, n.sw, x, y + half, rows);
    fill_rows(universe, n.se, x + half, y + half, rows);
}
