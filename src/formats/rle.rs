use super::{parse_comments, Pattern};
use crate::{PatternError, Rule, Universe};

const MIN_BUFFER_SIZE: usize = 0x100;
const MAX_BUFFER_SIZE: usize = 0x1000000;
/// expected share of alive cells in a pattern's bounding box
const DENSITY_ESTIMATE: f64 = 0.009;
const MAX_LINE_LENGTH: usize = 70;
/// most alive cells a file without usable dimensions may hold
const MAX_CELLS: u64 = 1 << 26;

fn initial_capacity(width: Option<u64>, height: Option<u64>) -> usize {
    match (width, height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => {
            let estimate = (w as f64 * h as f64 * DENSITY_ESTIMATE) as usize;
            estimate.clamp(MIN_BUFFER_SIZE, MAX_BUFFER_SIZE)
        }
        _ => MIN_BUFFER_SIZE,
    }
}

/// Alive cells a pattern may hold: its header area if known, never above `MAX_CELLS`.
fn cell_limit(width: Option<u64>, height: Option<u64>) -> u64 {
    match (width, height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => w.saturating_mul(h).min(MAX_CELLS),
        _ => MAX_CELLS,
    }
}

fn advance(coord: i64, run: i64) -> Result<i64, PatternError> {
    coord
        .checked_add(run)
        .ok_or_else(|| PatternError::Syntax("coordinate overflow".to_string()))
}

fn parse_header(header: &str, result: &mut Pattern) -> Result<(), PatternError> {
    for field in header.split(',').map(str::trim).filter(|f| !f.is_empty()) {
        let (key, value) = field
            .split_once('=')
            .ok_or_else(|| PatternError::InvalidHeader(field.to_string()))?;
        let (key, value) = (key.trim(), value.trim());
        let number = || {
            value
                .parse::<u64>()
                .map_err(|_| PatternError::InvalidHeader(field.to_string()))
        };
        match key.to_ascii_lowercase().as_str() {
            "x" => result.width = Some(number()?),
            "y" => result.height = Some(number()?),
            "rule" => result.rule = Some(Rule::parse(value)?),
            "alpha" | "color" => {}
            _ => return Err(PatternError::InvalidHeader(key.to_string())),
        }
    }
    Ok(())
}

/// Parse a run-length encoded pattern.
///
/// `b` is a dead run, any other letter an alive run, `$` ends rows and `!`
/// ends the pattern; a number before a tag repeats it. Cells are
/// returned relative to the top-left corner of the pattern.
pub fn parse_rle(text: &str) -> Result<Pattern, PatternError> {
    let (mut result, rest) = parse_comments(text, '#');
    let rest = rest.trim_start_matches('\n');
    let (header, body) = rest.split_once('\n').ok_or(PatternError::NoHeader)?;
    parse_header(header, &mut result)?;

    let capacity = initial_capacity(result.width, result.height);
    let limit = cell_limit(result.width, result.height);
    let mut field_x = Vec::with_capacity(capacity);
    let mut field_y = Vec::with_capacity(capacity);
    let (mut x, mut y) = (0i64, 0i64);
    let mut count: Option<i64> = None;

    for c in body.bytes() {
        if c.is_ascii_digit() {
            let digit = (c - b'0') as i64;
            count = Some(
                count
                    .unwrap_or(0)
                    .checked_mul(10)
                    .and_then(|n| n.checked_add(digit))
                    .ok_or_else(|| PatternError::Syntax("run length overflow".to_string()))?,
            );
            continue;
        }
        let run = count.take().unwrap_or(1);
        match c {
            b'b' => x = advance(x, run)?,
            b'$' => {
                y = advance(y, run)?;
                x = 0;
            }
            b'!' => break,
            c if c.is_ascii_alphabetic() => {
                if field_x.len() as u64 + run as u64 > limit {
                    return Err(PatternError::Syntax(format!(
                        "more than {} alive cells",
                        limit
                    )));
                }
                advance(x, run)?;
                for _ in 0..run {
                    field_x.push(x);
                    field_y.push(y);
                    x += 1;
                }
            }
            _ => {}
        }
    }

    result.field_x = field_x;
    result.field_y = field_y;
    Ok(result)
}

fn make_run(length: i64, is_empty: bool) -> String {
    let tag = if is_empty { 'b' } else { 'o' };
    match length {
        0 => String::new(),
        1 => tag.to_string(),
        n => format!("{}{}", n, tag),
    }
}

/// Body fragments, row by row, of the cells inside `bounds`.
fn rle_fragments(universe: &Universe, bounds: crate::Bounds) -> Vec<String> {
    let mut fragments = vec![];
    for y in bounds.top..=bounds.bottom {
        let mut state_is_empty = true;
        let mut run_start = bounds.left;
        for x in bounds.left..=bounds.right {
            let is_empty = !universe.get_bit(x, y);
            if state_is_empty != is_empty {
                fragments.push(make_run(x - run_start, state_is_empty));
                run_start = x;
                state_is_empty = is_empty;
            }
        }
        if !state_is_empty {
            fragments.push(make_run(bounds.right + 1 - run_start, false));
        }
        if y != bounds.bottom {
            fragments.push("$".to_string());
        }
    }
    fragments.push("!".to_string());
    fragments
}

/// Encode the universe's pattern as RLE with an optional `#N` name and `#C`
/// comment lines; body lines are at most 70 characters long.
pub fn generate_rle(universe: &Universe, name: Option<&str>, comments: &[&str]) -> String {
    let mut lines = vec![];
    if let Some(name) = name {
        lines.push(format!("#N {}", name));
    }
    lines.extend(comments.iter().map(|c| format!("#C {}", c)));

    let bounds = universe.get_root_bounds();
    lines.push(format!(
        "x = {}, y = {}, rule = {}",
        bounds.width(),
        bounds.height(),
        universe.rule()
    ));

    let mut current_line = String::new();
    for fragment in rle_fragments(universe, bounds) {
        if current_line.len() + fragment.len() > MAX_LINE_LENGTH {
            lines.push(std::mem::take(&mut current_line));
        }
        current_line += &fragment;
    }
    lines.push(current_line);
    lines.join("\n")
}
