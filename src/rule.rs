use crate::PatternError;
use std::fmt;
use std::str::FromStr;

/// Life-like rule: bit `k` of `survive` (`birth`) is set if a live (dead)
/// cell with `k` live neighbours is alive in the next generation.
///
/// Births on zero neighbours (B0) are not supported: they would fill the
/// unbounded empty space every generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rule {
    pub survive: u16,
    pub birth: u16,
}

impl Rule {
    /// B3/S23
    pub const CONWAY: Rule = Rule {
        survive: 1 << 2 | 1 << 3,
        birth: 1 << 3,
    };

    pub fn new(survive: u16, birth: u16) -> Self {
        assert!(
            survive < 1 << 9 && birth < 1 << 9,
            "neighbour counts range from 0 to 8"
        );
        assert!(birth & 1 == 0, "B0 rules are not supported");
        Self { survive, birth }
    }

    /// Parse `B3/S23`, `S23/B3` or the bare `23/3` (survival first) notation.
    /// Letters are case-insensitive.
    pub fn parse(text: &str) -> Result<Self, PatternError> {
        let invalid = || PatternError::InvalidRule(text.to_string());
        let (first, second) = text.trim().split_once('/').ok_or_else(invalid)?;

        let (survive, birth) = if first.chars().all(|c| c.is_ascii_digit()) {
            (first, second)
        } else {
            let mut survive = None;
            let mut birth = None;
            for part in [first, second] {
                let mut chars = part.chars();
                match chars.next().map(|c| c.to_ascii_lowercase()) {
                    Some('s') if survive.is_none() => survive = Some(chars.as_str()),
                    Some('b') if birth.is_none() => birth = Some(chars.as_str()),
                    _ => return Err(invalid()),
                }
            }
            (survive.ok_or_else(invalid)?, birth.ok_or_else(invalid)?)
        };

        let birth = parse_digits(birth).filter(|b| b & 1 == 0).ok_or_else(invalid)?;
        Ok(Self {
            survive: parse_digits(survive).ok_or_else(invalid)?,
            birth,
        })
    }

    /// Survival and birth digits in `23/3` notation.
    pub fn to_survive_birth(&self) -> String {
        format!("{}/{}", digits(self.survive), digits(self.birth))
    }
}

/// Bitmask of the digits 0..=8; `None` on any other character or a repeat.
fn parse_digits(text: &str) -> Option<u16> {
    let mut result = 0u16;
    for c in text.chars() {
        let d = c.to_digit(10).filter(|&d| d <= 8)?;
        if result & 1 << d != 0 {
            return None;
        }
        result |= 1 << d;
    }
    Some(result)
}

fn digits(mask: u16) -> String {
    (0..=8)
        .filter(|i| mask & 1 << i != 0)
        .map(|i| char::from(b'0' + i as u8))
        .collect()
}

impl Default for Rule {
    fn default() -> Self {
        Self::CONWAY
    }
}

/// `B3/S23` notation, as used in RLE headers.
impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B{}/S{}", digits(self.birth), digits(self.survive))
    }
}

impl FromStr for Rule {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
