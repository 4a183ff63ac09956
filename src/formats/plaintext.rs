use super::{parse_comments, Pattern};
use crate::PatternError;

/// Parse a plaintext pattern: `!` comment lines, then rows of `.` (dead)
/// and `O` (alive).
pub fn parse_plaintext(text: &str) -> Result<Pattern, PatternError> {
    let (mut result, rest) = parse_comments(text, '!');
    let (mut x, mut y) = (0, 0);
    for c in rest.chars() {
        match c {
            '.' => x += 1,
            'O' => {
                result.field_x.push(x);
                result.field_y.push(y);
                x += 1;
            }
            '\n' => {
                y += 1;
                x = 0;
            }
            '\r' | ' ' => {}
            _ => {
                return Err(PatternError::Syntax(format!(
                    "plaintext: unexpected '{}' in row {}",
                    c, y
                )))
            }
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let pattern = parse_plaintext("!Name: Glider\n!\n.O\n..O\nOOO\n").unwrap();
        assert_eq!(pattern.title.as_deref(), Some(" Glider"));
        assert_eq!(pattern.field_x, vec![1, 2, 0, 1, 2]);
        assert_eq!(pattern.field_y, vec![0, 1, 2, 2, 2]);
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(
            parse_plaintext("!\n.O\n.X\n"),
            Err(PatternError::Syntax(_))
        ));
    }
}
