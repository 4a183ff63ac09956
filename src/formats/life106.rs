use super::{parse_comments, Pattern};

/// Parse a Life 1.06 file: one `x y` pair per line. Lines that are not a
/// pair of integers are skipped.
pub fn parse_life106(text: &str) -> Pattern {
    let (mut result, rest) = parse_comments(text, '#');
    for line in rest.lines() {
        let mut numbers = line.split_whitespace().map(str::parse::<i64>);
        if let (Some(Ok(x)), Some(Ok(y)), None) = (numbers.next(), numbers.next(), numbers.next())
        {
            result.field_x.push(x);
            result.field_y.push(y);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let pattern = parse_life106("#Life 1.06\n#D a comment\n0 -1\n 1 0 \n-1 1\nnot a pair\n0 1");
        assert_eq!(pattern.field_x, vec![0, 1, -1, 0]);
        assert_eq!(pattern.field_y, vec![-1, 0, 1, 1]);
        assert_eq!(pattern.comment, "a comment");
    }
}
