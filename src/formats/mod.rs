mod life106;
mod macrocell;
mod plaintext;
mod rle;

pub use life106::parse_life106;
pub use macrocell::{load_macrocell, save_macrocell};
pub use plaintext::parse_plaintext;
pub use rle::{generate_rle, parse_rle};

use crate::{PatternError, Rule};

/// A parsed pattern file: metadata plus alive cell coordinates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pattern {
    pub title: Option<String>,
    pub author: Option<String>,
    pub comment: String,
    pub short_comment: String,
    pub urls: Vec<String>,
    /// rule given in the body header (RLE)
    pub rule: Option<Rule>,
    /// rule line from the comment block, unparsed
    pub rule_text: Option<String>,
    pub width: Option<u64>,
    pub height: Option<u64>,
    pub field_x: Vec<i64>,
    pub field_y: Vec<i64>,
}

/// Read the leading comment block. Returns the metadata and the rest of the
/// text.
///
/// With `#` as `comment_char`, the letter after it selects the field:
/// `N` title, `C`/`D` comment, `O` author, `R` rule; other letters are
/// skipped. Any other `comment_char` makes every line a comment.
pub fn parse_comments(text: &str, comment_char: char) -> (Pattern, &str) {
    let mut result = Pattern::default();
    let advanced = comment_char == '#';
    let mut rest = text;

    while rest.starts_with(comment_char) {
        let (raw, next) = match rest.find('\n') {
            Some(nl) => (&rest[..nl], &rest[nl + 1..]),
            None => (rest, ""),
        };
        rest = next;
        let mut line = &raw[comment_char.len_utf8()..];
        let mut cont = true;

        if advanced {
            let mut chars = line.chars();
            let tag = chars.next();
            line = chars.as_str().trim();
            match tag {
                Some('N') => {
                    if !line.is_empty() {
                        result.title = Some(line.to_string());
                    }
                    cont = false;
                }
                Some('C' | 'D') => {
                    if result.short_comment.is_empty() {
                        result.short_comment = line.to_string();
                    }
                }
                Some('O') => result.author = Some(line.to_string()),
                Some('R') => {
                    result.rule_text = Some(line.to_string());
                    cont = false;
                }
                _ => cont = false,
            }
        }

        if !cont {
            continue;
        }
        if is_url(line) {
            let url = if line.starts_with("http") {
                line.to_string()
            } else {
                format!("http://{}", line)
            };
            result.urls.push(url);
        } else if let Some(title) = line.strip_prefix("Name:") {
            result.title = Some(title.to_string());
        } else {
            result.comment += line;
            // lines of 70 or 80 characters continue on the next line
            if raw.len() != 70 && raw.len() != 80 {
                result.comment.push('\n');
            }
        }
    }

    result.comment = result.comment.trim().to_string();
    (result, rest)
}

fn is_url(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    ["http://", "https://", "www."].iter().any(|prefix| {
        lower
            .strip_prefix(prefix)
            .and_then(|r| r.chars().next())
            .is_some_and(|c| c.is_ascii_alphanumeric())
    })
}

/// First non-comment, non-empty line is a `key = value` list over the RLE keys.
fn has_rle_header(text: &str) -> bool {
    let mut lines = text.split('\n').skip_while(|line| line.starts_with('#'));
    let Some(header) = lines.by_ref().find(|line| !line.is_empty()) else {
        return false;
    };
    // the header must be terminated by a newline
    if lines.next().is_none() {
        return false;
    }
    let mut fields = header
        .split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .peekable();
    fields.peek().is_some()
        && fields.all(|field| {
            let Some((key, value)) = field.split_once('=') else {
                return false;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();
            ["x", "y", "rule", "color", "alpha"].contains(&key.as_str())
                && !value.is_empty()
                && value
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || "/()".contains(c))
        })
}

/// Detect the format of `text` and parse it.
///
/// Plaintext starts with `!`, Life 1.06 with `#Life 1.06`; RLE is recognised
/// by its header line.
pub fn parse_pattern(text: &str) -> Result<Pattern, PatternError> {
    let text = text.replace('\r', "");
    if text.starts_with('!') {
        parse_plaintext(&text)
    } else if text.starts_with("#Life 1.06") {
        Ok(parse_life106(&text))
    } else if has_rle_header(&text) {
        parse_rle(&text)
    } else {
        Err(PatternError::UnknownFormat)
    }
}
