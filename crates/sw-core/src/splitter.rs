//! Statement splitter for migration scripts.
//!
//! Most engines refuse several DDL statements in a single request, so a
//! declarative migration is split into individual statements before it is
//! executed. The splitter is purely lexical: it recognises comments, quoted
//! strings and delimiters, which is enough to avoid tripping over a `;` that
//! is commented out or quoted. It never validates the SQL itself.

/// Lexical class of one scanned token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    /// `--` or `//` up to the end of the line; dropped
    LineComment,
    /// `/* ... */`; collapsed to a space
    BlockComment,
    /// Quoted or dollar-delimited string; copied verbatim
    Quoted,
    /// `;`
    Delimiter,
    /// Run of whitespace; collapsed to a space
    Whitespace,
    /// Any other single character; copied verbatim
    Other,
}

/// Split `script` into trimmed, non-empty statements without their delimiters.
///
/// Line comments are removed. Whitespace and block comments separating two
/// tokens become a single space. An unterminated quote or comment opener is
/// treated as an ordinary character.
///
/// # Examples
/// ```
/// use sw_core::splitter::split;
/// assert_eq!(split("CREATE TABLE 'a;b';"), vec!["CREATE TABLE 'a;b'"]);
/// assert_eq!(split("A /* x;y */ B;"), vec!["A B"]);
/// ```
pub fn split(script: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_gap = false;
    let mut rest = script;

    while !rest.is_empty() {
        let (kind, len) = next_token(rest);
        let (token, tail) = rest.split_at(len);

        match kind {
            TokenKind::LineComment => {}
            TokenKind::BlockComment | TokenKind::Whitespace => {
                if !in_gap {
                    current.push(' ');
                    in_gap = true;
                }
            }
            TokenKind::Quoted | TokenKind::Other => {
                current.push_str(token);
                in_gap = false;
            }
            TokenKind::Delimiter => {
                push_statement(&mut statements, &current);
                current.clear();
                in_gap = false;
            }
        }

        rest = tail;
    }

    push_statement(&mut statements, &current);
    statements
}

fn push_statement(statements: &mut Vec<String>, buffer: &str) {
    let statement = buffer.trim();
    if !statement.is_empty() {
        statements.push(statement.to_string());
    }
}

/// Classify the token at the start of `input` and return its byte length.
///
/// Rules are tried in priority order; `input` must be non-empty.
fn next_token(input: &str) -> (TokenKind, usize) {
    if input.starts_with("--") || input.starts_with("//") {
        let len = input.find('\n').unwrap_or(input.len());
        return (TokenKind::LineComment, len);
    }
    if let Some(len) = block_comment_len(input) {
        return (TokenKind::BlockComment, len);
    }
    if let Some(len) = quoted_len(input, '"').or_else(|| quoted_len(input, '\'')) {
        return (TokenKind::Quoted, len);
    }
    if let Some(len) = dollar_quoted_len(input) {
        return (TokenKind::Quoted, len);
    }
    if input.starts_with(';') {
        return (TokenKind::Delimiter, 1);
    }

    let whitespace: usize = input
        .chars()
        .take_while(|c| c.is_whitespace())
        .map(char::len_utf8)
        .sum();
    if whitespace > 0 {
        return (TokenKind::Whitespace, whitespace);
    }

    let other = input.chars().next().map_or(1, char::len_utf8);
    (TokenKind::Other, other)
}

/// `/*`, at least one character, then the first `*/` after it.
fn block_comment_len(input: &str) -> Option<usize> {
    let body = input.strip_prefix("/*")?;
    let first = body.chars().next()?;
    let search_from = first.len_utf8();
    let end = body[search_from..].find("*/")?;
    Some(2 + search_from + end + 2)
}

/// A string delimited by `quote` in which a backslash escapes any character.
fn quoted_len(input: &str, quote: char) -> Option<usize> {
    let body = input.strip_prefix(quote)?;
    let mut chars = body.char_indices();
    while let Some((idx, c)) = chars.next() {
        if c == '\\' {
            chars.next()?;
        } else if c == quote {
            return Some(quote.len_utf8() + idx + c.len_utf8());
        }
    }
    None
}

/// `$$ ... $$` with backslash escapes. A lone `$` in the body ends the match
/// unsuccessfully.
fn dollar_quoted_len(input: &str) -> Option<usize> {
    let body = input.strip_prefix("$$")?;
    let mut chars = body.char_indices();
    while let Some((idx, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next()?;
            }
            '$' => {
                return body[idx..].starts_with("$$").then_some(2 + idx + 2);
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
#[path = "splitter_test.rs"]
mod tests;
