//! Native-SQL query guard.
//!
//! Gates the raw-SQL escape hatch: operators can run native SELECT queries
//! against a connection, and this lexical validator is the sole defense
//! against injection short of a full parser. It masks comments and string
//! literals with an explicit character scanner, then applies policy checks
//! on the masked text. Blacklist scope is deliberate and fixed; known gaps
//! are accepted trade-offs rather than bugs to close.

use crate::error::Error;

const FORBIDDEN_KEYWORDS: &[&str] = &[
    "DROP",
    "DELETE",
    "INSERT",
    "UPDATE",
    "ALTER",
    "UNION",
    "INTERSECT",
    "EXCEPT",
    // catches INTO OUTFILE / INTO DUMPFILE
    "INTO",
];

const FORBIDDEN_FUNCTIONS: &[&str] = &[
    "pg_sleep",
    "SLEEP",
    "BENCHMARK",
    "pg_read_file",
    "pg_read_binary_file",
    "pg_ls_dir",
    "LOAD_FILE",
    "WAITFOR",
];

/// Validate a raw SQL string against the native-query policy.
///
/// Accepts or rejects; never rewrites the query.
pub fn validate_query(query: &str) -> Result<(), Error> {
    if query.trim().is_empty() {
        tracing::debug!("native query rejected: empty");
        return Err(Error::EmptyQuery);
    }

    let masked = mask(query);

    check_select_only(&masked)?;
    check_single_statement(&masked)?;
    check_balanced_parentheses(&masked)?;
    check_forbidden_tokens(&masked)?;
    check_injection_patterns(&masked)?;

    Ok(())
}

#[derive(Clone, Copy, PartialEq)]
enum State {
    Normal,
    SingleQuote,
    DoubleQuote,
    LineComment,
    BlockComment,
}

/// Produce the masked copy of a query: comment regions removed, string
/// literal contents blanked (quotes kept), everything else verbatim.
/// Backslash-escaped and doubled quotes stay inside their literal.
fn mask(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    let mut state = State::Normal;
    let mut chars = query.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Normal => match c {
                '\'' => {
                    out.push('\'');
                    state = State::SingleQuote;
                }
                '"' => {
                    out.push('"');
                    state = State::DoubleQuote;
                }
                '-' if chars.peek() == Some(&'-') => {
                    chars.next();
                    state = State::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    out.push(' ');
                    state = State::BlockComment;
                }
                _ => out.push(c),
            },
            State::SingleQuote => match c {
                '\\' => {
                    chars.next();
                }
                '\'' => {
                    if chars.peek() == Some(&'\'') {
                        chars.next();
                    } else {
                        out.push('\'');
                        state = State::Normal;
                    }
                }
                _ => {}
            },
            State::DoubleQuote => match c {
                '\\' => {
                    chars.next();
                }
                '"' => {
                    out.push('"');
                    state = State::Normal;
                }
                _ => {}
            },
            State::LineComment => {
                if c == '\n' {
                    out.push('\n');
                    state = State::Normal;
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::Normal;
                }
            }
        }
    }
    out
}

fn check_select_only(masked: &str) -> Result<(), Error> {
    let trimmed = masked.trim_start();
    let is_select = trimmed
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("select"))
        && !trimmed[6..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_');
    if !is_select {
        tracing::debug!("native query rejected: not a SELECT");
        return Err(Error::SqlPolicyViolation(
            "Only SELECT queries are allowed.".into(),
        ));
    }
    Ok(())
}

fn check_single_statement(masked: &str) -> Result<(), Error> {
    let trimmed = masked.trim_end();
    let semicolons = trimmed.matches(';').count();
    if semicolons > 1 {
        tracing::debug!("native query rejected: multiple statements");
        return Err(Error::SqlPolicyViolation("Only one query is allowed.".into()));
    }
    if semicolons == 1 && !trimmed.ends_with(';') {
        tracing::debug!("native query rejected: interior semicolon");
        return Err(Error::SqlPolicyViolation(
            "Semicolon must only appear as the last character in the query.".into(),
        ));
    }
    Ok(())
}

fn check_balanced_parentheses(masked: &str) -> Result<(), Error> {
    let mut depth: i64 = 0;
    for c in masked.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            break;
        }
    }
    if depth != 0 {
        tracing::debug!("native query rejected: unbalanced parentheses");
        return Err(Error::SqlPolicyViolation(
            "The query contains unbalanced parentheses.".into(),
        ));
    }
    Ok(())
}

/// Whole-word keyword scan plus name-immediately-followed-by-`(` function
/// scan. First match wins and names itself in the error.
fn check_forbidden_tokens(masked: &str) -> Result<(), Error> {
    for word in words(masked) {
        if let Some(keyword) = FORBIDDEN_KEYWORDS
            .iter()
            .find(|k| k.eq_ignore_ascii_case(&word.text))
        {
            tracing::debug!(keyword, "native query rejected: forbidden keyword");
            return Err(Error::SqlPolicyViolation(format!(
                "The query contains a forbidden keyword: {}.",
                keyword
            )));
        }
        if word.next_char == Some('(') {
            if let Some(function) = FORBIDDEN_FUNCTIONS
                .iter()
                .find(|f| f.eq_ignore_ascii_case(&word.text))
            {
                tracing::debug!(function, "native query rejected: forbidden function");
                return Err(Error::SqlPolicyViolation(format!(
                    "The query contains a forbidden function: {}.",
                    function
                )));
            }
        }
    }
    Ok(())
}

/// Boolean-tautology injection signatures: `OR <n>=<n>` / `AND <n>=<n>`
/// with identical numeric literals, `OR TRUE`, `OR FALSE`. Deliberately
/// incomplete defense-in-depth, not a full parser.
fn check_injection_patterns(masked: &str) -> Result<(), Error> {
    let tokens = tokens(masked);
    for (i, token) in tokens.iter().enumerate() {
        let is_or = token.eq_ignore_ascii_case("OR");
        let is_and = token.eq_ignore_ascii_case("AND");
        if !is_or && !is_and {
            continue;
        }
        let tautology = matches!(
            (tokens.get(i + 1), tokens.get(i + 2), tokens.get(i + 3)),
            (Some(left), Some(eq), Some(right))
                if eq.as_str() == "=" && is_numeric_literal(left) && left == right
        );
        let or_constant = is_or
            && tokens.get(i + 1).is_some_and(|t| {
                t.eq_ignore_ascii_case("TRUE") || t.eq_ignore_ascii_case("FALSE")
            });
        if tautology || or_constant {
            tracing::debug!("native query rejected: injection pattern");
            return Err(Error::SqlPolicyViolation(
                "The query contains a potential SQL injection pattern.".into(),
            ));
        }
    }
    Ok(())
}

struct Word {
    text: String,
    /// Character immediately following the word, if any.
    next_char: Option<char>,
}

/// Identifier-shaped runs (`[A-Za-z0-9_]+`) with their trailing character.
fn words(masked: &str) -> Vec<Word> {
    let mut out = Vec::new();
    let mut current = String::new();
    for c in masked.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            current.push(c);
        } else if !current.is_empty() {
            out.push(Word {
                text: std::mem::take(&mut current),
                next_char: Some(c),
            });
        }
    }
    if !current.is_empty() {
        out.push(Word {
            text: current,
            next_char: None,
        });
    }
    out
}

/// Word runs and single punctuation characters, whitespace dropped.
fn tokens(masked: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for c in masked.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
            current.push(c);
        } else {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            if !c.is_whitespace() {
                out.push(c.to_string());
            }
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn is_numeric_literal(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit() || c == '.')
}
