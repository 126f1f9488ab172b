//! Script tokenizer
//!
//! Turns raw script text into per-statement token streams. Comment stripping
//! and statement splitting are quote-aware: `--` and `/* */` inside string
//! literals or quoted identifiers are not comments, and `;` inside a literal
//! does not end a statement.

/// A single lexical token within one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Bare word or a backtick/double-quote delimited identifier, unwrapped.
    Ident(String),
    /// Integer or decimal literal.
    Number(String),
    /// Single-quoted string literal, unwrapped.
    StringLit(String),
    /// Any other single character: parens, commas, operators.
    Symbol(char),
}

impl Token {
    /// Case-insensitive keyword match against a bare identifier.
    pub fn is_keyword(&self, word: &str) -> bool {
        matches!(self, Token::Ident(s) if s.eq_ignore_ascii_case(word))
    }
}

/// The script body split into trimmed statements.
#[derive(Debug)]
pub struct SplitScript {
    pub statements: Vec<String>,
    /// False when text remains after the last `;`: the script is missing
    /// its terminator. The trailing fragment is still included above.
    pub terminated: bool,
}

/// Remove `-- ...` and `/* ... */` comments, preserving string literals and
/// quoted identifiers. Comments are replaced with a single space so token
/// boundaries survive.
pub fn strip_comments(script: &str) -> String {
    #[derive(PartialEq)]
    enum Mode {
        Normal,
        LineComment,
        BlockComment,
        Single,
        Double,
        Backtick,
    }

    let mut out = String::with_capacity(script.len());
    let mut mode = Mode::Normal;
    let mut chars = script.chars().peekable();

    while let Some(c) = chars.next() {
        match mode {
            Mode::Normal => match c {
                '-' if chars.peek() == Some(&'-') => {
                    chars.next();
                    out.push(' ');
                    mode = Mode::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    out.push(' ');
                    mode = Mode::BlockComment;
                }
                '\'' => {
                    out.push(c);
                    mode = Mode::Single;
                }
                '"' => {
                    out.push(c);
                    mode = Mode::Double;
                }
                '`' => {
                    out.push(c);
                    mode = Mode::Backtick;
                }
                _ => out.push(c),
            },
            Mode::LineComment => {
                if c == '\n' {
                    out.push('\n');
                    mode = Mode::Normal;
                }
            }
            Mode::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    mode = Mode::Normal;
                }
            }
            Mode::Single => {
                out.push(c);
                if c == '\'' {
                    mode = Mode::Normal;
                }
            }
            Mode::Double => {
                out.push(c);
                if c == '"' {
                    mode = Mode::Normal;
                }
            }
            Mode::Backtick => {
                out.push(c);
                if c == '`' {
                    mode = Mode::Normal;
                }
            }
        }
    }

    out
}

/// Split comment-stripped text on `;`, respecting string literals and quoted
/// identifiers. Empty fragments are dropped.
pub fn split_statements(text: &str) -> SplitScript {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in text.chars() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' | '`' => {
                    current.push(c);
                    quote = Some(c);
                }
                ';' => {
                    let stmt = current.trim();
                    if !stmt.is_empty() {
                        statements.push(stmt.to_string());
                    }
                    current.clear();
                }
                _ => current.push(c),
            },
        }
    }

    let trailing = current.trim();
    let terminated = trailing.is_empty();
    if !terminated {
        statements.push(trailing.to_string());
    }

    SplitScript {
        statements,
        terminated,
    }
}

/// Tokenize one statement.
pub fn tokenize(statement: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = statement.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c.is_ascii_alphabetic() || c == '_' {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                    word.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Ident(word));
        } else if c.is_ascii_digit() {
            let mut num = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_digit() || c == '.' {
                    num.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Number(num));
        } else if c == '`' || c == '"' {
            let delim = c;
            chars.next();
            let mut ident = String::new();
            for c in chars.by_ref() {
                if c == delim {
                    break;
                }
                ident.push(c);
            }
            tokens.push(Token::Ident(ident));
        } else if c == '\'' {
            chars.next();
            let mut lit = String::new();
            for c in chars.by_ref() {
                if c == '\'' {
                    break;
                }
                lit.push(c);
            }
            tokens.push(Token::StringLit(lit));
        } else {
            chars.next();
            tokens.push(Token::Symbol(c));
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_line_and_block_comments() {
        let sql = "CREATE TABLE t (id INT); -- trailing\n/* block\ncomment */ DROP TABLE t;";
        let stripped = strip_comments(sql);
        assert!(!stripped.contains("trailing"));
        assert!(!stripped.contains("comment"));
        assert!(stripped.contains("CREATE TABLE t"));
        assert!(stripped.contains("DROP TABLE t"));
    }

    #[test]
    fn test_comment_markers_inside_literals_survive() {
        let sql = "INSERT INTO t VALUES ('a--b', 'c/*d*/e');";
        let stripped = strip_comments(sql);
        assert!(stripped.contains("'a--b'"));
        assert!(stripped.contains("'c/*d*/e'"));
    }

    #[test]
    fn test_split_respects_quoted_semicolons() {
        let split = split_statements("INSERT INTO t VALUES ('a;b'); DROP TABLE t;");
        assert_eq!(split.statements.len(), 2);
        assert!(split.terminated);
        assert!(split.statements[0].contains("'a;b'"));
    }

    #[test]
    fn test_split_detects_missing_terminator() {
        let split = split_statements("CREATE TABLE t (id INT); ALTER TABLE t ADD c INT");
        assert_eq!(split.statements.len(), 2);
        assert!(!split.terminated);
    }

    #[test]
    fn test_tokenize_unwraps_quoted_identifiers() {
        let tokens = tokenize("ALTER TABLE `Users` ADD \"Email\" VARCHAR(50)");
        assert!(tokens.contains(&Token::Ident("Users".to_string())));
        assert!(tokens.contains(&Token::Ident("Email".to_string())));
        assert!(tokens.contains(&Token::Number("50".to_string())));
        assert!(tokens.contains(&Token::Symbol('(')));
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let tokens = tokenize("create TABLE t");
        assert!(tokens[0].is_keyword("CREATE"));
        assert!(tokens[1].is_keyword("table"));
    }
}
