//! Statement extractor
//!
//! Recursive-descent parser over the token stream, producing the typed
//! `DdlStatement` variants. Extraction is fail-soft: a statement that opens
//! like DDL but does not complete the shape degrades to `Unknown` plus one
//! syntax issue on that statement; script-level problems (empty input,
//! missing terminator) attach to the synthetic statement index 0.

use super::lexer::{split_statements, strip_comments, tokenize, Token};
use super::statement::{AlterOp, DdlStatement, TypeDef};
use crate::schema::ColumnDescriptor;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct ParseError(String);

/// One extracted statement with its position and source text.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStatement {
    /// 1-based position in the script. Index 0 is reserved for script-level
    /// issues.
    pub index: usize,
    /// Comment-stripped source text of the statement.
    pub text: String,
    pub statement: DdlStatement,
    /// Syntax issues raised while parsing this statement.
    pub parse_issues: Vec<String>,
}

/// The extractor's output: ordered statements plus script-level issues.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedScript {
    pub statements: Vec<ParsedStatement>,
    /// Issues that belong to the script as a whole (synthetic statement 0).
    pub script_issues: Vec<String>,
}

impl ParsedScript {
    pub fn has_parse_errors(&self) -> bool {
        !self.script_issues.is_empty()
            || self.statements.iter().any(|s| !s.parse_issues.is_empty())
    }
}

/// Parse a full script into an ordered statement sequence.
pub fn parse_script(script: &str) -> ParsedScript {
    let stripped = strip_comments(script);
    let body = stripped.trim();

    let mut parsed = ParsedScript::default();

    if body.is_empty() {
        parsed
            .script_issues
            .push("Script is empty; nothing to validate.".to_string());
        return parsed;
    }

    let split = split_statements(body);
    if !split.terminated {
        parsed.script_issues.push(
            "Script does not end with a ';' statement terminator.".to_string(),
        );
    }

    let mut index = 0;
    for text in &split.statements {
        let tokens = tokenize(text);
        match parse_statement(&tokens) {
            Ok(statements) => {
                // A single ALTER TABLE or DROP TABLE may carry several
                // comma-separated operations; each becomes its own statement.
                for statement in statements {
                    index += 1;
                    parsed.statements.push(ParsedStatement {
                        index,
                        text: text.clone(),
                        statement,
                        parse_issues: Vec::new(),
                    });
                }
            }
            Err(e) => {
                index += 1;
                parsed.statements.push(ParsedStatement {
                    index,
                    text: text.clone(),
                    statement: DdlStatement::Unknown {
                        keyword: leading_keyword(&tokens),
                    },
                    parse_issues: vec![e.to_string()],
                });
            }
        }
    }

    parsed
}

fn leading_keyword(tokens: &[Token]) -> String {
    match tokens.first() {
        Some(Token::Ident(word)) => word.to_uppercase(),
        _ => String::new(),
    }
}

fn parse_statement(tokens: &[Token]) -> Result<Vec<DdlStatement>, ParseError> {
    let mut cur = Cursor::new(tokens);

    if cur.eat_keyword("CREATE") {
        if cur.eat_keyword("TABLE") {
            return parse_create_table(&mut cur).map(|s| vec![s]);
        }
        let unique = cur.eat_keyword("UNIQUE");
        if cur.eat_keyword("INDEX") {
            return parse_create_index(&mut cur, unique).map(|s| vec![s]);
        }
        // CREATE VIEW, CREATE TRIGGER, ...: outside the recognized subset.
        return Ok(vec![DdlStatement::Unknown {
            keyword: "CREATE".to_string(),
        }]);
    }

    if cur.eat_keyword("ALTER") {
        if cur.eat_keyword("TABLE") {
            return parse_alter_table(&mut cur);
        }
        return Ok(vec![DdlStatement::Unknown {
            keyword: "ALTER".to_string(),
        }]);
    }

    if cur.eat_keyword("DROP") {
        if cur.eat_keyword("TABLE") {
            return parse_drop_table(&mut cur);
        }
        if cur.eat_keyword("INDEX") {
            return parse_drop_index(&mut cur).map(|s| vec![s]);
        }
        return Ok(vec![DdlStatement::Unknown {
            keyword: "DROP".to_string(),
        }]);
    }

    Ok(vec![DdlStatement::Unknown {
        keyword: leading_keyword(tokens),
    }])
}

fn parse_create_table(cur: &mut Cursor) -> Result<DdlStatement, ParseError> {
    let if_not_exists = cur.eat_keyword_seq(&["IF", "NOT", "EXISTS"]);
    let table = cur.expect_ident("table name after CREATE TABLE")?;
    cur.expect_symbol('(', "column list after table name")?;

    let fragments = cur.take_parenthesized_fragments()?;

    let mut columns = Vec::new();
    let mut constraints = Vec::new();
    for fragment in &fragments {
        if fragment.is_empty() {
            continue;
        }
        if is_constraint_fragment(fragment) {
            constraints.push(render_tokens(fragment));
        } else {
            columns.push(parse_column_fragment(fragment)?);
        }
    }

    // Trailing table options (ENGINE=..., COMMENT=...) are ignored.
    Ok(DdlStatement::CreateTable {
        table: table.to_lowercase(),
        columns,
        constraints,
        if_not_exists,
    })
}

/// A CREATE TABLE fragment is a constraint, not a column, when it starts
/// with one of the constraint keywords.
fn is_constraint_fragment(fragment: &[Token]) -> bool {
    const CONSTRAINT_KEYWORDS: [&str; 6] =
        ["CONSTRAINT", "PRIMARY", "FOREIGN", "UNIQUE", "INDEX", "KEY"];
    match fragment.first() {
        Some(Token::Ident(word)) => CONSTRAINT_KEYWORDS
            .iter()
            .any(|k| word.eq_ignore_ascii_case(k)),
        _ => false,
    }
}

fn parse_column_fragment(fragment: &[Token]) -> Result<ColumnDescriptor, ParseError> {
    let mut cur = Cursor::new(fragment);
    let name = cur.expect_ident("column name")?;
    let type_def = parse_type_def(&mut cur)?;
    Ok(type_def.to_column(&name))
}

fn parse_create_index(cur: &mut Cursor, unique: bool) -> Result<DdlStatement, ParseError> {
    let name = cur.expect_ident("index name after CREATE INDEX")?;
    cur.expect_keyword("ON", "ON <table> after index name")?;
    let table = cur.expect_ident("table name after ON")?;
    cur.expect_symbol('(', "column list after table name")?;
    let fragments = cur.take_parenthesized_fragments()?;

    let mut columns = Vec::new();
    for fragment in &fragments {
        // Expression entries (anything with parentheses) are excluded from
        // the column-existence check.
        if fragment.iter().any(|t| matches!(t, Token::Symbol('('))) {
            continue;
        }
        if let Some(Token::Ident(column)) = fragment.first() {
            columns.push(column.to_lowercase());
        }
    }

    Ok(DdlStatement::CreateIndex {
        table: table.to_lowercase(),
        name: name.to_lowercase(),
        columns,
        unique,
    })
}

fn parse_alter_table(cur: &mut Cursor) -> Result<Vec<DdlStatement>, ParseError> {
    let table = cur.expect_ident("table name after ALTER TABLE")?.to_lowercase();

    let mut statements = Vec::new();
    loop {
        let op = parse_alter_op(cur)?;
        statements.push(DdlStatement::AlterTable {
            table: table.clone(),
            op,
        });
        if !cur.eat_symbol(',') {
            break;
        }
    }

    Ok(statements)
}

fn parse_alter_op(cur: &mut Cursor) -> Result<AlterOp, ParseError> {
    if cur.eat_keyword("ADD") {
        cur.eat_keyword("COLUMN");
        let name = cur.expect_ident("column name after ADD")?.to_lowercase();
        let type_def = parse_type_def(cur)?;
        return Ok(AlterOp::AddColumn { name, type_def });
    }
    if cur.eat_keyword("DROP") {
        cur.eat_keyword("COLUMN");
        let name = cur.expect_ident("column name after DROP")?.to_lowercase();
        return Ok(AlterOp::DropColumn { name });
    }
    if cur.eat_keyword("MODIFY") {
        cur.eat_keyword("COLUMN");
        let name = cur.expect_ident("column name after MODIFY")?.to_lowercase();
        let type_def = parse_type_def(cur)?;
        return Ok(AlterOp::ModifyColumn { name, type_def });
    }
    if cur.eat_keyword("CHANGE") {
        cur.eat_keyword("COLUMN");
        let old_name = cur.expect_ident("column name after CHANGE")?.to_lowercase();
        let new_name = cur.expect_ident("new column name after CHANGE")?.to_lowercase();
        let type_def = parse_type_def(cur)?;
        return Ok(AlterOp::ChangeColumn {
            old_name,
            new_name,
            type_def,
        });
    }
    Err(ParseError(
        "ALTER TABLE supports ADD, DROP, MODIFY and CHANGE column operations.".to_string(),
    ))
}

fn parse_drop_table(cur: &mut Cursor) -> Result<Vec<DdlStatement>, ParseError> {
    let if_exists = cur.eat_keyword_seq(&["IF", "EXISTS"]);

    let mut statements = Vec::new();
    loop {
        let table = cur.expect_ident("table name after DROP TABLE")?;
        statements.push(DdlStatement::DropTable {
            table: table.to_lowercase(),
            if_exists,
        });
        if !cur.eat_symbol(',') {
            break;
        }
    }

    Ok(statements)
}

fn parse_drop_index(cur: &mut Cursor) -> Result<DdlStatement, ParseError> {
    let name = cur.expect_ident("index name after DROP INDEX")?;
    cur.expect_keyword("ON", "ON <table> after index name")?;
    let table = cur.expect_ident("table name after ON")?;
    Ok(DdlStatement::DropIndex {
        table: table.to_lowercase(),
        name: name.to_lowercase(),
    })
}

/// Parse a column type definition: base type, optional `(length)` or
/// `(precision, scale)`, and nullability from the trailing attributes.
/// Non-numeric parameters (enum literals, expressions) leave the numeric
/// slots unknown.
fn parse_type_def(cur: &mut Cursor) -> Result<TypeDef, ParseError> {
    let start = cur.pos;
    let base_type = cur
        .expect_ident("column data type")?
        .to_uppercase();

    let mut length = None;
    let mut precision = None;
    let mut scale = None;

    if cur.eat_symbol('(') {
        let params = cur.take_parenthesized_fragments()?;
        let numbers: Vec<Option<u32>> = params
            .iter()
            .map(|fragment| match fragment.first() {
                Some(Token::Number(n)) if fragment.len() == 1 => n.parse().ok(),
                _ => None,
            })
            .collect();

        match numbers.as_slice() {
            [single] => length = *single,
            [first, second, ..] => {
                precision = *first;
                scale = *second;
            }
            [] => {}
        }
    }

    // UNSIGNED, DEFAULT ..., NOT NULL and other attributes run to the next
    // top-level comma or the end of the fragment; only nullability matters
    // to the engine.
    let mut nullable = true;
    let mut depth = 0usize;
    while let Some(token) = cur.peek() {
        match token {
            Token::Symbol('(') => depth += 1,
            Token::Symbol(')') => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            Token::Symbol(',') if depth == 0 => break,
            _ => {
                if token.is_keyword("NOT")
                    && cur.peek_at(1).map(|t| t.is_keyword("NULL")) == Some(true)
                {
                    nullable = false;
                }
            }
        }
        cur.advance();
    }

    Ok(TypeDef {
        raw: render_tokens(&cur.tokens[start..cur.pos]),
        base_type,
        length,
        precision,
        scale,
        nullable,
    })
}

/// Reconstruct display text from tokens. Not a faithful reprint of the
/// source, but stable and readable for issue messages.
fn render_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        let piece = match token {
            Token::Ident(s) => s.clone(),
            Token::Number(n) => n.clone(),
            Token::StringLit(s) => format!("'{}'", s),
            Token::Symbol(c) => c.to_string(),
        };
        match token {
            Token::Symbol(',') | Token::Symbol(')') => out.push_str(&piece),
            Token::Symbol('(') => out.push_str(&piece),
            _ => {
                if !out.is_empty() && !out.ends_with('(') {
                    out.push(' ');
                }
                out.push_str(&piece);
            }
        }
    }
    out
}

/// Token cursor with the helpers the grammar needs.
struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn eat_keyword(&mut self, word: &str) -> bool {
        if self.peek().is_some_and(|t| t.is_keyword(word)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume a keyword sequence atomically; either all or none.
    fn eat_keyword_seq(&mut self, words: &[&str]) -> bool {
        let all_match = words
            .iter()
            .enumerate()
            .all(|(i, w)| self.peek_at(i).is_some_and(|t| t.is_keyword(w)));
        if all_match {
            self.pos += words.len();
        }
        all_match
    }

    fn expect_keyword(&mut self, word: &str, what: &str) -> Result<(), ParseError> {
        if self.eat_keyword(word) {
            Ok(())
        } else {
            Err(ParseError(format!("Expected {}.", what)))
        }
    }

    fn eat_symbol(&mut self, symbol: char) -> bool {
        if matches!(self.peek(), Some(Token::Symbol(c)) if *c == symbol) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_symbol(&mut self, symbol: char, what: &str) -> Result<(), ParseError> {
        if self.eat_symbol(symbol) {
            Ok(())
        } else {
            Err(ParseError(format!("Expected {}.", what)))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, ParseError> {
        match self.peek() {
            Some(Token::Ident(word)) => {
                let word = word.clone();
                self.pos += 1;
                Ok(word)
            }
            _ => Err(ParseError(format!("Expected {}.", what))),
        }
    }

    /// Consume fragments up to the matching `)`, splitting on top-level
    /// commas. The opening `(` must already be consumed.
    fn take_parenthesized_fragments(&mut self) -> Result<Vec<Vec<Token>>, ParseError> {
        let mut fragments = Vec::new();
        let mut current = Vec::new();
        let mut depth = 0usize;

        while let Some(token) = self.peek() {
            match token {
                Token::Symbol('(') => {
                    depth += 1;
                    current.push(token.clone());
                }
                Token::Symbol(')') => {
                    if depth == 0 {
                        self.advance();
                        if !current.is_empty() {
                            fragments.push(current);
                        }
                        return Ok(fragments);
                    }
                    depth -= 1;
                    current.push(token.clone());
                }
                Token::Symbol(',') if depth == 0 => {
                    fragments.push(std::mem::take(&mut current));
                }
                _ => current.push(token.clone()),
            }
            self.advance();
        }

        Err(ParseError("Unbalanced parentheses.".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ddl::statement::DdlKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_create_table() {
        let parsed = parse_script(
            "CREATE TABLE Users (\n  id INT NOT NULL,\n  name VARCHAR(50),\n  balance DECIMAL(10,2),\n  PRIMARY KEY (id)\n);",
        );
        assert!(parsed.script_issues.is_empty());
        assert_eq!(parsed.statements.len(), 1);

        match &parsed.statements[0].statement {
            DdlStatement::CreateTable {
                table,
                columns,
                constraints,
                if_not_exists,
            } => {
                assert_eq!(table, "users");
                assert!(!if_not_exists);
                assert_eq!(constraints.len(), 1);
                assert_eq!(columns.len(), 3);
                assert_eq!(columns[0].name, "id");
                assert!(!columns[0].nullable);
                assert_eq!(columns[1].data_type, "VARCHAR");
                assert_eq!(columns[1].length, Some(50));
                assert_eq!(columns[2].data_type, "DECIMAL");
                assert_eq!(columns[2].precision, Some(10));
                assert_eq!(columns[2].scale, Some(2));
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_parse_if_not_exists_and_if_exists_flags() {
        let parsed = parse_script(
            "CREATE TABLE IF NOT EXISTS t (id INT); DROP TABLE IF EXISTS t;",
        );
        assert!(matches!(
            parsed.statements[0].statement,
            DdlStatement::CreateTable { if_not_exists: true, .. }
        ));
        assert!(matches!(
            parsed.statements[1].statement,
            DdlStatement::DropTable { if_exists: true, .. }
        ));
    }

    #[test]
    fn test_parse_alter_variants() {
        let parsed = parse_script(
            "ALTER TABLE t ADD COLUMN c1 INT;\
             ALTER TABLE t DROP COLUMN c2;\
             ALTER TABLE t MODIFY COLUMN c3 VARCHAR(10);\
             ALTER TABLE t CHANGE COLUMN c4 c5 BIGINT;",
        );
        assert_eq!(parsed.statements.len(), 4);
        let ops: Vec<_> = parsed
            .statements
            .iter()
            .map(|s| match &s.statement {
                DdlStatement::AlterTable { op, .. } => op.clone(),
                other => panic!("unexpected statement: {:?}", other),
            })
            .collect();

        assert!(matches!(&ops[0], AlterOp::AddColumn { name, .. } if name == "c1"));
        assert!(matches!(&ops[1], AlterOp::DropColumn { name } if name == "c2"));
        assert!(
            matches!(&ops[2], AlterOp::ModifyColumn { name, type_def } if name == "c3" && type_def.length == Some(10))
        );
        assert!(
            matches!(&ops[3], AlterOp::ChangeColumn { old_name, new_name, .. } if old_name == "c4" && new_name == "c5")
        );
    }

    #[test]
    fn test_multi_op_alter_flattens_with_distinct_indices() {
        let parsed = parse_script("ALTER TABLE t ADD c1 INT, DROP COLUMN c2;");
        assert_eq!(parsed.statements.len(), 2);
        assert_eq!(parsed.statements[0].index, 1);
        assert_eq!(parsed.statements[1].index, 2);
    }

    #[test]
    fn test_parse_create_index() {
        let parsed = parse_script("CREATE UNIQUE INDEX idx_email ON Users (Email, LOWER(name));");
        match &parsed.statements[0].statement {
            DdlStatement::CreateIndex {
                table,
                name,
                columns,
                unique,
            } => {
                assert_eq!(table, "users");
                assert_eq!(name, "idx_email");
                assert!(unique);
                // The expression entry is excluded from the existence check.
                assert_eq!(columns, &vec!["email".to_string()]);
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_parse_drop_index() {
        let parsed = parse_script("DROP INDEX idx_email ON users;");
        assert_eq!(
            parsed.statements[0].statement,
            DdlStatement::DropIndex {
                table: "users".to_string(),
                name: "idx_email".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_statements_pass_through() {
        let parsed = parse_script("USE mydb; SELECT * FROM t; SHOW TABLES;");
        assert_eq!(parsed.statements.len(), 3);
        for stmt in &parsed.statements {
            assert_eq!(stmt.statement.kind(), DdlKind::Unknown);
            assert!(stmt.parse_issues.is_empty());
        }
    }

    #[test]
    fn test_malformed_ddl_degrades_to_unknown_with_issue() {
        let parsed = parse_script("ALTER TABLE t RENAME TO u;");
        assert_eq!(parsed.statements.len(), 1);
        assert_eq!(parsed.statements[0].statement.kind(), DdlKind::Unknown);
        assert_eq!(parsed.statements[0].parse_issues.len(), 1);
        assert!(parsed.has_parse_errors());
    }

    #[test]
    fn test_empty_script_reports_script_issue() {
        let parsed = parse_script("  \n  -- only a comment\n");
        assert!(parsed.statements.is_empty());
        assert_eq!(parsed.script_issues.len(), 1);
    }

    #[test]
    fn test_missing_terminator_reports_script_issue() {
        let parsed = parse_script("CREATE TABLE t (id INT)");
        assert_eq!(parsed.script_issues.len(), 1);
        // Fail-soft: the unterminated statement is still extracted.
        assert_eq!(parsed.statements.len(), 1);
        assert_eq!(parsed.statements[0].statement.kind(), DdlKind::CreateTable);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let sql = "CREATE TABLE t (id INT, name VARCHAR(50));\nALTER TABLE t ADD email VARCHAR(100);\nCREATE INDEX idx_name ON t (name);";
        assert_eq!(parse_script(sql), parse_script(sql));
    }

    #[test]
    fn test_enum_parameters_stay_unknown() {
        let parsed = parse_script("ALTER TABLE t MODIFY status ENUM('a','b') NOT NULL;");
        match &parsed.statements[0].statement {
            DdlStatement::AlterTable {
                op: AlterOp::ModifyColumn { type_def, .. },
                ..
            } => {
                assert_eq!(type_def.base_type, "ENUM");
                assert_eq!(type_def.length, None);
                assert_eq!(type_def.precision, None);
                assert!(!type_def.nullable);
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }
}
