//! Statement parser: sqlparser tokenizer + recursive descent.
//!
//! Query text is tokenized with the `sqlparser` tokenizer, so keywords are
//! classified as whole tokens (case-insensitive) and never matched inside
//! identifiers or quoted literals. The token stream is then parsed into a
//! [`Statement`] by a small hand-written recursive-descent parser for the
//! supported subset:
//!
//! ```text
//! SELECT [DISTINCT] <field,...> FROM <table>
//!   [ (INNER|LEFT|RIGHT) JOIN <table> ON <table.col> = <table.col> ]
//!   [ WHERE <cond> ((AND|OR) <cond>)* ]
//!   [ GROUP BY <field,...> ]
//!   [ ORDER BY <field [ASC|DESC]>,... ]
//!   [ LIMIT <integer> ]
//!
//! INSERT INTO <table> (<col,...>) VALUES (<val,...>)
//!
//! DELETE FROM <table> [ WHERE <cond> ((AND|OR) <cond>)* ]
//! ```

use crate::error::{ExecutionError, ParseError, TabqlResult};
use crate::sql::types::*;
use crate::types::Value;
use sqlparser::dialect::GenericDialect;
use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::{Token, Tokenizer, Word};

/// Keywords that end an identifier position.
const RESERVED: &[Keyword] = &[
    Keyword::SELECT,
    Keyword::DISTINCT,
    Keyword::FROM,
    Keyword::WHERE,
    Keyword::GROUP,
    Keyword::BY,
    Keyword::ORDER,
    Keyword::LIMIT,
    Keyword::INNER,
    Keyword::LEFT,
    Keyword::RIGHT,
    Keyword::FULL,
    Keyword::CROSS,
    Keyword::OUTER,
    Keyword::JOIN,
    Keyword::ON,
    Keyword::AND,
    Keyword::OR,
    Keyword::NOT,
    Keyword::LIKE,
    Keyword::ILIKE,
    Keyword::IS,
    Keyword::IN,
    Keyword::BETWEEN,
    Keyword::ASC,
    Keyword::DESC,
    Keyword::INSERT,
    Keyword::INTO,
    Keyword::VALUES,
    Keyword::DELETE,
    Keyword::NULL,
];

/// Operator words that are recognised but outside the supported set.
const UNSUPPORTED_OPERATORS: &[Keyword] = &[
    Keyword::NOT,
    Keyword::ILIKE,
    Keyword::IS,
    Keyword::IN,
    Keyword::BETWEEN,
];

/// SQL 파서: sqlparser tokenizer 기반
pub struct SqlParser {
    dialect: GenericDialect,
}

impl SqlParser {
    /// 새 SQL 파서 생성
    pub fn new() -> Self {
        Self {
            dialect: GenericDialect {},
        }
    }

    /// Parse any supported statement, dispatching on the leading keyword.
    pub fn parse(&self, sql: &str) -> TabqlResult<Statement> {
        let mut stream = self.tokenize(sql)?;
        match stream.peek() {
            None => Err(ParseError::invalid("", "empty query").into()),
            Some(Token::Word(w)) if w.keyword == Keyword::SELECT => {
                Ok(Statement::Select(stream.parse_select()?))
            }
            Some(Token::Word(w)) if w.keyword == Keyword::INSERT => {
                Ok(Statement::Insert(stream.parse_insert()?))
            }
            Some(Token::Word(w)) if w.keyword == Keyword::DELETE => {
                Ok(Statement::Delete(stream.parse_delete()?))
            }
            Some(Token::Word(w)) => {
                Err(ExecutionError::UnsupportedQueryType(w.value.to_uppercase()).into())
            }
            Some(other) => Err(ExecutionError::UnsupportedQueryType(other.to_string()).into()),
        }
    }

    pub fn parse_select(&self, sql: &str) -> TabqlResult<SelectStatement> {
        self.tokenize(sql)?.parse_select()
    }

    pub fn parse_insert(&self, sql: &str) -> TabqlResult<InsertStatement> {
        self.tokenize(sql)?.parse_insert()
    }

    pub fn parse_delete(&self, sql: &str) -> TabqlResult<DeleteStatement> {
        self.tokenize(sql)?.parse_delete()
    }

    fn tokenize(&self, sql: &str) -> Result<TokenStream, ParseError> {
        let tokens = Tokenizer::new(&self.dialect, sql)
            .tokenize()
            .map_err(|e| ParseError::invalid(sql.trim(), e.to_string()))?;
        Ok(TokenStream {
            tokens: tokens
                .into_iter()
                .filter(|t| !matches!(t, Token::Whitespace(_)))
                .collect(),
            pos: 0,
        })
    }
}

impl Default for SqlParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a SELECT/INSERT/DELETE statement.
pub fn parse_statement(sql: &str) -> TabqlResult<Statement> {
    SqlParser::new().parse(sql)
}

pub fn parse_select(sql: &str) -> TabqlResult<SelectStatement> {
    SqlParser::new().parse_select(sql)
}

pub fn parse_insert(sql: &str) -> TabqlResult<InsertStatement> {
    SqlParser::new().parse_insert(sql)
}

pub fn parse_delete(sql: &str) -> TabqlResult<DeleteStatement> {
    SqlParser::new().parse_delete(sql)
}

fn is_reserved(word: &Word) -> bool {
    word.quote_style.is_none() && RESERVED.contains(&word.keyword)
}

/// Whitespace-free token cursor.
struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenStream {
    // ===== Cursor helpers =====

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.peek(), Some(Token::Word(w)) if w.quote_style.is_none() && w.keyword == keyword)
    }

    fn consume_keyword(&mut self, keyword: Keyword) -> bool {
        if self.peek_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword, reason: &str) -> Result<(), ParseError> {
        if self.consume_keyword(keyword) {
            Ok(())
        } else {
            Err(self.error(reason))
        }
    }

    fn consume_token(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_token(&mut self, expected: &Token, reason: &str) -> Result<(), ParseError> {
        if self.consume_token(expected) {
            Ok(())
        } else {
            Err(self.error(reason))
        }
    }

    /// Text near the cursor, for error messages.
    fn fragment(&self) -> String {
        let rest: Vec<String> = self.tokens[self.pos.min(self.tokens.len())..]
            .iter()
            .take(6)
            .map(ToString::to_string)
            .collect();
        if rest.is_empty() {
            "end of input".to_string()
        } else {
            rest.join(" ")
        }
    }

    fn error(&self, reason: &str) -> ParseError {
        ParseError::invalid(self.fragment(), reason)
    }

    /// Optional `;`, then end of input.
    fn finish(&mut self) -> Result<(), ParseError> {
        self.consume_token(&Token::SemiColon);
        if self.pos < self.tokens.len() {
            return Err(self.error("unexpected input after end of statement"));
        }
        Ok(())
    }

    fn parse_comma_separated<T>(
        &mut self,
        mut item: impl FnMut(&mut Self) -> TabqlResult<T>,
    ) -> TabqlResult<Vec<T>> {
        let mut items = vec![item(self)?];
        while self.consume_token(&Token::Comma) {
            items.push(item(self)?);
        }
        Ok(items)
    }

    // ===== Names =====

    fn parse_identifier(&mut self, what: &str) -> Result<String, ParseError> {
        match self.peek() {
            Some(Token::Word(w)) if !is_reserved(w) => {
                let name = w.value.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.error(&format!("expected {what}"))),
        }
    }

    /// `column` or `table.column`
    fn parse_field_ref(&mut self, what: &str) -> Result<String, ParseError> {
        let first = self.parse_identifier(what)?;
        if self.consume_token(&Token::Period) {
            let column = self.parse_identifier("column name after `.`")?;
            return Ok(format!("{first}.{column}"));
        }
        Ok(first)
    }

    fn parse_qualified_column(&mut self) -> Result<ColumnRef, ParseError> {
        let table = self.parse_identifier("qualified join key (table.column)")?;
        if !self.consume_token(&Token::Period) {
            return Err(self.error("join keys must be qualified as table.column"));
        }
        let column = self.parse_identifier("column name after `.`")?;
        Ok(ColumnRef { table, column })
    }

    // ===== SELECT =====

    fn parse_select(&mut self) -> TabqlResult<SelectStatement> {
        self.expect_keyword(Keyword::SELECT, "expected SELECT")?;
        let distinct = self.consume_keyword(Keyword::DISTINCT);
        let fields = self.parse_select_list()?;
        self.expect_keyword(Keyword::FROM, "expected FROM after the field list")?;
        let table = self.parse_identifier("table name after FROM")?;

        let join = if self.at_join() {
            Some(self.parse_join(&table)?)
        } else {
            None
        };

        let where_clause = if self.consume_keyword(Keyword::WHERE) {
            Some(self.parse_predicate()?)
        } else {
            None
        };

        let group_by = if self.consume_keyword(Keyword::GROUP) {
            self.expect_keyword(Keyword::BY, "expected BY after GROUP")?;
            Some(self.parse_comma_separated(|p| Ok(p.parse_field_ref("GROUP BY field")?))?)
        } else {
            None
        };

        let order_by = if self.consume_keyword(Keyword::ORDER) {
            self.expect_keyword(Keyword::BY, "expected BY after ORDER")?;
            Some(self.parse_comma_separated(Self::parse_order_item)?)
        } else {
            None
        };

        let limit = if self.consume_keyword(Keyword::LIMIT) {
            Some(self.parse_limit()?)
        } else {
            None
        };

        self.finish()?;

        let has_aggregate_without_group_by =
            group_by.is_none() && fields.iter().any(SelectField::is_aggregate);

        Ok(SelectStatement {
            fields,
            table,
            where_clause,
            join,
            group_by,
            has_aggregate_without_group_by,
            order_by,
            limit,
            distinct,
        })
    }

    fn parse_select_list(&mut self) -> TabqlResult<Vec<SelectField>> {
        if self.consume_token(&Token::Mul) {
            if self.peek() == Some(&Token::Comma) {
                return Err(self.error("`*` cannot be combined with other fields").into());
            }
            return Ok(vec![SelectField::Wildcard]);
        }
        self.parse_comma_separated(Self::parse_select_field)
    }

    fn parse_select_field(&mut self) -> TabqlResult<SelectField> {
        let is_call = matches!(
            (self.peek(), self.peek_nth(1)),
            (Some(Token::Word(w)), Some(Token::LParen)) if w.quote_style.is_none()
        );
        if !is_call {
            return Ok(SelectField::Column(self.parse_field_ref("field name")?));
        }

        let name = match self.advance() {
            Some(Token::Word(w)) => w.value,
            _ => return Err(self.error("expected function name").into()),
        };
        let function = AggregateFunction::from_name(&name).ok_or_else(|| {
            ParseError::invalid(
                format!("{name}("),
                format!("unknown aggregate function `{name}`"),
            )
        })?;
        self.expect_token(&Token::LParen, "expected `(`")?;
        let argument = if self.consume_token(&Token::Mul) {
            if function != AggregateFunction::Count {
                return Err(self.error("`*` is only valid as an argument of COUNT").into());
            }
            AggregateArg::Star
        } else {
            AggregateArg::Column(self.parse_field_ref("aggregate argument")?)
        };
        self.expect_token(&Token::RParen, "expected `)` after aggregate argument")?;
        Ok(SelectField::Aggregate(AggregateExpr { function, argument }))
    }

    fn parse_order_item(&mut self) -> TabqlResult<OrderSpec> {
        let field = match self.parse_select_field()? {
            SelectField::Wildcard => return Err(self.error("cannot ORDER BY `*`").into()),
            other => other.name(),
        };
        let direction = if self.consume_keyword(Keyword::DESC) {
            SortDirection::Desc
        } else {
            self.consume_keyword(Keyword::ASC);
            SortDirection::Asc
        };
        Ok(OrderSpec { field, direction })
    }

    fn parse_limit(&mut self) -> Result<i64, ParseError> {
        let negative = self.consume_token(&Token::Minus);
        match self.peek() {
            Some(Token::Number(n, _)) => {
                let parsed = n.parse::<i64>();
                match parsed {
                    Ok(v) => {
                        self.pos += 1;
                        Ok(if negative { -v } else { v })
                    }
                    Err(_) => Err(self.error("LIMIT expects an integer")),
                }
            }
            _ => Err(self.error("LIMIT expects an integer")),
        }
    }

    // ===== JOIN =====

    fn at_join(&self) -> bool {
        [
            Keyword::INNER,
            Keyword::LEFT,
            Keyword::RIGHT,
            Keyword::FULL,
            Keyword::CROSS,
            Keyword::JOIN,
        ]
        .into_iter()
        .any(|kw| self.peek_keyword(kw))
    }

    fn parse_join(&mut self, from_table: &str) -> TabqlResult<JoinSpec> {
        let kind = if self.consume_keyword(Keyword::INNER) {
            JoinType::Inner
        } else if self.consume_keyword(Keyword::LEFT) {
            self.consume_keyword(Keyword::OUTER);
            JoinType::Left
        } else if self.consume_keyword(Keyword::RIGHT) {
            self.consume_keyword(Keyword::OUTER);
            JoinType::Right
        } else if self.peek_keyword(Keyword::FULL) || self.peek_keyword(Keyword::CROSS) {
            let kind = self.fragment_word();
            return Err(ExecutionError::UnsupportedJoinType(kind).into());
        } else {
            JoinType::Inner
        };

        self.expect_keyword(Keyword::JOIN, "expected JOIN")?;
        let table = self.parse_identifier("table name after JOIN")?;
        // qualified names are the only way to tell the two sides apart
        if table.eq_ignore_ascii_case(from_table) {
            return Err(ParseError::invalid(table, "self-joins are not supported").into());
        }
        self.expect_keyword(Keyword::ON, "expected ON after the joined table")?;
        let first = self.parse_qualified_column()?;
        self.expect_token(&Token::Eq, "expected `=` in join condition")?;
        let second = self.parse_qualified_column()?;

        let (left_key, right_key) = if first.table.eq_ignore_ascii_case(from_table)
            && second.table.eq_ignore_ascii_case(&table)
        {
            (first, second)
        } else if first.table.eq_ignore_ascii_case(&table)
            && second.table.eq_ignore_ascii_case(from_table)
        {
            (second, first)
        } else {
            return Err(ParseError::invalid(
                format!("{first} = {second}"),
                format!("join condition must reference `{from_table}` and `{table}`"),
            )
            .into());
        };

        Ok(JoinSpec {
            kind,
            table,
            left_key,
            right_key,
        })
    }

    fn fragment_word(&self) -> String {
        match self.peek() {
            Some(Token::Word(w)) => w.value.to_uppercase(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }

    // ===== WHERE =====

    /// `or := and (OR and)*`
    fn parse_predicate(&mut self) -> TabqlResult<Predicate> {
        let mut left = self.parse_conjunction()?;
        while self.consume_keyword(Keyword::OR) {
            let right = self.parse_conjunction()?;
            left = Predicate::or(left, right);
        }
        Ok(left)
    }

    /// `and := primary (AND primary)*`
    fn parse_conjunction(&mut self) -> TabqlResult<Predicate> {
        let mut left = self.parse_primary()?;
        while self.consume_keyword(Keyword::AND) {
            let right = self.parse_primary()?;
            left = Predicate::and(left, right);
        }
        Ok(left)
    }

    fn parse_primary(&mut self) -> TabqlResult<Predicate> {
        if self.consume_token(&Token::LParen) {
            let inner = self.parse_predicate()?;
            self.expect_token(&Token::RParen, "expected `)` to close the condition group")?;
            return Ok(inner);
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> TabqlResult<Predicate> {
        let field = self.parse_field_ref("field name in condition")?;
        let operator = match self.peek() {
            Some(Token::Eq) => ComparisonOperator::Eq,
            Some(Token::Neq) => ComparisonOperator::NotEq,
            Some(Token::Gt) => ComparisonOperator::Gt,
            Some(Token::Lt) => ComparisonOperator::Lt,
            Some(Token::GtEq) => ComparisonOperator::GtEq,
            Some(Token::LtEq) => ComparisonOperator::LtEq,
            Some(Token::Word(w)) if w.quote_style.is_none() && w.keyword == Keyword::LIKE => {
                ComparisonOperator::Like
            }
            Some(token @ (Token::DoubleEq | Token::Spaceship)) => {
                return Err(ExecutionError::UnsupportedOperator(token.to_string()).into());
            }
            Some(Token::Word(w))
                if w.quote_style.is_none() && UNSUPPORTED_OPERATORS.contains(&w.keyword) =>
            {
                let mut op = w.value.to_uppercase();
                if w.keyword == Keyword::NOT
                    && let Some(Token::Word(next)) = self.peek_nth(1)
                {
                    op = format!("{op} {}", next.value.to_uppercase());
                }
                return Err(ExecutionError::UnsupportedOperator(op).into());
            }
            _ => return Err(self.error("expected a comparison operator").into()),
        };
        self.pos += 1;
        let (value, _) = self.parse_literal()?;
        Ok(Predicate::Compare(WhereClause {
            field,
            operator,
            value,
        }))
    }

    /// Literal value plus its quote-stripped text.
    fn parse_literal(&mut self) -> Result<(Value, String), ParseError> {
        let negative = self.consume_token(&Token::Minus);
        let token = self.peek().cloned();
        let literal = match token {
            Some(Token::Number(n, _)) => {
                let text = if negative { format!("-{n}") } else { n };
                let value = if let Ok(i) = text.parse::<i64>() {
                    Value::Int64(i)
                } else if let Ok(f) = text.parse::<f64>() {
                    Value::Float64(f)
                } else {
                    return Err(self.error("malformed number"));
                };
                (value, text)
            }
            _ if negative => return Err(self.error("expected a number after `-`")),
            Some(Token::SingleQuotedString(s)) | Some(Token::DoubleQuotedString(s)) => {
                (Value::Utf8(s.clone()), s)
            }
            Some(Token::Word(w)) if w.quote_style.is_some() => {
                (Value::Utf8(w.value.clone()), w.value)
            }
            Some(Token::Word(w)) if w.keyword == Keyword::NULL => (Value::Null, String::new()),
            // bare words are taken as text
            Some(Token::Word(w)) if !is_reserved(&w) => (Value::Utf8(w.value.clone()), w.value),
            _ => return Err(self.error("expected a value")),
        };
        self.pos += 1;
        Ok(literal)
    }

    // ===== INSERT / DELETE =====

    fn parse_insert(&mut self) -> TabqlResult<InsertStatement> {
        self.expect_keyword(Keyword::INSERT, "expected INSERT")?;
        self.expect_keyword(Keyword::INTO, "expected INTO after INSERT")?;
        let table = self.parse_identifier("table name after INTO")?;

        self.expect_token(&Token::LParen, "expected `(` before the column list")?;
        let columns = self.parse_comma_separated(|p| Ok(p.parse_identifier("column name")?))?;
        self.expect_token(&Token::RParen, "expected `)` after the column list")?;

        self.expect_keyword(Keyword::VALUES, "expected VALUES")?;
        self.expect_token(&Token::LParen, "expected `(` before the value list")?;
        let values = self.parse_comma_separated(|p| Ok(p.parse_literal()?.1))?;
        self.expect_token(&Token::RParen, "expected `)` after the value list")?;
        self.finish()?;

        if columns.len() != values.len() {
            return Err(ParseError::invalid(
                format!("({}) VALUES ({})", columns.join(", "), values.join(", ")),
                format!(
                    "{} columns but {} values",
                    columns.len(),
                    values.len()
                ),
            )
            .into());
        }

        Ok(InsertStatement {
            table,
            columns,
            values,
        })
    }

    fn parse_delete(&mut self) -> TabqlResult<DeleteStatement> {
        self.expect_keyword(Keyword::DELETE, "expected DELETE")?;
        self.expect_keyword(Keyword::FROM, "expected FROM after DELETE")?;
        let table = self.parse_identifier("table name after FROM")?;
        let where_clause = if self.consume_keyword(Keyword::WHERE) {
            Some(self.parse_predicate()?)
        } else {
            None
        };
        self.finish()?;
        Ok(DeleteStatement {
            table,
            where_clause,
        })
    }
}
