use vfq_common::{Result, VfqError};

use crate::ast::{
    CompareOp, Expr, LimitClause, Literal, OrderClause, OrderDirection, OrderTarget, Projection,
    ProjectionItem, ProjectionTarget, Statement, VectorExpr,
};
use crate::lexer::{tokenize, Token};

/// Parse query text into a [`Statement`].
///
/// Pure function: the same text always yields a structurally equal AST.
/// Fails with [`VfqError::Parse`] carrying the offending token and its
/// position in the input.
pub fn parse(text: &str) -> Result<Statement> {
    let tokens = tokenize(text)?;
    let mut parser = Parser { tokens, cursor: 0 };
    let statement = parser.parse_statement()?;
    parser.expect(Token::Eof, "expected end of query")?;
    Ok(statement)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    cursor: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.cursor].0
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.cursor].0.clone();
        if self.cursor + 1 < self.tokens.len() {
            self.cursor += 1;
        }
        token
    }

    fn accept(&mut self, token: Token) -> bool {
        if *self.peek() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, message: &str) -> Result<()> {
        if *self.peek() == token {
            self.advance();
            Ok(())
        } else {
            Err(self.error(message))
        }
    }

    /// Parse error pointing at the current (unconsumed) token.
    fn error(&self, message: &str) -> VfqError {
        let (token, position) = &self.tokens[self.cursor];
        VfqError::Parse {
            message: message.to_string(),
            token: token.to_string(),
            position: *position,
        }
    }

    fn identifier(&mut self, message: &str) -> Result<String> {
        match self.peek() {
            Token::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.error(message)),
        }
    }

    fn integer(&mut self, message: &str) -> Result<i64> {
        match self.peek() {
            Token::Integer(v) => {
                let v = *v;
                self.advance();
                Ok(v)
            }
            _ => Err(self.error(message)),
        }
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        self.expect(Token::Select, "expected SELECT")?;
        let projection = self.parse_projection()?;
        self.expect(Token::From, "expected FROM")?;
        let source = self.identifier("expected collection or namespace name after FROM")?;

        let predicate = if self.accept(Token::Where) {
            Some(self.parse_or()?)
        } else {
            None
        };

        let order_by = if self.accept(Token::Order) {
            self.expect(Token::By, "expected BY after ORDER")?;
            Some(self.parse_order_clause()?)
        } else {
            None
        };

        let limit = if self.accept(Token::Limit) {
            Some(self.parse_limit_clause()?)
        } else {
            None
        };

        Ok(Statement {
            projection,
            source,
            predicate,
            order_by,
            limit,
        })
    }

    fn parse_projection(&mut self) -> Result<Projection> {
        if self.accept(Token::Star) {
            return Ok(Projection::All);
        }
        let mut items = vec![self.parse_projection_item()?];
        while self.accept(Token::Comma) {
            items.push(self.parse_projection_item()?);
        }
        Ok(Projection::Items(items))
    }

    fn parse_projection_item(&mut self) -> Result<ProjectionItem> {
        let target = match self.peek() {
            Token::Id => {
                self.advance();
                ProjectionTarget::RecordId
            }
            Token::Similarity => {
                self.advance();
                ProjectionTarget::Similarity
            }
            Token::Vector => {
                self.advance();
                ProjectionTarget::Vector
            }
            Token::Identifier(name) => {
                let name = name.clone();
                self.advance();
                ProjectionTarget::Field(name)
            }
            _ => return Err(self.error("expected projection item")),
        };
        let alias = if self.accept(Token::As) {
            Some(self.identifier("expected alias after AS")?)
        } else {
            None
        };
        Ok(ProjectionItem { target, alias })
    }

    // Precedence: OR < AND < NOT < primary.

    fn parse_or(&mut self) -> Result<Expr> {
        let mut expr = self.parse_and()?;
        while self.accept(Token::Or) {
            let right = self.parse_and()?;
            expr = Expr::Or(Box::new(expr), Box::new(right));
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut expr = self.parse_not()?;
        while self.accept(Token::And) {
            let right = self.parse_not()?;
            expr = Expr::And(Box::new(expr), Box::new(right));
        }
        Ok(expr)
    }

    fn parse_not(&mut self) -> Result<Expr> {
        if self.accept(Token::Not) {
            let inner = self.parse_not()?;
            Ok(Expr::Not(Box::new(inner)))
        } else {
            self.parse_primary()
        }
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        if self.accept(Token::LParen) {
            let expr = self.parse_or()?;
            self.expect(Token::RParen, "expected closing parenthesis")?;
            return Ok(expr);
        }
        if self.accept(Token::Match) {
            return self.parse_match();
        }
        let field = self.identifier("expected predicate")?;
        self.parse_comparison(field)
    }

    fn parse_comparison(&mut self, field: String) -> Result<Expr> {
        let op = match self.peek() {
            Token::Eq => CompareOp::Eq,
            Token::NotEq => CompareOp::NotEq,
            Token::Lt => CompareOp::Lt,
            Token::LtEq => CompareOp::LtEq,
            Token::Gt => CompareOp::Gt,
            Token::GtEq => CompareOp::GtEq,
            Token::In => {
                self.advance();
                let value = self.parse_in_list()?;
                return Ok(Expr::Compare {
                    field,
                    op: CompareOp::In,
                    value,
                });
            }
            _ => return Err(self.error("expected comparison operator")),
        };
        self.advance();
        let value = self.parse_literal()?;
        Ok(Expr::Compare { field, op, value })
    }

    fn parse_in_list(&mut self) -> Result<Literal> {
        self.expect(Token::LParen, "expected '(' after IN")?;
        let mut values = vec![self.parse_literal()?];
        while self.accept(Token::Comma) {
            values.push(self.parse_literal()?);
        }
        self.expect(Token::RParen, "expected ')' closing IN list")?;
        Ok(Literal::List(values))
    }

    fn parse_literal(&mut self) -> Result<Literal> {
        let literal = match self.peek() {
            Token::Integer(v) => Literal::Integer(*v),
            Token::Float(v) => Literal::Float(*v),
            Token::Text(v) => Literal::Text(v.clone()),
            Token::Boolean(v) => Literal::Boolean(*v),
            Token::Null => Literal::Null,
            _ => return Err(self.error("expected literal value")),
        };
        self.advance();
        Ok(literal)
    }

    fn parse_match(&mut self) -> Result<Expr> {
        let vector = match self.peek() {
            Token::Param(name) => {
                let name = name.clone();
                self.advance();
                VectorExpr::Param(name)
            }
            Token::LBracket => VectorExpr::Literal(self.parse_vector_literal()?),
            _ => return Err(self.error("expected vector literal or :parameter after MATCH")),
        };
        self.expect(Token::Within, "expected WITHIN after MATCH vector")?;
        let within = self.integer("expected integer after WITHIN")?;
        Ok(Expr::Match { vector, within })
    }

    fn parse_vector_literal(&mut self) -> Result<Vec<f32>> {
        self.expect(Token::LBracket, "expected '['")?;
        if *self.peek() == Token::RBracket {
            return Err(self.error("vector literal must not be empty"));
        }
        let mut values = vec![self.parse_vector_component()?];
        while self.accept(Token::Comma) {
            values.push(self.parse_vector_component()?);
        }
        self.expect(Token::RBracket, "expected ']' closing vector literal")?;
        Ok(values)
    }

    fn parse_vector_component(&mut self) -> Result<f32> {
        let value = match self.peek() {
            Token::Integer(v) => *v as f32,
            Token::Float(v) => *v as f32,
            _ => return Err(self.error("expected numeric vector component")),
        };
        self.advance();
        Ok(value)
    }

    fn parse_order_clause(&mut self) -> Result<OrderClause> {
        let target = match self.peek() {
            Token::Similarity => {
                self.advance();
                OrderTarget::Similarity
            }
            Token::Identifier(field) => {
                let field = field.clone();
                self.advance();
                OrderTarget::Field(field)
            }
            _ => return Err(self.error("expected SIMILARITY or field name after ORDER BY")),
        };
        let direction = if self.accept(Token::Asc) {
            Some(OrderDirection::Asc)
        } else if self.accept(Token::Desc) {
            Some(OrderDirection::Desc)
        } else {
            None
        };
        Ok(OrderClause { target, direction })
    }

    fn parse_limit_clause(&mut self) -> Result<LimitClause> {
        let limit = self.integer("expected integer after LIMIT")?;
        let offset = if self.accept(Token::Offset) {
            Some(self.integer("expected integer after OFFSET")?)
        } else {
            None
        };
        Ok(LimitClause { limit, offset })
    }
}
