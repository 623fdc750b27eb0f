//! Hand-rolled recursive-descent parser over the token slice produced by
//! [`super::lexer`]. A `winnow::TokenSlice` stream would fit, but the
//! indentation-driven grammar here needs backtracking shapes (arbitrary
//! lookahead past `elif`/`else`, skip-balanced-brackets for expressions we
//! don't model) that are easiest to get right, and easiest to keep correct
//! without a compiler to check against, as plain recursive functions over a
//! slice.

mod expr;
mod stmt;

pub use expr::{Arg, Expr};
pub use stmt::{Decorator, Stmt, Suite};

use crate::ast::SourceLoc;
use crate::error::{parse_error, FlowError, FlowResult};
use crate::source::lexer::{Spanned, Token};

// ---------------------------------------------------------------------------
// Module-level structure
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub decorators: Vec<Decorator>,
    pub body: Suite,
    pub loc: SourceLoc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub name: String,
    pub decorators: Vec<Decorator>,
    pub methods: Vec<FunctionDef>,
    pub loc: SourceLoc,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Module {
    pub classes: Vec<ClassDef>,
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

pub(crate) struct Cursor<'a> {
    path: &'a str,
    toks: &'a [Spanned],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(path: &'a str, toks: &'a [Spanned]) -> Self {
        Self { path, toks, pos: 0 }
    }

    pub(crate) fn peek_tok(&self) -> Option<&Token> {
        self.toks.get(self.pos).map(|s| &s.tok)
    }

    pub(crate) fn peek_tok_at(&self, offset: usize) -> Option<&Token> {
        self.toks.get(self.pos + offset).map(|s| &s.tok)
    }

    pub(crate) fn loc(&self) -> SourceLoc {
        self.toks
            .get(self.pos)
            .map(|s| s.loc)
            .or_else(|| self.toks.last().map(|s| s.loc))
            .unwrap_or(SourceLoc::new(0, 0))
    }

    pub(crate) fn advance(&mut self) -> Option<&Token> {
        let tok = self.toks.get(self.pos).map(|s| &s.tok);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    pub(crate) fn save(&self) -> usize {
        self.pos
    }

    pub(crate) fn restore(&mut self, mark: usize) {
        self.pos = mark;
    }

    pub(crate) fn at_name(&self, name: &str) -> bool {
        matches!(self.peek_tok(), Some(Token::Name(n)) if n == name)
    }

    pub(crate) fn err(&self, message: impl std::fmt::Display) -> FlowError {
        let line = self.toks.get(self.pos).map(|s| s.loc.line);
        parse_error(self.path, line, message, "check the statement at this location")
    }

    pub(crate) fn expect(&mut self, expected: Token) -> FlowResult<()> {
        if self.peek_tok() == Some(&expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.err(format!("expected {expected:?}, found {:?}", self.peek_tok())))
        }
    }

    pub(crate) fn expect_keyword(&mut self, keyword: &str) -> FlowResult<()> {
        if self.at_name(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(self.err(format!("expected keyword '{keyword}'")))
        }
    }

    pub(crate) fn expect_name(&mut self) -> FlowResult<String> {
        match self.advance() {
            Some(Token::Name(n)) => Ok(n.clone()),
            other => Err(self.err(format!("expected identifier, found {other:?}"))),
        }
    }

    /// Skip tokens until the bracket opened just before this call (already
    /// consumed) is balanced closed, honoring nested brackets of any kind.
    pub(crate) fn skip_balanced(&mut self) {
        let mut depth = 1i32;
        while depth > 0 {
            match self.advance() {
                Some(Token::LParen | Token::LBracket | Token::LBrace) => depth += 1,
                Some(Token::RParen | Token::RBracket | Token::RBrace) => depth -= 1,
                Some(Token::EndMarker) | None => break,
                _ => {}
            }
        }
    }

    /// Skip tokens up to (not including) the next terminator-shaped token.
    pub(crate) fn skip_until_terminator(&mut self) {
        loop {
            match self.peek_tok() {
                Some(
                    Token::Newline
                    | Token::Colon
                    | Token::Comma
                    | Token::RParen
                    | Token::RBracket
                    | Token::RBrace
                    | Token::EndMarker,
                )
                | None => break,
                Some(Token::LParen | Token::LBracket | Token::LBrace) => {
                    self.advance();
                    self.skip_balanced();
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    pub(crate) fn at_terminator(&self) -> bool {
        matches!(
            self.peek_tok(),
            Some(
                Token::Newline
                    | Token::Colon
                    | Token::Comma
                    | Token::RParen
                    | Token::RBracket
                    | Token::RBrace
                    | Token::EndMarker
            ) | None
        )
    }

    /// Consume a trailing `NEWLINE`, if present, tolerating EOF without one.
    pub(crate) fn consume_newline(&mut self) -> FlowResult<()> {
        match self.peek_tok() {
            Some(Token::Newline) => {
                self.advance();
                Ok(())
            }
            Some(Token::EndMarker) | None => Ok(()),
            other => Err(self.err(format!("expected end of statement, found {other:?}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn parse_module(path: &str, toks: &[Spanned]) -> FlowResult<Module> {
    let mut c = Cursor::new(path, toks);
    let mut classes = Vec::new();
    loop {
        match c.peek_tok() {
            Some(Token::EndMarker) | None => break,
            Some(Token::Newline) => {
                c.advance();
            }
            Some(Token::At) => {
                let decorators = stmt::parse_decorators(&mut c)?;
                if c.at_name("class") {
                    classes.push(parse_class(&mut c, decorators)?);
                } else {
                    // Decorated top-level function: not a workflow/activity
                    // class, skip its definition body entirely.
                    stmt::skip_one_statement(&mut c)?;
                }
            }
            Some(Token::Name(n)) if n == "class" => {
                classes.push(parse_class(&mut c, Vec::new())?);
            }
            _ => {
                stmt::skip_one_statement(&mut c)?;
            }
        }
    }
    Ok(Module { classes })
}

fn parse_class(c: &mut Cursor, decorators: Vec<Decorator>) -> FlowResult<ClassDef> {
    let loc = c.loc();
    c.expect_keyword("class")?;
    let name = c.expect_name()?;
    if c.peek_tok() == Some(&Token::LParen) {
        c.advance();
        c.skip_balanced();
    }
    c.expect(Token::Colon)?;
    c.consume_newline()?;
    c.expect(Token::Indent)?;
    let mut methods = Vec::new();
    while !matches!(c.peek_tok(), Some(Token::Dedent) | Some(Token::EndMarker) | None) {
        if c.peek_tok() == Some(&Token::Newline) {
            c.advance();
            continue;
        }
        let method_decorators = if c.peek_tok() == Some(&Token::At) {
            stmt::parse_decorators(c)?
        } else {
            Vec::new()
        };
        if c.at_name("def") || (c.at_name("async") && matches!(c.peek_tok_at(1), Some(Token::Name(n)) if n == "def"))
        {
            methods.push(stmt::parse_function_def(c, method_decorators)?);
        } else {
            stmt::skip_one_statement(c)?;
        }
    }
    c.expect(Token::Dedent)?;
    Ok(ClassDef {
        name,
        decorators,
        methods,
        loc,
    })
}
