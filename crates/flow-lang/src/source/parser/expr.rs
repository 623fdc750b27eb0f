use super::Cursor;
use crate::ast::SourceLoc;
use crate::error::FlowResult;
use crate::source::lexer::Token;

/// One positional or keyword argument to a call.
#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    pub name: Option<String>,
    pub value: Expr,
}

/// An expression, modeled only to the depth the classifier needs. Anything
/// that doesn't reduce to a name reference, an attribute chain, a call, or
/// a literal becomes `Other` — the classifier never evaluates conditions or
/// arithmetic, so there is nothing further to represent.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Name(String),
    Attribute(Box<Expr>, String),
    Call {
        func: Box<Expr>,
        args: Vec<Arg>,
        loc: SourceLoc,
    },
    Str {
        value: String,
        is_fstring: bool,
    },
    Not(Box<Expr>),
    Other,
}

impl Expr {
    /// The dotted name of a `Name`/`Attribute` chain, e.g. `workflow.defn`,
    /// or `None` if this expression isn't a pure name chain.
    pub fn dotted_name(&self) -> Option<String> {
        match self {
            Expr::Name(n) => Some(n.clone()),
            Expr::Attribute(base, attr) => {
                let prefix = base.dotted_name()?;
                Some(format!("{prefix}.{attr}"))
            }
            _ => None,
        }
    }

    /// The trailing segment of a dotted name chain (e.g. `run` in
    /// `SomeWorkflow.run`), useful for method-style dispatch matching.
    pub fn last_segment(&self) -> Option<&str> {
        match self {
            Expr::Name(n) => Some(n.as_str()),
            Expr::Attribute(_, attr) => Some(attr.as_str()),
            _ => None,
        }
    }
}

pub(super) fn parse_expr(c: &mut Cursor) -> FlowResult<Expr> {
    if c.at_name("not") {
        c.advance();
        let inner = parse_expr(c)?;
        return finish(c, Expr::Not(Box::new(inner)));
    }
    let expr = parse_atom(c)?;
    let expr = parse_trailers(c, expr)?;
    finish(c, expr)
}

/// If trailing tokens remain before a terminator (a binary operator, a
/// subscript, anything we don't model), the expression as a whole is
/// opaque; consume the remainder so the caller resyncs cleanly.
fn finish(c: &mut Cursor, expr: Expr) -> FlowResult<Expr> {
    if c.at_terminator() {
        Ok(expr)
    } else {
        c.skip_until_terminator();
        Ok(Expr::Other)
    }
}

fn parse_trailers(c: &mut Cursor, mut expr: Expr) -> FlowResult<Expr> {
    loop {
        match c.peek_tok() {
            Some(Token::Dot) => {
                c.advance();
                let name = c.expect_name()?;
                expr = Expr::Attribute(Box::new(expr), name);
            }
            Some(Token::LParen) => {
                let loc = c.loc();
                let args = parse_arglist(c)?;
                expr = Expr::Call {
                    func: Box::new(expr),
                    args,
                    loc,
                };
            }
            Some(Token::LBracket) => {
                // Subscript: not modeled. Skip it and fall back to opaque.
                c.advance();
                c.skip_balanced();
                expr = Expr::Other;
            }
            _ => break,
        }
    }
    Ok(expr)
}

fn parse_atom(c: &mut Cursor) -> FlowResult<Expr> {
    match c.peek_tok().cloned() {
        Some(Token::Name(n)) => {
            c.advance();
            match n.as_str() {
                "True" | "False" | "None" | "lambda" => Ok(Expr::Other),
                _ => Ok(Expr::Name(n)),
            }
        }
        Some(Token::Str { value, is_fstring }) => {
            c.advance();
            Ok(Expr::Str { value, is_fstring })
        }
        Some(Token::Number(_)) => {
            c.advance();
            Ok(Expr::Other)
        }
        Some(Token::LParen) => {
            c.advance();
            let inner = parse_expr_inside_parens(c)?;
            Ok(inner)
        }
        Some(Token::LBracket) | Some(Token::LBrace) => {
            c.advance();
            c.skip_balanced();
            Ok(Expr::Other)
        }
        other => {
            c.skip_until_terminator();
            let _ = other;
            Ok(Expr::Other)
        }
    }
}

/// Parse the contents of a parenthesised group as a single expression
/// (grouping, not a tuple); anything with a top-level comma is opaque (a
/// tuple literal), which we don't model.
fn parse_expr_inside_parens(c: &mut Cursor) -> FlowResult<Expr> {
    if c.peek_tok() == Some(&Token::RParen) {
        c.advance();
        return Ok(Expr::Other);
    }
    let inner = parse_expr_no_resync(c)?;
    if c.peek_tok() == Some(&Token::RParen) {
        c.advance();
        Ok(inner)
    } else {
        c.advance();
        c.skip_balanced();
        Ok(Expr::Other)
    }
}

/// Like [`parse_expr`] but does not itself swallow trailing tokens into
/// `Other` — used where the caller (a `(...)` group) owns the terminator.
fn parse_expr_no_resync(c: &mut Cursor) -> FlowResult<Expr> {
    if c.at_name("not") {
        c.advance();
        let inner = parse_expr_no_resync(c)?;
        return Ok(Expr::Not(Box::new(inner)));
    }
    let atom = parse_atom(c)?;
    parse_trailers(c, atom)
}

fn parse_arglist(c: &mut Cursor) -> FlowResult<Vec<Arg>> {
    c.expect(Token::LParen)?;
    let mut args = Vec::new();
    if c.peek_tok() == Some(&Token::RParen) {
        c.advance();
        return Ok(args);
    }
    loop {
        if matches!(c.peek_tok(), Some(Token::Op(op)) if op == "*" || op == "**") {
            c.advance();
        }
        let name = if matches!(c.peek_tok(), Some(Token::Name(_)))
            && c.peek_tok_at(1) == Some(&Token::Equals)
        {
            let n = c.expect_name()?;
            c.advance();
            Some(n)
        } else {
            None
        };
        let value = parse_expr_no_resync(c)?;
        args.push(Arg { name, value });
        match c.peek_tok() {
            Some(Token::Comma) => {
                c.advance();
                if c.peek_tok() == Some(&Token::RParen) {
                    c.advance();
                    break;
                }
            }
            Some(Token::RParen) => {
                c.advance();
                break;
            }
            _ => {
                c.skip_until_terminator();
                if c.peek_tok() == Some(&Token::RParen) {
                    c.advance();
                }
                break;
            }
        }
    }
    Ok(args)
}
