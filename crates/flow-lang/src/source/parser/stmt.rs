use super::expr::{parse_expr, Expr};
use super::{Cursor, FunctionDef};
use crate::ast::SourceLoc;
use crate::error::FlowResult;
use crate::source::lexer::Token;

pub type Suite = Vec<Stmt>;

#[derive(Debug, Clone, PartialEq)]
pub struct Decorator {
    pub name: String,
    pub args: Vec<super::Arg>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr(Expr, SourceLoc),
    Assign {
        target: String,
        value: Expr,
        loc: SourceLoc,
    },
    If {
        test: Expr,
        body: Suite,
        orelse: Suite,
        loc: SourceLoc,
    },
    /// `with` doesn't branch; its body is kept as a nested suite that the
    /// classifier flattens into the surrounding sequence.
    With {
        body: Suite,
        loc: SourceLoc,
    },
    Return(Option<Expr>, SourceLoc),
    /// Statements with no bearing on the call graph (`pass`, `import`,
    /// `raise`, `assert`, `global`, `break`, `continue`, bare docstrings).
    Skip(SourceLoc),
    Unsupported {
        kind: String,
        loc: SourceLoc,
        reason: String,
    },
}

const CONTROL_FLOW_UNSUPPORTED: &[&str] = &["for", "while", "try"];

pub(super) fn parse_stmt(c: &mut Cursor) -> FlowResult<Stmt> {
    let loc = c.loc();
    match c.peek_tok() {
        Some(Token::Name(n)) if n == "if" => parse_if(c, "if"),
        Some(Token::Name(n)) if CONTROL_FLOW_UNSUPPORTED.contains(&n.as_str()) => {
            let kind = n.clone();
            skip_one_statement(c)?;
            Ok(Stmt::Unsupported {
                kind: kind.clone(),
                loc,
                reason: format!(
                    "`{kind}` introduces control flow this analyser does not enumerate"
                ),
            })
        }
        Some(Token::Name(n)) if n == "with" => parse_with(c),
        Some(Token::Name(n)) if n == "return" => {
            c.advance();
            if c.peek_tok() == Some(&Token::Newline) || c.peek_tok() == Some(&Token::EndMarker) {
                c.consume_newline()?;
                Ok(Stmt::Return(None, loc))
            } else {
                let value = parse_expr(c)?;
                c.consume_newline()?;
                Ok(Stmt::Return(Some(value), loc))
            }
        }
        Some(Token::Name(n))
            if [
                "pass", "import", "from", "raise", "assert", "global", "nonlocal", "del",
                "break", "continue",
            ]
            .contains(&n.as_str()) =>
        {
            skip_one_statement(c)?;
            Ok(Stmt::Skip(loc))
        }
        Some(Token::Str { .. }) => {
            // A bare string expression statement: typically a docstring.
            skip_one_statement(c)?;
            Ok(Stmt::Skip(loc))
        }
        _ => parse_expr_or_assign(c, loc),
    }
}

fn parse_if(c: &mut Cursor, keyword: &str) -> FlowResult<Stmt> {
    let loc = c.loc();
    c.expect_keyword(keyword)?;
    let test = parse_expr(c)?;
    c.expect(Token::Colon)?;
    let body = parse_suite(c)?;
    let orelse = if c.at_name("elif") {
        vec![parse_if(c, "elif")?]
    } else if c.at_name("else") {
        c.advance();
        c.expect(Token::Colon)?;
        parse_suite(c)?
    } else {
        Vec::new()
    };
    Ok(Stmt::If {
        test,
        body,
        orelse,
        loc,
    })
}

fn parse_with(c: &mut Cursor) -> FlowResult<Stmt> {
    let loc = c.loc();
    c.expect_keyword("with")?;
    // One or more comma-separated context managers, each optionally `as NAME`;
    // none of it affects control flow so we only need to reach the colon.
    c.skip_until_terminator();
    c.expect(Token::Colon)?;
    let body = parse_suite(c)?;
    Ok(Stmt::With { body, loc })
}

fn parse_expr_or_assign(c: &mut Cursor, loc: SourceLoc) -> FlowResult<Stmt> {
    let mark = c.save();
    if let Some(target) = try_parse_assign_target(c) {
        if c.peek_tok() == Some(&Token::Equals) {
            c.advance();
            let value = parse_expr(c)?;
            c.consume_newline()?;
            return Ok(Stmt::Assign { target, value, loc });
        }
    }
    c.restore(mark);
    let value = parse_expr(c)?;
    c.consume_newline()?;
    Ok(Stmt::Expr(value, loc))
}

/// A plausible assignment target: `name` or `name.attr.attr...`. Returns
/// `None` (restoring nothing — caller restores) if the shape doesn't match.
fn try_parse_assign_target(c: &mut Cursor) -> Option<String> {
    let Some(Token::Name(first)) = c.peek_tok().cloned() else {
        return None;
    };
    c.advance();
    let mut parts = vec![first];
    while c.peek_tok() == Some(&Token::Dot) {
        c.advance();
        match c.peek_tok().cloned() {
            Some(Token::Name(n)) => {
                c.advance();
                parts.push(n);
            }
            _ => return None,
        }
    }
    Some(parts.join("."))
}

fn parse_suite(c: &mut Cursor) -> FlowResult<Suite> {
    if c.peek_tok() == Some(&Token::Newline) {
        c.advance();
        c.expect(Token::Indent)?;
        let mut stmts = Vec::new();
        while !matches!(c.peek_tok(), Some(Token::Dedent) | Some(Token::EndMarker) | None) {
            if c.peek_tok() == Some(&Token::Newline) {
                c.advance();
                continue;
            }
            stmts.push(parse_stmt(c)?);
        }
        c.expect(Token::Dedent)?;
        Ok(stmts)
    } else {
        Ok(vec![parse_stmt(c)?])
    }
}

// ---------------------------------------------------------------------------
// Decorators and function definitions
// ---------------------------------------------------------------------------

pub(super) fn parse_decorators(c: &mut Cursor) -> FlowResult<Vec<Decorator>> {
    let mut decorators = Vec::new();
    while c.peek_tok() == Some(&Token::At) {
        c.advance();
        let target = super::expr::parse_expr(c)?;
        let (name, args) = match target {
            Expr::Call { func, args, .. } => (func.dotted_name().unwrap_or_default(), args),
            other => (other.dotted_name().unwrap_or_default(), Vec::new()),
        };
        decorators.push(Decorator { name, args });
        if c.peek_tok() == Some(&Token::Newline) {
            c.advance();
        }
    }
    Ok(decorators)
}

pub(super) fn parse_function_def(
    c: &mut Cursor,
    decorators: Vec<Decorator>,
) -> FlowResult<FunctionDef> {
    let loc = c.loc();
    if c.at_name("async") {
        c.advance();
    }
    c.expect_keyword("def")?;
    let name = c.expect_name()?;
    c.expect(Token::LParen)?;
    c.skip_balanced();
    // Optional `-> ReturnType` annotation before the colon.
    if matches!(c.peek_tok(), Some(Token::Op(op)) if op == "->") {
        c.advance();
        c.skip_until_terminator();
    }
    c.expect(Token::Colon)?;
    let body = parse_suite(c)?;
    Ok(FunctionDef {
        name,
        decorators,
        body,
        loc,
    })
}

/// Skip one logical statement this parser does not structurally need
/// (imports, bare expressions at class scope, etc.), including any
/// indented block it introduces.
pub(super) fn skip_one_statement(c: &mut Cursor) -> FlowResult<()> {
    loop {
        match c.peek_tok() {
            Some(Token::Newline) | Some(Token::EndMarker) | None => {
                c.advance();
                break;
            }
            Some(Token::Colon) => {
                c.advance();
                if c.peek_tok() == Some(&Token::Newline) {
                    c.advance();
                    if c.peek_tok() == Some(&Token::Indent) {
                        c.advance();
                        let mut depth = 1;
                        while depth > 0 {
                            match c.advance() {
                                Some(Token::Indent) => depth += 1,
                                Some(Token::Dedent) => depth -= 1,
                                Some(Token::EndMarker) | None => break,
                                _ => {}
                            }
                        }
                    }
                }
                break;
            }
            Some(Token::LParen | Token::LBracket | Token::LBrace) => {
                c.advance();
                c.skip_balanced();
            }
            _ => {
                c.advance();
            }
        }
    }
    Ok(())
}
