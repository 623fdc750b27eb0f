//! Indentation-aware tokenizer.
//!
//! Grounded on `wf-lang::parse_utils` for the leaf-level primitives
//! (identifier, quoted-string scanning), generalised here to also track
//! Python-style `INDENT`/`DEDENT`/`NEWLINE` structure, since the analysed
//! language's block structure is significant whitespace rather than the
//! explicit `use`/`rule` keywords `wfl_parser` tokenizes directly off of.

use winnow::combinator::{alt, opt};
use winnow::prelude::*;
use winnow::token::take_while;

use crate::ast::SourceLoc;
use crate::error::{parse_error, FlowError, FlowResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Indent,
    Dedent,
    Newline,
    Name(String),
    Str { value: String, is_fstring: bool },
    Number(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Dot,
    Colon,
    Equals,
    At,
    /// Any other operator token, kept verbatim. The parser only ever
    /// inspects these when matching `not`-style unary tests, so exact
    /// operator identity beyond the string itself is unneeded.
    Op(String),
    EndMarker,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub tok: Token,
    pub loc: SourceLoc,
}

const KEYWORDS: &[&str] = &[
    "class", "def", "if", "elif", "else", "for", "while", "try", "except", "finally", "return",
    "import", "from", "pass", "not", "and", "or", "True", "False", "None", "lambda", "with",
    "yield", "async", "await", "raise", "break", "continue", "global", "nonlocal", "del", "in",
    "is", "assert",
];

/// True if `name` is a reserved word rather than an identifier. The parser
/// uses this to tell a bare `Name` apart from a keyword it must special-case.
pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

struct Lexer<'a> {
    path: &'a str,
    chars: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    bracket_depth: i32,
    indents: Vec<usize>,
    at_line_start: bool,
    out: Vec<Spanned>,
}

impl<'a> Lexer<'a> {
    fn new(path: &'a str, source: &str) -> Self {
        Self {
            path,
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            bracket_depth: 0,
            indents: vec![0],
            at_line_start: true,
            out: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn loc(&self) -> SourceLoc {
        SourceLoc::new(self.line, self.col)
    }

    fn err(&self, message: impl std::fmt::Display) -> FlowError {
        parse_error(self.path, Some(self.line), message, "check the source near this line")
    }

    fn run(mut self) -> FlowResult<Vec<Spanned>> {
        loop {
            if self.at_line_start && self.bracket_depth == 0 {
                self.handle_line_start()?;
                if self.peek().is_none() {
                    break;
                }
            }
            let Some(c) = self.peek() else { break };
            match c {
                ' ' | '\t' => {
                    self.advance();
                }
                '\\' if self.peek_at(1) == Some('\n') => {
                    self.advance();
                    self.advance();
                }
                '#' => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                '\n' => {
                    self.advance();
                    if self.bracket_depth == 0 {
                        if let Some(last) = self.out.last() {
                            if last.tok != Token::Newline
                                && last.tok != Token::Indent
                                && last.tok != Token::Dedent
                            {
                                self.out.push(Spanned {
                                    tok: Token::Newline,
                                    loc: self.loc(),
                                });
                            }
                        }
                        self.at_line_start = true;
                    }
                }
                '"' | '\'' => self.lex_string(false)?,
                _ if c.is_ascii_digit() => self.lex_number()?,
                _ if c.is_ascii_alphabetic() || c == '_' => self.lex_name_or_string_prefix()?,
                '(' => self.push_punct(Token::LParen, true),
                ')' => self.push_punct(Token::RParen, false),
                '[' => self.push_punct(Token::LBracket, true),
                ']' => self.push_punct(Token::RBracket, false),
                '{' => self.push_punct(Token::LBrace, true),
                '}' => self.push_punct(Token::RBrace, false),
                ',' => self.push_punct(Token::Comma, false),
                '.' => self.push_punct(Token::Dot, false),
                ':' => self.push_punct(Token::Colon, false),
                '@' => self.push_punct(Token::At, false),
                '=' if self.peek_at(1) != Some('=') => self.push_punct(Token::Equals, false),
                _ => self.lex_operator()?,
            }
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            self.out.push(Spanned {
                tok: Token::Dedent,
                loc: self.loc(),
            });
        }
        self.out.push(Spanned {
            tok: Token::EndMarker,
            loc: self.loc(),
        });
        Ok(self.out)
    }

    fn push_punct(&mut self, tok: Token, opens_bracket: bool) {
        let loc = self.loc();
        if matches!(tok, Token::RParen | Token::RBracket | Token::RBrace) {
            self.bracket_depth = (self.bracket_depth - 1).max(0);
        }
        self.advance();
        if opens_bracket {
            self.bracket_depth += 1;
        }
        self.out.push(Spanned { tok, loc });
    }

    fn lex_operator(&mut self) -> FlowResult<()> {
        let loc = self.loc();
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c.is_alphanumeric() || "()[]{},.:@\"'#".contains(c) {
                break;
            }
            s.push(c);
            self.advance();
        }
        if s.is_empty() {
            let bad = self.advance().unwrap_or('?');
            return Err(self.err(format!("unexpected character '{bad}'")));
        }
        self.out.push(Spanned { tok: Token::Op(s), loc });
        Ok(())
    }

    fn handle_line_start(&mut self) -> FlowResult<()> {
        loop {
            let start_pos = self.pos;
            let mut width = 0usize;
            while let Some(c) = self.peek() {
                match c {
                    ' ' => {
                        width += 1;
                        self.advance();
                    }
                    '\t' => {
                        width += 8;
                        self.advance();
                    }
                    _ => break,
                }
            }
            match self.peek() {
                None => {
                    self.at_line_start = false;
                    return Ok(());
                }
                Some('\n') => {
                    self.advance();
                    continue;
                }
                Some('#') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                    continue;
                }
                _ => {
                    let _ = start_pos;
                    break;
                }
            }
        }
        self.at_line_start = false;
        let current = *self.indents.last().unwrap();
        let width = self.current_line_indent_width();
        if width > current {
            self.indents.push(width);
            self.out.push(Spanned {
                tok: Token::Indent,
                loc: self.loc(),
            });
        } else {
            while *self.indents.last().unwrap() > width {
                self.indents.pop();
                self.out.push(Spanned {
                    tok: Token::Dedent,
                    loc: self.loc(),
                });
            }
            if *self.indents.last().unwrap() != width {
                return Err(self.err("inconsistent indentation"));
            }
        }
        Ok(())
    }

    /// Recompute the indent width already consumed by the whitespace loop
    /// just run in `handle_line_start` (kept separate for clarity).
    fn current_line_indent_width(&self) -> usize {
        let mut w = 0usize;
        let mut i = self.pos;
        while i > 0 {
            i -= 1;
            match self.chars.get(i) {
                Some(' ') => w += 1,
                Some('\t') => w += 8,
                _ => break,
            }
        }
        w
    }

    fn lex_name_or_string_prefix(&mut self) -> FlowResult<()> {
        let loc = self.loc();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        let lower = text.to_lowercase();
        if (lower == "f" || lower == "rf" || lower == "fr")
            && matches!(self.peek(), Some('"') | Some('\''))
        {
            return self.lex_string(true);
        }
        if lower == "r" && matches!(self.peek(), Some('"') | Some('\'')) {
            return self.lex_string(false);
        }
        self.out.push(Spanned {
            tok: Token::Name(text),
            loc,
        });
        Ok(())
    }

    fn lex_number(&mut self) -> FlowResult<()> {
        let loc = self.loc();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '.' || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        self.out.push(Spanned {
            tok: Token::Number(text),
            loc,
        });
        Ok(())
    }

    fn lex_string(&mut self, is_fstring: bool) -> FlowResult<()> {
        let loc = self.loc();
        let quote = self.peek().expect("caller checked a quote follows");
        let triple = self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote);
        self.advance();
        if triple {
            self.advance();
            self.advance();
        }
        let mut value = String::new();
        loop {
            match self.peek() {
                None => return Err(self.err("unterminated string literal")),
                Some('\\') => {
                    self.advance();
                    if let Some(escaped) = self.advance() {
                        value.push(match escaped {
                            'n' => '\n',
                            't' => '\t',
                            other => other,
                        });
                    }
                }
                Some(c) if c == quote => {
                    if triple {
                        if self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote) {
                            self.advance();
                            self.advance();
                            self.advance();
                            break;
                        }
                        value.push(c);
                        self.advance();
                    } else {
                        self.advance();
                        break;
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }
        self.out.push(Spanned {
            tok: Token::Str { value, is_fstring },
            loc,
        });
        Ok(())
    }
}

/// Tokenize one source file's text. `path` is used only to annotate errors.
pub fn tokenize(path: &str, source: &str) -> FlowResult<Vec<Spanned>> {
    Lexer::new(path, source).run()
}

/// Parse the body of an f-string into literal/placeholder segments, using
/// the same combinator primitives `wf-lang::parse_utils` uses for
/// string-bearing grammar: `take_while` runs of literal text alternating
/// with brace-delimited placeholders.
#[derive(Debug, Clone, PartialEq)]
pub enum FStringSegment {
    Literal(String),
    Placeholder,
}

pub fn parse_fstring_body(body: &str) -> Vec<FStringSegment> {
    let mut input = body;
    let mut segments: Vec<FStringSegment> = Vec::new();
    let mut push_literal = |segments: &mut Vec<FStringSegment>, s: &str| {
        if s.is_empty() {
            return;
        }
        if let Some(FStringSegment::Literal(last)) = segments.last_mut() {
            last.push_str(s);
        } else {
            segments.push(FStringSegment::Literal(s.to_string()));
        }
    };
    while !input.is_empty() {
        if let Ok(escaped) = escaped_brace.parse_next(&mut input) {
            push_literal(&mut segments, escaped);
            continue;
        }
        if opt(real_placeholder).parse_next(&mut input).unwrap_or(None).is_some() {
            segments.push(FStringSegment::Placeholder);
            continue;
        }
        match literal_chunk.parse_next(&mut input) {
            Ok(s) if !s.is_empty() => push_literal(&mut segments, s),
            _ => break,
        }
    }
    segments
}

fn literal_chunk<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| c != '{' && c != '}').parse_next(input)
}

fn escaped_brace<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    alt(("{{".value("{"), "}}".value("}"))).parse_next(input)
}

fn real_placeholder(input: &mut &str) -> ModalResult<()> {
    (
        winnow::token::literal("{"),
        take_while(0.., |c: char| c != '}'),
        winnow::token::literal("}"),
    )
        .value(())
        .parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(toks: &[Spanned]) -> Vec<&Token> {
        toks.iter().map(|s| &s.tok).collect()
    }

    #[test]
    fn tokenizes_simple_def() {
        let src = "def run(self):\n    pass\n";
        let toks = tokenize("t.py", src).unwrap();
        assert!(matches!(toks[0].tok, Token::Name(ref n) if n == "def"));
        assert!(toks.iter().any(|t| t.tok == Token::Indent));
        assert!(toks.iter().any(|t| t.tok == Token::Dedent));
    }

    #[test]
    fn dedent_closes_nested_blocks() {
        let src = "if a:\n    if b:\n        pass\nelse:\n    pass\n";
        let toks = tokenize("t.py", src).unwrap();
        let indents = toks.iter().filter(|t| t.tok == Token::Indent).count();
        let dedents = toks.iter().filter(|t| t.tok == Token::Dedent).count();
        assert_eq!(indents, 2);
        assert_eq!(dedents, 2);
    }

    #[test]
    fn bracket_depth_suppresses_newline() {
        let src = "foo(\n    1,\n    2,\n)\n";
        let toks = tokenize("t.py", src).unwrap();
        let newlines = toks.iter().filter(|t| t.tok == Token::Newline).count();
        assert_eq!(newlines, 1);
    }

    #[test]
    fn string_and_fstring_tokens() {
        let src = "x = \"hi\"\ny = f\"ship-{id}\"\n";
        let toks = tokenize("t.py", src).unwrap();
        let strs: Vec<_> = toks
            .iter()
            .filter_map(|t| match &t.tok {
                Token::Str { value, is_fstring } => Some((value.clone(), *is_fstring)),
                _ => None,
            })
            .collect();
        assert_eq!(strs, vec![("hi".to_string(), false), ("ship-{id}".to_string(), true)]);
    }

    #[test]
    fn inconsistent_indentation_errors() {
        let src = "if a:\n   pass\n  pass\n";
        assert!(tokenize("t.py", src).is_err());
    }

    #[test]
    fn fstring_body_segments_literal_and_placeholder() {
        let segs = parse_fstring_body("shipping-{region_id}-queue");
        assert_eq!(
            segs,
            vec![
                FStringSegment::Literal("shipping-".into()),
                FStringSegment::Placeholder,
                FStringSegment::Literal("-queue".into()),
            ]
        );
    }

    #[test]
    fn fstring_body_escaped_braces_are_literal() {
        let segs = parse_fstring_body("literal {{brace}} only");
        assert_eq!(segs, vec![FStringSegment::Literal("literal {brace} only".into())]);
    }

    #[test]
    fn fstring_body_no_placeholder_is_pure_literal() {
        let segs = parse_fstring_body("ship_order");
        assert_eq!(segs, vec![FStringSegment::Literal("ship_order".into())]);
    }

    #[test]
    fn kinds_helper_reports_names() {
        let toks = tokenize("t.py", "x\n").unwrap();
        assert!(matches!(kinds(&toks)[0], Token::Name(n) if n == "x"));
    }
}
