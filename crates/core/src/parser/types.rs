use std::collections::HashSet;

use super::Parser;
use crate::ast::{
    ChanDir, Field, InterfaceElem, InterfaceType, MethodSpec, Signature, StructField, StructType,
    TypeExpr, TypeTerm,
};
use crate::error::ParseError;
use crate::lexer::{self, Token};

impl<'a> Parser<'a> {
    // -- Type parsing -------------------------------------------

    pub(super) fn parse_type(&mut self) -> Result<TypeExpr, ParseError> {
        match self.peek().clone() {
            Token::Word(w) => match w.as_str() {
                "map" => {
                    self.advance();
                    self.expect(&Token::LBracket, "[")?;
                    let key = self.parse_type()?;
                    self.expect(&Token::RBracket, "]")?;
                    let value = self.parse_type()?;
                    Ok(TypeExpr::Map {
                        key: Box::new(key),
                        value: Box::new(value),
                    })
                }
                "chan" => {
                    self.advance();
                    let dir = if self.eat(&Token::Arrow) {
                        ChanDir::Send
                    } else {
                        ChanDir::Both
                    };
                    let elem = self.parse_type()?;
                    Ok(TypeExpr::Chan {
                        dir,
                        elem: Box::new(elem),
                    })
                }
                "func" => {
                    self.advance();
                    Ok(TypeExpr::Func(self.parse_signature()?))
                }
                "interface" => {
                    self.advance();
                    Ok(TypeExpr::Interface(self.parse_interface_body()?))
                }
                "struct" => {
                    self.advance();
                    Ok(TypeExpr::Struct(self.parse_struct_body()?))
                }
                kw if lexer::is_keyword(kw) => {
                    Err(self.err(format!("expected type, got keyword '{}'", kw)))
                }
                _ => self.parse_type_name(),
            },
            Token::Star => {
                self.advance();
                Ok(TypeExpr::pointer(self.parse_type()?))
            }
            Token::LBracket => {
                self.advance();
                if self.eat(&Token::RBracket) {
                    return Ok(TypeExpr::slice(self.parse_type()?));
                }
                let len = self.take_array_len()?;
                let elem = self.parse_type()?;
                Ok(TypeExpr::Array {
                    len,
                    elem: Box::new(elem),
                })
            }
            Token::Arrow => {
                self.advance();
                self.expect_word("chan")?;
                let elem = self.parse_type()?;
                Ok(TypeExpr::Chan {
                    dir: ChanDir::Recv,
                    elem: Box::new(elem),
                })
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_type()?;
                self.expect(&Token::RParen, ")")?;
                Ok(TypeExpr::Paren(Box::new(inner)))
            }
            other => Err(self.err(format!("expected type, got {:?}", other))),
        }
    }

    /// `Name`, `pkg.Name`, optionally instantiated: `Name[A, B]`.
    fn parse_type_name(&mut self) -> Result<TypeExpr, ParseError> {
        let first = self.take_ident()?;
        let base = if self.eat(&Token::Dot) {
            let name = self.take_ident()?;
            TypeExpr::Qualified { pkg: first, name }
        } else {
            TypeExpr::Name(first)
        };
        if self.peek() != &Token::LBracket || self.peek_at(1) == &Token::RBracket {
            return Ok(base);
        }
        self.advance();
        let mut args = Vec::new();
        while self.peek() != &Token::RBracket {
            args.push(self.parse_type()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RBracket, "]")?;
        Ok(TypeExpr::Generic {
            base: Box::new(base),
            args,
        })
    }

    /// Array length source text up to and including the closing `]`.
    fn take_array_len(&mut self) -> Result<String, ParseError> {
        let mut text = String::new();
        let mut depth = 0usize;
        loop {
            let tok = self.advance().token.clone();
            match tok {
                Token::RBracket if depth == 0 => break,
                Token::Eof => return Err(self.err("array length not terminated")),
                Token::LBracket | Token::LParen => depth += 1,
                Token::RBracket | Token::RParen => depth = depth.saturating_sub(1),
                _ => {}
            }
            text.push_str(&token_text(&tok));
        }
        if text.is_empty() {
            return Err(self.err("missing array length"));
        }
        Ok(text)
    }

    /// A type parameter constraint or interface type-set element:
    /// `~int | string`, or a plain type.
    fn parse_constraint(&mut self) -> Result<TypeExpr, ParseError> {
        let mut terms = Vec::new();
        loop {
            let tilde = self.eat(&Token::Tilde);
            let ty = self.parse_type()?;
            terms.push(TypeTerm { tilde, ty });
            if !self.eat(&Token::Pipe) {
                break;
            }
        }
        if terms.len() == 1 && !terms[0].tilde {
            return Ok(terms.remove(0).ty);
        }
        Ok(TypeExpr::Union(terms))
    }

    // -- Signatures ---------------------------------------------

    pub(super) fn parse_signature(&mut self) -> Result<Signature, ParseError> {
        let params = self.parse_param_list(Token::LParen, Token::RParen, false)?;
        let results = match self.peek() {
            Token::LParen => self.parse_param_list(Token::LParen, Token::RParen, false)?,
            Token::Word(_) | Token::Star | Token::LBracket | Token::Arrow => {
                vec![Field::anonymous(self.parse_type()?)]
            }
            _ => Vec::new(),
        };
        Ok(Signature { params, results })
    }

    /// Parameter, result, receiver or type-parameter list between `open`
    /// and `close`. Entries are grouped the way Go groups them: in
    /// `(a, b string, c int)` the bare `a` takes the type of `b`.
    pub(super) fn parse_param_list(
        &mut self,
        open: Token,
        close: Token,
        constraint: bool,
    ) -> Result<Vec<Field>, ParseError> {
        let line = self.cur_line();
        self.expect(&open, if open == Token::LParen { "(" } else { "[" })?;

        let mut items: Vec<(Option<String>, TypeExpr)> = Vec::new();
        while self.peek() != &close {
            let name = if self.param_starts_with_name(&close) {
                Some(self.take_ident()?)
            } else {
                None
            };
            let ty = if self.eat(&Token::Ellipsis) {
                TypeExpr::Ellipsis(Box::new(self.parse_type()?))
            } else if constraint {
                self.parse_constraint()?
            } else {
                self.parse_type()?
            };
            items.push((name, ty));
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&close, if close == Token::RParen { ")" } else { "]" })?;

        if items.iter().all(|(name, _)| name.is_none()) {
            return Ok(items
                .into_iter()
                .map(|(_, ty)| Field::anonymous(ty))
                .collect());
        }

        let mixed = || {
            ParseError::new(
                &self.filename,
                line,
                "mixed named and unnamed parameters",
            )
        };
        let mut fields = Vec::new();
        let mut pending: Vec<String> = Vec::new();
        for (name, ty) in items {
            match (name, ty) {
                (Some(n), ty) => {
                    pending.push(n);
                    fields.push(Field {
                        names: std::mem::take(&mut pending),
                        ty,
                    });
                }
                (None, TypeExpr::Name(n)) => pending.push(n),
                (None, _) => return Err(mixed()),
            }
        }
        if !pending.is_empty() {
            return Err(mixed());
        }
        Ok(fields)
    }

    /// Whether the next list entry is `name Type` rather than a bare type.
    fn param_starts_with_name(&self, close: &Token) -> bool {
        if !matches!(self.peek(), Token::Word(w) if !lexer::is_keyword(w)) {
            return false;
        }
        match self.peek_at(1) {
            Token::Comma | Token::Dot | Token::Pipe => false,
            t if t == close => false,
            Token::LBracket => self.bracket_follows_name(),
            Token::Word(_)
            | Token::Star
            | Token::LParen
            | Token::Arrow
            | Token::Ellipsis
            | Token::Tilde => true,
            _ => false,
        }
    }

    /// With the cursor on `Word [`, tells `name [N]T` / `name []T` apart
    /// from the instantiated type `Name[T]` by looking past the matching
    /// `]`: only a field or parameter name is followed by another type.
    fn bracket_follows_name(&self) -> bool {
        let mut depth = 0usize;
        let mut i = 1;
        loop {
            match self.peek_at(i) {
                Token::LBracket => depth += 1,
                Token::RBracket => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                Token::Eof => return false,
                _ => {}
            }
            i += 1;
        }
        matches!(
            self.peek_at(i + 1),
            Token::Word(_) | Token::Star | Token::LBracket | Token::LParen | Token::Arrow
        )
    }

    // -- Interfaces and structs ---------------------------------

    fn parse_interface_body(&mut self) -> Result<InterfaceType, ParseError> {
        self.expect(&Token::LBrace, "{")?;
        let mut elems = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        loop {
            self.skip_semicolons();
            if self.peek() == &Token::RBrace {
                break;
            }
            let is_method = matches!(self.peek(), Token::Word(w) if !lexer::is_keyword(w))
                && self.peek_at(1) == &Token::LParen;
            if is_method {
                let line = self.cur_line();
                let name = self.take_ident()?;
                if !seen.insert(name.clone()) {
                    return Err(ParseError::new(
                        &self.filename,
                        line,
                        format!("duplicate method {}", name),
                    ));
                }
                let sig = self.parse_signature()?;
                elems.push(InterfaceElem::Method(MethodSpec { name, sig, line }));
            } else {
                elems.push(InterfaceElem::Embedded(self.parse_constraint()?));
            }
            self.expect_terminator()?;
        }
        self.expect(&Token::RBrace, "}")?;
        Ok(InterfaceType { elems })
    }

    fn parse_struct_body(&mut self) -> Result<StructType, ParseError> {
        self.expect(&Token::LBrace, "{")?;
        let mut fields = Vec::new();
        loop {
            self.skip_semicolons();
            if self.peek() == &Token::RBrace {
                break;
            }
            let (names, ty) = if self.eat(&Token::Star) {
                (Vec::new(), TypeExpr::pointer(self.parse_type_name()?))
            } else if self.is_embedded_field() {
                (Vec::new(), self.parse_type_name()?)
            } else {
                let mut names = vec![self.take_ident()?];
                while self.eat(&Token::Comma) {
                    names.push(self.take_ident()?);
                }
                (names, self.parse_type()?)
            };
            let tag = match self.peek() {
                Token::Str(_) => Some(self.take_str()?),
                _ => None,
            };
            fields.push(StructField { names, ty, tag });
            self.expect_terminator()?;
        }
        self.expect(&Token::RBrace, "}")?;
        Ok(StructType { fields })
    }

    fn is_embedded_field(&self) -> bool {
        match self.peek_at(1) {
            Token::Dot | Token::Semicolon | Token::RBrace | Token::Str(_) => true,
            Token::LBracket => !self.bracket_follows_name(),
            _ => false,
        }
    }
}

/// Source spelling of a token, for array lengths kept as text.
fn token_text(tok: &Token) -> String {
    match tok {
        Token::Word(s) | Token::Str(s) | Token::Char(s) | Token::Number(s) | Token::Op(s) => {
            s.clone()
        }
        Token::LBrace => "{".into(),
        Token::RBrace => "}".into(),
        Token::LBracket => "[".into(),
        Token::RBracket => "]".into(),
        Token::LParen => "(".into(),
        Token::RParen => ")".into(),
        Token::Comma => ", ".into(),
        Token::Dot => ".".into(),
        Token::Colon => ":".into(),
        Token::Semicolon => ";".into(),
        Token::Star => "*".into(),
        Token::Ellipsis => "...".into(),
        Token::Arrow => "<-".into(),
        Token::Tilde => "~".into(),
        Token::Pipe => "|".into(),
        Token::Assign => "=".into(),
        Token::Eof => String::new(),
    }
}
