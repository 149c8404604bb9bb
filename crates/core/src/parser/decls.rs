use super::Parser;
use crate::ast::{
    Decl, FuncDecl, ImportSpec, Provenance, TypeDecl, TypeSpec, ValueDecl, ValueKind, ValueSpec,
};
use crate::error::ParseError;
use crate::lexer::{self, Token};

impl<'a> Parser<'a> {
    fn prov(&self, line: u32) -> Provenance {
        Provenance {
            file: self.filename.clone(),
            line,
        }
    }

    // -- Imports ------------------------------------------------

    pub(super) fn parse_import_spec(&mut self) -> Result<ImportSpec, ParseError> {
        let line = self.cur_line();
        let name = match self.peek().clone() {
            Token::Dot => {
                self.advance();
                Some(".".to_owned())
            }
            Token::Word(_) => Some(self.take_ident()?),
            _ => None,
        };
        let lit = self.take_str()?;
        Ok(ImportSpec {
            name,
            path: unquote(&lit),
            line,
        })
    }

    // -- Top-level declarations ---------------------------------

    pub(super) fn parse_decl(&mut self) -> Result<Decl, ParseError> {
        let line = self.cur_line();
        match self.peek().clone() {
            Token::Word(w) => match w.as_str() {
                "type" => self.parse_type_decl(line),
                "func" => self.parse_func_decl(line),
                "var" => self.parse_value_decl(ValueKind::Var, line),
                "const" => self.parse_value_decl(ValueKind::Const, line),
                "import" => Err(self.err("imports must appear before other declarations")),
                _ => Err(self.err(format!(
                    "non-declaration statement outside function body: '{}'",
                    w
                ))),
            },
            other => Err(self.err(format!("expected declaration, got {:?}", other))),
        }
    }

    fn parse_type_decl(&mut self, line: u32) -> Result<Decl, ParseError> {
        self.advance();
        let (specs, grouped) = self.parse_group(Self::parse_type_spec)?;
        Ok(Decl::Type(TypeDecl {
            specs,
            grouped,
            prov: self.prov(line),
        }))
    }

    fn parse_type_spec(&mut self) -> Result<TypeSpec, ParseError> {
        let line = self.cur_line();
        let name = self.take_ident()?;
        let type_params = if self.peek() == &Token::LBracket && self.starts_type_params() {
            self.parse_param_list(Token::LBracket, Token::RBracket, true)?
        } else {
            Vec::new()
        };
        let alias = self.eat(&Token::Assign);
        let ty = self.parse_type()?;
        Ok(TypeSpec {
            name,
            type_params,
            alias,
            ty,
            line,
        })
    }

    /// After `type Name`, tells `[T any]` (type parameters) apart from
    /// `[N]T` (an array type).
    fn starts_type_params(&self) -> bool {
        let first_is_ident =
            matches!(self.peek_at(1), Token::Word(w) if !lexer::is_keyword(w));
        first_is_ident && matches!(self.peek_at(2), Token::Word(_) | Token::Comma | Token::Tilde)
    }

    fn parse_func_decl(&mut self, line: u32) -> Result<Decl, ParseError> {
        self.advance();
        let recv = if self.peek() == &Token::LParen {
            let mut fields = self.parse_param_list(Token::LParen, Token::RParen, false)?;
            if fields.len() != 1 || fields[0].arity() != 1 {
                return Err(ParseError::new(
                    &self.filename,
                    line,
                    "method must have exactly one receiver",
                ));
            }
            fields.pop()
        } else {
            None
        };
        let name = self.take_ident()?;
        let type_params = if self.peek() == &Token::LBracket {
            self.parse_param_list(Token::LBracket, Token::RBracket, true)?
        } else {
            Vec::new()
        };
        let sig = self.parse_signature()?;
        if self.peek() == &Token::LBrace {
            self.skip_block()?;
        }
        Ok(Decl::Func(FuncDecl {
            recv,
            name,
            type_params,
            sig,
            body: None,
            prov: self.prov(line),
        }))
    }

    fn parse_value_decl(&mut self, kind: ValueKind, line: u32) -> Result<Decl, ParseError> {
        self.advance();
        let (specs, _) = self.parse_group(Self::parse_value_spec)?;
        Ok(Decl::Value(ValueDecl {
            kind,
            specs,
            prov: self.prov(line),
        }))
    }

    fn parse_value_spec(&mut self) -> Result<ValueSpec, ParseError> {
        let mut names = vec![self.take_ident()?];
        while self.eat(&Token::Comma) {
            names.push(self.take_ident()?);
        }
        let ty = match self.peek() {
            Token::Assign | Token::Semicolon | Token::RParen | Token::Eof => None,
            _ => Some(self.parse_type()?),
        };
        if self.eat(&Token::Assign) {
            self.skip_expression_list()?;
        }
        Ok(ValueSpec { names, ty })
    }

    // -- Skipping -----------------------------------------------

    /// Skip a `{ ... }` block, including nested blocks.
    pub(super) fn skip_block(&mut self) -> Result<(), ParseError> {
        let start = self.cur_line();
        self.expect(&Token::LBrace, "{")?;
        let mut depth = 1usize;
        while depth > 0 {
            let tok = self.advance().token.clone();
            match tok {
                Token::LBrace => depth += 1,
                Token::RBrace => depth -= 1,
                Token::Eof => {
                    return Err(ParseError::new(
                        &self.filename,
                        start,
                        "block not terminated",
                    ))
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Skip initializer expressions up to the `;` or `)` that ends the
    /// enclosing spec, without consuming it.
    fn skip_expression_list(&mut self) -> Result<(), ParseError> {
        let start = self.cur_line();
        let mut depth = 0usize;
        loop {
            match self.peek() {
                Token::Eof if depth > 0 => {
                    return Err(ParseError::new(
                        &self.filename,
                        start,
                        "expression not terminated",
                    ))
                }
                Token::Eof => return Ok(()),
                Token::Semicolon | Token::RParen if depth == 0 => return Ok(()),
                Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
                Token::RParen | Token::RBracket | Token::RBrace => {
                    if depth == 0 {
                        return Err(self.err(format!("unexpected {:?}", self.peek())));
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.advance();
        }
    }
}

/// Strip the quotes or backticks from an import path literal.
fn unquote(lit: &str) -> String {
    let inner = lit
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| lit.strip_prefix('`').and_then(|s| s.strip_suffix('`')));
    inner.unwrap_or(lit).to_owned()
}

#[cfg(test)]
mod tests {
    use super::unquote;

    #[test]
    fn unquote_handles_both_literal_kinds() {
        assert_eq!(unquote("\"go/ast\""), "go/ast");
        assert_eq!(unquote("`go/ast`"), "go/ast");
    }
}
