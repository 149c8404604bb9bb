use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifiers and keywords, told apart by the parser
    Word(String),
    /// String literal exactly as written, quotes or backticks included
    Str(String),
    /// Rune literal exactly as written
    Char(String),
    /// Numeric literal text (int, float, imaginary, any base)
    Number(String),
    // Punctuation
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    Dot,
    Colon,
    /// Explicit `;` or one inserted at a line end
    Semicolon,
    Star,
    Ellipsis, // ...
    Arrow,    // <-
    Tilde,    // ~
    Pipe,     // |
    Assign,   // =
    /// Any other operator; only ever skipped over
    Op(String),
    // End of input
    Eof,
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub line: u32,
}

/// Multi-character operators, longest first.
const OPERATORS: &[&str] = &[
    "<<=", ">>=", "&^=", "...", "&&", "||", "<-", "++", "--", "==", "!=", "<=", ">=", ":=", "+=",
    "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<", ">>", "&^",
];

/// Whether a newline after `tok` terminates the statement (Go's automatic
/// semicolon rule).
fn ends_statement(tok: &Token) -> bool {
    match tok {
        Token::Word(w) => {
            !is_keyword(w) || matches!(w.as_str(), "break" | "continue" | "fallthrough" | "return")
        }
        Token::Str(_) | Token::Char(_) | Token::Number(_) => true,
        Token::RParen | Token::RBracket | Token::RBrace => true,
        Token::Op(op) => op == "++" || op == "--",
        _ => false,
    }
}

pub fn is_keyword(w: &str) -> bool {
    matches!(
        w,
        "break"
            | "case"
            | "chan"
            | "const"
            | "continue"
            | "default"
            | "defer"
            | "else"
            | "fallthrough"
            | "for"
            | "func"
            | "go"
            | "goto"
            | "if"
            | "import"
            | "interface"
            | "map"
            | "package"
            | "range"
            | "return"
            | "select"
            | "struct"
            | "switch"
            | "type"
            | "var"
    )
}

pub fn lex(src: &str, filename: &str) -> Result<Vec<Spanned>, ParseError> {
    let mut tokens: Vec<Spanned> = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut pos = 0usize;
    let mut line: u32 = 1;

    // Inserts the implicit semicolon owed at the end of `line`, if any.
    fn end_line(tokens: &mut Vec<Spanned>, line: u32) {
        if let Some(last) = tokens.last() {
            if ends_statement(&last.token) {
                tokens.push(Spanned {
                    token: Token::Semicolon,
                    line,
                });
            }
        }
    }

    while pos < chars.len() {
        let c = chars[pos];

        // Byte order mark, only allowed as the very first character
        if pos == 0 && c == '\u{feff}' {
            pos += 1;
            continue;
        }

        // Line comment
        if c == '/' && pos + 1 < chars.len() && chars[pos + 1] == '/' {
            while pos < chars.len() && chars[pos] != '\n' {
                pos += 1;
            }
            continue;
        }

        // Block comment; one spanning a newline acts like a newline
        if c == '/' && pos + 1 < chars.len() && chars[pos + 1] == '*' {
            let start_line = line;
            pos += 2;
            loop {
                if pos >= chars.len() {
                    return Err(ParseError::new(filename, start_line, "comment not terminated"));
                }
                if chars[pos] == '\n' {
                    line += 1;
                }
                if chars[pos] == '*' && pos + 1 < chars.len() && chars[pos + 1] == '/' {
                    pos += 2;
                    break;
                }
                pos += 1;
            }
            if line > start_line {
                end_line(&mut tokens, start_line);
            }
            continue;
        }

        if c == '\n' {
            end_line(&mut tokens, line);
            line += 1;
            pos += 1;
            continue;
        }

        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        let tok_line = line;

        // Interpreted string literal
        if c == '"' {
            let start = pos;
            pos += 1;
            loop {
                if pos >= chars.len() || chars[pos] == '\n' {
                    return Err(ParseError::new(
                        filename,
                        tok_line,
                        "string literal not terminated",
                    ));
                }
                match chars[pos] {
                    '\\' => pos += 2,
                    '"' => {
                        pos += 1;
                        break;
                    }
                    _ => pos += 1,
                }
            }
            tokens.push(Spanned {
                token: Token::Str(chars[start..pos].iter().collect()),
                line: tok_line,
            });
            continue;
        }

        // Raw string literal; may span lines
        if c == '`' {
            let start = pos;
            pos += 1;
            loop {
                if pos >= chars.len() {
                    return Err(ParseError::new(
                        filename,
                        tok_line,
                        "raw string literal not terminated",
                    ));
                }
                if chars[pos] == '\n' {
                    line += 1;
                }
                pos += 1;
                if chars[pos - 1] == '`' {
                    break;
                }
            }
            tokens.push(Spanned {
                token: Token::Str(chars[start..pos].iter().collect()),
                line: tok_line,
            });
            continue;
        }

        // Rune literal
        if c == '\'' {
            let start = pos;
            pos += 1;
            loop {
                if pos >= chars.len() || chars[pos] == '\n' {
                    return Err(ParseError::new(filename, tok_line, "rune literal not terminated"));
                }
                match chars[pos] {
                    '\\' => pos += 2,
                    '\'' => {
                        pos += 1;
                        break;
                    }
                    _ => pos += 1,
                }
            }
            tokens.push(Spanned {
                token: Token::Char(chars[start..pos].iter().collect()),
                line: tok_line,
            });
            continue;
        }

        // Number (any base, with '_' separators, exponents and 'i' suffix)
        if c.is_ascii_digit()
            || (c == '.' && pos + 1 < chars.len() && chars[pos + 1].is_ascii_digit())
        {
            let start = pos;
            let hex = c == '0' && matches!(chars.get(pos + 1).copied(), Some('x' | 'X'));
            pos += 1;
            while pos < chars.len() {
                let d = chars[pos];
                let exponent_sign = (d == '+' || d == '-')
                    && if hex {
                        matches!(chars[pos - 1], 'p' | 'P')
                    } else {
                        matches!(chars[pos - 1], 'e' | 'E')
                    };
                if d.is_ascii_alphanumeric() || d == '_' || d == '.' || exponent_sign {
                    pos += 1;
                } else {
                    break;
                }
            }
            tokens.push(Spanned {
                token: Token::Number(chars[start..pos].iter().collect()),
                line: tok_line,
            });
            continue;
        }

        // Identifier / keyword
        if c.is_alphabetic() || c == '_' {
            let start = pos;
            while pos < chars.len() && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                pos += 1;
            }
            tokens.push(Spanned {
                token: Token::Word(chars[start..pos].iter().collect()),
                line: tok_line,
            });
            continue;
        }

        // Multi-character operators
        if let Some(op) = OPERATORS
            .iter()
            .find(|op| op.chars().enumerate().all(|(i, oc)| chars.get(pos + i) == Some(&oc)))
        {
            pos += op.len();
            let token = match *op {
                "..." => Token::Ellipsis,
                "<-" => Token::Arrow,
                other => Token::Op(other.to_owned()),
            };
            tokens.push(Spanned {
                token,
                line: tok_line,
            });
            continue;
        }

        let token = match c {
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            '.' => Token::Dot,
            ':' => Token::Colon,
            ';' => Token::Semicolon,
            '*' => Token::Star,
            '~' => Token::Tilde,
            '|' => Token::Pipe,
            '=' => Token::Assign,
            '+' | '-' | '/' | '%' | '&' | '^' | '<' | '>' | '!' => Token::Op(c.to_string()),
            _ => {
                return Err(ParseError::new(
                    filename,
                    tok_line,
                    format!("unexpected character '{}'", c),
                ))
            }
        };
        tokens.push(Spanned {
            token,
            line: tok_line,
        });
        pos += 1;
    }

    end_line(&mut tokens, line);
    tokens.push(Spanned {
        token: Token::Eof,
        line,
    });
    Ok(tokens)
}
