use crate::{
    ident::Ident,
    keyword::Keyword,
    operators::Operator,
    token_tree::{DelimitedGroup, DelimiterPair, Separator, TokenTree, TokenizeError, TokenizeResult},
};
use jv_common::{span::*, TracedError};
use std::{path::PathBuf, rc::Rc};

pub fn lex(file_name: impl Into<PathBuf>, source: &str) -> TokenizeResult<Vec<TokenTree>> {
    let mut lexer = Lexer {
        chars: source.chars().collect(),
        pos: 0,
        location: Location::zero(),
        last: Location::zero(),
        file: Rc::new(file_name.into()),

        tokens: Vec::new(),
        delim_stack: Vec::new(),
    };

    while lexer.next_token()? {}

    if let Some(unmatched) = lexer.delim_stack.pop() {
        return Err(TracedError::trace(TokenizeError::UnmatchedDelimiter {
            span: lexer.span_to_current(unmatched.open.start),
            to_match: unmatched.open,
            delim: unmatched.delim,
        }));
    }

    Ok(lexer.tokens)
}

struct DelimGroupBuilder {
    delim: DelimiterPair,
    open: Span,
    inner: Vec<TokenTree>,
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    location: Location,
    // position of the last consumed char, spans end here inclusively
    last: Location,
    file: Rc<PathBuf>,

    tokens: Vec<TokenTree>,
    delim_stack: Vec<DelimGroupBuilder>,
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

impl Lexer {
    fn span_to_current(&self, start: Location) -> Span {
        Span {
            file: self.file.clone(),
            start,
            end: self.last,
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).cloned()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek(0)?;
        self.pos += 1;
        self.last = self.location;

        if c == '\n' {
            self.location.line += 1;
            self.location.col = 0;
        } else {
            self.location.col += 1;
        }

        Some(c)
    }

    fn push(&mut self, token: TokenTree) {
        match self.delim_stack.last_mut() {
            Some(group) => group.inner.push(token),
            None => self.tokens.push(token),
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> TokenizeResult<()> {
        loop {
            match (self.peek(0), self.peek(1)) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                },

                (Some('/'), Some('/')) => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                },

                (Some('/'), Some('*')) => {
                    let start = self.location;
                    self.bump();
                    self.bump();
                    loop {
                        match (self.peek(0), self.peek(1)) {
                            (Some('*'), Some('/')) => {
                                self.bump();
                                self.bump();
                                break;
                            },
                            (Some(_), _) => {
                                self.bump();
                            },
                            (None, _) => {
                                let span = self.span_to_current(start);
                                return Err(TracedError::trace(TokenizeError::UnterminatedComment(span)));
                            },
                        }
                    }
                },

                _ => break Ok(()),
            }
        }
    }

    fn next_token(&mut self) -> TokenizeResult<bool> {
        self.skip_whitespace_and_comments()?;

        let c = match self.peek(0) {
            Some(c) => c,
            None => return Ok(false),
        };

        let start = self.location;

        match c {
            c if is_ident_start(c) => self.ident_or_keyword(),

            '0'..='9' => {
                let token = self.literal_number()?;
                self.push(token);
            },

            '.' if self.peek(1).map(|c| c.is_ascii_digit()).unwrap_or(false) => {
                let token = self.literal_number()?;
                self.push(token);
            },

            '"' => {
                let token = self.literal_string()?;
                self.push(token);
            },

            '\'' => {
                let token = self.literal_char()?;
                self.push(token);
            },

            '(' => self.open_delim(DelimiterPair::Bracket),
            '[' => self.open_delim(DelimiterPair::SquareBracket),
            '{' => self.open_delim(DelimiterPair::Brace),
            ')' => self.close_delim(DelimiterPair::Bracket)?,
            ']' => self.close_delim(DelimiterPair::SquareBracket)?,
            '}' => self.close_delim(DelimiterPair::Brace)?,

            ';' | ',' | ':' | '.' => {
                self.bump();
                let sep = match c {
                    ';' => Separator::Semicolon,
                    ',' => Separator::Comma,
                    ':' => Separator::Colon,
                    _ => Separator::Dot,
                };
                let span = self.span_to_current(start);
                self.push(TokenTree::Separator { sep, span });
            },

            _ => {
                let matched = Operator::SPELLINGS.iter().find(|(text, _)| {
                    text.chars()
                        .enumerate()
                        .all(|(i, text_char)| self.peek(i) == Some(text_char))
                });

                match matched {
                    Some((text, op)) => {
                        for _ in 0..text.len() {
                            self.bump();
                        }
                        let span = self.span_to_current(start);
                        self.push(TokenTree::Operator { op: *op, span });
                    },

                    None => {
                        self.bump();
                        let span = self.span_to_current(start);
                        return Err(TracedError::trace(TokenizeError::IllegalToken(span)));
                    },
                }
            },
        }

        Ok(true)
    }

    fn ident_or_keyword(&mut self) {
        let start = self.location;
        let mut text = String::new();
        while let Some(c) = self.peek(0) {
            if !is_ident_part(c) {
                break;
            }
            text.push(c);
            self.bump();
        }

        let span = self.span_to_current(start);
        let token = match Keyword::try_parse(&text) {
            Some(kw) => TokenTree::Keyword { kw, span },
            None => TokenTree::Ident(Ident::new(&text, span)),
        };

        self.push(token);
    }

    fn open_delim(&mut self, delim: DelimiterPair) {
        let start = self.location;
        self.bump();

        self.delim_stack.push(DelimGroupBuilder {
            delim,
            open: self.span_to_current(start),
            inner: Vec::new(),
        });
    }

    fn close_delim(&mut self, delim: DelimiterPair) -> TokenizeResult<()> {
        let start = self.location;
        self.bump();
        let close = self.span_to_current(start);

        match self.delim_stack.pop() {
            Some(group) if group.delim == delim => {
                let span = group.open.to(&close);
                self.push(TokenTree::Delimited(DelimitedGroup {
                    delim,
                    inner: group.inner,
                    open: group.open,
                    close,
                    span,
                }));
                Ok(())
            },

            Some(group) => Err(TracedError::trace(TokenizeError::UnmatchedDelimiter {
                delim: group.delim,
                span: group.open.to(&close),
                to_match: group.open,
            })),

            None => Err(TracedError::trace(TokenizeError::UnexpectedCloseDelimited {
                delim,
                span: close,
            })),
        }
    }

    fn take_digits(&mut self, radix: u32, into: &mut String) {
        while let Some(c) = self.peek(0) {
            if c.is_digit(radix) {
                into.push(c);
                self.bump();
            } else if c == '_' {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn literal_number(&mut self) -> TokenizeResult<TokenTree> {
        let start = self.location;

        if self.peek(0) == Some('0') && matches!(self.peek(1), Some('x') | Some('X')) {
            self.bump();
            self.bump();
            let mut digits = String::new();
            self.take_digits(16, &mut digits);
            return self.finish_int(&digits, 16, start);
        }

        let mut text = String::new();
        self.take_digits(10, &mut text);

        let mut is_real = false;
        if self.peek(0) == Some('.') && self.peek(1).map(|c| c.is_ascii_digit()).unwrap_or(false) {
            is_real = true;
            text.push('.');
            self.bump();
            self.take_digits(10, &mut text);
        } else if self.peek(0) == Some('.') && !self.peek(1).map(is_ident_start).unwrap_or(false) {
            // `1.` is a complete double literal
            is_real = true;
            self.bump();
        }

        if let Some('e') | Some('E') = self.peek(0) {
            is_real = true;
            text.push('e');
            self.bump();
            if let Some(sign @ '+') | Some(sign @ '-') = self.peek(0) {
                text.push(sign);
                self.bump();
            }
            self.take_digits(10, &mut text);
        }

        let float_suffix = match self.peek(0) {
            Some('f') | Some('F') => Some(true),
            Some('d') | Some('D') => Some(false),
            _ => None,
        };

        if is_real || float_suffix.is_some() {
            if float_suffix.is_some() {
                self.bump();
            }
            let span = self.span_to_current(start);
            return match text.parse::<f64>() {
                Ok(value) => Ok(TokenTree::RealNumber {
                    value,
                    float: float_suffix.unwrap_or(false),
                    span,
                }),
                Err(_) => Err(TracedError::trace(TokenizeError::IllegalToken(span))),
            };
        }

        if text.len() > 1 && text.starts_with('0') {
            let octal = text[1..].to_string();
            if octal.chars().any(|c| !c.is_digit(8)) {
                let span = self.span_to_current(start);
                return Err(TracedError::trace(TokenizeError::IllegalToken(span)));
            }
            return self.finish_int(&octal, 8, start);
        }

        self.finish_int(&text, 10, start)
    }

    fn finish_int(&mut self, digits: &str, radix: u32, start: Location) -> TokenizeResult<TokenTree> {
        let long = match self.peek(0) {
            Some('l') | Some('L') => {
                self.bump();
                true
            },
            _ => false,
        };

        let span = self.span_to_current(start);
        if digits.is_empty() {
            return Err(TracedError::trace(TokenizeError::IllegalToken(span)));
        }

        match u64::from_str_radix(digits, radix) {
            Ok(value) => Ok(TokenTree::IntNumber {
                value,
                long,
                radix,
                span,
            }),
            Err(_) => Err(TracedError::trace(TokenizeError::IntegerTooLarge(span))),
        }
    }

    fn escape(&mut self, start: Location) -> TokenizeResult<char> {
        let unterminated = |lexer: &Self| {
            TracedError::trace(TokenizeError::UnterminatedLiteral(lexer.span_to_current(start)))
        };

        let c = self.bump().ok_or_else(|| unterminated(self))?;
        let escaped = match c {
            'n' => '\n',
            't' => '\t',
            'b' => '\u{8}',
            'r' => '\r',
            'f' => '\u{c}',
            '\'' => '\'',
            '"' => '"',
            '\\' => '\\',
            'u' => {
                while self.peek(0) == Some('u') {
                    self.bump();
                }
                let mut hex = String::new();
                for _ in 0..4 {
                    match self.bump() {
                        Some(h) if h.is_ascii_hexdigit() => hex.push(h),
                        _ => {
                            let span = self.span_to_current(start);
                            return Err(TracedError::trace(TokenizeError::IllegalToken(span)));
                        },
                    }
                }
                u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| {
                        TracedError::trace(TokenizeError::IllegalToken(self.span_to_current(start)))
                    })?
            },
            '0'..='7' => {
                let mut value = c.to_digit(8).unwrap_or(0);
                let max_digits = if c <= '3' { 2 } else { 1 };
                for _ in 0..max_digits {
                    match self.peek(0).and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            self.bump();
                        },
                        None => break,
                    }
                }
                char::from_u32(value).unwrap_or('\0')
            },
            _ => {
                let span = self.span_to_current(start);
                return Err(TracedError::trace(TokenizeError::IllegalToken(span)));
            },
        };

        Ok(escaped)
    }

    fn literal_string(&mut self) -> TokenizeResult<TokenTree> {
        let start = self.location;
        self.bump();

        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => break,
                Some('\\') => value.push(self.escape(start)?),
                Some('\n') | None => {
                    let span = self.span_to_current(start);
                    return Err(TracedError::trace(TokenizeError::UnterminatedLiteral(span)));
                },
                Some(c) => value.push(c),
            }
        }

        Ok(TokenTree::String {
            value: value.into(),
            span: self.span_to_current(start),
        })
    }

    fn literal_char(&mut self) -> TokenizeResult<TokenTree> {
        let start = self.location;
        self.bump();

        let value = match self.bump() {
            Some('\\') => self.escape(start)?,
            Some('\'') | Some('\n') | None => {
                let span = self.span_to_current(start);
                return Err(TracedError::trace(TokenizeError::IllegalToken(span)));
            },
            Some(c) => c,
        };

        match self.bump() {
            Some('\'') => Ok(TokenTree::Char {
                value,
                span: self.span_to_current(start),
            }),
            _ => {
                let span = self.span_to_current(start);
                Err(TracedError::trace(TokenizeError::UnterminatedLiteral(span)))
            },
        }
    }
}
