use crate::{parse::*, token_tree::*};
use jv_common::{span::*, TracedError};

/// Cursor over the trees of one delimited group (or a whole file). Parsing consumes from
/// the front; the `peek_*` methods look arbitrarily far ahead without consuming, which is
/// how declarations, casts and labels are told apart from expressions.
pub struct TokenStream {
    tokens: Vec<TokenTree>,
    position: usize,

    // span of the last consumed token, reported when the stream ends too early
    context: Span,
}

impl TokenStream {
    pub fn new(tokens: impl IntoIterator<Item = TokenTree>, context: Span) -> Self {
        TokenStream {
            tokens: tokens.into_iter().collect(),
            position: 0,
            context,
        }
    }

    pub fn context(&self) -> &Span {
        &self.context
    }

    pub fn current(&self) -> Option<&TokenTree> {
        self.peek_at(0)
    }

    pub fn peek_at(&self, offset: usize) -> Option<&TokenTree> {
        self.tokens.get(self.position + offset)
    }

    pub fn peek_is(&self, offset: usize, matcher: impl Into<Matcher>) -> bool {
        let matcher = matcher.into();
        self.peek_at(offset).map(|tt| matcher.is_match(tt)).unwrap_or(false)
    }

    /// Whether the upcoming tokens match `sequence` in order.
    pub fn peek_sequence(&self, sequence: &[Matcher]) -> bool {
        sequence
            .iter()
            .enumerate()
            .all(|(offset, matcher)| self.peek_at(offset).map(|tt| matcher.is_match(tt)).unwrap_or(false))
    }

    /// Number of upcoming tokens that spell a type (see [`type_shape_len`]).
    pub fn peek_type_len(&self) -> Option<usize> {
        type_shape_len(&self.tokens[self.position.min(self.tokens.len())..])
    }

    pub fn next(&mut self) -> Option<TokenTree> {
        let tt = self.tokens.get(self.position).cloned()?;
        self.position += 1;
        self.context = tt.span().clone();
        Some(tt)
    }

    pub fn advance(&mut self, count: usize) {
        for _ in 0..count {
            self.next();
        }
    }

    pub fn finish(mut self) -> ParseResult<()> {
        match self.next() {
            Some(unexpected) => Err(TracedError::trace(ParseError::UnexpectedToken(Box::new(unexpected), None))),
            None => Ok(()),
        }
    }

    pub fn match_one(&mut self, matcher: impl Into<Matcher>) -> ParseResult<TokenTree> {
        let matcher = matcher.into();

        match self.next() {
            Some(token) if matcher.is_match(&token) => Ok(token),
            Some(token) => Err(TracedError::trace(ParseError::UnexpectedToken(
                Box::new(token),
                Some(matcher),
            ))),
            None => Err(TracedError::trace(ParseError::UnexpectedEOF(matcher, self.context.clone()))),
        }
    }

    /// Consumes the next token only if it matches.
    pub fn match_one_maybe(&mut self, matcher: impl Into<Matcher>) -> Option<TokenTree> {
        if self.peek_is(0, matcher) {
            self.next()
        } else {
            None
        }
    }
}

/// Length of the type at the start of `tokens`: a primitive keyword or a dotted name,
/// followed by any number of empty `[]` groups. `None` if `tokens` doesn't start with one.
pub fn type_shape_len(tokens: &[TokenTree]) -> Option<usize> {
    let mut pos = match tokens.first()? {
        TokenTree::Keyword { kw, .. } if kw.is_primitive_type() => 1,
        TokenTree::Ident(_) => {
            let mut pos = 1;
            while pos + 1 < tokens.len()
                && tokens[pos].is_separator(Separator::Dot)
                && tokens[pos + 1].as_ident().is_some()
            {
                pos += 2;
            }
            pos
        },
        _ => return None,
    };

    while let Some(TokenTree::Delimited(group)) = tokens.get(pos) {
        if group.delim != DelimiterPair::SquareBracket || !group.inner.is_empty() {
            break;
        }
        pos += 1;
    }

    Some(pos)
}
