use super::*;

fn tokenize(src: &str) -> Vec<TokenTree> {
    TokenTree::tokenize("test", src).unwrap()
}

#[test]
fn lexes_keywords_and_idents() {
    let tokens = tokenize("public class Foo");
    assert_eq!(3, tokens.len());
    assert!(tokens[0].is_keyword(Keyword::Public));
    assert!(tokens[1].is_keyword(Keyword::Class));
    assert!(tokens[2].is_ident("Foo"));
}

#[test]
fn groups_delimited_tokens() {
    let tokens = tokenize("f(a, (b)) [1] { }");
    assert_eq!(4, tokens.len());

    let args = tokens[1].as_delimited().unwrap();
    assert_eq!(DelimiterPair::Bracket, args.delim);
    assert_eq!(3, args.inner.len());
    assert!(args.inner[2].is_delimited(DelimiterPair::Bracket));

    assert!(tokens[2].is_delimited(DelimiterPair::SquareBracket));
    assert!(tokens[3].is_delimited(DelimiterPair::Brace));
}

#[test]
fn operators_match_longest_spelling() {
    let tokens = tokenize("a >>>= b >> c >= d");
    let ops: Vec<_> = tokens.iter().filter_map(|t| t.as_operator()).collect();
    assert_eq!(
        vec![
            Operator::CompoundAssignment(crate::operators::CompoundAssignmentOperator::UShrAssign),
            Operator::Shr,
            Operator::Gte,
        ],
        ops
    );
}

#[test]
fn skips_comments() {
    let tokens = tokenize("a /* block\n comment */ b // line comment\n c");
    assert_eq!(3, tokens.len());
    assert!(tokens[2].is_ident("c"));
    assert_eq!(2, tokens[2].span().start.line);
}

#[test]
fn lexes_numeric_literals() {
    let tokens = tokenize("10 0x1F 017 5L 1.5 2f 3e2 .5");
    match &tokens[..] {
        [TokenTree::IntNumber { value: 10, long: false, radix: 10, .. }, TokenTree::IntNumber { value: 31, radix: 16, .. }, TokenTree::IntNumber { value: 15, radix: 8, .. }, TokenTree::IntNumber { value: 5, long: true, .. }, TokenTree::RealNumber { float: false, .. }, TokenTree::RealNumber { float: true, .. }, TokenTree::RealNumber { value: e, .. }, TokenTree::RealNumber { value: half, .. }] =>
        {
            assert_eq!(300.0, *e);
            assert_eq!(0.5, *half);
        },
        other => panic!("unexpected tokens: {:?}", other),
    }
}

#[test]
fn lexes_escapes_in_strings_and_chars() {
    let tokens = tokenize(r#""a\tb\n" '\'' 'A'"#);
    match &tokens[..] {
        [TokenTree::String { value, .. }, TokenTree::Char { value: quote, .. }, TokenTree::Char { value: a, .. }] => {
            assert_eq!("a\tb\n", &**value);
            assert_eq!('\'', *quote);
            assert_eq!('A', *a);
        },
        other => panic!("unexpected tokens: {:?}", other),
    }
}

#[test]
fn unmatched_delimiter_is_an_error() {
    let err = TokenTree::tokenize("test", "{ (a }").unwrap_err();
    match err.err {
        TokenizeError::UnmatchedDelimiter { delim: DelimiterPair::Bracket, .. } => {},
        other => panic!("expected unmatched delimiter, got {:?}", other),
    }
}

#[test]
fn unterminated_comment_is_an_error() {
    let err = TokenTree::tokenize("test", "a /* b").unwrap_err();
    assert!(matches!(err.err, TokenizeError::UnterminatedComment(..)));
}
