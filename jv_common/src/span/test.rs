use crate::span::*;

fn span(start: (usize, usize), end: (usize, usize)) -> Span {
    Span::new("A.java", Location::new(start.0, start.1), Location::new(end.0, end.1))
}

#[test]
fn joined_span_runs_from_first_start_to_last_end() {
    let joined = span((1, 4), (1, 8)).to(&span((3, 0), (3, 2)));
    assert_eq!(Location::new(1, 4), joined.start);
    assert_eq!(Location::new(3, 2), joined.end);
}

#[test]
fn joining_with_builtin_keeps_source_side() {
    let source = span((2, 0), (2, 5));
    assert_eq!(source, Span::builtin().to(&source));
    assert_eq!(source, source.to(&Span::builtin()));
    assert!(Span::builtin().to(&Span::builtin()).is_builtin());
}

#[test]
fn builtin_span_displays_without_location() {
    assert_eq!("<builtin>", Span::builtin().to_string());
    assert!(!span((0, 0), (0, 1)).is_builtin());
}

#[test]
fn locations_order_by_line_then_column() {
    assert!(Location::new(1, 9) < Location::new(2, 0));
    assert!(Location::new(2, 1) < Location::new(2, 3));
}
