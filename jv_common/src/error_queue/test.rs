use crate::span::*;
use crate::*;

fn span_at(line: usize) -> Span {
    Span::new("Test.java", Location::new(line, 0), Location::new(line, 4))
}

#[test]
fn duplicate_errors_are_only_queued_once() {
    let mut queue = ErrorQueue::new();
    queue.enqueue(ErrorInfo::semantic("bad thing", Some(span_at(1))));
    queue.enqueue(ErrorInfo::semantic("bad thing", Some(span_at(1))));
    queue.enqueue(ErrorInfo::semantic("bad thing", Some(span_at(2))));

    assert_eq!(2, queue.len());
    assert!(queue.has_errors());
}

#[test]
fn errors_keep_report_order() {
    let mut queue = ErrorQueue::new();
    queue.enqueue(ErrorInfo::semantic("second", Some(span_at(9))));
    queue.enqueue(ErrorInfo::semantic("first", Some(span_at(1))));

    let messages: Vec<_> = queue.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(vec!["second", "first"], messages);
}

#[test]
fn error_without_position_puts_message_in_notes() {
    let err = ErrorInfo::semantic("no position", None);
    assert!(err.label().is_none());
    assert_eq!(vec!["no position".to_string()], err.notes());
}
