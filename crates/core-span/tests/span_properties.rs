use core_span::{Span, SpanFormatter, StyleSpan, Template, TemplateError, span_template};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn leaf() -> impl Strategy<Value = Span> {
    prop_oneof![
        "[a-z ]{0,10}".prop_map(Span::content),
        Just(Span::foreground("red")),
        Just(Span::background("blue")),
        Just(Span::style(StyleSpan::bold_on())),
        Just(Span::Empty),
    ]
}

fn tree() -> impl Strategy<Value = Span> {
    leaf().prop_recursive(3, 24, 4, |inner| prop::collection::vec(inner, 0..4).prop_map(Span::container))
}

proptest! {
    #[test]
    fn length_matches_plain_text_width(span in tree()) {
        prop_assert_eq!(span.content_length(), span.to_string().chars().count());
    }

    #[test]
    fn literal_template_is_one_content_span(text in "[a-z ]{1,20}") {
        let span = SpanFormatter::new().parse_template(&Template::new(text.clone(), vec![])).unwrap();
        prop_assert_eq!(span, Span::content(text));
    }
}

#[test]
fn span_arguments_are_inserted_as_is() {
    let bold = Span::container([Span::style(StyleSpan::bold_on()), Span::content("x")]);
    let span = SpanFormatter::new()
        .parse_template(&span_template!("<{0}|{0}>", bold.clone()))
        .unwrap();
    assert_eq!(
        span,
        Span::container([
            Span::content("<"),
            bold.clone(),
            Span::content("|"),
            bold,
            Span::content(">"),
        ])
    );
}

#[test]
fn out_of_range_argument_is_rejected() {
    let err = SpanFormatter::new()
        .parse_template(&span_template!("{1}", 5))
        .unwrap_err();
    assert_eq!(err, TemplateError::ArgumentOutOfRange { index: 1, count: 1 });
}
