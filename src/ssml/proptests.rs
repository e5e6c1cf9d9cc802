//! Property-based tests for the markup helpers

use super::*;
use proptest::prelude::*;

/// Plain paragraph text: words separated by single spaces, no markup
fn arb_plain_para() -> impl Strategy<Value = String> {
    "[A-Za-z0-9.,!?']{1,12}( [A-Za-z0-9.,!?']{1,12}){0,6}"
}

/// Inline markup fragments that never contain a speak tag
fn arb_inline_markup() -> impl Strategy<Value = String> {
    prop_oneof![
        arb_plain_para(),
        arb_plain_para().prop_map(|t| emphasis(&t, EmphasisLevel::Strong)),
        arb_plain_para().prop_map(|t| phoneme(&t, "ph", PhonemeAlphabet::Ipa)),
        (1u32..10).prop_map(|s| format!("<break time='{s}s'/>")),
    ]
}

proptest! {
    #[test]
    fn prop_wrap_unwrap_roundtrip(body in proptest::collection::vec(arb_inline_markup(), 1..5)) {
        let wrapped = wrap_speak(&body, false);
        let rewrapped = wrap_speak(&[unwrap_speak(&wrapped)], false);
        prop_assert_eq!(rewrapped, wrapped);
    }

    #[test]
    fn prop_strip_two_paragraphs(p1 in arb_plain_para(), p2 in arb_plain_para()) {
        let stripped = strip_ssml(&wrap_paragraphs(&[p1.as_str(), p2.as_str()]));
        prop_assert_eq!(stripped, format!("{p1}\n\n{p2}"));
    }

    #[test]
    fn prop_strip_leaves_no_tags(body in proptest::collection::vec(arb_inline_markup(), 1..5)) {
        let stripped = strip_ssml(&wrap_paragraphs(&body));
        prop_assert!(!stripped.contains('<'));
        prop_assert!(!stripped.contains("  "));
    }
}
