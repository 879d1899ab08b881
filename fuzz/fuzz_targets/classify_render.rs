//! Fuzz target for classification and template rendering.
//!
//! Classification is total over arbitrary text, and rendering must
//! produce bounded parameters for whatever category falls out. Checks
//! the masking invariant on the way: no standalone digit run of four or
//! more survives into a masked summary.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sealpost_core::{TemplateCatalog, classify};
use sealpost_proto::MessageCategory;

fn has_long_digit_run(text: &str) -> bool {
    let mut run = 0usize;
    for c in text.chars() {
        if c.is_ascii_digit() {
            run += 1;
            if run >= 4 {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

fuzz_target!(|input: (&str, &str)| {
    let (sender, body) = input;

    let first = classify(body);
    let second = classify(body);
    assert_eq!(first, second, "classification must be deterministic");

    let catalog = TemplateCatalog::default();
    let message = catalog.render(first.category, sender, body);
    assert!(!message.template.is_empty());

    // The body-derived parameter is always last and always bounded.
    let summary = message.params.last().expect("every template carries parameters");
    assert!(summary.chars().count() <= 200, "unbounded template parameter");

    // Masked categories must not leak digit runs.
    if matches!(first.category, MessageCategory::Transaction | MessageCategory::Bill) {
        assert!(!has_long_digit_run(summary), "digit run leaked through masking");
    }
});
