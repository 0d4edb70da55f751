//! Reflow behavior through the public API.

use pdfreflow::{reflow_text, ReflowOptions, ReflowPreset, ReflowStatus, Reflower};

const PAGE: &str = "Introduction\n\
The study of line-\n\
wrapped text begins\n\
with a simple question.\n\
\n\
\n\
\n\
\n\
Methods\n\
We extracted each page\n\
and repaired it:\n\
first the hyphens, then the soft wraps.";

#[test]
fn test_clean_text_is_unchanged() {
    let text = "Title\n\nOne full sentence.\nAnother full sentence!\n\nLast paragraph?";
    assert_eq!(reflow_text(text), text);
}

#[test]
fn test_canonical_scenarios() {
    assert_eq!(reflow_text("inter-\nnational"), "international");
    assert_eq!(
        reflow_text("The cat sat on\nthe mat."),
        "The cat sat on the mat."
    );
    assert_eq!(
        reflow_text("End of sentence.\nNext sentence starts."),
        "End of sentence.\nNext sentence starts."
    );
    assert_eq!(
        reflow_text("Heading Line\nNext Paragraph"),
        "Heading Line\nNext Paragraph"
    );
    assert_eq!(
        reflow_text("First line.\n\n\n\n\nSecond line."),
        "First line.\n\nSecond line."
    );
}

#[test]
fn test_full_page() {
    assert_eq!(
        reflow_text(PAGE),
        "Introduction\n\
         The study of linewrapped text begins with a simple question.\n\
         \n\
         Methods\n\
         We extracted each page and repaired it:\n\
         first the hyphens, then the soft wraps."
    );
}

#[test]
fn test_presets_differ_on_colons_and_chaining() {
    let wrapped = "The cat\nsat on\nthe mat.";
    let minimal = Reflower::from_preset(ReflowPreset::Minimal);
    let standard = Reflower::from_preset(ReflowPreset::Standard);

    // Minimal merges pairwise, so the third line stays on its own.
    assert_eq!(minimal.reflow(wrapped).text, "The cat sat on\nthe mat.");
    assert_eq!(standard.reflow(wrapped).text, "The cat sat on the mat.");

    // Only the minimal preset lets a colon continue onto the next line.
    assert_eq!(minimal.reflow("Steps:\nfirst hyphens").text, "Steps: first hyphens");
    assert_eq!(standard.reflow("Steps:\nfirst hyphens").text, "Steps:\nfirst hyphens");

    let aggressive = Reflower::from_preset(ReflowPreset::Aggressive);
    assert_eq!(
        aggressive.reflow("Too   many\nspaces here.").text,
        "Too many spaces here."
    );
}

#[test]
fn test_malformed_input_never_fails() {
    let inputs = [
        "",
        "\n\n\n",
        "-",
        "-\n-\n-",
        "\u{00AD}\n\u{00AD}",
        "a\0b",
        "\r\r\n\r",
        "\u{FEFF}odd\u{200B}\nbytes",
        "ends with hyphen-",
        "x-\n",
    ];

    let reflower = Reflower::default();
    for input in inputs {
        let result = reflower.reflow(input);
        if let ReflowStatus::Fallback { .. } = result.status {
            assert_eq!(result.text, input);
        }
    }
}

#[test]
fn test_reflow_is_idempotent() {
    let samples = [
        PAGE,
        "inter-\nnational",
        "The cat sat on\nthe mat.",
        "A\n\n\n\nB",
        "list:\nitem one\nitem two",
    ];

    for sample in samples {
        let once = reflow_text(sample);
        assert_eq!(reflow_text(&once), once, "not idempotent for {:?}", sample);
    }
}

#[test]
fn test_oversized_input_is_passed_through() {
    let reflower = Reflower::new(ReflowOptions::standard().with_max_input_len(8));
    let result = reflower.reflow("far too long\nfor the limit");
    assert!(!result.is_applied());
    assert_eq!(result.into_text(), "far too long\nfor the limit");
}
