use pretty_assertions::assert_eq;
use rtdoc_engine::annotate::annotate;
use rtdoc_engine::{MarkdownToRst, MarkupConverter, Sanitizer, docs_to_rst};

#[test]
fn fixture_targets() {
    assert_fixture("targets", 2);
}

#[test]
fn fixture_passes() {
    assert_fixture("passes", 2);
}

fn read_fixture(file: &str) -> String {
    std::fs::read_to_string(format!(
        "{}/tests/fixtures/{file}",
        env!("CARGO_MANIFEST_DIR")
    ))
    .unwrap()
}

fn assert_fixture(name: &str, header_level: usize) {
    let text = read_fixture(&format!("{name}.txt"));
    let expected = read_fixture(&format!("{name}.rst"));

    let rst = docs_to_rst(&text, header_level).unwrap();
    assert_eq!(rst, expected);
}

#[test]
fn targets_scenario_snapshot() {
    let text = "* Targets *\n  NOTE: the <platform> tag is a placeholder.\n  more detail.\n";
    let rst = docs_to_rst(text, 2).unwrap();
    insta::assert_snapshot!(rst, @r"
.. role:: raw-html-m2r(raw)
   :format: html

Targets
-------

.. note::

   The <platform> tag is a placeholder.
   more detail.
");
}

/// The sanitizer only works while the converter keeps wrapping inline HTML
/// the same way.
#[test]
fn markdown_converter_still_emits_the_sanitized_wrapper() {
    let rst = MarkdownToRst.convert("keep the <platform> tag").unwrap();
    assert!(
        Sanitizer::default().matches(&rst),
        "converter output no longer matches the raw-html wrapper pattern: {rst:?}"
    );
}

#[test]
fn plain_text_keeps_its_paragraphs() {
    let text = "first line\nsecond line\n\nnext paragraph\n";
    assert_eq!(
        docs_to_rst(text, 1).unwrap(),
        "first line\nsecond line\n\nnext paragraph\n"
    );
}

#[test]
fn header_depth_follows_indentation() {
    let rst = docs_to_rst("* Foo *\n  * Bar *\n    text\n", 1).unwrap();
    assert_eq!(rst, "Foo\n===\n\nBar\n---\n\ntext\n");
}

#[test]
fn sibling_headers_return_to_their_level() {
    let text = "* A *\n  * B *\n  * C *\n* D *\n";
    assert_eq!(
        annotate(text, 1),
        "\n# A\n\n## B\n\n## C\n\n# D\n"
    );
}

#[test]
fn note_text_starts_with_capital() {
    let rst = docs_to_rst("NOTE: something happens.", 1).unwrap();
    assert_eq!(rst, ".. note::\n\n   Something happens.\n");
}

#[test]
fn sanitizing_converted_output_twice_changes_nothing() {
    let rst = MarkdownToRst
        .convert("a <b> c and `code` with <d>")
        .unwrap();
    let sanitizer = Sanitizer::default();
    let once = sanitizer.sanitize(&rst).into_owned();
    assert_eq!(sanitizer.sanitize(&once), once);
}

#[test]
fn option_header_with_code_span() {
    let rst = docs_to_rst("* `scheduler` *\n  Which scheduler.\n", 2).unwrap();
    assert_eq!(rst, "``scheduler``\n-------------\n\nWhich scheduler.\n");
}
