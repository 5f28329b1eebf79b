//! Synthesis properties checked against the parsed document tree

use livepane::bridge::BridgeConfig;
use livepane::synth::{Capability, DocumentOutline, Synthesizer, NO_MARKUP_DOCUMENT};
use livepane::{Project, SourceArtifact};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn project(markup: Option<&str>, css: &[&str], js: &[&str]) -> Project {
    let mut project = Project::new();
    if let Some(markup) = markup {
        project.add_artifact(SourceArtifact::from_path("index", "index.html", markup));
    }
    for (i, css) in css.iter().enumerate() {
        project.add_artifact(SourceArtifact::from_path(format!("css-{}", i), format!("s{}.css", i), *css));
    }
    for (i, js) in js.iter().enumerate() {
        project.add_artifact(SourceArtifact::from_path(format!("js-{}", i), format!("s{}.js", i), *js));
    }
    project
}

#[test]
fn test_round_trip_example() {
    let synth = Synthesizer::default();
    let doc = synth.synthesize(&project(
        Some("<html><body>X</body></html>"),
        &["body{color:red}"],
        &["console.log('hi')"],
    ));

    let outline = DocumentOutline::parse(&doc).unwrap();
    assert!(outline.has_doctype);
    assert_eq!(outline.style_elements, 1);
    assert_eq!(doc.matches("body{color:red}").count(), 1);
    assert_eq!(doc.matches("console.log('hi')").count(), 1);

    let diagnostics = doc.find("livepane-diagnostics").unwrap();
    assert!(diagnostics < doc.find("body{color:red}").unwrap());
    assert!(diagnostics < doc.find("console.log('hi')").unwrap());
    assert_eq!(
        outline.markers(),
        vec!["livepane-diagnostics", "livepane-styles", "livepane-scripts"]
    );
}

#[test]
fn test_asset_basename_fallback() {
    let mut p = project(Some("<img src=\"logo.png\" alt=\"logo\">"), &[], &[]);
    p.add_asset("images/logo.png", "data:image/png;base64,iVBORw0KGgo=");

    let doc = Synthesizer::default().synthesize(&p);
    assert!(doc.contains("src=\"data:image/png;base64,iVBORw0KGgo=\""));
}

#[test]
fn test_unresolved_asset_left_alone() {
    let doc = Synthesizer::default().synthesize(&project(Some("<img src=\"missing.png\">"), &[], &[]));
    assert!(doc.contains("<img src=\"missing.png\">"));
}

#[test]
fn test_no_markup_is_minimal_document() {
    let doc = Synthesizer::default().synthesize(&project(None, &["p{}"], &["go()"]));
    assert_eq!(doc, NO_MARKUP_DOCUMENT);
    let outline = DocumentOutline::parse(&doc).unwrap();
    assert!(outline.has_doctype);
    assert!(outline.markers().is_empty());
}

#[test]
fn test_user_content_cannot_close_injected_blocks() {
    let doc = Synthesizer::default().synthesize(&project(
        Some("<p>x</p>"),
        &["p{content:'</style><b>'}"],
        &["var s = '</script><i>';"],
    ));
    let outline = DocumentOutline::parse(&doc).unwrap();
    assert_eq!(outline.style_elements, 1);
    assert!(outline.markers_unique());
    assert!(doc.contains("<\\/style><b>"));
    assert!(doc.contains("<\\/script><i>"));
}

#[test]
fn test_capabilities_positioned() {
    let synth = Synthesizer::new(
        &BridgeConfig::default(),
        vec![
            Capability::inline_style("reset", "*{box-sizing:border-box}"),
            Capability::external_script("tailwind", "https://cdn.tailwindcss.com"),
        ],
    );
    let doc = synth.synthesize(&project(Some("<h1>t</h1>"), &["h1{}"], &["run()"]));
    let outline = DocumentOutline::parse(&doc).unwrap();

    assert_eq!(
        outline.head_markers,
        vec!["livepane-diagnostics", "livepane-cap-reset", "livepane-styles"]
    );
    assert_eq!(outline.body_markers, vec!["livepane-cap-tailwind", "livepane-scripts"]);
    assert_eq!(outline.first_head_element.as_deref(), Some("script#livepane-diagnostics"));
}

fn markup_strategy() -> impl Strategy<Value = String> {
    (
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        "[a-zA-Z0-9 ]{0,24}",
    )
        .prop_map(|(doctype, html, head, body, text)| {
            let mut inner = String::new();
            if head {
                inner.push_str("<head><title>t</title></head>");
            }
            if body {
                inner.push_str(&format!("<body><p>{}</p></body>", text));
            } else {
                inner.push_str(&format!("<p>{}</p>", text));
            }
            let mut out = String::new();
            if doctype {
                out.push_str("<!DOCTYPE html>");
            }
            if html {
                out.push_str(&format!("<html lang=\"en\">{}</html>", inner));
            } else {
                out.push_str(&inner);
            }
            out
        })
}

proptest! {
    #[test]
    fn prop_synthesis_is_idempotent(
        markup in markup_strategy(),
        css in "[a-z{}:; ]{0,24}",
        js in "[a-z().; ]{0,24}",
    ) {
        let synth = Synthesizer::default();
        let p = project(Some(&markup), &[&css], &[&js]);
        let first = synth.synthesize(&p);
        prop_assert_eq!(&first, &synth.synthesize(&p));

        // Feeding the output back in as markup changes nothing either
        let again = synth.compose(Some(&first), &css, &js, &|_: &str| None);
        prop_assert_eq!(&first, &again);
    }

    #[test]
    fn prop_structure_and_order(
        markup in markup_strategy(),
        css in "[a-z{}:; ]{0,24}",
        js in "[a-z().; ]{0,24}",
    ) {
        let synth = Synthesizer::new(
            &BridgeConfig::default(),
            vec![Capability::inline_style("base", "p{}")],
        );
        let doc = synth.synthesize(&project(Some(&markup), &[&css], &[&js]));

        for tag in ["<html", "<head", "<body", "</html>", "</head>", "</body>"] {
            prop_assert_eq!(doc.matches(tag).count(), 1, "tag {}", tag);
        }

        let outline = DocumentOutline::parse(&doc).unwrap();
        prop_assert!(outline.has_doctype);
        prop_assert!(outline.markers_unique());
        prop_assert_eq!(outline.position("livepane-diagnostics"), Some(0));
        prop_assert_eq!(outline.position("livepane-cap-base"), Some(1));
        if !css.is_empty() {
            prop_assert_eq!(outline.position("livepane-styles"), Some(2));
        }
    }

    #[test]
    fn prop_arbitrary_markup_never_panics(markup in "\\PC{0,64}") {
        let doc = Synthesizer::default().synthesize(&project(Some(&markup), &[], &[]));
        prop_assert!(doc.contains("id=\"livepane-diagnostics\""));
    }
}
