//! Integration tests for the document transformer with the documentation
//! component registry.

use rstest::{fixture, rstest};

use dskview::application::components::{DocContext, RenderKind, RenderNode};
use dskview::application::services::DocumentService;
use dskview::config::DocConfig;
use dskview::domain::doc::{
    DocumentTransformer, Fragment, Props, TransformOptions, TransformRegistry,
};
use dskview::util::testing;

#[fixture]
fn service() -> DocumentService {
    testing::init_test_setup();
    DocumentService::new(&DocConfig::default()).expect("default document service")
}

fn transform(service: &DocumentService, markup: &str) -> Vec<Fragment<RenderNode>> {
    service
        .transformer()
        .transform(markup, &DocContext::default())
        .expect("transform")
}

fn node(fragment: &Fragment<RenderNode>) -> &RenderNode {
    fragment.as_node().expect("rendered node")
}

fn names(fragments: &[Fragment<RenderNode>]) -> Vec<String> {
    fragments
        .iter()
        .map(|f| match f {
            Fragment::Text(t) => format!("#{t}"),
            Fragment::Node(n) => n.name.clone(),
        })
        .collect()
}

// ============================================================
// Pseudo custom elements
// ============================================================

#[rstest]
fn given_div_with_component_attribute_when_transforming_then_same_as_literal_tag(
    service: DocumentService,
) {
    // Arrange
    let pseudo = r#"<div ColorCard color="red" name="Danger">Red</div>"#;
    let literal = r#"<ColorCard color="red" name="Danger">Red</ColorCard>"#;

    // Act
    let from_pseudo = transform(&service, pseudo);
    let from_literal = transform(&service, literal);

    // Assert
    assert_eq!(from_pseudo, from_literal);
    let card = node(&from_pseudo[0]);
    assert_eq!(card.name, "ColorCard");
    assert_eq!(card.kind, RenderKind::Component);
    assert_eq!(
        card.props.iter().collect::<Vec<_>>(),
        vec![("color", "red"), ("name", "Danger")]
    );
}

#[rstest]
fn given_div_with_plain_attribute_when_transforming_then_passed_through_as_markup(
    service: DocumentService,
) {
    let out = transform(&service, r#"<div class="note">Hi</div>"#);

    let div = node(&out[0]);
    assert_eq!(div.kind, RenderKind::Html);
    assert_eq!(div.name, "div");
    assert_eq!(div.props.get("class"), Some("note"));
    assert_eq!(div.text(), "Hi");
}

#[test]
fn given_literal_registration_for_container_when_transforming_then_literal_wins() {
    // Arrange
    let registry: TransformRegistry<String> = TransformRegistry::new()
        .with("div", |_, _, _| "div".to_string())
        .with("Banner", |_, _, _| "banner".to_string());
    let transformer = DocumentTransformer::new(registry, TransformOptions::default());

    // Act
    let out = transformer.transform("<div Banner>x</div>", &()).unwrap();

    // Assert
    assert_eq!(out, vec![Fragment::Node("div".to_string())]);
}

// ============================================================
// Orphan promotion and cleanup
// ============================================================

#[rstest]
fn given_image_inside_paragraph_when_transforming_then_it_lands_before_paragraph(
    service: DocumentService,
) {
    let markup = r#"<p>Intro</p><p>Before<img src="logo.png">After</p><p>Outro</p>"#;

    let out = transform(&service, markup);

    assert_eq!(names(&out), vec!["p", "Image", "p", "p"]);
    assert_eq!(node(&out[1]).props.get("src"), Some("logo.png"));
    assert_eq!(node(&out[2]).text(), "BeforeAfter");
}

#[rstest]
fn given_paragraph_holding_only_component_when_transforming_then_paragraph_disappears(
    service: DocumentService,
) {
    let out = transform(&service, r#"<p><Banner type="info">Note</Banner></p>"#);

    assert_eq!(names(&out), vec!["Banner"]);
    assert_eq!(node(&out[0]).props.get("type"), Some("info"));
}

#[rstest]
fn given_link_inside_paragraph_when_transforming_then_it_stays_inline(service: DocumentService) {
    let out = transform(&service, r#"<p>See <a href="/colors">colors</a> <a href="/icons">icons</a></p>"#);

    let p = node(&out[0]);
    assert_eq!(names(&p.children), vec!["#See ", "Link", "# ", "Link"]);
}

#[test]
fn given_configured_orphan_when_transforming_then_it_is_promoted_too() {
    // Arrange
    let config = DocConfig {
        orphans: vec!["p > iframe".into()],
        ..DocConfig::default()
    };
    let service = DocumentService::new(&config).unwrap();

    // Act
    let out = transform(&service, r#"<p><iframe src="x"></iframe></p>"#);

    // Assert
    assert_eq!(names(&out), vec!["iframe"]);
}

#[test]
fn given_malformed_orphan_selector_when_creating_service_then_error() {
    let config = DocConfig {
        orphans: vec!["iframe".into()],
        ..DocConfig::default()
    };

    assert!(DocumentService::new(&config).is_err());
}

// ============================================================
// Text handling
// ============================================================

#[rstest]
fn given_escaped_text_when_transforming_then_decoded_exactly_once(service: DocumentService) {
    let out = transform(&service, "<p>5 &lt; 6 &amp;&amp; &lt;b&gt;</p>");

    assert_eq!(node(&out[0]).text(), "5 < 6 && <b>");
}

#[rstest]
fn given_escaped_code_block_when_transforming_then_not_escaped_twice(service: DocumentService) {
    // Arrange
    let markup = "<pre><code class=\"language-html\">&lt;b&gt;bold&lt;/b&gt;</code></pre>";

    // Act
    let out = transform(&service, markup);

    // Assert
    let code = node(&out[0]);
    assert_eq!(code.name, "CodeBlock");
    assert_eq!(code.props.get("language"), Some("html"));
    assert_eq!(code.text(), "&lt;b&gt;bold&lt;/b&gt;");
}

#[rstest]
fn given_preformatted_whitespace_when_transforming_then_kept_verbatim(service: DocumentService) {
    let out = transform(&service, "<playground>\n  <b>x</b>\n\n</playground>");

    let playground = node(&out[0]);
    assert_eq!(playground.name, "Playground");
    assert_eq!(
        playground.children,
        vec![Fragment::Text("\n  <b>x</b>\n\n".to_string())]
    );
}

#[rstest]
fn given_blank_lines_between_blocks_when_transforming_then_no_text_fragments(
    service: DocumentService,
) {
    let out = transform(&service, "<h2>Usage</h2>\n\n<p>Text</p>\n");

    assert_eq!(names(&out), vec!["Heading", "p"]);
}

// ============================================================
// Components
// ============================================================

#[rstest]
#[case("<h1>Brand Colors</h1>", "alpha", "brand-colors")]
#[case("<h3>Do &amp; Don't</h3>", "gamma", "do-and-dont")]
#[case(r#"<h4 id="custom">Spacing</h4>"#, "delta", "custom")]
fn given_heading_when_transforming_then_level_and_anchor_are_set(
    service: DocumentService,
    #[case] markup: &str,
    #[case] level: &str,
    #[case] id: &str,
) {
    let out = transform(&service, markup);

    let heading = node(&out[0]);
    assert_eq!(heading.name, "Heading");
    assert_eq!(heading.props.get("level"), Some(level));
    assert_eq!(heading.props.get("id"), Some(id));
}

#[rstest]
fn given_mixed_case_tag_when_transforming_then_registry_matches(service: DocumentService) {
    let out = transform(&service, "<WARNING>Deprecated</WARNING>");

    let banner = node(&out[0]);
    assert_eq!(banner.name, "Banner");
    assert_eq!(banner.props, Props::new().with("type", "warning"));
    assert_eq!(banner.text(), "Deprecated");
}
