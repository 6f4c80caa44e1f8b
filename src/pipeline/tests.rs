//! Traversal and mutation tests for `Pipeline::run`.

use std::cell::RefCell;

use anyhow::{Result, bail};

use super::*;
use crate::dom::NodeData;
use crate::html::{parse, render};

// =============================================================================
// Helpers
// =============================================================================

/// Parse `html` and return the document plus its first top-level node.
fn fixture(html: &str) -> (Document, NodeId) {
    let doc = parse(html).expect("fixture should parse");
    let first = doc.first_child(doc.root()).expect("fixture has a top-level node");
    (doc, first)
}

/// Run `pipeline` over the first top-level node of `html` and render it.
fn run_html(html: &str, pipeline: &mut Pipeline<'_>) -> String {
    let (mut doc, root) = fixture(html);
    let root = pipeline.run(&mut doc, root).expect("pipeline should succeed");
    render(&doc, root)
}

/// Transform that records every node it sees and passes.
fn recorder(log: &RefCell<Vec<String>>) -> impl FnMut(NodeRef<'_>) -> Result<Verdict> + '_ {
    move |node| {
        log.borrow_mut().push(node.to_string());
        Ok(Verdict::Pass)
    }
}

fn seen(log: &RefCell<Vec<String>>) -> Vec<String> {
    log.borrow().clone()
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_delete_matching_paragraph() {
    let mut pipeline = Pipeline::new().pipe_fn(|node| {
        Ok(if node.is("p") && node.text_content() == "a" {
            Verdict::Delete
        } else {
            Verdict::Pass
        })
    });

    let html = run_html("<div><p>a</p><p>b</p></div>", &mut pipeline);
    assert_eq!(html, "<div><p>b</p></div>");
}

#[test]
fn test_unwrap_span() {
    let mut pipeline = Pipeline::new().pipe_fn(|node| {
        Ok(if node.is("span") { Verdict::Unwrap } else { Verdict::Pass })
    });

    let html = run_html("<div><span><b>x</b></span></div>", &mut pipeline);
    assert_eq!(html, "<div><b>x</b></div>");
}

#[test]
fn test_replace_text_with_number() {
    let (mut doc, div) = fixture("<div>hello</div>");
    let mut pipeline = Pipeline::new().pipe_fn(|node| {
        Ok(if node.text() == Some("hello") {
            Verdict::text(42)
        } else {
            Verdict::Pass
        })
    });

    pipeline.run(&mut doc, div).unwrap();

    let children: Vec<_> = doc.children(div).collect();
    assert_eq!(children.len(), 1);
    assert_eq!(doc.data(children[0]), &NodeData::Text("42".to_string()));
    assert_eq!(render(&doc, div), "<div>42</div>");
}

fn italic_to_xy(node: NodeRef<'_>) -> Result<Verdict> {
    Ok(if node.is("i") {
        Verdict::fragment([Node::text("x"), Node::text("y")])
    } else {
        Verdict::Pass
    })
}

#[test]
fn test_fragment_replacement_before_normalization() {
    let (mut doc, div) = fixture("<div><i>a</i></div>");
    let mut pipeline = Pipeline::new().normalize(false).pipe_fn(italic_to_xy);

    pipeline.run(&mut doc, div).unwrap();

    let children: Vec<_> = doc.children(div).map(|id| doc.data(id).clone()).collect();
    assert_eq!(
        children,
        vec![NodeData::Text("x".into()), NodeData::Text("y".into())]
    );
}

#[test]
fn test_fragment_replacement_after_normalization() {
    let (mut doc, div) = fixture("<div><i>a</i></div>");
    let mut pipeline = Pipeline::new().pipe_fn(italic_to_xy);

    pipeline.run(&mut doc, div).unwrap();

    assert_eq!(doc.children(div).count(), 1);
    assert_eq!(render(&doc, div), "<div>xy</div>");
}

// =============================================================================
// Coverage and ordering
// =============================================================================

#[test]
fn test_every_node_sees_transforms_in_order() {
    let log = RefCell::new(Vec::new());
    let mut pipeline = Pipeline::new()
        .pipe_fn(|node| {
            log.borrow_mut().push(format!("0 {node}"));
            Ok(Verdict::Pass)
        })
        .pipe_fn(|node| {
            log.borrow_mut().push(format!("1 {node}"));
            Ok(Verdict::Pass)
        });

    run_html("<div><p>a</p><span>b</span></div>", &mut pipeline);

    assert_eq!(
        seen(&log),
        vec![
            "0 <p>", "1 <p>", "0 \"a\"", "1 \"a\"", "0 <span>", "1 <span>", "0 \"b\"", "1 \"b\"",
        ]
    );
}

#[test]
fn test_first_verdict_wins() {
    let log = RefCell::new(Vec::new());
    let mut pipeline = Pipeline::new()
        .pipe_fn(|node| Ok(if node.is("p") { Verdict::Delete } else { Verdict::Pass }))
        .pipe_fn(|_| Ok(Verdict::Unwrap))
        .pipe_fn(recorder(&log));

    // Whatever survives the first transform is unwrapped by the second, so the
    // recorder never runs.
    let html = run_html("<div><p>a</p><i>b</i></div>", &mut pipeline);
    assert_eq!(html, "<div></div>");
    assert!(seen(&log).is_empty());
}

#[test]
fn test_root_is_boundary() {
    let log = RefCell::new(Vec::new());
    let (mut doc, body) = fixture("<body><main><p>in</p></main><footer>out</footer></body>");
    let main = doc.first_child(body).unwrap();

    let mut pipeline = Pipeline::new().pipe_fn(recorder(&log));
    let returned = pipeline.run(&mut doc, main).unwrap();

    assert_eq!(returned, main);
    assert_eq!(seen(&log), vec!["<p>", "\"in\""]);
}

#[test]
fn test_empty_root_is_untouched() {
    let log = RefCell::new(Vec::new());
    let (mut doc, div) = fixture("<div></div>");
    let mut pipeline = Pipeline::new().pipe_fn(recorder(&log));

    assert_eq!(pipeline.run(&mut doc, div).unwrap(), div);
    assert!(seen(&log).is_empty());
    assert_eq!(pipeline.stats().visited, 0);
}

#[test]
fn test_text_root_is_rejected() {
    let (mut doc, text) = fixture("plain");
    let mut pipeline = Pipeline::new().pipe_fn(|_| Ok(Verdict::Delete));

    let err = pipeline.run(&mut doc, text).unwrap_err();
    assert!(matches!(err, PipelineError::NotAContainer(id) if id == text));
}

#[test]
fn test_pass_only_pipeline_is_noop() {
    let source = r#"<article><h1 id="t">Title</h1><p>one <em>two</em> three</p><ul><li>x</li><li></li></ul></article>"#;
    let (mut doc, article) = fixture(source);
    let before = doc.to_node(article);

    let mut pipeline = Pipeline::new()
        .pipe_fn(|_| Ok(Verdict::Pass))
        .pipe_fn(|_| Ok(Verdict::Pass));
    pipeline.run(&mut doc, article).unwrap();

    assert_eq!(doc.to_node(article), before);
    assert_eq!(render(&doc, article), source);
    assert_eq!(pipeline.stats().visited, 11);
}

// =============================================================================
// Delete
// =============================================================================

#[test]
fn test_delete_middle_continues_with_next_sibling() {
    let log = RefCell::new(Vec::new());
    let mut pipeline = Pipeline::new()
        .pipe_fn(recorder(&log))
        .pipe_fn(|node| {
            Ok(if node.is("li") && node.text_content() == "2" {
                Verdict::Delete
            } else {
                Verdict::Pass
            })
        });

    let html = run_html("<ul><li>1</li><li>2</li><li>3</li></ul>", &mut pipeline);

    assert_eq!(html, "<ul><li>1</li><li>3</li></ul>");
    assert_eq!(seen(&log), vec!["<li>", "\"1\"", "<li>", "<li>", "\"3\""]);
}

#[test]
fn test_delete_first_child_continues_from_parent() {
    let log = RefCell::new(Vec::new());
    let mut pipeline = Pipeline::new()
        .pipe_fn(recorder(&log))
        .pipe_fn(|node| {
            Ok(if node.is("li") && node.text_content() == "1" {
                Verdict::Delete
            } else {
                Verdict::Pass
            })
        });

    let html = run_html("<ul><li>1</li><li>2</li></ul>", &mut pipeline);

    assert_eq!(html, "<ul><li>2</li></ul>");
    assert_eq!(seen(&log), vec!["<li>", "<li>", "\"2\""]);
}

#[test]
fn test_delete_everything() {
    let mut pipeline = Pipeline::new().pipe_fn(|_| Ok(Verdict::Delete));
    let html = run_html("<div><p>a</p>b<i>c</i></div>", &mut pipeline);

    assert_eq!(html, "<div></div>");
    assert_eq!(pipeline.stats().deleted, 3);
    assert_eq!(pipeline.stats().visited, 3);
}

// =============================================================================
// Unwrap
// =============================================================================

#[test]
fn test_unwrap_splices_children_in_place() {
    let log = RefCell::new(Vec::new());
    let mut pipeline = Pipeline::new()
        .pipe_fn(recorder(&log))
        .pipe_fn(|node| Ok(if node.is("section") { Verdict::Unwrap } else { Verdict::Pass }));

    let html = run_html(
        "<div><hr><section><p>1</p><p>2</p></section><hr></div>",
        &mut pipeline,
    );

    assert_eq!(html, "<div><hr><p>1</p><p>2</p><hr></div>");
    assert_eq!(
        seen(&log),
        vec!["<hr>", "<section>", "<p>", "\"1\"", "<p>", "\"2\"", "<hr>"]
    );
}

#[test]
fn test_unwrapped_children_get_full_pipeline() {
    let log = RefCell::new(Vec::new());
    let mut pipeline = Pipeline::new()
        .pipe_fn(|node| Ok(if node.is("font") { Verdict::Unwrap } else { Verdict::Pass }))
        .pipe_fn(recorder(&log));

    let html = run_html("<p><font><font>x</font></font></p>", &mut pipeline);

    assert_eq!(html, "<p>x</p>");
    assert_eq!(seen(&log), vec!["\"x\""]);
    assert_eq!(pipeline.stats().unwrapped, 2);
}

#[test]
fn test_unwrap_empty_element_removes_it() {
    let mut pipeline = Pipeline::new()
        .pipe_fn(|node| Ok(if node.is("span") { Verdict::Unwrap } else { Verdict::Pass }));

    let html = run_html("<div>a<span></span>b</div>", &mut pipeline);
    assert_eq!(html, "<div>ab</div>");
}

#[test]
fn test_unwrap_text_first_child_removes_it() {
    let log = RefCell::new(Vec::new());
    let mut pipeline = Pipeline::new()
        .pipe_fn(|node| Ok(if node.is_text() { Verdict::Unwrap } else { Verdict::Pass }))
        .pipe_fn(recorder(&log));

    let html = run_html("<div>a<b>c</b></div>", &mut pipeline);

    assert_eq!(html, "<div><b></b></div>");
    assert_eq!(seen(&log), vec!["<b>"]);
    assert_eq!(pipeline.stats().unwrapped, 2);
}

#[test]
fn test_unwrap_and_delete_do_not_grow_arena() {
    let (mut doc, div) = fixture("<div><span>a</span><i>b</i><span><em>c</em></span></div>");
    let before = doc.capacity();
    let mut pipeline = Pipeline::new().pipe_fn(|node| {
        Ok(match node.tag() {
            Some("span") => Verdict::Unwrap,
            Some("i") => Verdict::Delete,
            _ => Verdict::Pass,
        })
    });

    pipeline.run(&mut doc, div).unwrap();

    assert_eq!(render(&doc, div), "<div>a<em>c</em></div>");
    assert_eq!(doc.capacity(), before);
}

// =============================================================================
// Keep
// =============================================================================

#[test]
fn test_keep_skips_subtree_and_later_transforms() {
    let log = RefCell::new(Vec::new());
    let mut pipeline = Pipeline::new()
        .pipe_fn(|node| Ok(if node.is("nav") { Verdict::Keep } else { Verdict::Pass }))
        .pipe_fn(recorder(&log));

    let html = run_html("<div><nav><a>x</a></nav><p>y</p></div>", &mut pipeline);

    assert_eq!(html, "<div><nav><a>x</a></nav><p>y</p></div>");
    assert_eq!(seen(&log), vec!["<p>", "\"y\""]);
    assert_eq!(pipeline.stats().kept, 1);
}

#[test]
fn test_keep_last_child_climbs_without_revisiting() {
    let log = RefCell::new(Vec::new());
    let mut pipeline = Pipeline::new()
        .pipe_fn(recorder(&log))
        .pipe_fn(|node| Ok(if node.is("nav") { Verdict::Keep } else { Verdict::Pass }));

    run_html(
        "<div><section><nav><a>x</a></nav></section><p>z</p></div>",
        &mut pipeline,
    );

    assert_eq!(seen(&log), vec!["<section>", "<nav>", "<p>", "\"z\""]);
}

#[test]
fn test_keep_last_node_ends_traversal() {
    let log = RefCell::new(Vec::new());
    let mut pipeline = Pipeline::new()
        .pipe_fn(recorder(&log))
        .pipe_fn(|_| Ok(Verdict::Keep));

    run_html("<div><p>a</p><p>b</p></div>", &mut pipeline);
    assert_eq!(seen(&log), vec!["<p>", "<p>"]);
}

// =============================================================================
// Replace
// =============================================================================

#[test]
fn test_replacement_runs_remaining_transforms_only() {
    let first = RefCell::new(Vec::new());
    let second = RefCell::new(Vec::new());
    let mut pipeline = Pipeline::new()
        .pipe_fn(|node| {
            first.borrow_mut().push(node.to_string());
            Ok(if node.is("b") {
                Verdict::replace(Node::element("strong").with_child(node.text_content()))
            } else {
                Verdict::Pass
            })
        })
        .pipe_fn(recorder(&second));

    let html = run_html("<div><b>x</b></div>", &mut pipeline);

    assert_eq!(html, "<div><strong>x</strong></div>");
    // The replacement's children are new nodes and get the whole pipeline.
    assert_eq!(seen(&first), vec!["<b>", "\"x\""]);
    assert_eq!(seen(&second), vec!["<strong>", "\"x\""]);
}

#[test]
fn test_text_replacements_chain() {
    let log = RefCell::new(Vec::new());
    let mut pipeline = Pipeline::new()
        .pipe_fn(|node| {
            Ok(match node.text() {
                Some("hello") => Verdict::text("hi"),
                _ => Verdict::Pass,
            })
        })
        .pipe_fn(recorder(&log))
        .pipe_fn(|node| {
            Ok(match node.text() {
                Some("hi") => Verdict::text(7.5),
                _ => Verdict::Pass,
            })
        });

    let html = run_html("<div>hello</div>", &mut pipeline);

    assert_eq!(html, "<div>7.5</div>");
    assert_eq!(seen(&log), vec!["\"hi\""]);
    assert_eq!(pipeline.stats().replaced, 2);
}

#[test]
fn test_replacement_can_be_deleted_by_later_transform() {
    let mut pipeline = Pipeline::new()
        .pipe_fn(|node| Ok(if node.is("b") { Verdict::text("gone") } else { Verdict::Pass }))
        .pipe_fn(|node| Ok(if node.text() == Some("gone") { Verdict::Delete } else { Verdict::Pass }));

    let html = run_html("<p>a<b>x</b>c</p>", &mut pipeline);
    assert_eq!(html, "<p>ac</p>");
}

#[test]
fn test_fragment_first_child_gets_remaining_transforms() {
    let first = RefCell::new(Vec::new());
    let second = RefCell::new(Vec::new());
    let mut pipeline = Pipeline::new()
        .pipe_fn(|node| {
            first.borrow_mut().push(node.to_string());
            Ok(if node.is("i") {
                Verdict::fragment([
                    Node::element("b").with_child("1"),
                    Node::element("u").with_child("2"),
                ])
            } else {
                Verdict::Pass
            })
        })
        .pipe_fn(recorder(&second));

    let html = run_html("<div><i>a</i><hr></div>", &mut pipeline);

    assert_eq!(html, "<div><b>1</b><u>2</u><hr></div>");
    assert_eq!(seen(&first), vec!["<i>", "\"1\"", "<u>", "\"2\"", "<hr>"]);
    assert_eq!(seen(&second), vec!["<b>", "\"1\"", "<u>", "\"2\"", "<hr>"]);
}

#[test]
fn test_empty_fragment_acts_as_delete() {
    let log = RefCell::new(Vec::new());
    let mut pipeline = Pipeline::new()
        .pipe_fn(|node| Ok(if node.is("i") {
                Verdict::Replace(Node::Fragment(Vec::new()))
            } else {
                Verdict::Pass
            }))
        .pipe_fn(recorder(&log));

    let html = run_html("<div><p>a</p><i>x</i><p>b</p></div>", &mut pipeline);

    assert_eq!(html, "<div><p>a</p><p>b</p></div>");
    assert_eq!(seen(&log), vec!["<p>", "\"a\"", "<p>", "\"b\""]);
    assert_eq!(pipeline.stats().deleted, 1);
    assert_eq!(pipeline.stats().replaced, 0);
}

#[test]
fn test_nested_empty_fragment_acts_as_delete() {
    let mut pipeline = Pipeline::new().pipe_fn(|node| {
        Ok(if node.is("i") {
            Verdict::fragment([Node::Fragment(Vec::new())])
        } else {
            Verdict::Pass
        })
    });

    let html = run_html("<div><i>x</i>y</div>", &mut pipeline);
    assert_eq!(html, "<div>y</div>");
}

#[test]
fn test_empty_fragment_allocates_nothing() {
    let (mut doc, div) = fixture("<div><i>x</i>y</div>");
    let before = doc.capacity();
    let mut pipeline = Pipeline::new().pipe_fn(|node| {
        Ok(if node.is("i") {
            Verdict::fragment([Node::Fragment(Vec::new())])
        } else {
            Verdict::Pass
        })
    });

    for _ in 0..10 {
        pipeline.run(&mut doc, div).unwrap();
    }

    assert_eq!(render(&doc, div), "<div>y</div>");
    assert_eq!(doc.capacity(), before);
}

#[test]
fn test_keep_on_replacement_skips_its_subtree() {
    let log = RefCell::new(Vec::new());
    let mut pipeline = Pipeline::new()
        .pipe_fn(|node| {
            Ok(if node.is("i") {
                Verdict::replace(Node::element("b").with_child(Node::element("u").with_child("x")))
            } else {
                Verdict::Pass
            })
        })
        .pipe_fn(|node| Ok(if node.is("b") { Verdict::Keep } else { Verdict::Pass }))
        .pipe_fn(recorder(&log));

    let html = run_html("<div><i>a</i><p>z</p></div>", &mut pipeline);

    assert_eq!(html, "<div><b><u>x</u></b><p>z</p></div>");
    assert_eq!(seen(&log), vec!["<p>", "\"z\""]);
    assert_eq!(pipeline.stats().replaced, 1);
    assert_eq!(pipeline.stats().kept, 1);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_transform_error_aborts_without_rollback() {
    let (mut doc, div) = fixture("<div><p>1</p><p>2</p><p>3</p></div>");
    let mut pipeline = Pipeline::new()
        .pipe_fn(|node| {
            Ok(if node.is("p") && node.text_content() == "1" {
                Verdict::Delete
            } else {
                Verdict::Pass
            })
        })
        .pipe(from_fn(|node| {
            if node.text() == Some("2") {
                bail!("refusing to touch 2");
            }
            Ok(Verdict::Pass)
        })
        .named("picky"));

    let err = pipeline.run(&mut doc, div).unwrap_err();

    match &err {
        PipelineError::Transform { index, name, source } => {
            assert_eq!(*index, 1);
            assert_eq!(name, "picky");
            assert_eq!(source.to_string(), "refusing to touch 2");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(render(&doc, div), "<div><p>2</p><p>3</p></div>");
}

#[test]
fn test_clone_subtree_gives_atomic_runs() {
    let (mut doc, div) = fixture("<div><p>keep</p><p>boom</p></div>");
    let mut pipeline = Pipeline::new().pipe_fn(|node| {
        if node.text_content() == "boom" {
            bail!("boom");
        }
        Ok(if node.is("p") { Verdict::Unwrap } else { Verdict::Pass })
    });

    let scratch = doc.clone_subtree(div);
    assert!(pipeline.run(&mut doc, scratch).is_err());

    // The live tree is untouched; only the scratch copy was mutated.
    assert_eq!(render(&doc, div), "<div><p>keep</p><p>boom</p></div>");
    assert_eq!(render(&doc, scratch), "<div>keep<p>boom</p></div>");
}

// =============================================================================
// Transform trait
// =============================================================================

struct StripTag(&'static str);

impl Transform for StripTag {
    fn apply(&mut self, node: NodeRef<'_>) -> Result<Verdict> {
        Ok(if node.is(self.0) { Verdict::Delete } else { Verdict::Pass })
    }
}

#[test]
fn test_struct_transform_and_default_name() {
    let strip = StripTag("script");
    assert!(strip.name().ends_with("StripTag"));

    let mut pipeline = Pipeline::new().pipe(strip).pipe(StripTag("style"));
    assert_eq!(pipeline.len(), 2);

    let html = run_html(
        "<head><style>p{}</style><script>x()</script><title>t</title></head>",
        &mut pipeline,
    );
    assert_eq!(html, "<head><title>t</title></head>");
}

#[test]
fn test_push_and_reuse_across_documents() {
    let mut pipeline = Pipeline::new();
    pipeline.push(StripTag("br"));

    assert_eq!(run_html("<p>a<br>b</p>", &mut pipeline), "<p>ab</p>");
    assert_eq!(run_html("<p><br><br></p>", &mut pipeline), "<p></p>");
    assert_eq!(pipeline.stats().deleted, 2);
}
