use recomp_tracker::analysis::{Analysis, CallKind};
use recomp_tracker::InstrumentOptions;

fn analyze(source: &str) -> Analysis {
    let file = syn::parse_file(source).expect("source parses");
    Analysis::run(&file, &InstrumentOptions::default())
}

fn closure_names(analysis: &Analysis) -> Vec<String> {
    analysis
        .instrumentation_targets()
        .map(|info| info.declaration.display_name())
        .collect()
}

#[test]
fn test_nested_inclusion_stops_at_skipped_function() {
    let analysis = analyze(
        r#"
#[component]
#[track_recompositions(include_nested = true)]
fn feed(cx: &mut Host) {
    story(cx);
}

#[component]
fn story(cx: &mut Host) {
    comments(cx);
}

#[component]
#[skip_recomposition_tracking]
fn comments(cx: &mut Host) {
    avatar(cx);
}

#[component]
fn avatar(cx: &mut Host) {}
"#,
    );
    assert_eq!(closure_names(&analysis), vec!["feed", "story"]);
}

#[test]
fn test_forward_references_resolve() {
    let analysis = analyze(
        r#"
#[component]
#[track_recompositions(true)]
fn first(cx: &mut Host) {
    later(cx);
}

#[component]
fn later(cx: &mut Host) {}
"#,
    );
    assert_eq!(closure_names(&analysis), vec!["first", "later"]);
    let first = analysis.find("first").unwrap();
    assert_eq!(first.calls.len(), 1);
    assert_eq!(first.calls[0].kind, CallKind::Direct);
}

#[test]
fn test_explicit_tracking_wins_over_skip() {
    let analysis = analyze(
        r#"
#[component]
#[track_recompositions]
#[skip_recomposition_tracking]
fn badge(cx: &mut Host) {}
"#,
    );
    assert_eq!(closure_names(&analysis), vec!["badge"]);
}

#[test]
fn test_tracking_without_nested_flag_does_not_propagate() {
    let analysis = analyze(
        r#"
#[component]
#[track_recompositions]
fn screen(cx: &mut Host) {
    child(cx);
}

#[component]
fn child(cx: &mut Host) {}
"#,
    );
    assert_eq!(closure_names(&analysis), vec!["screen"]);
}

#[test]
fn test_adding_an_edge_never_removes_members() {
    let before = analyze(
        r#"
#[component]
#[track_recompositions(include_nested = true)]
fn root(cx: &mut Host) {
    left(cx);
}

#[component]
fn left(cx: &mut Host) {}

#[component]
fn right(cx: &mut Host) {}
"#,
    );
    let after = analyze(
        r#"
#[component]
#[track_recompositions(include_nested = true)]
fn root(cx: &mut Host) {
    left(cx);
    right(cx);
}

#[component]
fn left(cx: &mut Host) {}

#[component]
fn right(cx: &mut Host) {}
"#,
    );
    let before = closure_names(&before);
    let after = closure_names(&after);
    for name in &before {
        assert!(after.contains(name), "{name} dropped from the closure");
    }
    assert_eq!(after, vec!["root", "left", "right"]);
}

#[test]
fn test_repeated_calls_collapse_into_one_edge() {
    let analysis = analyze(
        r#"
#[component]
fn grid(cx: &mut Host, rows: usize) {
    for _ in 0..rows {
        cell(cx);
    }
    if rows == 0 {
        cell(cx);
    }
}

#[component]
fn cell(cx: &mut Host) {}
"#,
    );
    assert_eq!(analysis.find("grid").unwrap().calls.len(), 1);
    assert_eq!(analysis.call_graph().edge_count(), 1);
}

#[test]
fn test_closure_members_are_unique() {
    let analysis = analyze(
        r#"
#[component]
#[track_recompositions(include_nested = true)]
fn a(cx: &mut Host) {
    b(cx);
    c(cx);
}

#[component]
#[track_recompositions(include_nested = true)]
fn b(cx: &mut Host) {
    c(cx);
    a(cx);
}

#[component]
fn c(cx: &mut Host) {
    b(cx);
}
"#,
    );
    assert_eq!(closure_names(&analysis), vec!["a", "b", "c"]);
}

#[test]
fn test_bodyless_and_read_only_functions_are_excluded() {
    let analysis = analyze(
        r#"
trait Screen {
    #[component]
    #[track_recompositions]
    fn render(&self, cx: &mut Host);
}

#[component]
#[track_recompositions(include_nested = true)]
fn app(cx: &mut Host) {
    theme(cx);
}

#[component]
#[read_only_component]
fn theme(cx: &mut Host) {}
"#,
    );
    assert_eq!(closure_names(&analysis), vec!["app"]);
}

#[test]
fn test_tracking_marker_on_plain_function_warns() {
    let analysis = analyze(
        r#"
#[track_recompositions]
fn helper() {}
"#,
    );
    assert!(analysis.closure().is_empty());
    assert_eq!(analysis.warnings().len(), 1);
    assert!(analysis.warnings()[0].contains("helper"));
}

#[test]
fn test_skip_inline_removes_inline_render_functions() {
    let source = r#"
#[component]
#[track_recompositions(include_nested = true)]
fn page(cx: &mut Host) {
    spacer(cx);
}

#[component]
#[inline]
fn spacer(cx: &mut Host) {}
"#;
    let file = syn::parse_file(source).unwrap();
    let default = Analysis::run(&file, &InstrumentOptions::default());
    assert_eq!(closure_names(&default), vec!["page", "spacer"]);

    let options = InstrumentOptions {
        skip_inline: true,
        ..InstrumentOptions::default()
    };
    let skipping = Analysis::run(&file, &options);
    assert_eq!(closure_names(&skipping), vec!["page"]);
}

#[test]
fn test_render_content_references_are_edges() {
    let analysis = analyze(
        r#"
#[component]
#[track_recompositions(include_nested = true)]
fn shell(cx: &mut Host) {
    scaffold(cx, toolbar);
}

#[component]
fn scaffold(cx: &mut Host, top: fn(&mut Host)) {}

#[component]
fn toolbar(cx: &mut Host) {}
"#,
    );
    let shell = analysis.find("shell").unwrap();
    let kinds: Vec<CallKind> = shell.calls.iter().map(|edge| edge.kind).collect();
    assert_eq!(kinds, vec![CallKind::Direct, CallKind::Reference]);
    assert_eq!(closure_names(&analysis), vec!["shell", "scaffold", "toolbar"]);
}

#[test]
fn test_marked_closure_in_macro_keeps_its_callees() {
    let analysis = analyze(
        r#"
#[component]
#[track_recompositions(include_nested = true)]
fn screen(cx: &mut Host) {
    column!(cx, #[component] |cx: &mut Host| row(cx));
    column!(cx, |cx: &mut Host| badge(cx));
}

#[component]
fn row(cx: &mut Host) {}

#[component]
fn badge(cx: &mut Host) {}
"#,
    );
    assert_eq!(closure_names(&analysis), vec!["screen", "row", "badge"]);
}
