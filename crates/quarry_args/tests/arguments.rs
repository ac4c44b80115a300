mod common;

use quarry_actions::{CommandLine, ExpansionError, NoopRemapper, Value};
use quarry_args::{CommandLineBuilder, Semantics, VectorSpec};

use common::*;

fn builder() -> CommandLineBuilder {
    CommandLineBuilder::new(Semantics::default())
}

#[test]
fn empty_builder_yields_empty_command_line() {
    let line = builder().build(false);
    assert_eq!(line.arguments().expect("arguments"), Vec::<String>::new());
}

#[test]
fn scalar_prefix_then_before_each_list() {
    let mut b = builder();
    b.add("--deps");
    b.add_vector(
        VectorSpec::from_list(vec![Value::from("a"), Value::from("b"), Value::from("c")])
            .location(loc())
            .before_each("-I"),
    )
    .expect("add vector");
    let line = b.build(false);
    assert_eq!(
        line.arguments().expect("arguments"),
        vec!["--deps", "-I", "a", "-I", "b", "-I", "c"]
    );
}

#[test]
fn join_format_and_omit_if_empty() {
    let mut b = builder();
    b.add_vector(
        VectorSpec::from_list(Vec::new())
            .location(loc())
            .arg_name("--names")
            .join_with(",")
            .format_joined("[%s]")
            .omit_if_empty(true),
    )
    .expect("add vector");
    let line = b.build(false);
    assert_eq!(line.arguments().expect("arguments"), Vec::<String>::new());

    let mut b = builder();
    b.add_vector(
        VectorSpec::from_list(vec![Value::from("x")])
            .location(loc())
            .arg_name("--names")
            .join_with(",")
            .format_joined("[%s]")
            .omit_if_empty(true),
    )
    .expect("add vector");
    let line = b.build(false);
    assert_eq!(line.arguments().expect("arguments"), vec!["--names", "[x]"]);
}

#[test]
fn omit_if_empty_also_swallows_terminator() {
    let mut b = builder();
    b.add_vector(
        VectorSpec::from_list(Vec::new())
            .location(loc())
            .arg_name("--objs")
            .terminate_with(";")
            .omit_if_empty(true),
    )
    .expect("add vector");
    b.add("tail");
    let line = b.build(false);
    assert_eq!(line.arguments().expect("arguments"), vec!["tail"]);
}

#[test]
fn empty_vector_without_omit_still_emits_name_and_terminator() {
    let mut b = builder();
    b.add_vector(
        VectorSpec::from_list(Vec::new())
            .location(loc())
            .arg_name("--objs")
            .terminate_with(";"),
    )
    .expect("add vector");
    let line = b.build(false);
    assert_eq!(line.arguments().expect("arguments"), vec!["--objs", ";"]);
}

#[test]
fn uniquify_preserves_first_occurrences() {
    let values = ["b", "a", "b", "c", "a"]
        .into_iter()
        .map(Value::from)
        .collect();
    let mut b = builder();
    b.add_vector(
        VectorSpec::from_list(values)
            .location(loc())
            .uniquify(true)
            .format_each("k=%s"),
    )
    .expect("add vector");
    let line = b.build(false);
    assert_eq!(
        line.arguments().expect("arguments"),
        vec!["k=b", "k=a", "k=c"]
    );
}

#[test]
fn uniquify_is_idempotent() {
    for _ in 0..2 {
        let values = ["x", "x", "y"].into_iter().map(Value::from).collect();
        let mut b = builder();
        b.add_vector(VectorSpec::from_list(values).location(loc()).uniquify(true))
            .expect("add vector");
        let out = b.build(false).arguments().expect("arguments");
        assert_eq!(out, vec!["x", "y"]);
    }
}

#[test]
fn formatted_single_arg() {
    let mut b = builder();
    b.add_formatted(out("out/cfg/lib.a"), "--lib=%s");
    let line = b.build(false);
    assert_eq!(
        line.arguments().expect("arguments"),
        vec!["--lib=out/cfg/lib.a"]
    );
}

#[test]
fn formatted_single_arg_rejects_bad_template() {
    let mut b = builder();
    b.add_formatted("x", "%d");
    let line = b.build(false);
    assert!(matches!(
        line.arguments(),
        Err(ExpansionError::Expansion(_))
    ));
}

#[test]
fn scalars_and_directives_interleave_in_buffer_order() {
    let mut b = builder();
    b.add("cc");
    b.add_vector(
        VectorSpec::from_list(vec![Value::from("x.o"), Value::from("y.o")])
            .location(loc())
            .join_with(","),
    )
    .expect("add vector");
    b.add(7);
    b.add_formatted("z", "<%s>");
    b.add("end");
    let line = b.build(false);
    assert_eq!(
        line.arguments().expect("arguments"),
        vec!["cc", "x.o,y.o", "7", "<z>", "end"]
    );
}

#[test]
fn set_values_expand_in_set_order() {
    let set = std::sync::Arc::new(ListSet(vec![
        Value::from("s1"),
        Value::from("s2"),
    ]));
    let mut b = builder();
    b.add_vector(VectorSpec::from_set(set).location(loc()).format_each("+%s"))
        .expect("add vector");
    let line = b.build(false);
    assert_eq!(line.arguments().expect("arguments"), vec!["+s1", "+s2"]);
}

#[test]
fn interrupted_set_flattening_propagates() {
    let mut b = builder();
    b.add_vector(
        VectorSpec::from_set(std::sync::Arc::new(InterruptedSet)).location(loc()),
    )
    .expect("add vector");
    let line = b.build(false);
    assert!(matches!(line.arguments(), Err(ExpansionError::Interrupted)));
}

#[test]
fn remapper_post_processing_hook_runs_on_plain_lines() {
    let mut b = builder();
    b.add("keep");
    let line = b.build(false);
    assert_eq!(
        line.arguments_with(None, &SentinelRemapper)
            .expect("arguments"),
        vec!["keep", "--post-processed"]
    );
    assert_eq!(
        line.arguments_with(None, &NoopRemapper).expect("arguments"),
        vec!["keep"]
    );
}

#[test]
fn opaque_values_use_the_host_coercion() {
    #[derive(Debug)]
    struct Label(&'static str);

    impl quarry_actions::CommandItem for Label {
        fn expand_to_command_line(&self) -> String {
            format!("//{}", self.0)
        }
    }

    let mut b = builder();
    b.add(Value::Opaque(std::sync::Arc::new(Label("pkg:tool"))));
    let line = b.build(false);
    assert_eq!(line.arguments().expect("arguments"), vec!["//pkg:tool"]);
}

#[test]
fn derived_artifacts_are_remapped_sources_are_not() {
    let mut b = builder();
    b.add(out("out/cfg-fast/lib.a"));
    b.add(source("pkg/main.c"));
    let line = b.build(false);
    let remapper = SwapPrefixRemapper {
        from: "out/cfg-fast/",
        to: "out/",
    };
    assert_eq!(
        line.arguments_with(None, &remapper).expect("arguments"),
        vec!["out/lib.a", "pkg/main.c"]
    );
}
