//! Unit tests for CLI module
//!
//! Tests command nodes, tree lookup, invocation arity and the clap adapter
//! on hand-built trees. Record-derived trees are covered by the
//! integration tests.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]

use std::{cell::RefCell, rc::Rc};

use crate::{
    RecliError,
    cli::{
        CliService, CommandCategory, CommandNode, CommandTree, FlagKind, FlagSpec, FlagValue, Invocation,
        formatting::format_error,
    },
};

type Calls = Rc<RefCell<Vec<Invocation>>>;

fn recording_leaf(name: &str, calls: &Calls) -> CommandNode {
    let calls = Rc::clone(calls);
    CommandNode::leaf(name, format!("Run {name}"), move |invocation| {
        calls.borrow_mut().push(invocation.clone());
        Ok(())
    })
}

fn sample_tree(calls: &Calls) -> CommandTree {
    let add = recording_leaf("add", calls).with_flags(vec![
        FlagSpec {
            name: "hostname".to_string(),
            usage: None,
            kind: FlagKind::String,
        },
        FlagSpec {
            name: "port".to_string(),
            usage: Some("default value: 2019".to_string()),
            kind: FlagKind::Int,
        },
        FlagSpec {
            name: "tags".to_string(),
            usage: None,
            kind: FlagKind::StringList,
        },
        FlagSpec {
            name: "enabled".to_string(),
            usage: None,
            kind: FlagKind::Bool,
        },
    ]);

    CommandTree::new(vec![
        CommandNode::group("address", vec![recording_leaf("get", calls), recording_leaf("set", calls)])
            .with_category(CommandCategory::Properties),
        CommandNode::group(
            "backends",
            vec![
                CommandNode::group("dup", vec![recording_leaf("first", calls)]).with_category(CommandCategory::Items),
                CommandNode::group("dup", vec![recording_leaf("second", calls)]).with_category(CommandCategory::Items),
                add,
            ],
        )
        .with_category(CommandCategory::Properties),
        recording_leaf("dump-json", calls),
    ])
}

#[test]
fn expect_args_checks_the_exact_count() {
    let invocation = Invocation::new(["a", "b"]);

    assert_eq!(invocation.expect_args(2).unwrap(), ["a".to_string(), "b".to_string()]);
    let error = invocation.expect_args(1).unwrap_err();
    assert!(matches!(error, RecliError::WrongArity { expected: 1, actual: 2 }));
    assert_eq!(error.to_string(), "expected 1 argument, got 2");
    assert_eq!(
        Invocation::default().expect_args(2).unwrap_err().to_string(),
        "expected 2 arguments, got 0"
    );
}

#[test]
fn flag_values_render_as_text() {
    assert_eq!(FlagValue::Bool(true).to_text(), "true");
    assert_eq!(FlagValue::Int(-3).to_text(), "-3");
    assert_eq!(FlagValue::Float(2.5).to_text(), "2.5");
    assert_eq!(FlagValue::IntList(vec![1, 2]).to_text(), "1,2");
    assert_eq!(
        FlagValue::StringList(vec!["a,b".to_string(), "c".to_string()]).to_texts(),
        vec!["a,b".to_string(), "c".to_string()]
    );
}

#[test]
fn category_labels() {
    assert_eq!(CommandCategory::Properties.to_string(), "PROPERTIES");
    assert_eq!(CommandCategory::Items.to_string(), "ITEMS");
    assert_eq!(CommandCategory::Actions.to_string(), "ACTIONS");
}

#[test]
fn find_prefers_the_last_duplicate_sibling() {
    let calls = Calls::default();
    let tree = sample_tree(&calls);

    assert!(tree.find(&["backends", "dup", "second"]).is_some());
    assert!(tree.find(&["backends", "dup", "first"]).is_none());
    assert!(tree.find(&[]).is_none());
    assert!(tree.find(&["missing"]).is_none());
}

#[test]
fn invoke_requires_a_leaf() {
    let calls = Calls::default();
    let tree = sample_tree(&calls);

    tree.invoke(&["address", "set"], &Invocation::new(["x"])).unwrap();
    assert_eq!(calls.borrow().len(), 1);
    assert_eq!(calls.borrow()[0].args, vec!["x".to_string()]);

    assert!(matches!(
        tree.invoke(&["address"], &Invocation::default()),
        Err(RecliError::CommandNotFound(_))
    ));
    assert!(matches!(
        tree.invoke(&["nope", "get"], &Invocation::default()),
        Err(RecliError::CommandNotFound(path)) if path == "nope get"
    ));
}

#[test]
fn leaf_paths_follow_tree_order() {
    let calls = Calls::default();
    let paths = sample_tree(&calls).leaf_paths();

    let rendered: Vec<String> = paths.iter().map(|path| path.join(" ")).collect();
    assert_eq!(
        rendered,
        vec![
            "address get",
            "address set",
            "backends dup first",
            "backends dup second",
            "backends add",
            "dump-json",
        ]
    );
}

#[test]
fn clap_command_mirrors_the_tree() {
    let calls = Calls::default();
    let service = CliService::new("proxy", sample_tree(&calls));
    let command = service.command();

    command.clone().debug_assert();
    let names: Vec<&str> = command.get_subcommands().map(|sub| sub.get_name()).collect();
    assert_eq!(names, vec!["address", "backends", "dump-json"]);

    let backends = command.find_subcommand("backends").unwrap();
    assert_eq!(backends.get_subcommands().filter(|sub| sub.get_name() == "dup").count(), 1);
}

#[test]
fn execute_passes_positional_arguments_verbatim() {
    let calls = Calls::default();
    let service = CliService::new("proxy", sample_tree(&calls));

    service.execute(["proxy", "address", "set", "-1"]).unwrap();

    assert_eq!(calls.borrow()[0].args, vec!["-1".to_string()]);
    assert!(calls.borrow()[0].flags.is_empty());
}

#[test]
fn execute_collects_only_flags_given_on_the_command_line() {
    let calls = Calls::default();
    let service = CliService::new("proxy", sample_tree(&calls));

    service
        .execute([
            "proxy",
            "backends",
            "add",
            "--hostname",
            "b2.com",
            "--tags",
            "a,b",
            "--tags",
            "c",
        ])
        .unwrap();

    let recorded = calls.borrow();
    let call = &recorded[0];
    assert!(call.args.is_empty());
    assert_eq!(call.flags.len(), 2);
    assert_eq!(call.flags["hostname"], FlagValue::String("b2.com".to_string()));
    assert_eq!(
        call.flags["tags"],
        FlagValue::StringList(vec!["a".to_string(), "b".to_string(), "c".to_string()])
    );
    assert!(!call.flags.contains_key("enabled"));
    assert!(!call.flags.contains_key("port"));
}

#[test]
fn execute_parses_typed_flags() {
    let calls = Calls::default();
    let service = CliService::new("proxy", sample_tree(&calls));

    service
        .execute(["proxy", "backends", "add", "--port", "8080", "--enabled"])
        .unwrap();

    let recorded = calls.borrow();
    let call = &recorded[0];
    assert_eq!(call.flags["port"], FlagValue::Int(8080));
    assert_eq!(call.flags["enabled"], FlagValue::Bool(true));
}

#[test]
fn usage_errors_come_from_clap() {
    let calls = Calls::default();
    let service = CliService::new("proxy", sample_tree(&calls));

    assert!(matches!(
        service.execute(["proxy", "backends", "add", "--port", "many"]),
        Err(RecliError::Usage(_))
    ));
    assert!(matches!(service.execute(["proxy", "unknown"]), Err(RecliError::Usage(_))));
    assert!(matches!(service.execute(["proxy", "address"]), Err(RecliError::Usage(_))));
    assert!(calls.borrow().is_empty());
}

#[test]
fn format_error_wraps_text_in_red() {
    let formatted = format_error("boom");

    assert!(formatted.contains("boom"));
    assert!(formatted.starts_with("\x1b[1m\x1b[31m"));
    assert!(formatted.ends_with("\x1b[0m"));
}
