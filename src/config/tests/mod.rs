//! Unit tests for config module
//!
//! Tests the standard policy and field name conversion.

use std::{cell::RefCell, rc::Rc};

use crate::{
    config::{Config, to_lower_dash_case},
    reflect::Tag,
};

#[test]
fn lower_dash_case_splits_words() {
    assert_eq!(to_lower_dash_case("Address"), "address");
    assert_eq!(to_lower_dash_case("ListenAddress"), "listen-address");
    assert_eq!(to_lower_dash_case("listenAddress"), "listen-address");
    assert_eq!(to_lower_dash_case("address"), "address");
}

#[test]
fn lower_dash_case_keeps_capital_runs_together() {
    assert_eq!(to_lower_dash_case("MaxSizeMB"), "max-size-mb");
    assert_eq!(to_lower_dash_case("SizeB"), "sizeb");
    assert_eq!(to_lower_dash_case("URL"), "url");
    assert_eq!(to_lower_dash_case("ID"), "id");
}

#[test]
fn lower_dash_case_converts_underscores() {
    assert_eq!(to_lower_dash_case("max_conns"), "max-conns");
    assert_eq!(to_lower_dash_case("timeout_secs"), "timeout-secs");
    assert_eq!(to_lower_dash_case("already-dashed"), "already-dashed");
    assert_eq!(to_lower_dash_case("snake_Then_Caps"), "snake-then-caps");
    assert_eq!(to_lower_dash_case("_leading"), "leading");
    assert_eq!(to_lower_dash_case(""), "");
}

#[test]
fn standard_policy_tags() {
    let config = Config::standard();

    assert_eq!(config.skip_tag, Tag::new("recli", "-"));
    assert_eq!(config.id_tag, Tag::new("recli", "id"));
    assert_eq!(config.read_only_tag, Tag::new("recli", "readonly"));
    assert_eq!(config.usage_tag_name, "usage");
    assert_eq!(config.default_tag_name, "default");
    assert_eq!(config.command_name("MaxConns"), "max-conns");
}

#[test]
fn printers_and_converter_can_be_replaced() {
    let lines = Rc::new(RefCell::new(Vec::new()));
    let values = Rc::clone(&lines);
    let pairs = Rc::clone(&lines);

    let config = Config::standard()
        .with_value_printer(move |value| values.borrow_mut().push(value.to_string()))
        .with_key_value_printer(move |key, value| pairs.borrow_mut().push(format!("{key}:{value}")))
        .with_field_name_converter(str::to_uppercase);

    config.print_value("one");
    config.print_pair("k", "v");

    assert_eq!(*lines.borrow(), vec!["one".to_string(), "k:v".to_string()]);
    assert_eq!(config.command_name("port"), "PORT");
}

#[test]
fn debug_output_omits_callbacks() {
    let rendered = format!("{:?}", Config::default());

    assert!(rendered.contains("skip_tag"));
    assert!(rendered.contains(".."));
}
