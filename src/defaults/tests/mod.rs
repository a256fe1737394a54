//! Unit tests for defaults module
//!
//! Tests default application over nested, shared and cyclic records.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use serde::{Deserialize, Serialize};

use crate::{
    RecliError, Result, Scalar, ScalarKind, Shape,
    defaults::{ParseDefault, apply},
    reflect::Reflect,
};

#[derive(Default, Serialize, Deserialize)]
struct Inner {
    a: String,
    b: Option<Rc<RefCell<Outer>>>,
}

crate::record!(Inner {
    a [default = "inner"],
    b,
});

#[derive(Default, Serialize, Deserialize)]
struct Outer {
    a: String,
    b: Vec<i64>,
    c: Inner,
}

crate::record!(Outer {
    a [default = "outer"],
    b [default = "10,20"],
    c,
});

#[test]
fn defaults_terminate_on_self_referencing_records() {
    let outer = Rc::new(RefCell::new(Outer::default()));
    outer.borrow_mut().c.b = Some(Rc::clone(&outer));

    apply(&mut *outer.borrow_mut(), "default").unwrap();

    {
        let x = outer.borrow();
        assert_eq!(x.a, "outer");
        assert_eq!(x.b, vec![10, 20]);
        assert_eq!(x.c.a, "inner");
        let back = x.c.b.as_ref().unwrap();
        assert!(Rc::ptr_eq(back, &outer));
    }

    outer.borrow_mut().c.b = None;
}

/// Counts how often its default was applied.
#[derive(Default, Serialize, Deserialize)]
struct Tally(u32);

impl Scalar for Tally {
    fn kind(&self) -> ScalarKind {
        ScalarKind::Int
    }

    fn read(&self) -> Result<String> {
        Ok(self.0.to_string())
    }

    fn write(&mut self, text: &str) -> Result<()> {
        self.0 = text.parse().map_err(|e| RecliError::conversion(text, "Tally", e))?;
        Ok(())
    }
}

impl Reflect for Tally {
    fn shape(&mut self) -> Shape<'_> {
        Shape::Scalar(self)
    }

    fn as_scalar(&self) -> Option<&dyn Scalar> {
        Some(self)
    }

    fn as_parse_default(&mut self) -> Option<&mut dyn ParseDefault> {
        Some(self)
    }
}

impl ParseDefault for Tally {
    fn parse_default(&mut self, text: &str) -> Result<()> {
        let step: u32 = text.parse().map_err(|e| RecliError::conversion(text, "Tally", e))?;
        self.0 += step;
        Ok(())
    }
}

#[derive(Default, Serialize, Deserialize)]
struct Counter {
    tally: Tally,
}

crate::record!(Counter {
    tally [default = "1"],
});

#[derive(Default, Serialize, Deserialize)]
struct Diamond {
    left: Rc<RefCell<Counter>>,
    right: Rc<RefCell<Counter>>,
}

crate::record!(Diamond { left, right });

#[test]
fn shared_records_receive_defaults_once() {
    let shared = Rc::new(RefCell::new(Counter::default()));
    let mut diamond = Diamond {
        left: Rc::clone(&shared),
        right: Rc::clone(&shared),
    };

    apply(&mut diamond, "default").unwrap();

    assert_eq!(shared.borrow().tally.0, 1);
}

#[test]
fn parse_default_replaces_the_codec() {
    let mut counter = Counter { tally: Tally(5) };

    apply(&mut counter, "default").unwrap();

    assert_eq!(counter.tally.0, 6);
}

#[derive(Default, Serialize, Deserialize)]
struct Listener {
    port: u16,
    backlog: u32,
    name: String,
    timeout: Option<f64>,
    retries: Option<u8>,
}

crate::record!(Listener {
    port [default = "0x1F90"],
    backlog,
    name [usage = "Listener name"],
    timeout [default = "2.5"],
    retries,
});

#[test]
fn defaults_only_touch_tagged_fields() {
    let mut listener = Listener {
        backlog: 7,
        name: "edge".to_string(),
        ..Listener::default()
    };

    apply(&mut listener, "default").unwrap();

    assert_eq!(listener.port, 8080);
    assert_eq!(listener.backlog, 7);
    assert_eq!(listener.name, "edge");
    assert_eq!(listener.retries, None);
}

#[test]
fn empty_optionals_are_materialized() {
    let mut listener = Listener::default();

    apply(&mut listener, "default").unwrap();

    assert_eq!(listener.timeout, Some(2.5));
}

#[test]
fn applying_twice_changes_nothing() {
    let mut once = Listener::default();
    apply(&mut once, "default").unwrap();

    let mut twice = Listener::default();
    apply(&mut twice, "default").unwrap();
    apply(&mut twice, "default").unwrap();

    assert_eq!(once.port, twice.port);
    assert_eq!(once.timeout, twice.timeout);
}

#[test]
fn other_tag_names_are_honoured() {
    let mut listener = Listener::default();

    apply(&mut listener, "usage").unwrap();

    assert_eq!(listener.name, "Listener name");
    assert_eq!(listener.port, 0);
}

#[derive(Default, Serialize, Deserialize)]
struct Limits {
    burst: u8,
}

crate::record!(Limits {
    burst [default = "300"],
});

#[derive(Default, Serialize, Deserialize)]
struct RouteLimits {
    per_route: HashMap<String, u32>,
}

crate::record!(RouteLimits {
    per_route [default = "a=1"],
});

#[test]
fn unparsable_defaults_name_the_field() {
    let mut limits = Limits::default();

    let error = apply(&mut limits, "default").unwrap_err();

    match &error {
        RecliError::Field { field, .. } => assert_eq!(field, "burst"),
        other => panic!("expected a field error, got {other:?}"),
    }
    assert!(matches!(error.innermost(), RecliError::Conversion { .. }));
    assert_eq!(limits.burst, 0);
}

#[test]
fn defaults_on_maps_are_unsupported() {
    let mut limits = RouteLimits::default();

    let error = apply(&mut limits, "default").unwrap_err();

    assert!(error.to_string().starts_with("per_route: unsupported kind"));
    assert!(limits.per_route.is_empty());
}

#[derive(Default, Serialize, Deserialize)]
struct Blank {
    port: u16,
    name: String,
    hosts: Vec<String>,
}

crate::record!(Blank {
    port [default = ""],
    name [default = ""],
    hosts [default = ""],
});

#[test]
fn empty_default_tags_are_ignored() {
    let mut blank = Blank {
        port: 7,
        name: "edge".to_string(),
        hosts: vec!["a".to_string()],
    };

    apply(&mut blank, "default").unwrap();

    assert_eq!(blank.port, 7);
    assert_eq!(blank.name, "edge");
    assert_eq!(blank.hosts, vec!["a".to_string()]);
}
