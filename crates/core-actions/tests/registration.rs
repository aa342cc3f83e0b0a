mod common;

use common::*;
use core_keymap::KeymapError;
use pretty_assertions::assert_eq;

#[test]
fn duplicate_add_fails() -> anyhow::Result<()> {
    let r = runner();
    r.add(simple("dd"))?;
    let err = r.add(simple("dd")).unwrap_err();
    assert_eq!(err, KeymapError::DuplicateBinding(key_set("dd")));
    assert_eq!(err.to_string(), "a binding for `dd` is already registered");
    assert_eq!(r.binding_count(), 1);
    Ok(())
}

#[test]
fn duplicate_add_fails_for_a_different_payload() -> anyhow::Result<()> {
    let r = runner();
    r.add(simple("x"))?;
    assert!(r.add(counting_motion("x", &Counter::default())).is_err());
    assert!(!r.commands()[0].is_motion());
    Ok(())
}

#[test]
fn removing_an_absent_binding_is_a_noop() -> anyhow::Result<()> {
    let r = runner();
    r.add(simple("a"))?;
    r.remove(&keys("zz"));
    r.remove(&keys("a<Esc>"));
    assert_eq!(r.binding_count(), 1);
    assert!(r.has_binding(&keys("a")));
    Ok(())
}

#[test]
fn remove_then_add_again() -> anyhow::Result<()> {
    let r = runner();
    r.add(simple("gg"))?;
    r.remove(&keys("gg"));
    assert!(!r.has_binding(&keys("gg")));
    assert!(run(&r, "g").is_error());
    r.add(simple("gg"))?;
    assert!(run(&r, "gg").is_completed());
    Ok(())
}

#[test]
fn commands_lists_every_binding() -> anyhow::Result<()> {
    let r = runner();
    for k in ["a", "b", "cd", "<C-x>"] {
        r.add(simple(k))?;
    }
    let mut listed: Vec<String> = r.commands().iter().map(|b| b.keys().to_string()).collect();
    listed.sort();
    assert_eq!(listed, vec!["<C-x>", "a", "b", "cd"]);
    Ok(())
}
