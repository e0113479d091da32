mod common;

use std::sync::Arc;

use anyhow::Result;
use webac_auth::{
    AccessRequest, ContainerRole, Method, Mode, Permission, PermissionRealm, Principals,
    RequestGate, RoleComputer, TargetState, WebacConfig,
};
use webac_graph::{MemoryResourceGraph, ResourceGraph, ResourceId, Transaction};

use common::{Rule, container};

const BASE: &str = "http://localhost:8080/rest";

fn realm(graph: MemoryResourceGraph) -> Result<PermissionRealm<MemoryResourceGraph>> {
    let config = WebacConfig::from_json(&format!(r#"{{ "baseUri": "{BASE}" }}"#))?;
    let roles = RoleComputer::from_config(graph, &config)?;
    Ok(PermissionRealm::new(Arc::new(roles), config.base_uri.clone()))
}

fn repository() -> MemoryResourceGraph {
    let graph = MemoryResourceGraph::default();
    container(&graph, "/", &[]);
    container(
        &graph,
        "/private",
        &[
            Rule::new("owner")
                .agent("alice")
                .mode(Mode::Read)
                .mode(Mode::Write)
                .mode(Mode::Control)
                .access_to("/private")
                .inherited(),
            Rule::new("drop-box")
                .agent("bob")
                .mode(Mode::Append)
                .access_to("/private")
                .inherited(),
        ],
    );
    container(&graph, "/private/notes", &[]);
    graph
}

#[test]
fn owners_may_edit_and_others_may_not() -> Result<()> {
    let realm = realm(repository())?;
    let notes = format!("{BASE}/private/notes");
    let write = Permission::of(Mode::Write, notes.as_str());

    assert!(realm.is_permitted(None, &Principals::user("alice"), &write)?);
    assert!(!realm.is_permitted(None, &Principals::user("bob"), &write)?);
    assert!(!realm.is_permitted(None, &Principals::anonymous(), &write)?);

    Ok(())
}

#[test]
fn header_principals_are_evaluated_alongside_the_user() -> Result<()> {
    let realm = realm(repository())?;
    let notes = format!("{BASE}/private/notes");

    let grants = realm.grants(
        None,
        &Principals::user("carol").with_header_principal("alice"),
        [notes.as_str()],
    )?;

    assert!(grants.is_permitted(&Permission::of(Mode::Control, notes.as_str())));

    Ok(())
}

#[test]
fn an_administrator_acting_for_a_user_gets_only_their_rights() -> Result<()> {
    let realm = realm(repository())?;
    let notes = format!("{BASE}/private/notes");
    let admin = Principals::user("root").with_role(ContainerRole::Admin);

    let own = realm.grants(None, &admin, [notes.as_str()])?;
    let acting = realm.grants(None, &admin.clone().delegating_to("bob"), [notes.as_str()])?;

    assert!(own.is_permitted(&Permission::of(Mode::Write, notes.as_str())));
    assert!(!acting.is_admin());
    assert!(acting.has_role(ContainerRole::Admin));
    assert!(!acting.is_permitted(&Permission::of(Mode::Write, notes.as_str())));
    assert!(acting.is_permitted(&Permission::of(Mode::Append, notes.as_str())));

    Ok(())
}

#[test]
fn the_gate_applies_append_rules_to_new_children() -> Result<()> {
    let realm = realm(repository())?;
    let gate = RequestGate;
    let private = format!("{BASE}/private");
    let new_child = format!("{BASE}/private/letter");

    let bob = Principals::user("bob");
    let on_container = realm.grants(None, &bob, [private.as_str()])?;
    let on_new_child = realm.grants(None, &bob, [new_child.as_str()])?;

    assert!(gate.is_authorized(
        &on_container,
        &AccessRequest::new(Method::Post, private.as_str()).with_state(TargetState::Container)
    ));
    assert!(gate.is_authorized(&on_new_child, &AccessRequest::new(Method::Put, new_child.as_str())));
    assert!(!gate.is_authorized(
        &on_container,
        &AccessRequest::new(Method::Delete, private.as_str())
    ));
    assert!(!gate.is_authorized(
        &on_container,
        &AccessRequest::new(Method::Get, format!("{private}/fcr:acl")).on_acl()
    ));

    Ok(())
}

#[test]
fn uncommitted_acls_govern_only_their_transaction() -> Result<()> {
    let graph = repository();
    let transaction = Transaction::new("tx-7");
    let realm = realm(graph.clone())?;
    let public = format!("{BASE}/public");
    let read = Permission::of(Mode::Read, public.as_str());

    let staged = MemoryResourceGraph::default();
    container(
        &staged,
        "/public",
        &[Rule::new("alice").agent("alice").mode(Mode::Read).access_to("/public")],
    );
    for path in ["/public", "/public/fcr:acl"] {
        let resource = staged.resource(None, &ResourceId::from_path(path))?;
        graph.insert_in(&transaction, resource);
    }

    assert!(!realm.is_permitted(Some(&transaction), &Principals::anonymous(), &read)?);
    assert!(realm.is_permitted(Some(&transaction), &Principals::user("alice"), &read)?);
    assert!(realm.is_permitted(None, &Principals::anonymous(), &read)?);

    Ok(())
}

#[test]
fn deleting_a_container_needs_write_on_everything_below_it() -> Result<()> {
    let graph = repository();
    container(
        &graph,
        "/private/locked",
        &[Rule::new("reader")
            .agent("alice")
            .mode(Mode::Read)
            .access_to("/private/locked")],
    );
    container(&graph, "/private/locked/page", &[]);
    let realm = realm(graph)?;
    let alice = Principals::user("alice");
    let private = format!("{BASE}/private");

    let mut below = realm.descendant_targets(None, &private)?;
    below.sort();
    assert_eq!(
        below,
        vec![
            format!("{BASE}/private/locked"),
            format!("{BASE}/private/locked/page"),
            format!("{BASE}/private/notes"),
        ]
    );

    assert!(!realm.authorize(None, &alice, &AccessRequest::new(Method::Delete, private.as_str()))?);
    assert!(realm.authorize(
        None,
        &alice,
        &AccessRequest::new(Method::Delete, format!("{private}/notes"))
    )?);
    assert!(!realm.authorize(
        None,
        &Principals::user("bob"),
        &AccessRequest::new(Method::Delete, format!("{private}/notes"))
    )?);

    Ok(())
}
