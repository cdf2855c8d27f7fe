//! Word matching: keys, choices, values, prefixes, mandatory input and
//! profile-driven presentation.

mod common;

use common::{config_engine, engine, engine_with, enter_config, labels, sid};
use schemash_core::{ErrorKind, ExecError, NodeKind, Outcome, ParseOptions, codes};
use schemash_profile::{KeyKeywords, Profile};

fn parse_error(e: &mut schemash_core::Engine, line: &str) -> schemash_core::ParseError {
    match e.execute_line(line) {
        Err(ExecError::Parse(p)) => p,
        other => panic!("expected a parse error for {line:?}, got {other:?}"),
    }
}

// ── List keys ───────────────────────────────────────────────────────────

#[test]
fn positional_keys_are_offered_one_at_a_time() {
    let e = config_engine();
    let first = e.complete("route ");
    assert_eq!(labels(&first), vec!["<string>"]);
    assert!(first[0].is_value);
    assert!(first[0].via.is_some());

    assert_eq!(labels(&e.complete("route 10.0.0.0/8 ")), vec!["<string>"]);
    assert_eq!(labels(&e.complete("route 10.0.0.0/8 192.0.2.1 ")), vec!["<uint16>"]);

    let after = labels(&e.complete("route 10.0.0.0/8 192.0.2.1 5 "));
    assert_eq!(after, vec!["tag"]);
}

#[test]
fn keys_fill_in_declaration_order() {
    let e = config_engine();
    let r = e.parse("route 10.0.0.0/8 192.0.2.1 5", ParseOptions::execute());
    assert!(r.success, "{:?}", r.error);
    let res = &r.result;
    let route = res.children(res.root())[0];
    let keys: Vec<_> = res.children(route).iter().map(|&k| res.kind(k)).collect();
    assert_eq!(keys, vec![
        NodeKind::Schema(sid("route/prefix")),
        NodeKind::Schema(sid("route/next-hop")),
        NodeKind::Schema(sid("route/metric")),
    ]);
}

#[test]
fn named_keys_require_the_key_keyword() {
    let mut e = engine_with(Profile {
        key_keywords: KeyKeywords::Shown,
        ..Profile::default()
    });
    enter_config(&mut e);
    assert_eq!(labels(&e.complete("network ")), vec!["network-id"]);
    let outcome = e.execute_line("network network-id 5").unwrap();
    assert!(matches!(outcome, Outcome::ModeEntered { depth: 2 }), "got {outcome:?}");
}

#[test]
fn partial_keys_are_incomplete() {
    let mut e = config_engine();
    let err = parse_error(&mut e, "route 10.0.0.0/8");
    assert_eq!(err.kind, ErrorKind::Incomplete);
    assert_eq!(err.code, codes::PARSE_INCOMPLETE);
}

// ── Values ──────────────────────────────────────────────────────────────

#[test]
fn out_of_range_value_has_no_completions() {
    let mut e = config_engine();
    e.execute_line("network 1").unwrap();
    assert!(e.complete("qos priority 9").is_empty());
    let err = parse_error(&mut e, "qos priority 9");
    assert_eq!(err.kind, ErrorKind::NoCompletions);
    assert_eq!(err.word_index, Some(2));
}

#[test]
fn enumeration_literals_complete_as_keywords() {
    let e = config_engine();
    assert_eq!(labels(&e.complete("t:system speed f")), vec!["fast"]);
    let r = e.parse("t:system speed slow", ParseOptions::execute());
    assert!(r.success && r.complete);
    let chain = r.chain();
    assert_eq!(r.result.node(chain[1]).value(), Some("slow"));
}

#[test]
fn bits_accumulate_on_the_leaf() {
    let e = config_engine();
    let r = e.parse("t:system features ipv4 mpls", ParseOptions::execute());
    assert!(r.success, "{:?}", r.error);
    assert!(r.complete);
    let chain = r.chain();
    assert_eq!(r.result.node(chain[1]).value(), Some("ipv4 mpls"));
    assert_eq!(labels(&e.complete("t:system features ipv4 mpls ")), vec!["ipv6"]);
}

#[test]
fn union_prefix_shared_by_literal_and_text_is_ambiguous() {
    let mut e = config_engine();
    let mut offered = labels(&e.complete("t:system link-mode fa"));
    offered.sort();
    assert_eq!(offered, vec!["<string>", "fast"]);

    let err = parse_error(&mut e, "t:system link-mode fa");
    assert_eq!(err.kind, ErrorKind::Ambiguous);
    assert_eq!(err.code, codes::PARSE_AMBIGUOUS);
    assert_eq!(err.candidates.len(), 2);

    let r = e.parse("t:system link-mode fast", ParseOptions::execute());
    assert!(r.success && r.complete, "{:?}", r.error);
    assert_eq!(r.result.node(r.chain()[1]).value(), Some("fast"));
}

#[test]
fn union_members_are_tried_in_order_when_only_values_remain() {
    let e = config_engine();
    let r = e.parse("t:system link-mode 100", ParseOptions::execute());
    assert!(r.success && r.complete, "{:?}", r.error);
    assert_eq!(r.result.node(r.chain()[1]).value(), Some("100"));

    let r = e.parse("t:system link-mode fiber", ParseOptions::execute());
    assert!(r.success && r.complete, "{:?}", r.error);
    assert_eq!(r.result.node(r.chain()[1]).value(), Some("fiber"));
}

#[test]
fn leaf_without_value_is_incomplete() {
    let mut e = config_engine();
    let err = parse_error(&mut e, "t:system hostname");
    assert_eq!(err.kind, ErrorKind::Incomplete);
}

// ── Choices ─────────────────────────────────────────────────────────────

#[test]
fn taking_a_case_hides_the_other_cases() {
    let e = config_engine();
    let after_dhcp = labels(&e.complete("addressing dhcp "));
    assert!(!after_dhcp.iter().any(|l| l == "ip" || l == "mask"), "{after_dhcp:?}");

    let after_ip = labels(&e.complete("addressing ip 192.0.2.7 "));
    assert!(after_ip.iter().any(|l| l == "mask"), "{after_ip:?}");
    assert!(!after_ip.iter().any(|l| l == "dhcp"), "{after_ip:?}");
}

// ── Name collisions and prefixes ────────────────────────────────────────

#[test]
fn colliding_names_need_a_prefix() {
    let mut e = config_engine();
    let c = e.complete("sys");
    assert_eq!(c.len(), 2);
    assert!(c.iter().all(|c| c.needs_prefix));
    let mut l = labels(&c);
    l.sort();
    assert_eq!(l, vec!["o:system", "t:system"]);

    let err = parse_error(&mut e, "system hostname r1");
    assert_eq!(err.kind, ErrorKind::Ambiguous);
    assert_eq!(err.code, codes::PARSE_AMBIGUOUS);
    assert_eq!(err.candidates.len(), 2);

    let outcome = e.execute_line("t:system hostname r1").unwrap();
    assert!(matches!(outcome, Outcome::Command(_)), "got {outcome:?}");
    let outcome = e.execute_line("o:system contact ops").unwrap();
    assert!(matches!(outcome, Outcome::Command(_)), "got {outcome:?}");
}

#[test]
fn unique_prefixes_are_completed() {
    let e = config_engine();
    let r = e.parse("gen g-c gc 5", ParseOptions::execute());
    assert!(r.success, "{:?}", r.error);
    assert!(r.complete);
}

#[test]
fn suppress_completion_requires_full_keywords() {
    let e = config_engine();
    let options = ParseOptions {
        suppress_completion: true,
        ..ParseOptions::execute()
    };
    let r = e.parse("gen", options);
    assert_eq!(r.error.map(|e| e.kind), Some(ErrorKind::NoCompletions));
    let r = e.parse("general-container", options);
    assert!(r.success);
}

#[test]
fn hidden_namespace_resolves_collisions() {
    let mut e = engine_with(Profile {
        hidden_namespaces: vec!["o".into()],
        ..Profile::default()
    });
    enter_config(&mut e);
    let outcome = e.execute_line("system hostname r1").unwrap();
    assert!(matches!(outcome, Outcome::Command(_)));
}

#[test]
fn hidden_paths_are_not_offered() {
    let mut e = engine_with(Profile {
        hidden_paths: vec!["addressing".into()],
        ..Profile::default()
    });
    enter_config(&mut e);
    assert!(e.complete("addr").is_empty());
    assert!(e.suppress_path("no/such/path").is_err());
}

// ── Deprecation ─────────────────────────────────────────────────────────

#[test]
fn deprecated_nodes_follow_the_profile() {
    let e = config_engine();
    assert!(e.complete("t:system old").is_empty());

    let mut shown = engine_with(Profile {
        show_deprecated: true,
        ..Profile::default()
    });
    enter_config(&mut shown);
    let c = shown.complete("t:system old");
    assert_eq!(labels(&c), vec!["old-name"]);
    assert!(c[0].help.contains("deprecated"));
}

// ── Operations ──────────────────────────────────────────────────────────

#[test]
fn missing_mandatory_rpc_input_is_reported() {
    let mut e = engine();
    let err = parse_error(&mut e, "reboot reason maintenance");
    assert_eq!(err.kind, ErrorKind::MissingMandatory);
    assert_eq!(err.missing, vec!["delay"]);
    assert_eq!(err.code, codes::PARSE_MISSING_MANDATORY);

    let outcome = e.execute_line("reboot delay 30 reason maintenance").unwrap();
    let Outcome::Command(result) = outcome else {
        panic!("expected an operation, got {outcome:?}");
    };
    assert!(result.check_for_mandatory(e.schema()).is_empty());
}

#[test]
fn rpc_inputs_are_not_repeated() {
    let e = engine();
    let offered = labels(&e.complete("reboot delay 5 "));
    assert_eq!(offered, vec!["reason"]);
}

#[test]
fn rpc_input_lists_take_several_entries() {
    let e = engine();
    assert_eq!(labels(&e.complete("trace hop a ")), vec!["hop"]);

    let r = e.parse("trace hop a hop b", ParseOptions::execute());
    assert!(r.success && r.complete, "{:?}", r.error);
    let res = &r.result;
    let rpc = res.children(res.root())[0];
    let hops = res.children(rpc);
    assert_eq!(hops.len(), 2);
    let addresses: Vec<_> = hops
        .iter()
        .map(|&h| res.node(res.children(h)[0]).value())
        .collect();
    assert_eq!(addresses, vec![Some("a"), Some("b")]);
}

#[test]
fn leaf_lists_take_several_values() {
    let e = config_engine();
    let r = e.parse(
        "general-container g-container gc-leaf-list-unit8 1 2",
        ParseOptions::execute(),
    );
    assert!(r.success && r.complete, "{:?}", r.error);
    let chain = r.chain();
    let leaf_list = chain[2];
    assert_eq!(
        r.result.kind(leaf_list),
        NodeKind::Schema(sid("general-container/g-container/gc-leaf-list-unit8"))
    );
    let values: Vec<_> = r
        .result
        .children(leaf_list)
        .iter()
        .map(|&v| r.result.node(v).value())
        .collect();
    assert_eq!(values, vec![Some("1"), Some("2")]);
}

// ── show ────────────────────────────────────────────────────────────────

#[test]
fn show_reaches_state_data_without_values() {
    let e = engine();
    let r = e.parse("show state uptime", ParseOptions::execute());
    assert!(r.success, "{:?}", r.error);
    assert!(r.complete);
    assert_eq!(r.print_hook.as_deref(), Some("show"));
    assert_eq!(labels(&e.complete("show state uptime ")), vec!["<uint64>"]);
}

#[test]
fn show_accepts_an_optional_leaf_value() {
    let e = config_engine();
    assert_eq!(labels(&e.complete("show t:system hostname ")), vec!["<string>"]);

    let bare = e.parse("show t:system hostname", ParseOptions::execute());
    assert!(bare.success && bare.complete, "{:?}", bare.error);

    let r = e.parse("show t:system hostname r1", ParseOptions::execute());
    assert!(r.success && r.complete, "{:?}", r.error);
    assert_eq!(r.print_hook.as_deref(), Some("show"));
    let chain = r.chain();
    assert_eq!(r.result.node(chain[chain.len() - 1]).value(), Some("r1"));

    let after = labels(&e.complete("show t:system hostname r1 "));
    assert!(after.iter().any(|l| l == "speed"), "{after:?}");
}

#[test]
fn show_offers_a_wildcard_for_list_keys() {
    let e = config_engine();
    let offered = labels(&e.complete("show network "));
    assert!(offered.iter().any(|l| l == "*"), "{offered:?}");
    let r = e.parse("show network *", ParseOptions::execute());
    assert!(r.success && r.complete, "{:?}", r.error);
    assert_eq!(r.mode_entry, None);
}

// ── Lexing ──────────────────────────────────────────────────────────────

#[test]
fn quoted_values_keep_whitespace() {
    let mut e = config_engine();
    e.execute_line("network 2").unwrap();
    let r = e.parse(r#"description "core uplink""#, ParseOptions::execute());
    assert!(r.success);
    let chain = r.chain();
    assert_eq!(r.result.node(chain[0]).value(), Some("core uplink"));
}

#[test]
fn unterminated_quote_is_invalid_input() {
    let mut e = config_engine();
    let err = parse_error(&mut e, r#"t:system hostname "r1"#);
    assert_eq!(err.kind, ErrorKind::InvalidInput);
    assert_eq!(err.code, codes::PARSE_INVALID_INPUT);
}

#[test]
fn empty_line_does_nothing() {
    let mut e = config_engine();
    assert!(matches!(e.execute_line("   ").unwrap(), Outcome::Empty));
}
