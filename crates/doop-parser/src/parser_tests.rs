//! Unit tests for the token parser.
//!
//! Sources are tokenized with the real lexer so positions in assertions are
//! the positions a user would see.

use std::time::Instant;

use crate::{
    ast::{LiteralKind, Node},
    error::{Diagnostic, ErrorCode, ErrorKind},
    guard::ParseOptions,
    lexer,
    parser::{self, Parser},
};

fn parse_ok(source: &str) -> Vec<Node> {
    let tokens = lexer::tokenize(source, None).expect("lexing should succeed");
    parser::parse(&tokens).unwrap_or_else(|e| panic!("expected parse to succeed: {e}"))
}

fn parse_err(source: &str) -> Diagnostic {
    let tokens = lexer::tokenize(source, None).expect("lexing should succeed");
    match parser::parse(&tokens) {
        Ok(nodes) => panic!("expected parse to fail, got {nodes:?}"),
        Err(err) => err,
    }
}

fn only_component(source: &str) -> crate::ast::Component {
    match parse_ok(source).into_iter().next() {
        Some(Node::Component(component)) => component,
        other => panic!("expected a component, got {other:?}"),
    }
}

fn only_view(source: &str) -> crate::ast::View {
    match parse_ok(source).into_iter().next() {
        Some(Node::View(view)) => view,
        other => panic!("expected a view, got {other:?}"),
    }
}

#[test]
fn test_empty_source() {
    assert!(parse_ok("").is_empty());
    assert!(parse_ok("  // nothing here\n/* or here */").is_empty());
}

#[test]
fn test_empty_component() {
    let component = only_component("component Api {}");
    assert_eq!(component.name, "Api");
    assert!(component.description.is_none());
    assert!(component.properties.is_empty());
    assert!(component.visualization.is_empty());
    assert_eq!(component.position.map(|p| (p.line, p.column)), Some((1, 1)));
}

#[test]
fn test_component_description() {
    let component = only_component(r#"component Api { description: "Public API"; }"#);
    assert_eq!(component.description.as_deref(), Some("Public API"));
}

#[test]
fn test_properties() {
    let component = only_component(
        r#"
        component User {
            properties {
                id: UUID;
                email: String { description: "Login"; required: true; }
                age: Int { default: 18; }
                nickname: String
            }
        }
        "#,
    );

    assert_eq!(component.properties.len(), 4);

    let id = &component.properties[0];
    assert_eq!((id.name.as_str(), id.type_name.as_str()), ("id", "UUID"));
    assert!(!id.required);

    let email = component.property("email").expect("email property");
    assert_eq!(email.description.as_deref(), Some("Login"));
    assert!(email.required);

    let age = component.property("age").expect("age property");
    let default = age.default.as_ref().expect("default value");
    assert_eq!(default.kind, LiteralKind::Number);
    assert_eq!(default.as_number(), Some(18.0));

    assert_eq!(component.properties[3].name, "nickname");
}

#[test]
fn test_property_default_accepts_strings_and_booleans() {
    let component = only_component(
        r#"component C { properties { a: String { default: "x"; } b: Bool { default: false; } } }"#,
    );
    assert_eq!(component.properties[0].default.as_ref().map(|l| l.kind), Some(LiteralKind::String));
    assert_eq!(component.properties[1].default.as_ref().and_then(|l| l.as_bool()), Some(false));
}

#[test]
fn test_methods() {
    let component = only_component(
        r#"
        component Auth {
            methods {
                login(user: String, password: String) -> Token {
                    description: "Authenticate";
                    precondition: "user exists";
                    postcondition: "session created";
                    returns: "a session token";
                }
                logout();
                ping() -> Bool
            }
        }
        "#,
    );

    assert_eq!(component.methods.len(), 3);

    let login = component.method("login").expect("login method");
    let params: Vec<_> = login
        .parameters
        .iter()
        .map(|p| (p.name.as_str(), p.type_name.as_str()))
        .collect();
    assert_eq!(params, [("user", "String"), ("password", "String")]);
    assert_eq!(login.return_type.as_deref(), Some("Token"));
    assert_eq!(login.description.as_deref(), Some("Authenticate"));
    assert_eq!(login.precondition.as_deref(), Some("user exists"));
    assert_eq!(login.postcondition.as_deref(), Some("session created"));
    assert_eq!(login.returns.as_deref(), Some("a session token"));

    let logout = component.method("logout").expect("logout method");
    assert!(logout.parameters.is_empty());
    assert!(logout.return_type.is_none());

    assert_eq!(component.methods[2].return_type.as_deref(), Some("Bool"));
}

#[test]
fn test_relationships() {
    let component = only_component(
        r#"
        component Api {
            relationships {
                depends_on: Store, Cache { reason: "persistence"; description: "hot path"; }
                publishes_to: Bus;
            }
        }
        "#,
    );

    assert_eq!(component.relationships.len(), 2);
    let first = &component.relationships[0];
    assert_eq!(first.rel_type, "depends_on");
    assert_eq!(first.targets, ["Store", "Cache"]);
    assert_eq!(first.reason.as_deref(), Some("persistence"));
    assert_eq!(first.description.as_deref(), Some("hot path"));
    assert_eq!(component.relationships[1].targets, ["Bus"]);
}

#[test]
fn test_visualization() {
    let component = only_component(
        r#"
        component Api {
            visualization {
                color: #abc;
                icon: "server";
                group: "edge";
                order: 2;
            }
        }
        "#,
    );

    let vis = &component.visualization;
    assert_eq!(vis.color.as_deref(), Some("#aabbcc"));
    assert_eq!(vis.icon.as_deref(), Some("server"));
    assert_eq!(vis.group.as_deref(), Some("edge"));
    assert_eq!(vis.order_value(), Some(2.0));
}

#[test]
fn test_view() {
    let view = only_view(
        r#"
        view Checkout {
            description: "Checkout flow";
            includes: Api, Store;
            focus: "latency";
            sequence {
                User -> Api: "POST /checkout";
                Api -> Store;
            }
        }
        "#,
    );

    assert_eq!(view.name, "Checkout");
    assert_eq!(view.description.as_deref(), Some("Checkout flow"));
    assert_eq!(view.includes, ["Api", "Store"]);
    assert_eq!(view.focus.as_deref(), Some("latency"));
    assert_eq!(view.sequence.len(), 2);
    assert_eq!(view.sequence[0].source, "User");
    assert_eq!(view.sequence[0].message.as_deref(), Some("POST /checkout"));
    assert!(view.sequence[1].message.is_none());
}

#[test]
fn test_annotations() {
    let nodes = parse_ok(
        r#"
        @deprecated
        @owner(team: "payments", tier: 1, critical: true, kind: backend)
        component Billing {
            properties {
                @pii
                card: String;
            }
            methods {
                @idempotent(retries: 3)
                charge(amount: Money);
            }
        }
        @draft() view Draft {}
        "#,
    );

    let Node::Component(billing) = &nodes[0] else {
        panic!("expected component");
    };
    assert_eq!(billing.annotations.len(), 2);
    assert_eq!(billing.annotations[0].name, "deprecated");
    assert!(billing.annotations[0].args.is_empty());

    let owner = &billing.annotations[1];
    assert_eq!(owner.arg("team").map(|l| l.as_str()), Some("payments"));
    assert_eq!(owner.arg("tier").and_then(|l| l.as_number()), Some(1.0));
    assert_eq!(owner.arg("critical").and_then(|l| l.as_bool()), Some(true));
    assert_eq!(owner.arg("kind").map(|l| l.kind), Some(LiteralKind::Identifier));
    let keys: Vec<_> = owner.args.keys().map(String::as_str).collect();
    assert_eq!(keys, ["team", "tier", "critical", "kind"]);

    assert_eq!(billing.properties[0].annotations[0].name, "pii");
    assert_eq!(billing.methods[0].annotations[0].name, "idempotent");

    let Node::View(draft) = &nodes[1] else {
        panic!("expected view");
    };
    assert_eq!(draft.annotations[0].name, "draft");
}

#[test]
fn test_repeated_annotation_key_keeps_last_value() {
    let component = only_component(r#"@tag(k: 1, k: 2) component C {}"#);
    let tag = &component.annotations[0];
    assert_eq!(tag.args.len(), 1);
    assert_eq!(tag.arg("k").map(|l| l.as_str()), Some("2"));
}

#[test]
fn test_sections_in_any_order() {
    let component = only_component(
        r#"
        component C {
            visualization { order: 1; }
            relationships { uses: D; }
            description: "late";
            methods { m(); }
            properties { p: T; }
        }
        "#,
    );
    assert_eq!(component.description.as_deref(), Some("late"));
    assert_eq!(component.properties.len(), 1);
    assert_eq!(component.methods.len(), 1);
}

#[test]
fn test_redeclared_section_warns_and_last_wins() {
    let source = r#"
component C {
    properties { a: A; }
    properties { b: B; }
}
view V { focus: "x"; focus: "y"; }
"#;
    let tokens = lexer::tokenize(source, None).expect("lexing should succeed");
    let mut parser = Parser::new(&tokens);
    let nodes = parser.parse().expect("redeclaration is not fatal");

    let Node::Component(component) = &nodes[0] else {
        panic!("expected component");
    };
    assert_eq!(component.properties.len(), 1);
    assert_eq!(component.properties[0].name, "b");

    let Node::View(view) = &nodes[1] else {
        panic!("expected view");
    };
    assert_eq!(view.focus.as_deref(), Some("y"));

    let warnings = parser.into_warnings();
    assert_eq!(warnings.len(), 2);
    assert!(warnings.iter().all(|w| w.severity().is_warning()));
    assert!(warnings.iter().all(|w| w.code() == Some(ErrorCode::E103)));
    assert_eq!(warnings[0].line(), Some(4));
}

#[test]
fn test_missing_closing_brace() {
    let err = parse_err("component Api {");
    assert_eq!(err.message(), "Expected RBRACE, got EOF");
    assert_eq!(err.code(), Some(ErrorCode::E101));
    assert_eq!(err.kind(), Some(ErrorKind::Parse));
}

#[test]
fn test_missing_component_name() {
    let err = parse_err("component {}");
    assert_eq!(err.message(), "Expected component name");
    assert_eq!(err.code(), Some(ErrorCode::E100));
    assert_eq!((err.line(), err.column()), (Some(1), Some(11)));
}

#[test]
fn test_top_level_must_be_definition() {
    let err = parse_err("properties {}");
    assert_eq!(err.message(), "Expected 'component' or 'view', got PROPERTIES");
}

#[test]
fn test_dangling_annotation() {
    let err = parse_err("@owner(team: \"x\")");
    assert_eq!(
        err.message(),
        "Annotations must be followed by a component or view definition"
    );
    assert_eq!(err.code(), Some(ErrorCode::E102));
}

#[test]
fn test_unexpected_token_in_bodies() {
    let cases = [
        ("component C { includes: A; }", "Unexpected token in component body: INCLUDES"),
        ("component C { properties { p: T { reason: \"r\"; } } }", "Unexpected token in property attributes: REASON"),
        ("component C { methods { m() { focus: \"f\"; } } }", "Unexpected token in method attributes: FOCUS"),
        ("component C { relationships { uses: D { order: 1; } } }", "Unexpected token in relationship attributes: ORDER"),
        ("component C { visualization { shape: box; } }", "Unexpected token in visualization section: IDENTIFIER"),
        ("view V { properties {} }", "Unexpected token in view body: PROPERTIES"),
    ];

    for (source, expected) in cases {
        assert_eq!(parse_err(source).message(), expected, "source: {source}");
    }
}

#[test]
fn test_attribute_value_errors() {
    let cases = [
        ("component C { description: 42; }", "Expected string for description"),
        ("component C { visualization { color: \"red\"; } }", "Expected HEX_COLOR"),
        ("component C { visualization { order: \"1\"; } }", "Expected number for order"),
        ("component C { visualization { icon: db; } }", "Expected string for icon name"),
        ("component C { properties { p: T { required: yes; } } }", "Expected boolean for required flag"),
        ("component C { properties { p: T { default: other; } } }", "Expected literal for default value"),
        ("component C { properties { p; } }", "Expected COLON, got SEMICOLON"),
        ("component C { properties { p: ; } }", "Expected property type"),
        ("component C { methods { m(a) ; } }", "Expected COLON, got RPAREN"),
        ("component C { methods { m() -> ; } }", "Expected return type"),
        ("component C { relationships { uses: ; } }", "Expected target component name"),
        ("view V { sequence { A -> B: c; } }", "Expected string for message"),
        ("view V { sequence { -> B; } }", "Expected source component name"),
        ("view V { includes: ; }", "Expected component name"),
        ("@ component C {}", "Expected annotation name after @"),
        ("@a(: 1) component C {}", "Expected argument name"),
        ("@a(k 1) component C {}", "Expected ':' after argument name"),
        ("@a(k: ) component C {}", "Expected argument value"),
    ];

    for (source, expected) in cases {
        assert_eq!(parse_err(source).message(), expected, "source: {source}");
    }
}

#[test]
fn test_error_carries_file_and_label() {
    let tokens = lexer::tokenize("view {}", Some("views.doop")).expect("lexing should succeed");
    let err = parser::parse(&tokens).expect_err("missing view name");

    assert_eq!(err.message(), "Expected view name");
    assert_eq!(err.file(), Some("views.doop"));
    assert_eq!(err.labels().len(), 1);
    assert_eq!(err.labels()[0].span().start(), 5);
    assert_eq!(err.labels()[0].message(), "unexpected LBRACE");
}

#[test]
fn test_depth_limit() {
    let tokens = lexer::tokenize("component C { properties { p: T {} } }", None)
        .expect("lexing should succeed");

    let shallow = ParseOptions::new().with_max_depth(2);
    let err = Parser::with_options(&tokens, shallow)
        .parse()
        .expect_err("three levels exceed the limit");
    assert_eq!(err.code(), Some(ErrorCode::E403));
    assert_eq!(err.kind(), Some(ErrorKind::Resource));
    assert!(err.position().is_some());

    let deep_enough = ParseOptions::new().with_max_depth(3);
    assert!(Parser::with_options(&tokens, deep_enough).parse().is_ok());
}

#[test]
fn test_expired_deadline() {
    let tokens = lexer::tokenize("component C {}", None).expect("lexing should succeed");
    let options = ParseOptions::new().with_deadline(Instant::now());

    let err = Parser::with_options(&tokens, options)
        .parse()
        .expect_err("deadline has passed");
    assert_eq!(err.code(), Some(ErrorCode::E404));
}

#[test]
fn test_parse_without_eof_token() {
    let mut tokens = lexer::tokenize("component C {", None).expect("lexing should succeed");
    tokens.pop();

    let err = parser::parse(&tokens).expect_err("unterminated block");
    assert_eq!(err.message(), "Expected RBRACE, got EOF");
    assert!(parser::parse(&[]).expect("nothing to parse").is_empty());
}

#[test]
fn test_spans_cover_referenced_names() {
    let source = "component Api {\n    relationships { uses: Store, Cache; }\n}\nview Flow {\n    includes: Api, Store;\n    sequence { User -> Api: \"call\"; }\n}\n";
    let nodes = parse_ok(source);
    let text = |span: Option<crate::span::Span>| {
        let span = span.expect("span recorded");
        &source[span.start()..span.end()]
    };

    let Node::Component(component) = &nodes[0] else {
        panic!("expected component");
    };
    assert_eq!(text(component.span), "Api");
    assert_eq!(text(component.relationships[0].span), "uses: Store, Cache");

    let Node::View(view) = &nodes[1] else {
        panic!("expected view");
    };
    assert_eq!(text(view.span), "Flow");
    assert_eq!(text(view.includes_span), "Api, Store");
    assert_eq!(text(view.sequence[0].span), "User -> Api");
}

#[test]
fn test_annotation_argument_lists() {
    let component = only_component("@a() @b(x: 1, y: two) component C {}");
    assert_eq!(component.annotations.len(), 2);
    assert!(component.annotations[0].args.is_empty());

    let args: Vec<_> = component.annotations[1].args.keys().map(String::as_str).collect();
    assert_eq!(args, ["x", "y"]);

    let err = parse_err("@b(x: 1,) component C {}");
    assert_eq!(err.message(), "Expected argument name");
}
