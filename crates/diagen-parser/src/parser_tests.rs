//! Unit tests for the winnow parser implementation
//!
//! These tests verify that the parser handles all Diagen language constructs
//! and that broken lines are reported without hiding later ones.

use crate::{
    error::{Diagnostic, ErrorCode},
    lexer, parser,
    parser_types::{BlockEntry, Document, NodeSet, NodeSuffix, Statement, Value},
};

/// Helper function to parse a source string and inspect the document
fn with_document<R>(source: &str, f: impl FnOnce(&Document<'_>) -> R) -> R {
    let tokens = lexer::tokenize(source).expect("lexing should succeed");
    match parser::build_document(&tokens) {
        Ok(document) => f(&document),
        Err(err) => panic!("Expected parsing to succeed, but got error: {err}"),
    }
}

/// Helper function to parse a source string and return its diagnostics
fn parse_diagnostics(source: &str) -> Vec<Diagnostic> {
    let tokens = lexer::tokenize(source).expect("lexing should succeed");
    match parser::build_document(&tokens) {
        Ok(_) => Vec::new(),
        Err(err) => err.into_diagnostics(),
    }
}

/// Helper function to parse a source string and assert success
fn assert_parses_successfully(source: &str) {
    with_document(source, |_| ());
}

/// Helper function to parse a source string and assert failure
fn assert_parse_fails(source: &str) {
    if parse_diagnostics(source).is_empty() {
        panic!("Expected parsing to fail, but it succeeded");
    }
}

fn node_or_edge<'a, 'src>(statement: &'a Statement<'src>) -> &'a crate::parser_types::NodeOrEdgeStatement<'src> {
    match statement {
        Statement::NodeOrEdge(stmt) => stmt,
        other => panic!("Expected node or edge statement, got {other:?}"),
    }
}

mod header_tests {
    use super::*;
    use diagen_core::ir::DocumentKind;

    #[test]
    fn test_diagram_header_with_subtype() {
        with_document("@diagram flowchart\n", |doc| {
            assert_eq!(*doc.header.kind.inner(), DocumentKind::Diagram);
            assert_eq!(doc.header.subtype.as_deref(), Some(&"flowchart"));
            assert!(doc.body.is_empty());
        });
    }

    #[test]
    fn test_header_without_trailing_newline() {
        with_document("@infographic", |doc| {
            assert_eq!(*doc.header.kind.inner(), DocumentKind::Infographic);
            assert!(doc.header.subtype.is_none());
        });
    }

    #[test]
    fn test_page_header() {
        with_document("@page\n", |doc| {
            assert_eq!(*doc.header.kind.inner(), DocumentKind::Page);
        });
    }

    #[test]
    fn test_leading_blank_lines_and_comments() {
        let source = r#"

            // architecture overview
            @diagram architecture
            A -> B
        "#;
        assert_parses_successfully(source);
    }

    #[test]
    fn test_missing_header_fails() {
        let diagnostics = parse_diagnostics("A -> B\n");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E100));
        assert!(diagnostics[0].message().contains("document header"));
    }

    #[test]
    fn test_empty_input_fails() {
        assert_parse_fails("");
    }

    #[test]
    fn test_page_rejects_subtype() {
        assert_parse_fails("@page poster\n");
    }
}

mod meta_tests {
    use super::*;

    #[test]
    fn test_meta_block() {
        let source = r#"
            @diagram flowchart
            ---
            title: "Checkout"
            direction: LR
            width: 800
            ---
            A -> B
        "#;
        with_document(source, |doc| {
            let keys: Vec<&str> = doc.meta.iter().map(|p| *p.key.inner()).collect();
            assert_eq!(keys, ["title", "direction", "width"]);
            assert!(matches!(&doc.meta[0].value, Value::String(s) if s.inner() == "Checkout"));
            assert!(matches!(&doc.meta[1].value, Value::Identifier(s) if *s.inner() == "LR"));
            assert!(matches!(&doc.meta[2].value, Value::Number(n) if *n.inner() == 800.0));
            assert_eq!(doc.body.len(), 1);
        });
    }

    #[test]
    fn test_meta_block_allows_blank_lines() {
        let source = "@diagram\n---\ntitle: \"T\"\n\ntheme: dark\n---\n";
        with_document(source, |doc| assert_eq!(doc.meta.len(), 2));
    }

    #[test]
    fn test_unclosed_meta_block() {
        let diagnostics = parse_diagnostics("@diagram\n---\ntitle: \"T\"\n");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message().contains("closing `---`"));
        assert!(diagnostics[0].labels().iter().any(|l| l.is_secondary()));
    }

    #[test]
    fn test_meta_property_without_value() {
        assert_parse_fails("@diagram\n---\ntitle:\n---\n");
    }
}

mod node_tests {
    use super::*;

    #[test]
    fn test_node_with_label_and_attributes() {
        let source = "@diagram\ndb: \"Database\" [cylinder, fill: #336699, opacity: 80%,]\n";
        with_document(source, |doc| {
            let stmt = node_or_edge(&doc.body[0]);
            assert!(stmt.chain.is_empty());
            let NodeSet::Single(def) = &stmt.head else {
                panic!("Expected single node");
            };
            assert_eq!(def.path.joined(), "db");
            assert!(matches!(&def.suffix, Some(NodeSuffix::Label(l)) if l.inner() == "Database"));
            let names: Vec<&str> = def.attributes.iter().map(|a| *a.name.inner()).collect();
            assert_eq!(names, ["cylinder", "fill", "opacity"]);
            assert!(def.attributes[0].value.is_none());
            assert!(matches!(&def.attributes[2].value, Some(Value::Percent(p)) if *p.inner() == 80));
        });
    }

    #[test]
    fn test_node_with_port_suffix() {
        with_document("@diagram\nserver:http\n", |doc| {
            let NodeSet::Single(def) = &node_or_edge(&doc.body[0]).head else {
                panic!("Expected single node");
            };
            assert!(matches!(&def.suffix, Some(NodeSuffix::Port(p)) if *p.inner() == "http"));
        });
    }

    #[test]
    fn test_dotted_path() {
        with_document("@diagram\nbackend.api.v2\n", |doc| {
            let NodeSet::Single(def) = &node_or_edge(&doc.body[0]).head else {
                panic!("Expected single node");
            };
            assert_eq!(def.path.segments.len(), 3);
            assert_eq!(def.path.joined(), "backend.api.v2");
        });
    }

    #[test]
    fn test_gradient_and_array_values() {
        let source = r#"
            @diagram
            A [fill: linear(#ff0000, #0000ff), ports: (in [side: left], out [right])]
        "#;
        with_document(source, |doc| {
            let NodeSet::Single(def) = &node_or_edge(&doc.body[0]).head else {
                panic!("Expected single node");
            };
            assert!(matches!(
                &def.attributes[0].value,
                Some(Value::Gradient { name, from, to })
                    if *name.inner() == "linear" && *from.inner() == "#ff0000" && *to.inner() == "#0000ff"
            ));
            let Some(Value::Array(items)) = &def.attributes[1].value else {
                panic!("Expected array value");
            };
            assert_eq!(items.len(), 2);
            assert_eq!(items[0].attributes.len(), 1);
            assert_eq!(*items[1].attributes[0].name.inner(), "right");
        });
    }

    #[test]
    fn test_keywords_allowed_as_node_ids() {
        assert_parses_successfully("@diagram\nstep -> chart\n");
    }

    #[test]
    fn test_unclosed_attribute_list() {
        let diagnostics = parse_diagnostics("@diagram\nA [fill: #ffffff\n");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message().contains("expected `]`"));
    }

    #[test]
    fn test_two_nodes_on_one_line_fail() {
        let diagnostics = parse_diagnostics("@diagram\nA B\n");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message().contains("end of line"));
    }

    #[test]
    fn test_malformed_gradient() {
        assert_parse_fails("@diagram\nA [fill: linear(#ff0000)]\n");
    }
}

mod edge_tests {
    use super::*;
    use crate::parser_types::ArrowOp;

    #[test]
    fn test_chain_with_labels() {
        let source = "@diagram\nA -> B: \"calls\" --> C ==> D\n";
        with_document(source, |doc| {
            let stmt = node_or_edge(&doc.body[0]);
            let arrows: Vec<ArrowOp> = stmt.chain.iter().map(|hop| *hop.arrow.inner()).collect();
            assert_eq!(
                arrows,
                [ArrowOp::Arrow, ArrowOp::DashedArrow, ArrowOp::BoldArrow]
            );
            // The label binds to the target node; the IR builder moves it to the edge.
            let NodeSet::Single(target) = &stmt.chain[0].target else {
                panic!("Expected single node");
            };
            assert!(matches!(&target.suffix, Some(NodeSuffix::Label(l)) if l.inner() == "calls"));
            assert!(stmt.chain[0].label.is_none());
        });
    }

    #[test]
    fn test_label_after_node_list() {
        with_document("@diagram
A -> (B, C): \"fan\"\n", |doc| {
            let stmt = node_or_edge(&doc.body[0]);
            assert_eq!(stmt.chain[0].label.as_ref().map(|l| l.inner().as_str()), Some("fan"));
        });
    }

    #[test]
    fn test_all_arrow_kinds() {
        let source = r#"
            @diagram
            a -> b
            b <-> c
            c --> d
            d <--> e
            e ==> f
            f <=> a
        "#;
        with_document(source, |doc| assert_eq!(doc.body.len(), 6));
    }

    #[test]
    fn test_fan_out_and_fan_in() {
        let source = "@diagram\n(A, B:out) -> (C, svc.D)\n";
        with_document(source, |doc| {
            let stmt = node_or_edge(&doc.body[0]);
            let NodeSet::List(heads) = &stmt.head else {
                panic!("Expected node list");
            };
            assert_eq!(heads.len(), 2);
            assert_eq!(heads[1].port.as_deref(), Some(&"out"));
            let NodeSet::List(targets) = &stmt.chain[0].target else {
                panic!("Expected node list");
            };
            assert_eq!(targets[1].path.joined(), "svc.D");
        });
    }

    #[test]
    fn test_dangling_arrow() {
        let diagnostics = parse_diagnostics("@diagram\nA ->\n");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E100));
    }

    #[test]
    fn test_empty_node_list() {
        assert_parse_fails("@diagram\n() -> A\n");
    }
}

mod group_tests {
    use super::*;

    #[test]
    fn test_nested_groups() {
        let source = r#"
            @diagram architecture
            group backend [label: "Backend", direction: LR] {
                api
                group storage {
                    db [cylinder]
                }
                api -> storage.db
            }
            client -> backend.api
        "#;
        with_document(source, |doc| {
            assert_eq!(doc.body.len(), 2);
            let Statement::Group(group) = &doc.body[0] else {
                panic!("Expected group");
            };
            assert_eq!(*group.id.inner(), "backend");
            assert_eq!(group.attributes.len(), 2);
            assert_eq!(group.body.len(), 3);
            assert!(matches!(&group.body[1], Statement::Group(inner) if inner.body.len() == 1));
        });
    }

    #[test]
    fn test_empty_group_on_one_line() {
        with_document("@diagram\ngroup g {}\n", |doc| {
            assert!(matches!(&doc.body[0], Statement::Group(g) if g.body.is_empty()));
        });
    }

    #[test]
    fn test_unclosed_group() {
        let source = "@diagram\ngroup g {\n  A";
        let diagnostics = parse_diagnostics(source);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message().starts_with("unexpected end of input"));
        assert!(diagnostics[0].message().contains("expected `}`"));
        let primary = diagnostics[0].primary_span().expect("primary span");
        assert_eq!(primary.start(), source.len());
        assert!(primary.is_empty());
        let secondary: Vec<&str> = diagnostics[0]
            .labels()
            .iter()
            .filter(|l| l.is_secondary())
            .map(|l| l.message())
            .collect();
        assert_eq!(secondary, ["group opened here"]);
    }

    #[test]
    fn test_stray_closing_brace() {
        let diagnostics = parse_diagnostics("@diagram\nA\n}\nB\n");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E102));
    }

    #[test]
    fn test_error_inside_group_is_contained() {
        let source = "@diagram\ngroup g {\n  A ->\n  B\n}\nC\n";
        let diagnostics = parse_diagnostics(source);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_broken_group_header_skips_body() {
        let source = "@diagram\ngroup [fill: #ffffff] {\n  A\n}\nB -> C\n";
        let diagnostics = parse_diagnostics(source);
        assert_eq!(diagnostics.len(), 1);
    }
}

mod infographic_tests {
    use super::*;

    #[test]
    fn test_element_with_block() {
        let source = r#"
            @infographic timeline
            phase "Roadmap" [color: #4A90D9] {
                subtitle: "2026"
                "milestone count": 3
                step "Design" {
                    status: done
                }
                kickoff -> launch
            }
        "#;
        with_document(source, |doc| {
            let Statement::Element(element) = &doc.body[0] else {
                panic!("Expected element definition");
            };
            assert_eq!(*element.keyword.inner(), "phase");
            assert_eq!(element.id.inner(), "Roadmap");
            assert_eq!(
                element.block.as_deref(),
                Some(
                    &[
                        BlockEntry::Property,
                        BlockEntry::Property,
                        BlockEntry::Element,
                        BlockEntry::Statement,
                    ][..]
                )
            );
        });
    }

    #[test]
    fn test_identifier_colon_identifier_is_a_node_port() {
        // `a: b -> c` does not end after the identifier, so it is a statement.
        let source = "@infographic\nsystem \"F\" {\n  a: b -> c\n  kind: linear\n}\n";
        with_document(source, |doc| {
            let Statement::Element(element) = &doc.body[0] else {
                panic!("Expected element definition");
            };
            assert_eq!(
                element.block.as_deref(),
                Some(&[BlockEntry::Statement, BlockEntry::Property][..])
            );
        });
    }

    #[test]
    fn test_broken_property_in_element_block() {
        let source = "@infographic\nphase \"P\" {\n  subtitle: \"2026\" [fill\n  status: done\n}\n";
        let diagnostics = parse_diagnostics(source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E100));
    }

    #[test]
    fn test_element_keyword_without_string_is_a_node() {
        with_document("@infographic\nstep\n", |doc| {
            assert!(matches!(&doc.body[0], Statement::NodeOrEdge(_)));
        });
    }

    #[test]
    fn test_place_block() {
        let source = r#"
            @page
            place [0, 0, 400, 300] {
                @diagram flowchart
                A -> B
            }
        "#;
        with_document(source, |doc| {
            let Statement::Place(place) = &doc.body[0] else {
                panic!("Expected place block");
            };
            assert_eq!(place.placement.inner().width, 400.0);
            assert_eq!(place.document.body.len(), 1);
        });
    }

    #[test]
    fn test_place_requires_four_numbers() {
        assert_parse_fails("@page\nplace [0, 0, 400] {\n@diagram\n}\n");
    }
}

mod recovery_tests {
    use super::*;

    #[test]
    fn test_multiple_errors_are_collected() {
        let source = "@diagram\nA ->\nB -> C\nD -> -> E\nF [\n";
        let diagnostics = parse_diagnostics(source);
        assert_eq!(diagnostics.len(), 3);
        assert!(diagnostics.iter().all(|d| d.severity().is_error()));
    }

    #[test]
    fn test_error_span_points_at_offending_token() {
        let source = "@diagram\nA -> -> B\n";
        let diagnostics = parse_diagnostics(source);
        let span = diagnostics[0].primary_span().expect("span");
        assert_eq!(&source[span.range()], "->");
        assert_eq!(span.start(), 14);
    }

    #[test]
    fn test_error_location_is_one_based() {
        let source = "@diagram\nA\n  B C\n";
        let diagnostics = parse_diagnostics(source);
        let location = diagnostics[0].location(source).expect("location");
        assert_eq!((location.line, location.column), (3, 5));
    }
}
