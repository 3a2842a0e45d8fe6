use std::collections::HashSet;

use proptest::prelude::*;

use diagen::{
    DiagenError, DiagramBuilder, DiagramDefinition, EdgeDefinition, PipelineOptions,
    compile_dsl,
    compiler::{CompilerOptions, IssueCode, NormalizerOptions, normalize},
    config::AppConfig,
    create_diagram, dsl_to_svg,
    identifier::Id,
    ir::{DiagramEdge, DiagramIr, DiagramNode, NodeShape},
    model::DiagramModel,
};

const ARCHITECTURE: &str = r#"
@diagram architecture
---
title: "Shop"
theme: modern
---
group backend {
  api: "API" [roundRect]
  db: "Orders" [database]
  api -> db
}
web: "Storefront" [fill: #4A90D9]
web -> backend.api: "REST"
web --> cdn
"#;

#[test]
fn test_architecture_end_to_end() {
    let diagram = compile_dsl(ARCHITECTURE, &PipelineOptions::default()).expect("compiled");
    let model = &diagram.model;

    assert_eq!(model.node_count(), 4);
    assert_eq!(model.group_count(), 1);
    assert_eq!(model.edge_count(), 3);
    assert_eq!(model.theme(), Some("modern"));

    let api = model.get_node(Id::new("api")).expect("api");
    assert_eq!(api.parent_id, Some(Id::new("backend")));
    assert_eq!(api.shape, NodeShape::RoundRect);

    let cdn = model.get_node(Id::new("cdn")).expect("edge endpoint node");
    assert_eq!(cdn.label, "cdn");

    let web = model.get_node(Id::new("web")).expect("web");
    assert_eq!(
        web.style.as_ref().and_then(|s| s.fill.as_deref()),
        Some("#4A90D9")
    );

    assert!(model.nodes().all(|n| n.position.is_some()));
    assert!(model.groups().all(|g| g.size.is_some()));
}

#[test]
fn test_undefined_endpoints_are_warnings() {
    let definition = DiagramDefinition {
        nodes: vec![DiagramNode::new(Id::new("a"), "A")],
        edges: vec![EdgeDefinition::new(Id::new("a"), Id::new("ghost"))],
        ..DiagramDefinition::default()
    };

    let diagram = create_diagram(definition, &PipelineOptions::default()).expect("compiled");

    let undefined: Vec<_> = diagram
        .warnings
        .iter()
        .filter(|issue| issue.code == IssueCode::UndefinedEndpoint)
        .collect();
    assert_eq!(undefined.len(), 1);
    assert!(undefined[0].message.contains("\"ghost\""));

    let ghost = diagram.model.get_node(Id::new("ghost")).expect("auto-created node");
    assert_eq!(ghost.label, "ghost");
    assert!(ghost.position.is_some());
}

#[test]
fn test_parse_errors_are_summarized() {
    let err = compile_dsl("@diagram\na -> \"b\"\nc -> d\n", &PipelineOptions::default())
        .expect_err("syntax error");

    let message = err.to_string();
    assert!(message.starts_with("Parse error:\n"));
    assert!(message.contains("2:"));
}

#[test]
fn test_builder_keeps_parse_diagnostics() {
    let builder = DiagramBuilder::default();

    match builder.build("@diagram\na -> \"b\"\n") {
        Err(DiagenError::Parse { err, src }) => {
            assert!(!err.diagnostics().is_empty());
            assert!(src.contains("a -> \"b\""));
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn test_skip_layout_leaves_positions_unset() {
    let options = PipelineOptions {
        skip_layout: true,
        ..PipelineOptions::default()
    };

    let diagram = compile_dsl("@diagram\na -> b\n", &options).expect("compiled");

    assert!(diagram.model.nodes().all(|n| n.position.is_none()));
}

#[test]
fn test_dsl_to_svg_uses_metadata_size() {
    let source = "@diagram\n---\nwidth: 640\nheight: 480\n---\na: \"Alpha\"\na -> b\n";

    let svg = dsl_to_svg(source, &PipelineOptions::default()).expect("rendered");

    assert!(svg.contains("width=\"640\""));
    assert!(svg.contains("height=\"480\""));
    assert!(svg.contains(">Alpha<"));
    assert!(svg.contains("node-a"));
    assert!(svg.contains("edge-"));
}

#[test]
fn test_builder_with_config() {
    let config: AppConfig = toml::from_str(
        r##"
        [compiler]
        theme = "minimal"

        [layout]
        direction = "LR"

        [style]
        background_color = "#fafafa"
        "##,
    )
    .expect("valid config");
    let builder = DiagramBuilder::new(config);

    let diagram = builder.build("@diagram\na -> b\n").expect("compiled");
    let a = diagram.model.get_node(Id::new("a")).and_then(|n| n.position);
    let b = diagram.model.get_node(Id::new("b")).and_then(|n| n.position);
    let (a, b) = (a.expect("a placed"), b.expect("b placed"));
    assert!(b.x > a.x);
    assert!((a.y - b.y).abs() < 1e-9);

    let svg = builder.render_svg(&diagram).expect("rendered");
    assert!(svg.contains("#fafafa"));
}

#[test]
fn test_create_diagram() {
    let definition = DiagramDefinition {
        nodes: vec![
            DiagramNode::new(Id::new("client"), "Client"),
            DiagramNode::new(Id::new("server"), "Server").with_shape(NodeShape::Hexagon),
        ],
        edges: vec![EdgeDefinition {
            label: Some("HTTP".to_string()),
            ..EdgeDefinition::new(Id::new("client"), Id::new("server"))
        }],
        ..DiagramDefinition::default()
    };

    let diagram = create_diagram(definition, &PipelineOptions::default()).expect("compiled");

    let edge = diagram.model.get_edge(Id::new("edge-0")).expect("generated id");
    assert_eq!(edge.label.as_deref(), Some("HTTP"));
    assert!(diagram.model.nodes().all(|n| n.style.is_some()));
}

#[test]
fn test_strict_mode_rejects_circular_groups() {
    let mut a = diagen::ir::DiagramGroup::new(Id::new("A"));
    a.parent_id = Some(Id::new("B"));
    let mut b = diagen::ir::DiagramGroup::new(Id::new("B"));
    b.parent_id = Some(Id::new("A"));
    let definition = DiagramDefinition {
        groups: vec![a, b],
        ..DiagramDefinition::default()
    };
    let strict = PipelineOptions {
        compiler: CompilerOptions {
            strict: true,
            ..CompilerOptions::default()
        },
        ..PipelineOptions::default()
    };

    let err = create_diagram(definition.clone(), &strict).expect_err("strict failure");
    assert!(err.to_string().contains("Circular group reference detected"));

    let lenient = create_diagram(definition, &PipelineOptions::default()).expect("compiled");
    assert!(lenient.warnings.iter().any(|w| w.code == IssueCode::CircularGroup));
    assert!(lenient.model.groups().all(|g| g.position.is_some()));
}

fn distinct_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set(0u32..500, 2..8)
        .prop_map(|set| set.into_iter().map(|n| format!("n{n}")).collect())
}

fn edge(i: usize, source: &str, target: &str) -> DiagramEdge {
    DiagramEdge::new(Id::new(&format!("e{i}")), Id::new(source), Id::new(target))
}

proptest! {
    #[test]
    fn chains_are_layered_top_to_bottom(names in distinct_names()) {
        let source = format!("@diagram\n{}\n", names.join(" -> "));

        let diagram = compile_dsl(&source, &PipelineOptions::default()).expect("compiled");

        prop_assert_eq!(diagram.model.node_count(), names.len());
        prop_assert_eq!(diagram.model.edge_count(), names.len() - 1);
        let ys: Vec<f64> = names
            .iter()
            .map(|name| {
                diagram
                    .model
                    .get_node(Id::new(name))
                    .and_then(|n| n.position)
                    .map(|p| p.y)
                    .unwrap_or(f64::NAN)
            })
            .collect();
        prop_assert!(ys.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn normalizing_twice_adds_nothing(names in distinct_names(), defined in 0usize..8) {
        let nodes = names
            .iter()
            .take(defined)
            .map(|name| DiagramNode::new(Id::new(name), name.as_str()))
            .collect();
        let edges = names
            .windows(2)
            .enumerate()
            .map(|(i, pair)| edge(i, &pair[0], &pair[1]))
            .collect();
        let ir = DiagramIr { nodes, edges, ..DiagramIr::default() };
        let options = NormalizerOptions::default();

        let once = normalize(&ir, &options);
        let twice = normalize(&once, &options);

        prop_assert_eq!(once.nodes.len(), names.len());
        prop_assert_eq!(&once, &twice);
    }

    #[test]
    fn model_round_trip_keeps_elements(names in distinct_names()) {
        let source = format!("@diagram\ngroup G {{\n  {}\n}}\n", names.join(" -> "));
        let ir = diagen_parser::parse(&source).expect("valid source");

        let round_trip = DiagramModel::from_ir(&ir).to_ir();

        prop_assert_eq!(&round_trip, &ir);
        let ids: HashSet<Id> = round_trip.nodes.iter().map(|n| n.id).collect();
        prop_assert_eq!(ids.len(), names.len());
    }
}
