use serde::Serialize;
use std::collections::HashSet;

use crate::db::models::Document;

/// One node per visible document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
}

/// One edge per link, keyed `<from>-<to>` as the widget's dataset requires
/// unique ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    pub id: String,
    pub from: String,
    pub to: String,
}

/// Nodes, edges and widget options, serialized in the shape the
/// force-directed network widget consumes directly.
#[derive(Debug, Clone, Serialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub options: serde_json::Value,
}

/// Build the link graph of the documents a viewer can see.
///
/// Edges pointing at documents outside `documents` are dropped, so a
/// reader never gets a dangling edge or learns the id of a private target.
/// A repeated `(from, to)` pair yields a single edge.
pub fn build_graph(documents: &[Document]) -> GraphData {
    let visible: HashSet<&str> = documents.iter().map(|d| d.id.as_str()).collect();
    let visible = &visible;

    let nodes = documents
        .iter()
        .map(|doc| GraphNode {
            id: doc.id.clone(),
            label: doc.title.clone(),
        })
        .collect();

    let mut seen = HashSet::new();
    let edges = documents
        .iter()
        .flat_map(move |doc| {
            doc.links_out
                .iter()
                .filter(move |target| visible.contains(target.as_str()))
                .map(move |target| GraphEdge {
                    id: format!("{}-{}", doc.id, target),
                    from: doc.id.clone(),
                    to: target.clone(),
                })
        })
        .filter(|edge| seen.insert(edge.id.clone()))
        .collect();

    GraphData {
        nodes,
        edges,
        options: network_options(),
    }
}

/// Fixed styling for the network widget; physics stabilization is off so
/// the layout settles live after the first draw.
pub fn network_options() -> serde_json::Value {
    serde_json::json!({
        "nodes": {
            "shape": "dot",
            "size": 10,
            "font": { "size": 12, "color": "#666666" },
            "borderWidth": 2,
            "color": {
                "border": "#999999",
                "background": "#CCCCCC",
                "highlight": { "border": "#666666", "background": "#AAAAAA" },
                "hover": { "border": "#666666", "background": "#BBBBBB" }
            }
        },
        "edges": {
            "width": 1,
            "color": { "color": "#AAAAAA", "highlight": "#888888", "hover": "#999999" }
        },
        "physics": { "stabilization": false }
    })
}
