use serde::{Deserialize, Serialize};

pub const MAX_NODES: usize = 10;
pub const MAX_EDGES: usize = 14;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub label: String,
    /// party | court | event | issue | outcome, as the model reports it
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub label: String,
}

/// Directed case graph returned by the diagram prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl CaseGraph {
    /// Strict parse of the model output (surrounding whitespace allowed),
    /// then capped to the node and edge limits.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let mut graph: CaseGraph = serde_json::from_str(text.trim())?;
        graph.nodes.truncate(MAX_NODES);
        graph.edges.truncate(MAX_EDGES);
        Ok(graph)
    }

    /// Edges whose endpoints both name a node.
    pub fn connected_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|e| {
            self.nodes.iter().any(|n| n.id == e.from) && self.nodes.iter().any(|n| n.id == e.to)
        })
    }

    /// Graphviz rendering; nodes fall back to their id when unlabelled.
    pub fn to_dot(&self) -> String {
        let quote = |s: &str| format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""));
        let mut out = String::from("digraph case {\n");
        for n in &self.nodes {
            let label = if n.label.is_empty() { &n.id } else { &n.label };
            out.push_str(&format!("  {} [label={}];\n", quote(&n.id), quote(label)));
        }
        for e in self.connected_edges() {
            out.push_str(&format!(
                "  {} -> {} [label={}];\n",
                quote(&e.from),
                quote(&e.to),
                quote(&e.label)
            ));
        }
        out.push_str("}\n");
        out
    }
}
