use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use itertools::Itertools;
use ordered_float::OrderedFloat;
use petgraph::{Graph, graph::NodeIndex, dot::Dot};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use super::mdp::StateType;
use super::solver_api::SolveResponse;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub value: f64,
    pub reward: f64,
    #[serde(rename = "type")]
    pub state_type: StateType,
    pub success_rate: Option<f64>
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub probability: f64,
    pub is_policy: bool
}

/// Layout-agnostic graph of a solved MDP.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualGraph {
    pub nodes: BTreeMap<String, Node>,
    pub edges: Vec<Edge>
}

/// Turns a solver response into a [`VisualGraph`]. Returns `None` when the response carries no
/// nodes or no edges, which callers treat as nothing to draw.
///
/// An edge is a policy edge iff its source is a decision node whose policy action equals the
/// edge target. Actions are matched to targets by label, so an action label that is not a state
/// name never marks an edge.
pub fn build_graph(result: &SolveResponse) -> Option<VisualGraph> {
    let (node_records, edge_records) = match (&result.nodes, &result.edges) {
        (Some(n), Some(e)) => (n, e),
        _ => {
            debug!("solver result has no graph data");
            return None
        }
    };

    let nodes: BTreeMap<String, Node> = node_records.iter()
        .map(|(name, record)| {
            let success_rate = match record.state_type {
                StateType::Chance => record.success_rate,
                _ => None
            };
            (name.to_string(), Node {
                name: name.to_string(),
                value: record.value,
                reward: record.reward,
                state_type: record.state_type,
                success_rate
            })
        })
        .collect();

    let edges: Vec<Edge> = edge_records.iter()
        .map(|record| {
            let is_decision = nodes.get(&record.source)
                .map_or(false, |x| x.state_type == StateType::Decision);
            let is_policy = is_decision && result.policy.get(&record.source)
                .map_or(false, |action| *action == record.target);
            Edge {
                source: record.source.to_string(),
                target: record.target.to_string(),
                probability: record.probability,
                is_policy
            }
        })
        .collect();

    debug!(nodes = nodes.len(), edges = edges.len(), "built graph model");
    Some(VisualGraph { nodes, edges })
}

impl VisualGraph {
    pub fn policy_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|x| x.is_policy)
    }

    pub fn outgoing<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |x| x.source == name)
    }

    /// Nodes from highest to lowest value, ties by name; NaN values come last.
    pub fn nodes_by_value(&self) -> Vec<&Node> {
        self.nodes.values()
            .sorted_by_key(|x| {
                let v = if x.value.is_nan() { f64::NEG_INFINITY } else { x.value };
                (x.value.is_nan(), std::cmp::Reverse(OrderedFloat(v)))
            })
            .collect()
    }

    /// Node weights are state names. Edge weights are the probability to two decimals, with a
    /// trailing `*` on policy edges. Edges with an endpoint outside `nodes` are skipped.
    pub fn to_petgraph(&self) -> Graph<String, String> {
        let mut graph: Graph<String, String> = Graph::new();
        let mut ix: HashMap<&str, NodeIndex> = HashMap::new();
        for name in self.nodes.keys() {
            ix.insert(name.as_str(), graph.add_node(name.to_string()));
        }
        for edge in self.edges.iter() {
            match (ix.get(edge.source.as_str()), ix.get(edge.target.as_str())) {
                (Some(s), Some(t)) => {
                    let label = if edge.is_policy {
                        format!("{:.2}*", edge.probability)
                    } else {
                        format!("{:.2}", edge.probability)
                    };
                    graph.add_edge(*s, *t, label);
                }
                _ => warn!(source = %edge.source, target = %edge.target, "edge endpoint has no node, skipped")
            }
        }
        graph
    }

    pub fn to_dot(&self) -> String {
        let g = self.to_petgraph();
        format!("{}", Dot::new(&g))
    }

    pub fn write_edges_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for edge in self.edges.iter() {
            wtr.serialize(edge)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdp_core::solver_api::{EdgeRecord, NodeRecord};

    fn node(name: &str, value: f64, state_type: StateType, success_rate: Option<f64>) -> (String, NodeRecord) {
        (name.to_string(), NodeRecord {
            name: name.to_string(),
            value,
            reward: 0.0,
            state_type,
            success_rate
        })
    }

    fn edge(source: &str, target: &str, probability: f64) -> EdgeRecord {
        EdgeRecord { source: source.to_string(), target: target.to_string(), probability }
    }

    fn response() -> SolveResponse {
        let mut resp = SolveResponse::default();
        resp.success = true;
        resp.nodes = Some(vec![
            node("S1", 2.0, StateType::Decision, Some(1.0)),
            node("S2", 5.0, StateType::Chance, Some(0.8)),
            node("S3", -1.0, StateType::Terminal, None),
        ].into_iter().collect());
        resp.edges = Some(vec![edge("S1", "S2", 1.0), edge("S1", "S3", 0.0), edge("S2", "S3", 1.0)]);
        resp.policy.insert("S1".to_string(), "S2".to_string());
        resp
    }

    #[test]
    fn marks_only_the_policy_edge() {
        let g = build_graph(&response()).unwrap();
        assert!(g.edges[0].is_policy);
        assert!(!g.edges[1].is_policy);
        assert!(!g.edges[2].is_policy);
        assert_eq!(g.policy_edges().count(), 1);
    }

    #[test]
    fn policy_on_non_decision_source_is_ignored() {
        let mut resp = response();
        resp.policy.insert("S2".to_string(), "S3".to_string());
        let g = build_graph(&resp).unwrap();
        assert!(!g.edges[2].is_policy);
    }

    #[test]
    fn policy_for_unknown_source_is_ignored() {
        let mut resp = response();
        resp.edges.as_mut().unwrap().push(edge("Q", "S1", 1.0));
        resp.policy.insert("Q".to_string(), "S1".to_string());
        let g = build_graph(&resp).unwrap();
        assert!(!g.edges[3].is_policy);
    }

    #[test]
    fn success_rate_only_on_chance_nodes() {
        let g = build_graph(&response()).unwrap();
        assert_eq!(g.nodes["S1"].success_rate, None);
        assert_eq!(g.nodes["S2"].success_rate, Some(0.8));
        assert_eq!(g.nodes["S3"].success_rate, None);
    }

    #[test]
    fn edge_order_follows_solver() {
        let mut resp = response();
        resp.edges = Some(vec![edge("S2", "S3", 1.0), edge("S1", "S3", 0.0), edge("S1", "S2", 1.0)]);
        let g = build_graph(&resp).unwrap();
        itertools::assert_equal(
            g.edges.iter().map(|x| (x.source.as_str(), x.target.as_str())),
            vec![("S2", "S3"), ("S1", "S3"), ("S1", "S2")]);
        itertools::assert_equal(g.outgoing("S1").map(|x| x.target.as_str()), vec!["S3", "S2"]);
    }

    #[test]
    fn missing_edges_or_nodes_is_no_data() {
        let mut resp = response();
        resp.edges = None;
        assert!(build_graph(&resp).is_none());
        let mut resp = response();
        resp.nodes = None;
        assert!(build_graph(&resp).is_none());
        assert!(build_graph(&SolveResponse::default()).is_none());
    }

    #[test]
    fn builds_from_solver_json() {
        let resp: SolveResponse = serde_json::from_str(r#"{
            "success": true,
            "policy": {"S1": "S2"},
            "nodes": {"S1": {"name": "S1", "value": 1.0, "reward": 1.0, "type": "decision"}},
            "edges": [
                {"source": "S1", "target": "S2", "probability": 1.0},
                {"source": "S1", "target": "S3", "probability": 0.0}
            ]
        }"#).unwrap();
        let g = build_graph(&resp).unwrap();
        assert!(g.edges[0].is_policy);
        assert!(!g.edges[1].is_policy);
    }

    #[test]
    fn nodes_sorted_by_value() {
        let mut resp = response();
        resp.nodes.as_mut().unwrap().extend(vec![node("S4", f64::NAN, StateType::Terminal, None)]);
        let g = build_graph(&resp).unwrap();
        itertools::assert_equal(g.nodes_by_value().iter().map(|x| x.name.as_str()), vec!["S2", "S1", "S3", "S4"]);
    }

    #[test]
    fn petgraph_export() {
        let mut resp = response();
        resp.edges.as_mut().unwrap().push(edge("S1", "missing", 1.0));
        let g = build_graph(&resp).unwrap();
        let pg = g.to_petgraph();
        assert_eq!(pg.node_count(), 3);
        assert_eq!(pg.edge_count(), 3);
        let labels: Vec<&String> = pg.edge_indices().map(|e| &pg[e]).collect();
        assert_eq!(labels, vec!["1.00*", "0.00", "1.00"]);
        assert!(g.to_dot().contains("1.00*"));
    }

    #[test]
    fn csv_export() {
        let g = build_graph(&response()).unwrap();
        let mut buf: Vec<u8> = Vec::new();
        g.write_edges_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "source,target,probability,is_policy");
        assert_eq!(lines[1], "S1,S2,1.0,true");
        assert_eq!(lines.len(), 4);
    }
}
