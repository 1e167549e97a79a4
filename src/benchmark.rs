use criterion::{black_box, criterion_group, criterion_main, Criterion};
use itertools::Itertools;
use mdpgraph::{build_graph, parse, validate, EdgeRecord, NodeRecord, SolveResponse, StateType};

/// A chain of `n` states, each a decision between the next two states, closed by a terminal.
fn setup_text(n: usize) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(3 * n + 1);
    for i in 0..n {
        lines.push(format!("s{} = -1", i));
        lines.push(format!("s{} : [s{}, s{}]", i, i + 1, i + 2));
        lines.push(format!("s{} % 0.8", i));
    }
    lines.push(format!("s{} = 10", n));
    lines.push(format!("s{} = 0", n + 1));
    lines.iter().join("\n")
}

fn setup_response(n: usize) -> SolveResponse {
    let mut resp = SolveResponse::default();
    resp.success = true;
    resp.nodes = Some((0..n + 2).map(|i| {
        let name = format!("s{}", i);
        let state_type = if i < n { StateType::Decision } else { StateType::Terminal };
        (name.to_string(), NodeRecord { name, value: i as f64, reward: -1.0, state_type, success_rate: None })
    }).collect());
    resp.edges = Some((0..n).flat_map(|i| vec![
        EdgeRecord { source: format!("s{}", i), target: format!("s{}", i + 1), probability: 0.8 },
        EdgeRecord { source: format!("s{}", i), target: format!("s{}", i + 2), probability: 0.2 },
    ]).collect());
    for i in 0..n {
        resp.policy.insert(format!("s{}", i), format!("s{}", i + 1));
    }
    resp
}

pub fn parse_benchmark(c: &mut Criterion) {
    let text = setup_text(1000);
    c.bench_function("parse 1000 states", |b| b.iter(|| parse(black_box(&text))));
    let mdp = parse(&text);
    c.bench_function("validate 1000 states", |b| b.iter(|| validate(black_box(&mdp))));
}

pub fn graph_benchmark(c: &mut Criterion) {
    let resp = setup_response(1000);
    c.bench_function("build graph 1000 states", |b| b.iter(|| build_graph(black_box(&resp))));
}

criterion_group!(benches, parse_benchmark, graph_benchmark);
criterion_main!(benches);
