use clap::{clap_app, App, ArgMatches};
use mdpgraph::{build_graph, parse, read_mdp_text, read_solve_response, validate, Error, Result, SolveRequest, SolverConfig};
use std::fs::File;
use std::io::Write;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn app() -> App<'static, 'static> {
    clap_app!(mdpgraph =>
        (version: "0.1")
        (about: "Parse MDP definition text and turn solver output into a graph model")
        (@arg VERBOSE: -v --verbose [VERBOSITY] default_value("0") "Level of verbosity \
        0 - warnings
        1 - progress
        2 - parser and builder summaries
        3 - every classified line
        ")
        (@subcommand parse =>
            (about: "Parse a definition file and print it as json")
            (@arg FILE: +required "Definition text, one statement per line e.g.
            Class = -2
            Class : [Pub, Sleep]
            Class % 0.6 0.4
            ")
        )
        (@subcommand validate =>
            (about: "Check a definition file locally and print the validation report")
            (@arg FILE: +required "Definition text file")
        )
        (@subcommand request =>
            (about: "Build the json body of a solve request")
            (@arg FILE: +required "Definition text file")
            (@arg DF: --df [DISCOUNT] "Discount factor in (0, 1], defaults to 1.0")
            (@arg TOL: --tol [TOLERANCE] "Tolerance for exiting value iteration, defaults to 0.01")
            (@arg ITER: --iter [MAX_ITER] "Cutoff for value iteration, defaults to 100")
            (@arg MIN: --min "Minimise values as costs instead of maximising rewards")
        )
        (@subcommand graph =>
            (about: "Build the graph model from a solver response")
            (@arg RESPONSE: +required "Solver response json")
            (@arg DOT: --dot [PATH] "Write the graph in dot format")
            (@arg CSV: --csv [PATH] "Write the edge list as csv")
        )
    )
}

fn filter_for(verbose: u32) -> &'static str {
    match verbose {
        0 => "mdpgraph=warn",
        1 => "mdpgraph=info",
        2 => "mdpgraph=debug",
        _ => "mdpgraph=trace"
    }
}

fn init_tracing(verbose: u32) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter_for(verbose).into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn parse_arg<T: std::str::FromStr>(m: &ArgMatches, name: &str) -> Result<Option<T>> {
    match m.value_of(name) {
        None => Ok(None),
        Some(v) => v.parse::<T>()
            .map(Some)
            .map_err(|_| Error::InvalidConfig(format!("could not read {} from '{}'", name, v)))
    }
}

fn config_from_args(m: &ArgMatches) -> Result<SolverConfig> {
    let mut config = SolverConfig::default();
    if let Some(df) = parse_arg::<f64>(m, "DF")? {
        config.discount_factor = df;
    }
    if let Some(tol) = parse_arg::<f64>(m, "TOL")? {
        config.tolerance = tol;
    }
    if let Some(iter) = parse_arg::<u32>(m, "ITER")? {
        config.max_iterations = Some(iter);
    }
    config.minimize = m.is_present("MIN");
    config.validate()?;
    Ok(config)
}

fn required<'a>(m: &'a ArgMatches, name: &str) -> Result<&'a str> {
    m.value_of(name).ok_or_else(|| Error::InvalidConfig(format!("missing argument {}", name)))
}

fn run(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        ("parse", Some(f)) => {
            let path = required(f, "FILE")?;
            info!(path, "parsing definition");
            let mdp = parse(&read_mdp_text(path)?);
            println!("{}", serde_json::to_string_pretty(&mdp)?);
        }
        ("validate", Some(f)) => {
            let path = required(f, "FILE")?;
            info!(path, "validating definition");
            let report = validate(&parse(&read_mdp_text(path)?));
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        ("request", Some(f)) => {
            let path = required(f, "FILE")?;
            let config = config_from_args(f)?;
            info!(path, ?config, "building solve request");
            let request = SolveRequest::new(&read_mdp_text(path)?, &config)?;
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
        ("graph", Some(f)) => {
            let path = required(f, "RESPONSE")?;
            info!(path, "building graph model");
            let response = read_solve_response(path)?.into_result()?;
            let graph = match build_graph(&response) {
                Some(g) => g,
                None => {
                    println!("Nothing to visualize");
                    return Ok(())
                }
            };
            if let Some(dot_path) = f.value_of("DOT") {
                let mut file = File::create(dot_path)?;
                file.write_all(graph.to_dot().as_bytes())?;
                info!(path = dot_path, "wrote dot file");
            }
            if let Some(csv_path) = f.value_of("CSV") {
                graph.write_edges_csv(File::create(csv_path)?)?;
                info!(path = csv_path, "wrote edge csv");
            }
            println!("{}", serde_json::to_string_pretty(&graph)?);
        }
        (_, _) => {
            println!("{}", matches.usage());
        }
    }
    Ok(())
}

fn main() {
    let matches = app().get_matches();
    let verbose: u32 = matches.value_of("VERBOSE").and_then(|x| x.parse().ok()).unwrap_or(0);
    init_tracing(verbose);
    if let Err(e) = run(&matches) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
