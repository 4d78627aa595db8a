use anyhow::Context;
use clap::Parser;
use crystal_lighting::beam::{SearchConfig, solve};
use crystal_lighting::problem::Problem;
use std::time::{Duration, Instant};

/// Places lanterns, mirrors and obstacles on a board read from stdin or a file.
#[derive(Parser, Debug)]
struct Cli {
    /// Problem file; standard input when omitted.
    #[clap(long, short = 'i')]
    input: Option<String>,
    /// Wall-clock budget in seconds.
    #[clap(long, short = 't', default_value_t = 9.5)]
    time_limit: f64,
    /// First beam width.
    #[clap(long, default_value_t = 1)]
    width: usize,
    /// Beam width multiplier between rounds.
    #[clap(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(2..))]
    growth: u64,
    /// Never place mirrors.
    #[clap(long, default_value_t = false)]
    no_mirrors: bool,
    /// Print a JSON summary instead of the answer lines.
    #[clap(long, default_value_t = false)]
    json: bool,
    /// Write an SVG rendering of the answer to this path.
    #[clap(long)]
    svg: Option<String>,
    #[clap(long, short = 'v', default_value_t = false)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();
    let problem = match &cli.input {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
            Problem::parse(&text)?
        }
        None => Problem::read_from_stdin()?,
    };
    let config = SearchConfig {
        time_limit: Duration::from_secs_f64(cli.time_limit),
        initial_width: cli.width,
        width_growth: cli.growth as usize,
        mirrors: !cli.no_mirrors,
        verbose: cli.verbose,
    };
    let outcome = solve(&problem, config);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        let lines = outcome.solution.lines();
        println!("{}", lines.len());
        for line in lines {
            println!("{}", line);
        }
    }
    if let Some(path) = &cli.svg {
        std::fs::write(path, crystal_lighting::svg::render(&problem, &outcome.solution))
            .with_context(|| format!("Failed to write {}", path))?;
    }
    let width = outcome.rounds.last().map_or(0, |r| r.width);
    eprintln!("!log score {}", outcome.score);
    eprintln!("!log width {}", width);
    eprintln!("!log items {}", outcome.solution.placements.len());
    eprintln!("!log time {:.2}", start.elapsed().as_secs_f64());
    Ok(())
}
