use anyhow::Context;
use clap::Parser;
use crystal_lighting::judge::{Solution, evaluate};
use crystal_lighting::problem::Problem;

/// Scores an answer file against a problem file.
#[derive(Parser, Debug)]
struct Cli {
    /// Path to the problem
    input: String,
    /// Path to the answer
    output: String,
    /// Write an SVG rendering of the answer to this path.
    #[clap(long)]
    vis: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let input = std::fs::read_to_string(&cli.input).with_context(|| format!("No such input: {}", cli.input))?;
    let output = std::fs::read_to_string(&cli.output).with_context(|| format!("No such output: {}", cli.output))?;
    let problem = Problem::parse(&input)?;
    let solution = match Solution::parse(&output) {
        Ok(solution) => solution,
        Err(err) => {
            eprintln!("!log status WA");
            return Err(err).context("Invalid answer");
        }
    };
    let eval = match evaluate(&problem, &solution) {
        Ok(eval) => eval,
        Err(err) => {
            eprintln!("!log status WA");
            return Err(err).context("Rejected answer");
        }
    };
    if let Some(path) = &cli.vis {
        std::fs::write(path, crystal_lighting::svg::render(&problem, &solution))
            .with_context(|| format!("Cannot create {}", path))?;
    }
    eprintln!("!log status AC");
    eprintln!("!log score {}", eval.score);
    eprintln!("!log matched {}/{}", eval.matched, eval.crystals);
    eprintln!("!log mismatched {}", eval.mismatched);
    if eval.lit_lanterns > 0 {
        eprintln!("!log lit_lanterns {}", eval.lit_lanterns);
    }
    println!("{}", serde_json::to_string(&eval)?);
    Ok(())
}
