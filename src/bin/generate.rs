use anyhow::bail;
use clap::Parser;
use crystal_lighting::mapgen;
use rand::Rng;

#[derive(Parser)]
struct Cli {
    #[clap(long, short = 's')]
    seed: Option<u64>,
    /// `contest` or `small`.
    #[clap(long, short = 't', default_value = "contest")]
    r#type: String,
    /// Print the problem as JSON rows and parameters.
    #[clap(long, default_value_t = false)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let params = match args.r#type.as_str() {
        "contest" => mapgen::random::Params::contest(),
        "small" => mapgen::random::Params::small(),
        other => bail!("Unknown type: {}", other),
    };
    let seed = args.seed.unwrap_or_else(|| rand::rng().random());
    let problem = mapgen::random::generate(&params, seed);
    if args.json {
        let value = serde_json::json!({
            "seed": seed,
            "rows": problem.rows(),
            "costs": problem.costs,
            "limits": problem.limits,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", problem);
    }
    eprintln!("!log seed {}", seed);
    Ok(())
}
