use anyhow::bail;
use clap::Parser;
use crystal_lighting::beam::{SearchConfig, solve};
use crystal_lighting::judge::evaluate;
use crystal_lighting::mapgen;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Solves a range of generated boards and reports the total score.
#[derive(Parser, Debug)]
struct Cli {
    #[clap(long, default_value_t = 0)]
    from: u64,
    #[clap(long, default_value_t = 10)]
    count: u64,
    /// `contest` or `small`.
    #[clap(long, short = 't', default_value = "contest")]
    r#type: String,
    /// Seconds per board.
    #[clap(long, default_value_t = 1.0)]
    time_limit: f64,
    #[clap(long, default_value_t = false)]
    no_mirrors: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let params = match cli.r#type.as_str() {
        "contest" => mapgen::random::Params::contest(),
        "small" => mapgen::random::Params::small(),
        other => bail!("Unknown type: {}", other),
    };
    let bar = ProgressBar::new(cli.count);
    bar.set_style(
        ProgressStyle::with_template("[{bar:30.cyan/dim}] {pos}/{len} {elapsed_precise} {msg}")?
            .progress_chars("=> "),
    );
    let mut total = 0i64;
    for seed in cli.from..cli.from + cli.count {
        let problem = mapgen::random::generate(&params, seed);
        let config = SearchConfig {
            time_limit: Duration::from_secs_f64(cli.time_limit),
            mirrors: !cli.no_mirrors,
            ..Default::default()
        };
        let outcome = solve(&problem, config);
        let eval = evaluate(&problem, &outcome.solution)?;
        if eval.score != outcome.score as i64 {
            bar.println(format!("seed {}: search reported {}, judge {}", seed, outcome.score, eval.score));
        }
        total += eval.score;
        bar.set_message(format!("total {}", total));
        bar.inc(1);
    }
    bar.finish();
    eprintln!("!log score {}", total);
    Ok(())
}
