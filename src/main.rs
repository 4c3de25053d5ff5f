use clap::{Args, Parser, Subcommand};
use owo_colors::{OwoColorize, Stream::Stdout, Style};
use std::time::Instant;

use gsea_core::methods::gsea::{execute_gsea_preranked, GseaConfig, RandomSeedGenerator};
use gsea_core::readers::{read_gmt_file, read_rank_file};
use gsea_core::writers::save_gsea_results;

/// GSEA enrichment CLI.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run pre-ranked GSEA on a rank file against a GMT of gene sets
    Gsea(GseaArgs),
}

#[derive(Args)]
struct GseaArgs {
    /// Path to the GMT file of gene sets
    gmt: Option<String>,
    /// Path to the rank file of interest
    rnk: Option<String>,
    /// Output path for the JSON results
    #[arg(short, long, default_value = "gsea_results.json")]
    out: String,
    /// Number of permutations to run
    #[arg(short = 'n', long, default_value = "1000")]
    permutations: usize,
    /// Weighting exponent applied to each rank
    #[arg(short, long, default_value = "1.0")]
    weight: f64,
    /// Minimum qualified gene-set overlap
    #[arg(long, default_value = "15")]
    min_overlap: i32,
    /// Maximum qualified gene-set overlap
    #[arg(long, default_value = "500")]
    max_overlap: i32,
    /// Seed for the permutation RNG
    #[arg(short, long, default_value = "42")]
    seed: u64,
}

fn main() {
    println!("GSEA CLI v{}", env!("CARGO_PKG_VERSION"));
    let args = CliArgs::parse();
    match &args.command {
        Some(Commands::Gsea(gsea_args)) => run_gsea(gsea_args),
        None => {
            println!("Please select a valid command. Run --help for options.")
        }
    }
}

fn run_gsea(gsea_args: &GseaArgs) {
    let error_style = Style::new().red().bold();
    let info_style = Style::new().blue().bold();

    if gsea_args.gmt.is_none() || gsea_args.rnk.is_none() {
        println!(
            "{}: DID NOT PROVIDE PATHS FOR GMT AND RANK FILE.",
            "ERROR".if_supports_color(Stdout, |text| text.style(error_style))
        );
        return;
    }

    let rnk_path = gsea_args.rnk.clone().unwrap();
    let gmt_path = gsea_args.gmt.clone().unwrap();

    let ranked_list = read_rank_file(rnk_path.clone())
        .unwrap_or_else(|_| panic!("File {rnk_path} not found"));
    let gene_sets =
        read_gmt_file(gmt_path.clone()).unwrap_or_else(|_| panic!("File {gmt_path} not found"));

    println!(
        "{}: RUNNING GSEA OVER {} GENE SETS",
        "INFO".if_supports_color(Stdout, |text| text.style(info_style)),
        gene_sets.len()
    );

    let config = GseaConfig {
        p: gsea_args.weight,
        min_overlap: gsea_args.min_overlap,
        max_overlap: gsea_args.max_overlap,
        permutations: gsea_args.permutations,
        ..GseaConfig::default()
    };
    let seeds = RandomSeedGenerator::new(gsea_args.seed);

    let start = Instant::now();
    let db = match execute_gsea_preranked(ranked_list, &gene_sets, &config, seeds) {
        Ok(db) => db,
        Err(e) => {
            println!(
                "{}: {}",
                "ERROR".if_supports_color(Stdout, |text| text.style(error_style)),
                e
            );
            return;
        }
    };
    println!("Analysis took {:?}", start.elapsed());

    save_gsea_results(gsea_args.out.clone(), &db).unwrap_or_else(|e| {
        panic!("failed to write results to {}: {e}", gsea_args.out);
    });
    println!(
        "{}: WROTE {} RESULTS TO {}",
        "INFO".if_supports_color(Stdout, |text| text.style(info_style)),
        db.results.len(),
        gsea_args.out
    );
}
