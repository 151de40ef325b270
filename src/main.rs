use anyhow::{bail, Result};
use std::env;
use std::path::PathBuf;

use water_network::{
    write_outputs, AnalyticsEngine, NetworkPipeline, PipelineConfig, PipelineOutput,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() > 1 && args[1] == "build" {
        let config = parse_build_args(&args[2..])?;
        run_build(config)?;
    } else {
        print_usage();
    }

    Ok(())
}

fn print_usage() {
    println!("water-network {}", water_network::VERSION);
    println!();
    println!("Usage:");
    println!("  water-network build --intake <csv> --sales <csv> --retail <csv> --bridge <csv> \\");
    println!("                      [--year <survey year>] [--out <directory>]");
}

struct BuildOptions {
    config: PipelineConfig,
    output_dir: PathBuf,
}

fn parse_build_args(args: &[String]) -> Result<BuildOptions> {
    let mut intake = None;
    let mut sales = None;
    let mut retail = None;
    let mut bridge = None;
    let mut year = None;
    let mut output_dir = PathBuf::from("outputs");

    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let value = match iter.next() {
            Some(value) => value,
            None => bail!("Missing value for {}", flag),
        };
        match flag.as_str() {
            "--intake" => intake = Some(PathBuf::from(value)),
            "--sales" => sales = Some(PathBuf::from(value)),
            "--retail" => retail = Some(PathBuf::from(value)),
            "--bridge" => bridge = Some(PathBuf::from(value)),
            "--year" => year = Some(value.parse::<i64>()?),
            "--out" => output_dir = PathBuf::from(value),
            other => bail!("Unknown flag: {}", other),
        }
    }

    let config = PipelineConfig {
        intake_path: required(intake, "--intake")?,
        sales_path: required(sales, "--sales")?,
        retail_path: required(retail, "--retail")?,
        bridge_path: required(bridge, "--bridge")?,
        year,
    };

    Ok(BuildOptions { config, output_dir })
}

fn required(path: Option<PathBuf>, flag: &str) -> Result<PathBuf> {
    path.ok_or_else(|| anyhow::anyhow!("Missing required flag: {}", flag))
}

fn run_build(options: BuildOptions) -> Result<()> {
    println!("🚰 Water Network Builder - survey datasets → directed supply graph");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Run the pipeline
    println!("\n📂 Loading datasets and building the network...");
    let pipeline = NetworkPipeline::new(options.config);
    let output = pipeline.run()?;

    report_run(&output);

    // 2. Analytics
    println!("\n📊 Computing analytics...");
    let engine = AnalyticsEngine::new(&output.graph);
    let summary = engine.summary();
    println!(
        "✓ {} nodes, {} edges, density {:.6}, average degree {:.3}, {} weak components",
        summary.nodes,
        summary.edges,
        summary.density,
        summary.average_degree,
        summary.weak_component_count
    );

    let fragmentation = engine.fragmentation_index();
    println!("✓ Fragmentation index: {:.6}", fragmentation);

    // 3. Outputs
    println!("\n💾 Writing outputs to {}...", options.output_dir.display());
    write_outputs(&options.output_dir, &output.graph, output.survey_year)?;
    println!("✓ nodes.csv, edges.csv, network.json, metadata.json");

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✅ Build complete");

    Ok(())
}

fn report_run(output: &PipelineOutput) {
    println!("✓ Edges: {}", output.builder.summary());
    println!("✓ Reconciliation: {}", output.reconciliation.summary());
    println!("✓ Nodes: {}", output.nodes.summary());

    if output.quality.is_clean() {
        println!("✓ Data quality: clean run");
    } else {
        println!("⚠️  Data quality: {}", output.quality.summary());
    }
}
