//! Thing Model Code Generator CLI
//!
//! Generates Kotlin sources from a Thing Model file.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use thingmodel_codegen::{
    ClassNamingPolicy, CodegenConfig, EnumPlacement, FsLoader, Generator, KotlinEmitter,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "thingmodel-codegen")]
#[command(about = "Generate typed sources from a WoT Thing Model")]
struct Cli {
    /// Thing Model file
    model: PathBuf,

    /// Root package of generated types
    #[arg(short, long)]
    package: Option<String>,

    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Where generated enums are placed
    #[arg(long, value_enum)]
    enum_placement: Option<EnumPlacement>,

    /// How nested classes are named
    #[arg(long, value_enum)]
    class_naming: Option<ClassNamingPolicy>,

    /// Emit DSL builders for data classes
    #[arg(long)]
    dsl: bool,

    /// Make DSL builder blocks suspending (implies --dsl)
    #[arg(long)]
    suspend_dsl: bool,

    /// Fail on references that resolve to nothing
    #[arg(long)]
    strict_references: bool,

    /// Additional config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = CodegenConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    let options = &mut config.generation;
    if let Some(placement) = cli.enum_placement {
        options.enum_placement = placement;
    }
    if let Some(naming) = cli.class_naming {
        options.class_naming = naming;
    }
    options.dsl_builders |= cli.dsl || cli.suspend_dsl;
    options.suspend_builders |= cli.suspend_dsl;
    options.strict_references |= cli.strict_references;

    let Some(package) = cli.package.or_else(|| config.output.package.clone()) else {
        bail!("no package given; pass --package or set output.package in the config");
    };
    if let Some(output) = cli.output {
        config.output.directory = output;
    }
    let output_dir = config.output_dir();

    let root = cli
        .model
        .parent()
        .map(PathBuf::from)
        .unwrap_or_default();
    let file_name = cli
        .model
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("invalid model path: {}", cli.model.display()))?
        .to_string();

    let emitter = KotlinEmitter::from_options(&config.generation);
    let generator = Generator::new(FsLoader::new(root), config.generation.clone());
    let report = generator
        .generate(&file_name, &package, &output_dir, &emitter)
        .await
        .with_context(|| format!("generating from {}", cli.model.display()))?;

    println!(
        "Generated {} files for {} ({} classes, {} enums, {} aliases) in {}",
        report.files.len(),
        report.thing,
        report.classes,
        report.enums,
        report.aliases,
        output_dir.display()
    );
    Ok(())
}
