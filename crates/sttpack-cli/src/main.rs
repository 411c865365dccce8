use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sttpack_core::{Config, FeatureFlags, PackageDescriptor, CONFIG_FILE};
use sttpack_setup::DescriptorBuilder;

/// sttpack - package descriptor assembly for the STT training distribution
#[derive(Parser)]
#[command(name = "sttpack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Project root holding VERSION and the package sources
    #[arg(short = 'C', long, global = true, default_value = ".")]
    project_root: PathBuf,

    /// Path to config file (default: <project-root>/sttpack.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the package descriptor and emit it as JSON
    Describe {
        /// Write the descriptor to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the assembled install requirements, one per line
    Requires,

    /// Print the version read from the version file
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    load_dotenv(&cli.project_root)?;
    let config = load_config(&cli)?;
    let flags = FeatureFlags::from_env();

    if cli.verbose {
        let enabled = flags.enabled();
        if enabled.is_empty() {
            eprintln!("{}", "No feature flags set".cyan());
        } else {
            for flag in enabled {
                eprintln!("{} {}", "Flag set:".yellow(), flag);
            }
        }
    }

    let builder = DescriptorBuilder::new(config, flags);

    match cli.command {
        Commands::Describe { output } => {
            describe_command(&builder, &cli.project_root, output.as_deref(), cli.verbose)
        }
        Commands::Requires => requires_command(&builder, &cli.project_root),
        Commands::Version => version_command(&builder, &cli.project_root),
    }
}

/// Log to stderr; `RUST_LOG` wins over the verbosity default
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Load `.env` from the project root without overriding the environment
fn load_dotenv(project_root: &Path) -> Result<()> {
    let path = project_root.join(".env");
    match dotenvy::from_path(&path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "loaded .env");
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to load {}", path.display())),
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let default_path = cli.project_root.join(CONFIG_FILE);

    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()))?
    } else if default_path.exists() {
        Config::from_file(&default_path)
            .with_context(|| format!("Failed to load config {}", default_path.display()))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    Ok(config)
}

fn build_descriptor(builder: &DescriptorBuilder, project_root: &Path) -> Result<PackageDescriptor> {
    builder
        .build(project_root)
        .with_context(|| format!("Failed to assemble package descriptor in {}", project_root.display()))
}

/// Describe command - emit the descriptor for the publishing toolchain
fn describe_command(
    builder: &DescriptorBuilder,
    project_root: &Path,
    output: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let descriptor = build_descriptor(builder, project_root)?;

    if verbose {
        print_descriptor_summary(&descriptor);
    }

    match output {
        Some(path) => {
            descriptor
                .save_to_file(path)
                .with_context(|| format!("Failed to write descriptor to {}", path.display()))?;
            eprintln!("{} {}", "Descriptor saved to:".green(), path.display());
        }
        None => println!("{}", descriptor.to_json()?),
    }

    Ok(())
}

/// Requires command - list install requirements in assembly order
fn requires_command(builder: &DescriptorBuilder, project_root: &Path) -> Result<()> {
    let version = builder
        .version_reader(project_root)
        .read()
        .context("Failed to read package version")?;

    for requirement in &builder.assembler().assemble(&version) {
        println!("{}", requirement);
    }

    Ok(())
}

/// Version command - print the package version
fn version_command(builder: &DescriptorBuilder, project_root: &Path) -> Result<()> {
    let version = builder
        .version_reader(project_root)
        .read()
        .context("Failed to read package version")?;

    println!("{}", version);
    Ok(())
}

/// Print a short human summary to stderr
fn print_descriptor_summary(descriptor: &PackageDescriptor) {
    eprintln!("\n{}", "=".repeat(60).bright_blue());
    eprintln!("{}", "Package Descriptor".bold().bright_blue());
    eprintln!("{}", "=".repeat(60).bright_blue());
    eprintln!();

    eprintln!("{} {} {}", "Package:".bold(), descriptor.name.green(), descriptor.version);
    eprintln!("Schema: {}", descriptor.schema);
    eprintln!("License: {}", descriptor.license);
    eprintln!("Packages: {}", descriptor.packages.len());
    eprintln!();

    eprintln!("{}", "Install requirements:".bold());
    for (i, requirement) in descriptor.install_requires.iter().enumerate() {
        eprintln!("  {}. {}", i + 1, requirement.to_string().yellow());
    }

    eprintln!();
    eprintln!("{}", "=".repeat(60).bright_blue());
}
