//! Command-line interface for the packager.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::PackagerConfig;
use crate::error::Result;
use crate::exceptions::RepositoryExceptions;
use crate::oai::OaiClient;
use crate::packager::Packager;
use crate::resolver::resolve;

/// DC-ORE Packager - Repackage DSpace items as Simple Archive Format zips.
#[derive(Parser)]
#[command(name = "dc-ore-packager")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command that talks to a repository.
#[derive(Args, Debug, Clone)]
pub struct RepositoryArgs {
    /// Repository base URL (e.g., https://demo.dspace.org)
    pub base_url: String,

    /// Skip TLS certificate verification
    #[arg(long)]
    pub insecure: bool,

    /// YAML file with per-repository overrides
    #[arg(long, value_name = "FILE")]
    pub exceptions: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Package one or more items into a Simple Archive Format zip.
    Package {
        #[command(flatten)]
        repository: RepositoryArgs,

        /// Item handles (e.g., 10673/7)
        #[arg(required = true, num_args = 1..)]
        handles: Vec<String>,

        /// Output zip file (default: <output-dir>/<uuid>.zip)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory for generated output names (default: ./tmp)
        #[arg(short = 'd', long)]
        output_dir: Option<PathBuf>,

        /// Rewrite handle prefixes with the repository's own prefix
        #[arg(long)]
        use_id_prefix: bool,
    },

    /// Show the repository identifier used to build OAI identifiers.
    Identify {
        #[command(flatten)]
        repository: RepositoryArgs,
    },

    /// Print the converted dublin_core.xml of one item without packaging.
    Preview {
        #[command(flatten)]
        repository: RepositoryArgs,

        /// Item handle (e.g., 10673/7)
        handle: String,

        /// Also print the item's ORE resource map
        #[arg(long)]
        ore: bool,

        /// Rewrite the handle prefix with the repository's own prefix
        #[arg(long)]
        use_id_prefix: bool,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Package {
            repository,
            handles,
            output,
            output_dir,
            use_id_prefix,
        } => package_command(
            &repository,
            &handles,
            output.as_deref(),
            output_dir.as_deref(),
            use_id_prefix,
        ),
        Commands::Identify { repository } => identify_command(&repository),
        Commands::Preview {
            repository,
            handle,
            ore,
            use_id_prefix,
        } => preview_command(&repository, &handle, ore, use_id_prefix),
    }
}

/// Build the configuration shared by all commands.
fn load_config(args: &RepositoryArgs) -> Result<PackagerConfig> {
    let mut config = PackagerConfig::new(&args.base_url)?.with_verify_tls(!args.insecure);
    if let Some(path) = &args.exceptions {
        config = config.with_exceptions(RepositoryExceptions::from_yaml_file(path)?);
    }
    Ok(config)
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Execute the package command.
fn package_command(
    args: &RepositoryArgs,
    handles: &[String],
    output: Option<&Path>,
    output_dir: Option<&Path>,
    use_id_prefix: bool,
) -> Result<()> {
    let mut config = load_config(args)?.with_use_id_prefix(use_id_prefix);
    if let Some(dir) = output_dir {
        config = config.with_output_dir(dir);
    }
    if let Some(file) = output {
        config = config.with_output_file(file);
    }

    println!(
        "{} {} item(s) from {}",
        style("Packaging").bold(),
        style(handles.len()).cyan(),
        style(&config.base_url).green()
    );
    println!();

    let pb = spinner();
    pb.set_message("Resolving repository identifier...");

    let mut packager = match Packager::new(config, handles) {
        Ok(packager) => packager,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    for identifier in packager.identifiers() {
        pb.println(format!("  {}", style(identifier).dim()));
    }
    pb.set_message("Fetching and writing items...");

    let output_path = match packager.build_package() {
        Ok(path) => path,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.finish_and_clear();

    println!();
    println!("  Items: {}", packager.identifiers().len());
    println!("  DC elements: {}", packager.dc_elements().len());
    for key in packager.dc_elements() {
        println!("    {key}");
    }
    println!();
    println!(
        "{} {}",
        style("Saved to:").green().bold(),
        output_path.display()
    );

    Ok(())
}

/// Execute the identify command.
fn identify_command(args: &RepositoryArgs) -> Result<()> {
    let config = load_config(args)?;
    let client = OaiClient::new(&config.base_url, config.verify_tls)?;

    let pb = spinner();
    pb.set_message("Querying repository...");
    let repository = match resolve(&client, &config.base_url, &config.exceptions) {
        Ok(repository) => repository,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };
    pb.finish_and_clear();

    println!("  Endpoint: {}", client.endpoint());
    println!("  Repository identifier: {}", style(&repository.id).green());
    println!("  Delimiter: {}", repository.delimiter);
    if let Some(sample) = &repository.sample_identifier {
        println!("  Sample identifier: {sample}");
    }
    match &repository.handle_prefix {
        Some(prefix) => println!("  Handle prefix: {}", style(prefix).cyan()),
        None => println!("  Handle prefix: {}", style("unknown").yellow()),
    }

    Ok(())
}

/// Execute the preview command.
fn preview_command(
    args: &RepositoryArgs,
    handle: &str,
    ore: bool,
    use_id_prefix: bool,
) -> Result<()> {
    let config = load_config(args)?.with_use_id_prefix(use_id_prefix);

    let pb = spinner();
    pb.set_message("Fetching item...");
    let item = match Packager::new(config, &[handle]).and_then(|p| p.fetch_item(0)) {
        Ok(item) => item,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };
    pb.finish_and_clear();

    print!("{}", item.dublin_core_xml());
    if ore {
        println!();
        println!("{}", item.ore_xml());
    }

    Ok(())
}
