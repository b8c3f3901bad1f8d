use clap::{Parser, Subcommand};
use folio::{config, generate, output, resolve, scan};
use std::path::{Path, PathBuf};
use tracing::{Level, debug};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Static site generator for a personal blog and project portfolio")]
#[command(long_about = "\
Static site generator for a personal blog and project portfolio

Posts and projects are markdown files with TOML front matter. A post's path
below blog/ is its slug; nested directories become multi-segment slugs.

Content structure:

  content/
  ├── config.toml                  # Site config (optional)
  ├── assets/                      # Copied verbatim to the output root
  ├── blog/
  │   ├── hello-world.md           # /blog/hello-world/
  │   └── rust/
  │       ├── index.md             # /blog/rust/
  │       └── ownership.md         # /blog/rust/ownership/
  └── projects/
      └── trail-log.md             # Requires date and category

Front matter:

  +++
  title = \"Ownership Without Tears\"
  description = \"A gentle tour of moves and borrows\"
  date = 2024-03-02
  tags = [\"rust\"]
  +++

Run 'folio gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (manifest)
    #[arg(long, default_value = ".folio-temp", global = true)]
    temp_dir: PathBuf,

    /// Override site.url from config.toml
    #[arg(long, global = true)]
    site_url: Option<String>,

    /// Log pipeline details to stderr (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan content directory into a manifest
    Scan,
    /// Produce the final HTML site from the manifest
    Generate,
    /// Run the full pipeline: scan → generate
    Build,
    /// Validate content directory without building
    Check,
    /// Print the route parameters of every post as JSON
    Params,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Scan => {
            let manifest = scan_source(&cli.source, cli.site_url.as_deref())?;
            write_manifest(&manifest, &cli.temp_dir)?;
            output::print_scan_output(&manifest, &cli.source);
        }
        Command::Generate => {
            let manifest_path = cli.temp_dir.join("manifest.json");
            let report = generate::generate(
                &manifest_path,
                &cli.source,
                &cli.output,
                cli.site_url.as_deref(),
            )?;
            output::print_generate_output(&report);
        }
        Command::Build => {
            println!("==> Stage 1: Scanning {}", cli.source.display());
            let manifest = scan_source(&cli.source, cli.site_url.as_deref())?;
            write_manifest(&manifest, &cli.temp_dir)?;
            output::print_scan_output(&manifest, &cli.source);

            println!("==> Stage 2: Generating HTML → {}", cli.output.display());
            let report = generate::generate_site(&manifest, &cli.source, &cli.output)?;
            output::print_generate_output(&report);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let manifest = scan_source(&cli.source, cli.site_url.as_deref())?;
            output::print_scan_output(&manifest, &cli.source);
            println!("==> {}", output::format_check_output(&manifest));
        }
        Command::Params => {
            let manifest = scan_source(&cli.source, cli.site_url.as_deref())?;
            let params = resolve::static_params(&manifest.posts);
            println!("{}", serde_json::to_string_pretty(&params)?);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Route `tracing` events to stderr so stdout stays clean for `params` and
/// `gen-config` output.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn scan_source(source: &Path, site_url: Option<&str>) -> Result<scan::Manifest, Box<dyn std::error::Error>> {
    let mut manifest = scan::scan(source)?;
    if let Some(url) = site_url {
        manifest.config.override_site_url(url)?;
    }
    Ok(manifest)
}

fn write_manifest(manifest: &scan::Manifest, temp_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(temp_dir)?;
    let manifest_path = temp_dir.join("manifest.json");
    std::fs::write(&manifest_path, serde_json::to_string_pretty(manifest)?)?;
    debug!(path = %manifest_path.display(), "wrote manifest");
    Ok(())
}
