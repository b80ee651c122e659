use clap::{Parser, Subcommand};
use image_intake::config::Paths;
use image_intake::{backfill, intake, output, project, reconcile, store};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "image-intake")]
#[command(about = "Image ingestion and metadata synthesis for static photo sites")]
#[command(long_about = "\
Image ingestion and metadata synthesis for static photo sites

Drop editing-suite exports into the intake directory; the pipeline
transcodes them to bounded AVIFs, derives metadata records, and keeps the
store, the files on disk, and the generated enumerations in agreement.

On-disk layout (defaults):

  image-intake/                      # intake: uploads awaiting processing
  public/images/                     # served images
  ├── 2023-05-01-img_001.g.avif     # pipeline-generated (.g.avif suffix)
  └── map-of-the-world.png          # hand-placed static asset
  content/image_metadata.g.toml      # metadata store (edit by hand freely)
  content/image_keys.g.rs            # generated key/name/tag value sets
  content/image_types.g.rs           # generated literal-checking macros

Key derivation:
  Lightroom export:  <capture-date>-<raw-file-stem>.g.avif
  Other intake:      <filename-stem>.g.avif
  Static asset:      the literal filename

Operator overrides live in the store file: a display_name moved away from
its key, or a dominant_color with overridden = true, is never touched by
reprocessing. Re-running the pipeline is always safe and idempotent.")]
#[command(version)]
struct Cli {
    /// Intake directory (uploads awaiting processing)
    #[arg(long, default_value = "image-intake", global = true)]
    intake_dir: PathBuf,

    /// Output directory (served images, generated and hand-placed)
    #[arg(long, default_value = "public/images", global = true)]
    output_dir: PathBuf,

    /// Metadata store document
    #[arg(long, default_value = "content/image_metadata.g.toml", global = true)]
    store_file: PathBuf,

    /// Generated value-set declarations
    #[arg(long, default_value = "content/image_keys.g.rs", global = true)]
    keys_file: PathBuf,

    /// Generated literal-checking macros
    #[arg(long, default_value = "content/image_types.g.rs", global = true)]
    types_file: PathBuf,

    /// Answer yes to the intake cleanup prompt
    #[arg(long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Backfill static images, import intake, reconcile, project (default)
    All,
    /// Backfill metadata for hand-placed images, reconcile, project
    Static,
    /// Import and transcode intake images, reconcile, project
    Intake,
    /// Regenerate the key/name/tag enumerations only
    Project,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let paths = Paths {
        intake_dir: cli.intake_dir.clone(),
        output_dir: cli.output_dir.clone(),
        store_file: cli.store_file.clone(),
        keys_file: cli.keys_file.clone(),
        types_file: cli.types_file.clone(),
    };

    let command = cli.command.unwrap_or(Command::All);
    let (run_static, run_intake) = match command {
        Command::All => (true, true),
        Command::Static => (true, false),
        Command::Intake => (false, true),
        Command::Project => (false, false),
    };

    let mut store = store::read(&paths.store_file)?;

    if run_static {
        let report = backfill::backfill(&mut store, &paths)?;
        output::print_stage("static", &report);
    }

    let mut imported = Vec::new();
    if run_intake {
        let report = intake::import(&mut store, &paths)?;
        imported = report.imported_filenames();
        output::print_stage("intake", &report);
    }

    if run_static || run_intake {
        let reconciled = reconcile::reconcile(&mut store, &paths.output_dir)?;
        output::print_reconcile(&reconciled);
        store::write(&paths.store_file, &store)?;
    }

    let projection = project::emit(&store, &paths.keys_file, &paths.types_file)?;
    output::print_projection(&projection);

    // Only files that actually imported this run are ever offered for
    // deletion; skipped and failed files stay put.
    if !imported.is_empty() && confirm_clear_intake(cli.yes)? {
        let removed = reconcile::clean_intake_dir(&paths.intake_dir, &imported)?;
        println!(
            "removed {removed} imported files from {}",
            paths.intake_dir.display()
        );
    }

    Ok(())
}

/// Interactive y/N prompt, defaulting to yes. `--yes` skips it.
fn confirm_clear_intake(assume_yes: bool) -> io::Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    print!("clear imported files from the intake directory? [Y/n] ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let answer = line.trim().to_lowercase();
    Ok(answer.is_empty() || answer == "y" || answer == "yes")
}
