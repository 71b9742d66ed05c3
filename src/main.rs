//! slot-save - inspect and manage save slots from the command line.

use anyhow::{bail, Context};
use clap::{ArgGroup, Parser, Subcommand};
use slot_save::crypto::CipherMode;
use slot_save::encoding::parse_json_or_null;
use slot_save::{SaveConfig, Section, SlotManager};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "slot-save")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Save-slot persistence engine",
    long_about = "Manage signed, optionally encrypted save slots and portable export strings."
)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the save root directory
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Prompt for the at-rest encryption password
    #[arg(long, global = true)]
    password: bool,

    /// Secret for export-string substitution (enables the cipher)
    #[arg(long, global = true)]
    secret: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    InitConfig {
        /// Output path
        path: PathBuf,
    },

    /// List every slot's metadata
    List,

    /// Print every section of a slot
    Show {
        /// Slot index
        slot: usize,
    },

    /// Set one value in a slot section
    Set {
        /// Slot index
        slot: usize,

        /// Section category
        category: String,

        /// Key within the section
        key: String,

        /// JSON value (bare words are stored as strings)
        value: String,
    },

    /// Rename a slot
    Rename {
        /// Slot index
        slot: usize,

        /// New display name
        name: String,
    },

    /// Delete a slot's files
    Delete {
        /// Slot index
        slot: usize,

        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },

    /// Print a slot as an export string
    Export {
        /// Slot index
        slot: usize,

        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Import an export string into a slot
    #[command(group(ArgGroup::new("source").args(["input", "data"])))]
    Import {
        /// Slot index
        slot: usize,

        /// File containing the export string
        #[arg(long)]
        input: Option<PathBuf>,

        /// Export string
        #[arg(long)]
        data: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::InitConfig { path } => cmd_init_config(path),
        Commands::List => cmd_list(&open_slots(&cli)?),
        Commands::Show { slot } => cmd_show(&mut open_slots(&cli)?, *slot),
        Commands::Set {
            slot,
            category,
            key,
            value,
        } => cmd_set(&mut open_slots(&cli)?, *slot, category, key, value),
        Commands::Rename { slot, name } => cmd_rename(&mut open_slots(&cli)?, *slot, name),
        Commands::Delete { slot, force } => cmd_delete(&mut open_slots(&cli)?, *slot, *force),
        Commands::Export { slot, output } => {
            cmd_export(&open_slots(&cli)?, *slot, output.as_deref())
        }
        Commands::Import { slot, input, data } => cmd_import(
            &mut open_slots(&cli)?,
            *slot,
            input.as_deref(),
            data.as_deref(),
        ),
    }
}

fn open_slots(cli: &Cli) -> anyhow::Result<SlotManager> {
    let mut slots = SlotManager::from_config(load_config(cli)?)?;
    slots.init()?;
    Ok(slots)
}

fn load_config(cli: &Cli) -> anyhow::Result<SaveConfig> {
    let mut config = match &cli.config {
        Some(path) => SaveConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SaveConfig::default(),
    };

    if let Some(root) = &cli.root {
        config.root = root.clone();
    }
    if cli.password {
        config.password = Some(prompt_password("Password: ")?);
    }
    if let Some(secret) = &cli.secret {
        config.cipher.mode = CipherMode::Substitution;
        config.cipher.secret = secret.clone();
    }
    Ok(config)
}

fn prompt_password(prompt: &str) -> anyhow::Result<String> {
    match rpassword::prompt_password(prompt) {
        Ok(password) => Ok(password),
        Err(_) => {
            eprint!("{}", prompt);
            io::stderr().flush()?;
            let mut password = String::new();
            io::stdin().read_line(&mut password)?;
            Ok(password.trim().to_string())
        }
    }
}

fn cmd_init_config(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    SaveConfig::default().save(path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

fn cmd_list(slots: &SlotManager) -> anyhow::Result<()> {
    for (index, entry) in slots.metadata().iter().enumerate() {
        let name = match slots.slot_name(index) {
            Some(name) if !name.is_empty() => name,
            _ => "(unnamed)",
        };
        println!("{:>3}  {:<24} {}", index, name, serde_json::to_string(entry)?);
    }
    Ok(())
}

fn cmd_show(slots: &mut SlotManager, slot: usize) -> anyhow::Result<()> {
    slots.select(slot, true)?;
    let categories: Vec<String> = slots.categories().map(str::to_string).collect();
    for category in categories {
        if let Some(section) = slots.section(&category) {
            println!("[{}]", category);
            println!("{}", serde_json::to_string_pretty(&section.to_map())?);
        }
    }
    slots.exit()?;
    Ok(())
}

fn cmd_set(
    slots: &mut SlotManager,
    slot: usize,
    category: &str,
    key: &str,
    value: &str,
) -> anyhow::Result<()> {
    if slots.section(category).is_none() {
        bail!("unknown section category: {}", category);
    }
    let value = parse_json_or_null(value).unwrap_or_else(|| value.into());

    slots.select(slot, true)?;
    if let Some(section) = slots.section_mut(category) {
        let mut data = section.to_map();
        data.insert(key.to_string(), value);
        section.set_from_map(data, Some(slot));
    }
    slots.save()?;
    slots.exit()?;

    println!("Set {}.{} in slot {}", category, key, slot);
    Ok(())
}

fn cmd_rename(slots: &mut SlotManager, slot: usize, name: &str) -> anyhow::Result<()> {
    slots.rename(slot, name)?;
    println!("Renamed slot {} to {:?}", slot, name);
    Ok(())
}

fn cmd_delete(slots: &mut SlotManager, slot: usize, force: bool) -> anyhow::Result<()> {
    if !force {
        eprint!("This will permanently delete slot {}. Continue? [y/N] ", slot);
        io::stderr().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted");
            return Ok(());
        }
    }

    if slots.delete(slot)? {
        println!("Deleted slot {}", slot);
    } else {
        println!("Slot {} had no files", slot);
    }
    Ok(())
}

fn cmd_export(slots: &SlotManager, slot: usize, output: Option<&Path>) -> anyhow::Result<()> {
    let encoded = slots.export(slot)?;
    match output {
        Some(path) => {
            std::fs::write(path, &encoded)?;
            println!("Wrote export of slot {} to {}", slot, path.display());
        }
        None => println!("{}", encoded),
    }
    Ok(())
}

fn cmd_import(
    slots: &mut SlotManager,
    slot: usize,
    input: Option<&Path>,
    data: Option<&str>,
) -> anyhow::Result<()> {
    let encoded = if let Some(path) = input {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    } else if let Some(data) = data {
        data.to_string()
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    };

    let report = slots.import(slot, &encoded)?;
    println!(
        "Imported {} into slot {}",
        report.imported.join(", "),
        slot
    );
    if !report.skipped.is_empty() {
        println!("Skipped unknown categories: {}", report.skipped.join(", "));
    }
    Ok(())
}
