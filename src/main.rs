use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use prettytable::{Table, row};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pfm::{FileHandle, PAGE_SIZE, PageNum, PagedFileManager};

/// Inspect and manipulate paged files
#[derive(Debug, Parser)]
#[command(name = "pfm", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an empty paged file
    Create { path: PathBuf },
    /// Delete a paged file
    Destroy { path: PathBuf },
    /// Show the metadata page
    Stats {
        path: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Append pages filled with a single byte
    Append {
        path: PathBuf,
        #[arg(long, value_parser = parse_byte)]
        fill: u8,
        #[arg(long, default_value_t = 1)]
        count: u32,
    },
    /// Print the first bytes of a logical page
    Read { path: PathBuf, page: PageNum },
}

fn parse_byte(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid byte '{}': {}", s, e))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    run(cli.command)
}

fn run(command: Command) -> Result<()> {
    let manager = PagedFileManager::new();

    match command {
        Command::Create { path } => {
            manager
                .create_file(&path)
                .with_context(|| format!("creating {}", path.display()))?;
            info!(path = %path.display(), "created");
        }
        Command::Destroy { path } => {
            manager
                .destroy_file(&path)
                .with_context(|| format!("destroying {}", path.display()))?;
        }
        Command::Stats { path, json } => {
            let metadata = manager
                .read_metadata(&path)
                .with_context(|| format!("reading metadata of {}", path.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&metadata)?);
            } else {
                let mut table = Table::new();
                table.add_row(row!["pages", "reads", "writes", "appends"]);
                table.add_row(row![
                    metadata.page_count,
                    metadata.read_counter,
                    metadata.write_counter,
                    metadata.append_counter
                ]);
                table.printstd();
            }
        }
        Command::Append { path, fill, count } => {
            with_handle(&manager, &path, |handle| {
                let page = vec![fill; PAGE_SIZE];
                for _ in 0..count {
                    handle.append_page(&page)?;
                }
                println!("{} pages", handle.get_number_of_pages());
                Ok(())
            })?;
        }
        Command::Read { path, page } => {
            with_handle(&manager, &path, |handle| {
                let mut buffer = vec![0u8; PAGE_SIZE];
                handle.read_page(page, &mut buffer)?;
                for (i, chunk) in buffer.chunks(16).take(8).enumerate() {
                    let hex: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
                    println!("{:08x}  {}", i * 16, hex.join(" "));
                }
                Ok(())
            })?;
        }
    }

    Ok(())
}

/// Run `f` against a handle bound to `path`, closing it afterwards
fn with_handle<F>(manager: &PagedFileManager, path: &Path, f: F) -> Result<()>
where
    F: FnOnce(&mut FileHandle) -> pfm::FileResult<()>,
{
    let mut handle = FileHandle::new();
    manager
        .open_file(path, &mut handle)
        .with_context(|| format!("opening {}", path.display()))?;

    let result = f(&mut handle);
    manager
        .close_file(&mut handle)
        .with_context(|| format!("closing {}", path.display()))?;
    result.with_context(|| format!("page operation on {}", path.display()))
}
