//! breedlens client: fetch a random breed image and print or save it.

use anyhow::{Context, Result};
use breedlens_grpc::client::{connect, search_image, DEFAULT_SERVER_ADDR};
use breedlens_grpc::logging::{init_tracing, LogLevel};
use breedlens_grpc::persist::{file_name_for, save_to_disk, DEFAULT_IMAGE_DIR};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Server address
    #[arg(long, env = "CLIENT_GRPC_ADDR", default_value = DEFAULT_SERVER_ADDR)]
    addr: String,

    /// Log level
    #[arg(short, long, value_enum, default_value_t = LogLevel::Info, global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search for a random image of a breed
    Search(SearchArgs),
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Breed to search for
    #[arg(short, long)]
    breed: String,

    /// Sub-breed to search for
    #[arg(short, long, default_value = "")]
    sub_breed: String,

    /// Save the image instead of printing its URL
    #[arg(long)]
    save: bool,

    /// Directory to save into
    #[arg(short, long, default_value = DEFAULT_IMAGE_DIR)]
    path: PathBuf,

    /// File name without extension (default: taken from the image URL)
    #[arg(short, long)]
    file_name: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level).context("Failed to initialize logging")?;

    match cli.command {
        Command::Search(args) => search(&cli.addr, args).await,
    }
}

async fn search(addr: &str, args: SearchArgs) -> Result<()> {
    // Reject a bad name before spending an admission slot on the call.
    let requested = args.file_name.as_deref();
    if let Some(name) = requested {
        file_name_for("", Some(name))?;
    }

    let mut client = connect(addr).await?;
    let found = search_image(&mut client, &args.breed, &args.sub_breed).await?;

    if !args.save {
        println!("{}", found.image_url);
        return Ok(());
    }

    let file_name = file_name_for(&found.image_url, requested)?;
    let path = save_to_disk(&found.image, &file_name, &args.path).await?;
    let absolute = tokio::fs::canonicalize(&path).await.unwrap_or(path);
    println!("image saved to {}", absolute.display());
    Ok(())
}
