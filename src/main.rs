use std::io::{self, Write as _};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use vaultcy::spn::BLOCK_LEN;
use vaultcy::Vault;

#[derive(Parser)]
#[command(name = "vaultcy", version = "0.1.0", about = "Streaming archiver, LZW compressor, and keyed SPN cipher")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Archive, compress, and encrypt a file or directory
    Encode {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        password: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Delete the source file(s) after a successful read
        #[arg(long)]
        delete_source: bool,
    },
    /// Decrypt, decompress, and unpack a container
    Decode {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        password: Option<String>,
        #[arg(short, long = "output-dir")]
        output_dir: Option<PathBuf>,
    },
    /// Report container size without decrypting
    Info {
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    match run(Cli::parse().command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("vaultcy: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        // ── Encode ───────────────────────────────────────────────────────────
        Commands::Encode { input, password, output, delete_source } => {
            let password = resolve_password(password)?;
            let output = output.unwrap_or_else(|| {
                let mut p = input.clone().into_os_string();
                p.push(".vlt");
                PathBuf::from(p)
            });
            Vault::encode(&input, password.as_bytes(), &output, delete_source)?;
            let size = std::fs::metadata(&output)?.len();
            println!("Encoded: {} -> {} ({} B)", input.display(), output.display(), size);
        }

        // ── Decode ───────────────────────────────────────────────────────────
        Commands::Decode { input, password, output_dir } => {
            let password = resolve_password(password)?;
            let output_dir = output_dir.unwrap_or_else(|| {
                let stem = input.file_stem().map(PathBuf::from).unwrap_or_else(|| input.clone());
                input.parent().map(|p| p.join(&stem)).unwrap_or(stem)
            });
            std::fs::create_dir_all(&output_dir)?;
            Vault::decode(&input, password.as_bytes(), &output_dir)?;
            println!("Decoded: {} -> {}", input.display(), output_dir.display());
        }

        // ── Info ─────────────────────────────────────────────────────────────
        Commands::Info { input } => {
            let size = std::fs::metadata(&input)?.len();
            let total_blocks = size / BLOCK_LEN as u64;
            let ciphertext_blocks = total_blocks.saturating_sub(1);
            println!("── vaultcy container ────────────────────────────────────");
            println!("  Path                    {}", input.display());
            println!("  Size                    {} B", size);
            println!("  256-byte ciphertext blocks {}", ciphertext_blocks);
            if size % BLOCK_LEN as u64 != 0 {
                println!("  Warning: size is not a multiple of {BLOCK_LEN}; container is not well-formed");
            }
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn resolve_password(flag: Option<String>) -> io::Result<String> {
    if let Some(pw) = flag {
        return Ok(pw);
    }
    if let Ok(pw) = std::env::var("VAULTCY_PASSWORD") {
        return Ok(pw);
    }
    print!("Password: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}
