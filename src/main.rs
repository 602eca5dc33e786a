//! burn-session: inspect session profiles and plan multi-disc burns

use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use burn_session::core::{format_flags, parse_flag};
use burn_session::logging::init_logging;
use burn_session::profiles::{build_session, load_profile};
use burn_session::{BurnFlags, BurnResult, BurnSession, Drive, MediaKind, Medium, SessionDefaults, SessionSpan};

#[derive(Parser)]
#[command(name = "burn-session")]
#[command(about = "Inspect burn session profiles and plan multi-disc burns", version)]
struct Cli {
    /// Show debug output on the terminal
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a profile's tracks into batches that each fit one disc
    Plan {
        /// Session profile (JSON)
        profile: PathBuf,

        /// Medium capacity in 2048-byte blocks
        #[arg(long)]
        capacity: u64,

        /// Free blocks on the medium (defaults to the capacity)
        #[arg(long)]
        free: Option<u64>,

        /// The medium can be erased
        #[arg(long)]
        rewritable: bool,

        /// Burn flag to set, e.g. `append` or `merge` (repeatable)
        #[arg(long = "flag")]
        flags: Vec<String>,
    },
    /// Print the flag names of a numeric flag mask
    Flags {
        /// Decimal or 0x-prefixed hexadecimal mask
        bits: String,
    },
    /// Print the size and readiness of a profile's session
    Size {
        /// Session profile (JSON)
        profile: PathBuf,
    },
}

fn parse_bits(text: &str) -> Result<u32, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse::<u32>(),
    };
    parsed.map_err(|e| format!("Invalid flag mask {:?}: {}", text, e))
}

fn load_session(profile_path: &Path) -> Result<BurnSession, String> {
    let profile = load_profile(profile_path)?;
    build_session(&profile, &SessionDefaults::load())
}

fn plan(
    profile_path: &Path,
    capacity: u64,
    free: Option<u64>,
    rewritable: bool,
    flag_names: &[String],
) -> Result<(), String> {
    let mut session = load_session(profile_path)?;

    for name in flag_names {
        let flag = parse_flag(name).ok_or_else(|| format!("Unknown flag: {}", name))?;
        session.add_flag(flag);
    }

    let free = free.unwrap_or(capacity);
    let mut kind = MediaKind::CD | MediaKind::WRITABLE;
    if rewritable {
        kind |= MediaKind::REWRITABLE;
    }
    if free >= capacity {
        kind |= MediaKind::BLANK;
    } else {
        kind |= MediaKind::APPENDABLE;
    }
    session.set_burner(Some(Drive::with_medium("burner", Medium::new(kind, capacity, free))));

    let mut span = SessionSpan::new(session);
    println!(
        "Available: {} blocks, flags: {}",
        span.session().get_available_medium_space(),
        format_flags(span.session().get_flags())
    );
    println!("Largest track: {} blocks", span.get_max_space());

    if span.possible() == BurnResult::Error {
        return Err("The first track does not fit on the medium".to_string());
    }

    span.start();
    let mut batch = 0;
    loop {
        match span.next() {
            BurnResult::Retry => {
                batch += 1;
                let session = span.session();
                println!("Disc {}: {} blocks", batch, session.get_size().blocks);
                for track in session.get_tracks() {
                    println!("  {:>10} blocks  {}", track.get_size().1.blocks, track.get_type());
                }
                span.session_mut().pop_tracks();
            }
            BurnResult::Ok => break,
            other => {
                span.stop();
                return Err(format!("Cannot continue spanning after {} discs: {}", batch, other));
            }
        }
    }
    span.stop();

    println!("{} disc(s) needed", batch);
    Ok(())
}

fn size(profile_path: &Path) -> Result<(), String> {
    let session = load_session(profile_path)?;
    let total = session.get_size();
    let status = session.get_status();

    println!("Input: {}", session.get_input_type());
    println!("Tracks: {}", session.track_count());
    println!("Size: {} blocks ({} bytes)", total.blocks, total.bytes);
    match status.progress {
        Some(progress) => println!("Status: {} ({:.0}%)", status.result, progress * 100.0),
        None => println!("Status: {}", status.result),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    init_logging(level);

    let result = match &cli.command {
        Commands::Plan {
            profile,
            capacity,
            free,
            rewritable,
            flags,
        } => plan(profile, *capacity, *free, *rewritable, flags),
        Commands::Flags { bits } => parse_bits(bits).map(|bits| {
            println!("{}", format_flags(BurnFlags::from_bits_retain(bits)));
        }),
        Commands::Size { profile } => size(profile),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
