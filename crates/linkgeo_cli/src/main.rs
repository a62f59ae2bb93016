use std::process::ExitCode;

use clap::{Parser, Subcommand};
use linkgeo_core::{AngularSeparation, EngineError};
use linkgeo_frames::vsep;
use linkgeo_time::{Epoch, TimeConverter};

#[derive(Parser)]
#[command(name = "linkgeo", about = "Lander/Earth link geometry helpers")]
struct Cli {
    /// Log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a UTC string to ephemeris time (TDB seconds past J2000)
    Et {
        /// UTC instant, e.g. 2012-AUG-06~05:17:57 (`~` stands for a space)
        utc: String,
    },
    /// Convert ephemeris time back to a UTC calendar string
    Utc {
        /// TDB seconds past J2000
        #[arg(allow_negative_numbers = true)]
        et: f64,
    },
    /// Angle in degrees between two vectors
    Vsep {
        /// First vector as x,y,z
        a: String,
        /// Second vector as x,y,z
        b: String,
    },
}

/// Shell-friendly placeholder for the space between date and time.
fn restore_spaces(s: &str) -> String {
    s.replace('~', " ")
}

fn parse_vector(s: &str) -> Result<[f64; 3], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected x,y,z but got '{s}'"));
    };
    let component = |v: &str| v.parse::<f64>().map_err(|e| format!("bad component '{v}': {e}"));
    Ok([component(x)?, component(y)?, component(z)?])
}

fn run(command: Commands) -> Result<(), String> {
    let time = TimeConverter::with_builtin_table();
    match command {
        Commands::Et { utc } => {
            let instant = time
                .to_ephemeris_time(&restore_spaces(&utc))
                .map_err(|e| EngineError::from(e).to_string())?;
            println!("UTC: {}", instant.utc.to_calendar_string());
            println!("ET:  {:.6} s past J2000", instant.epoch.as_tdb_seconds());
            println!("JD:  {:.9} TDB", instant.epoch.as_jd_tdb());
        }
        Commands::Utc { et } => {
            let utc = time
                .to_utc(Epoch::from_tdb_seconds(et))
                .map_err(|e| EngineError::from(e).to_string())?;
            println!("{}", utc.to_calendar_string());
        }
        Commands::Vsep { a, b } => {
            let a = parse_vector(&a)?;
            let b = parse_vector(&b)?;
            let radians =
                vsep(&a, &b).ok_or_else(|| "angle undefined for a zero-length vector".to_string())?;
            println!("{}", AngularSeparation::from_radians(radians));
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
