use std::fs;
use std::io::{self, Seek, Write};
use std::path::{Path, PathBuf};
use std::process::{exit, Command};

use clap::{Parser, Subcommand, ValueEnum};
use zip::result::ZipResult;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const LAMBDA_PACKAGE: &str = "contact_form_lambda";
const LAMBDA_BINARY: &str = "contact_form";

#[derive(Parser)]
#[command(name = "xtask", about = "Task runner for the contact form workspace")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI checks (fmt, clippy, tests)
    Ci {
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Build the Lambda binary in release mode and zip it as `bootstrap`
    LambdaPackage {
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        #[arg(long, default_value = "dist")]
        dist_dir: PathBuf,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
enum CiJob {
    Lint,
    Test,
    Check,
}

fn run_cargo(args: &[&str]) {
    eprintln!("+ cargo {}", args.join(" "));
    let status = match Command::new("cargo").args(args).status() {
        Ok(status) => status,
        Err(error) => {
            eprintln!("failed to execute cargo: {error}");
            exit(1);
        }
    };
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn package_lambda(target: &str, dist_dir: &Path) -> io::Result<PathBuf> {
    run_cargo(&[
        "build",
        "-p",
        LAMBDA_PACKAGE,
        "--bin",
        LAMBDA_BINARY,
        "--target",
        target,
        "--release",
    ]);

    let binary_path = Path::new("target")
        .join(target)
        .join("release")
        .join(LAMBDA_BINARY);
    let binary = fs::read(&binary_path).map_err(|error| {
        io::Error::new(
            error.kind(),
            format!("expected lambda binary at '{}': {error}", binary_path.display()),
        )
    })?;

    fs::create_dir_all(dist_dir)?;
    let zip_path = dist_dir.join(format!("{LAMBDA_BINARY}.zip"));
    write_bootstrap_zip(&binary, fs::File::create(&zip_path)?)?;
    Ok(zip_path)
}

/// The provided.al2023 runtime executes a file named `bootstrap`.
fn write_bootstrap_zip<W: Write + Seek>(binary: &[u8], writer: W) -> ZipResult<W> {
    let mut zip = ZipWriter::new(writer);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file("bootstrap", options)?;
    zip.write_all(binary)?;
    zip.finish()
}

fn run_ci(job: CiJob) {
    if matches!(job, CiJob::Lint | CiJob::Check) {
        run_cargo(&["fmt", "--all", "--", "--check"]);
        run_cargo(&["clippy", "--all-targets", "--", "-D", "warnings"]);
    }
    if matches!(job, CiJob::Test | CiJob::Check) {
        run_cargo(&["test", "-p", "contact_form_core"]);
        run_cargo(&["test", "-p", LAMBDA_PACKAGE]);
    }
}

fn main() {
    match Cli::parse().command {
        Commands::Ci { job } => {
            run_ci(job);
            eprintln!("CI job passed.");
        }
        Commands::LambdaPackage { target, dist_dir } => match package_lambda(&target, &dist_dir) {
            Ok(zip_path) => eprintln!("Packaged {}", zip_path.display()),
            Err(error) => {
                eprintln!("packaging failed: {error}");
                exit(1);
            }
        },
    }
}
