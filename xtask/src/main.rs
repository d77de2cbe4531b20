use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const LAMBDA_PACKAGE: &str = "openhouse_lambda";

/// Every deployable handler binary, zipped as `<name>.zip`.
const LAMBDA_BINARIES: [&str; 7] = [
    "areas_lambda",
    "buildings_lambda",
    "eateries_lambda",
    "events_lambda",
    "open_houses_lambda",
    "event_attendees_lambda",
    "open_house_attendees_lambda",
];

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the open house API workspace",
    long_about = "Builds and packages the open house Lambda handlers, prepares a\n\
                  local DynamoDB and runs the CI checks."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI checks
    Ci {
        #[arg(value_enum, default_value_t = CiJob::All)]
        job: CiJob,
    },
    /// Create the API tables in a local DynamoDB
    LocalTables {
        /// DynamoDB Local endpoint
        #[arg(long, env = "ENDPOINT_OVERRIDE", default_value = "http://localhost:8000")]
        endpoint: String,
    },
    /// Build every handler and package each as a Lambda `bootstrap` zip
    ServerlessPackage {
        /// Compilation target triple for Lambda binaries
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
        /// Directory receiving the zip artifacts
        #[arg(long, default_value = "dist")]
        out_dir: PathBuf,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting and clippy
    Lint,
    /// Unit tests for every crate
    Test,
    /// Lint then test
    All,
}

#[derive(Clone, Copy, ValueEnum)]
enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    fn cargo_flag(self) -> Option<&'static str> {
        match self {
            Self::Debug => None,
            Self::Release => Some("--release"),
        }
    }
}

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str], envs: &[(&str, &str)]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .envs(envs.iter().copied())
        .status()
        .unwrap_or_else(|error| fail(&format!("failed to execute cargo: {error}")))
}

fn run_cargo(args: &[&str]) {
    run_cargo_with_env(args, &[]);
}

fn run_cargo_with_env(args: &[&str], envs: &[(&str, &str)]) {
    let status = cargo(args, envs);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn fail(message: &str) -> ! {
    eprintln!("error: {message}");
    exit(1);
}

fn ci_lint() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&["clippy", "--all-targets", "--", "-D", "warnings"]);
}

fn ci_test() {
    step("Test openhouse_core");
    run_cargo(&["test", "-p", "openhouse_core"]);

    step("Test openhouse_lambda");
    run_cargo(&["test", "-p", LAMBDA_PACKAGE]);
}

fn require_installed_target(target: &str) {
    let output = match Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output()
    {
        Ok(output) if output.status.success() => output,
        _ => {
            eprintln!("warning: could not list installed rust targets; skipping target check");
            return;
        }
    };

    let installed = String::from_utf8_lossy(&output.stdout);
    if !installed.lines().any(|line| line.trim() == target) {
        fail(&format!(
            "rust target `{target}` is not installed; run `rustup target add {target}`"
        ));
    }
}

fn package_lambdas(target: &str, profile: BuildProfile, out_dir: &Path) {
    require_installed_target(target);

    step("Build lambda binaries");
    let mut args = vec!["build", "-p", LAMBDA_PACKAGE, "--target", target];
    for binary in LAMBDA_BINARIES {
        args.extend(["--bin", binary]);
    }
    if let Some(flag) = profile.cargo_flag() {
        args.push(flag);
    }
    run_cargo(&args);

    step("Package lambda zip artifacts");
    let build_dir = Path::new("target").join(target).join(profile.dir_name());
    if let Err(error) = fs::create_dir_all(out_dir) {
        fail(&format!("failed to create {}: {error}", out_dir.display()));
    }

    let mut packaged = Vec::with_capacity(LAMBDA_BINARIES.len());
    for binary in LAMBDA_BINARIES {
        let zip_path = out_dir.join(format!("{binary}.zip"));
        if let Err(error) = write_bootstrap_zip(&build_dir.join(binary), &zip_path) {
            fail(&format!("failed to package {binary}: {error}"));
        }
        packaged.push(zip_path);
    }

    eprintln!("\nPackaged artifacts:");
    for path in packaged {
        eprintln!("- {}", path.display());
    }
}

fn write_bootstrap_zip(binary_path: &Path, zip_path: &Path) -> std::io::Result<()> {
    let binary = fs::read(binary_path)?;
    let mut zip = ZipWriter::new(fs::File::create(zip_path)?);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file("bootstrap", options)?;
    zip.write_all(&binary)?;
    zip.finish()?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { job } => {
            match job {
                CiJob::Lint => ci_lint(),
                CiJob::Test => ci_test(),
                CiJob::All => {
                    ci_lint();
                    ci_test();
                }
            }
            eprintln!("\nCI job passed.");
        }
        Commands::LocalTables { endpoint } => {
            step("Create local tables");
            run_cargo_with_env(
                &["run", "-p", LAMBDA_PACKAGE, "--bin", "local_tables"],
                &[("ENDPOINT_OVERRIDE", endpoint.as_str())],
            );
        }
        Commands::ServerlessPackage {
            target,
            profile,
            out_dir,
        } => package_lambdas(&target, profile, &out_dir),
    }
}
