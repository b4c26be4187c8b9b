use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{exit, Command, ExitStatus};

use alert_sink_core::contract::{DeliveryRecord, OutputDeliveryEvent};
use alert_sink_core::event::{encode_event, AlertEvent};
use clap::{Parser, Subcommand, ValueEnum};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the alert sink workspace",
    long_about = "A unified CLI for CI checks, local replays, sample batch\n\
                  generation, and Lambda packaging in the alert sink workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI checks (fmt, clippy, tests, package)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Write a sample delivery event with fake alerts
    SampleBatch {
        /// Number of records in the batch
        #[arg(long, default_value_t = 10)]
        count: usize,
        /// 1-based record positions that carry malformed JSON
        #[arg(long, value_delimiter = ',')]
        malformed: Vec<usize>,
        /// Output file path
        #[arg(long, default_value = "delivery_event.json")]
        output: String,
    },
    /// Replay a delivery event file through the handler locally
    Replay {
        /// Delivery event JSON file
        #[arg(long, default_value = "delivery_event.json")]
        input: String,
        /// How many times the batch is delivered
        #[arg(long, default_value_t = 2)]
        passes: usize,
    },
    /// Build and package the Rust Lambda artifact
    ServerlessPackage {
        /// Compilation target triple for Lambda binaries
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build profile used for binaries
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Build the Lambda package
    Package,
    /// Run check + package
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

    fn as_cargo_flag(self) -> Option<&'static str> {
        match self {
            Self::Debug => None,
            Self::Release => Some("--release"),
        }
    }
}

const LAMBDA_BINARY: &str = "save_alert";
const DIST_DIR: &str = "dist";

const SAMPLE_ACTIONS: [&str; 6] = [
    "login_failed",
    "password_reset",
    "purchase_declined",
    "profile_scraped",
    "coupon_abuse",
    "session_hijack",
];

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn package_serverless_lambda(target: &str, profile: BuildProfile) {
    ensure_rust_target_installed(target);

    step("Build alert sink lambda binary");

    let mut cargo_args = vec![
        "build",
        "-p",
        "alert_sink_lambda",
        "--target",
        target,
        "--bin",
        LAMBDA_BINARY,
    ];
    if let Some(flag) = profile.as_cargo_flag() {
        cargo_args.push(flag);
    }
    run_cargo(&cargo_args);

    step("Package lambda zip artifact");
    let target_dir = Path::new("target").join(target).join(profile.dir_name());
    let dist_dir = Path::new(DIST_DIR);
    fs::create_dir_all(dist_dir).expect("failed to create lambda dist directory");

    let zip_path = dist_dir.join(format!("{LAMBDA_BINARY}.zip"));
    package_lambda_zip(&target_dir.join(binary_name(LAMBDA_BINARY, target)), &zip_path);

    eprintln!("\nPackaged artifact:\n- {}", zip_path.display());
}

fn ensure_rust_target_installed(target: &str) {
    let output = Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output();

    let output = match output {
        Ok(value) => value,
        Err(error) => {
            eprintln!(
                "warning: failed to run `rustup target list --installed` ({error}); continuing without target preflight"
            );
            return;
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "failed to list installed rust targets; run `rustup target list --installed` manually. details: {}",
            stderr.trim()
        );
    }

    let installed = String::from_utf8_lossy(&output.stdout);
    if !installed.lines().any(|line| line.trim() == target) {
        panic!(
            "required rust target `{target}` is not installed. install it with `rustup target add {target}` and re-run `cargo run -p xtask -- serverless-package`"
        );
    }
}

fn binary_name(bin_name: &str, target: &str) -> String {
    if target.contains("windows") {
        format!("{bin_name}.exe")
    } else {
        bin_name.to_string()
    }
}

fn package_lambda_zip(binary_path: &Path, zip_path: &Path) {
    if !binary_path.exists() {
        panic!("expected lambda binary at '{}'", binary_path.display());
    }

    let binary = fs::read(binary_path).expect("failed to read lambda binary");
    let file = fs::File::create(zip_path).expect("failed to create lambda zip");
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file("bootstrap", options)
        .expect("failed to start bootstrap entry in lambda zip");
    zip.write_all(&binary)
        .expect("failed to write bootstrap entry");
    zip.finish().expect("failed to finish lambda zip");
}

// ── sample data ────────────────────────────────────────────────────

fn sample_delivery_event(count: usize, malformed: &[usize]) -> OutputDeliveryEvent {
    let records = (1..=count)
        .map(|position| {
            let record_id = format!("record-{position}");
            if malformed.contains(&position) {
                return DeliveryRecord::from_payload(record_id, b"{\"eventId\": ");
            }
            let alert = AlertEvent {
                event_id: uuid::Uuid::new_v4().to_string(),
                action: SAMPLE_ACTIONS[(position - 1) % SAMPLE_ACTIONS.len()].to_string(),
                user_id: uuid::Uuid::new_v4().to_string(),
                created_at: chrono::Utc::now()
                    .format("%Y-%m-%d %H:%M:%S%.6f")
                    .to_string(),
                object_id: uuid::Uuid::new_v4().to_string(),
                biz_id: uuid::Uuid::new_v4().to_string(),
                error_msg: "[error]".to_string(),
            };
            DeliveryRecord::from_payload(record_id, &encode_event(&alert))
        })
        .collect();

    OutputDeliveryEvent {
        invocation_id: uuid::Uuid::new_v4().to_string(),
        application_arn:
            "arn:aws:kinesisanalytics:us-east-1:123456789012:application/abnormality-event-detector"
                .to_string(),
        records,
    }
}

fn write_sample_batch(count: usize, malformed: &[usize], output: &str) {
    let event = sample_delivery_event(count, malformed);
    let body = serde_json::to_vec_pretty(&event).expect("sample event should serialize");
    fs::write(output, body).expect("failed to write sample delivery event");
    eprintln!("Wrote {count} record(s) to {output}");
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    step("Test alert_sink_core");
    run_cargo(&["test", "-p", "alert_sink_core"]);

    step("Test alert_sink_lambda");
    run_cargo(&["test", "-p", "alert_sink_lambda"]);
}

fn ci_package() {
    package_serverless_lambda("x86_64-unknown-linux-gnu", BuildProfile::Release);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check(),
                CiJob::Package => ci_package(),
                CiJob::All => {
                    ci_check();
                    ci_package();
                }
            }
            eprintln!("\nCI job passed.");
        }
        Commands::SampleBatch {
            count,
            malformed,
            output,
        } => {
            write_sample_batch(count, &malformed, &output);
        }
        Commands::Replay { input, passes } => {
            let passes = passes.to_string();
            run_cargo(&[
                "run",
                "-p",
                "alert_sink_lambda",
                "--bin",
                "alert_replay",
                "--",
                "--input",
                &input,
                "--passes",
                &passes,
            ]);
        }
        Commands::ServerlessPackage { target, profile } => {
            package_serverless_lambda(&target, profile);
        }
    }
}
