use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use dotpath_fuzz::cli::{Cli, Command};
use dotpath_fuzz::{driver, generate, logging, GenerateParams};
use tokio_util::sync::CancellationToken;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to start async runtime: {e}");
            return ExitCode::from(1);
        }
    };

    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Generate(args) => run_generate(args).await,
        Command::Main(args) => run_main(args).await,
    }
}

async fn run_generate(args: dotpath_fuzz::cli::GenerateArgs) -> ExitCode {
    let mut params = GenerateParams::new(args.os_type.into(), args.depth, args.method.into());
    params.target_file = args.file;
    params.extra_files = args.extra_files;
    params.extension = args.extension;

    let payloads = match generate(&params) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(1);
        }
    };

    let mut out: Box<dyn Write> = match &args.output_file {
        Some(path) => match std::fs::File::create(path) {
            Ok(f) => Box::new(f),
            Err(e) => {
                eprintln!("error: failed to create {path}: {e}");
                return ExitCode::from(1);
            }
        },
        None => Box::new(std::io::stdout()),
    };

    for payload in &payloads {
        if writeln!(out, "{payload}").is_err() {
            eprintln!("error: failed to write payload output");
            return ExitCode::from(1);
        }
    }

    ExitCode::SUCCESS
}

async fn run_main(args: dotpath_fuzz::cli::ScanArgs) -> ExitCode {
    let quiet = args.quiet;
    let format = args.format;

    let config = match args.into_scan_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(1);
        }
    };

    let cancel = CancellationToken::new();
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_for_signal.cancel();
        }
    });

    let progress: Option<dotpath_fuzz::ProgressCallback> = if quiet {
        None
    } else {
        Some(Arc::new(|index, total, payload| {
            tracing::debug!(index, total, payload = %payload, "dispatching payload");
        }))
    };

    match driver::run_scan(config, progress, cancel).await {
        Ok(result) => {
            print_result(&result, quiet, format);
            ExitCode::SUCCESS
        }
        Err(dotpath_fuzz::FuzzError::Cancelled) => {
            eprintln!("scan cancelled");
            ExitCode::from(130)
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(1)
        }
    }
}

fn print_result(result: &dotpath_fuzz::ScanResult, quiet: bool, format: dotpath_fuzz::cli::CliFormat) {
    if matches!(format, dotpath_fuzz::cli::CliFormat::Json) {
        match serde_json::to_string_pretty(result) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("error: failed to serialize result: {e}"),
        }
        return;
    }

    for vuln in &result.vulnerabilities {
        println!("[VULNERABLE] {}", vuln.endpoint_rendering);
        if let Some(depth) = vuln.bisected_depth {
            println!("  exact depth: {depth}");
        }
    }

    if quiet {
        return;
    }

    println!(
        "false positives: {}  errors: {}  total: {}  duration: {:.2}s",
        result.false_positives.len(),
        result.errors.len(),
        result.total_tests,
        result.duration.as_secs_f64()
    );
    if let Some(banner) = &result.server_banner {
        println!("server banner: {banner}");
    }
}
