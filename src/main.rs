//! shell-proc binary entry point.

use std::io::Write;
use std::process::ExitCode;
use std::time::Instant;

use shell_proc::cli::{self, Args};
use shell_proc::config::Config;
use shell_proc::{execute_command, file_in_path, logging, AsyncProcess, Command};
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Run 'shell-proc --help' for usage.");
            return ExitCode::from(2);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(2);
        }
    };
    logging::try_init_with_filter(config.log_filter()).ok();

    if let Some(ref name) = args.which {
        let found = file_in_path(name);
        debug!("{} on PATH: {}", name, found);
        return if found {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    let Some(command) = build_command(&args, &config) else {
        eprintln!("error: no command given");
        eprintln!("Run 'shell-proc --help' for usage.");
        return ExitCode::from(2);
    };

    let code = if args.run_async {
        run_async(command, &config).await
    } else {
        run_sync(&command)
    };
    exit_code(code)
}

fn build_command(args: &Args, config: &Config) -> Option<Command> {
    let program = args.program()?;
    let line = Command::with_args(program, &args.program_args()).command_line;
    Some(config.command(line))
}

fn run_sync(command: &Command) -> i32 {
    let result = execute_command(command);
    if !result.succeeded {
        eprintln!(
            "error: {}",
            result.error_message.as_deref().unwrap_or("execution failed")
        );
        return 1;
    }

    let mut stdout = std::io::stdout();
    if let Err(e) = stdout
        .write_all(result.output_bytes())
        .and_then(|_| stdout.flush())
    {
        warn!("Failed to write output: {}", e);
    }
    if result.truncated {
        warn!("Output was truncated at the size cap");
    }
    result.exit_code
}

async fn run_async(command: Command, config: &Config) -> i32 {
    let mut process = AsyncProcess::spawn(&command);
    if !process.started() {
        eprintln!(
            "error: {}",
            process.error_message().unwrap_or("failed to start process")
        );
        return 1;
    }
    process.set_poll_interval(config.poll_interval());
    info!("Started process {}", process.pid());

    let deadline = config.timeout().map(|timeout| Instant::now() + timeout);
    let mut stdout = std::io::stdout();
    let mut killed = false;

    loop {
        forward(&mut process, &mut stdout);
        if !process.is_running() {
            break;
        }

        if !killed && deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            warn!("Timeout reached, killing process {}", process.pid());
            killed = process.kill().is_ok();
        }

        tokio::select! {
            _ = tokio::time::sleep(config.poll_interval()) => {}
            _ = tokio::signal::ctrl_c(), if !killed => {
                warn!("Interrupted, killing process {}", process.pid());
                killed = process.kill().is_ok();
            }
        }
    }
    forward(&mut process, &mut stdout);

    let code = process.exit_code();
    debug!("Process {} finished: {:?}", process.pid(), process.exit_state());
    process.close();
    code
}

fn forward(process: &mut AsyncProcess, stdout: &mut std::io::Stdout) {
    while let Some(chunk) = process.read_output() {
        if let Err(e) = stdout.write_all(&chunk).and_then(|_| stdout.flush()) {
            warn!("Failed to write output: {}", e);
            return;
        }
    }
}

/// Map a child status onto a process exit code; abnormal endings become 1.
fn exit_code(code: i32) -> ExitCode {
    u8::try_from(code).map(ExitCode::from).unwrap_or(ExitCode::FAILURE)
}
