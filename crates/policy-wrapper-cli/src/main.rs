// crates/policy-wrapper-cli/src/main.rs
// ============================================================================
// Module: Policy Wrapper CLI Entry Point
// Description: KRM function binary for the policy wrapper engine.
// Purpose: Read pipeline input, run the transformer, and write its output.
// Dependencies: clap, policy-wrapper-cli, policy-wrapper-core, thiserror
// ============================================================================

//! ## Overview
//! `policy-wrapper` reads a `ResourceList` (or, with `--config`, a plain
//! document stream) from stdin, wraps it, and writes the result to stdout.
//! All user-facing strings are routed through the i18n catalog.
//!
//! Security posture: stdin and config files are untrusted; reads are size
//! bounded and fail closed.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::Parser;
use clap::ValueEnum;
use policy_wrapper_cli::FunctionError;
use policy_wrapper_cli::JsonLogTelemetry;
use policy_wrapper_cli::MAX_INPUT_BYTES;
use policy_wrapper_cli::i18n::Locale;
use policy_wrapper_cli::i18n::set_locale;
use policy_wrapper_cli::run_function;
use policy_wrapper_cli::t;
use policy_wrapper_core::NoopTelemetry;
use policy_wrapper_core::TransformerConfig;
use policy_wrapper_core::WrapTelemetry;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable for CLI locale selection.
const LANG_ENV: &str = "POLICY_WRAPPER_LANG";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "policy-wrapper", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue)]
    show_version: bool,
    /// Preferred output language (overrides `POLICY_WRAPPER_LANG`).
    #[arg(long, value_enum, value_name = "LANG")]
    lang: Option<LangArg>,
    /// Transformer config file; stdin is then read as a plain document stream.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Write one JSON line per engine event to stderr.
    #[arg(long, action = ArgAction::SetTrue)]
    log_events: bool,
}

/// Supported CLI language selections.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum LangArg {
    /// English.
    En,
    /// Catalan.
    Ca,
}

impl From<LangArg> for Locale {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::En => Self::En,
            LangArg::Ca => Self::Ca,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Parses arguments and runs one function invocation.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let env_lang = std::env::var(LANG_ENV).ok();
    let locale = resolve_locale(cli.lang, env_lang.as_deref())?;
    set_locale(locale);
    if locale != Locale::En {
        write_stderr_line(&t!("i18n.disclaimer.machine_translated"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = cli.config.as_deref().map(load_config).transpose()?;
    let input = read_input(std::io::stdin().lock(), MAX_INPUT_BYTES)?;
    let telemetry: Arc<dyn WrapTelemetry> = if cli.log_events {
        Arc::new(JsonLogTelemetry::new(std::io::stderr()))
    } else {
        Arc::new(NoopTelemetry)
    };

    let output = run_function(&input, config.as_ref(), telemetry)
        .map_err(|err| CliError::new(describe_function_error(&err)))?;
    write_stdout(&output).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Input
// ============================================================================

/// Loads the transformer config named by `--config`.
fn load_config(path: &Path) -> CliResult<TransformerConfig> {
    TransformerConfig::load(path).map_err(|err| {
        CliError::new(t!("config.load_failed", path = path.display(), error = err))
    })
}

/// Reads all of `reader`, failing once more than `max_bytes` arrive.
fn read_input(reader: impl Read, max_bytes: usize) -> CliResult<Vec<u8>> {
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    let mut bytes = Vec::new();
    reader.take(limit.saturating_add(1)).read_to_end(&mut bytes).map_err(|err| {
        CliError::new(t!("input.read_failed", kind = t!("input.kind.stdin"), error = err))
    })?;
    if bytes.len() > max_bytes {
        return Err(CliError::new(t!(
            "input.read_too_large",
            kind = t!("input.kind.stdin"),
            size = bytes.len(),
            limit = max_bytes
        )));
    }
    Ok(bytes)
}

/// Localizes a function failure.
fn describe_function_error(error: &FunctionError) -> String {
    match error {
        FunctionError::TooLarge {
            size,
            limit,
        } => t!("input.read_too_large", kind = t!("input.kind.stdin"), size = size, limit = limit),
        FunctionError::NotUtf8 => t!("input.not_utf8", kind = t!("input.kind.stdin")),
        FunctionError::Envelope(message) => t!("function.envelope_invalid", error = message),
        FunctionError::MissingConfig => t!("function.config_missing"),
        FunctionError::Config(err) => t!("config.invalid", error = err),
        FunctionError::Document(err) => t!("function.document_invalid", error = err),
        FunctionError::Wrap(err) => t!("function.wrap_failed", error = err),
    }
}

/// Resolves the CLI locale from flags or environment.
fn resolve_locale(lang: Option<LangArg>, env_lang: Option<&str>) -> CliResult<Locale> {
    if let Some(lang) = lang {
        return Ok(lang.into());
    }
    if let Some(value) = env_lang {
        return Locale::parse(value).ok_or_else(|| {
            CliError::new(t!("i18n.lang.invalid_env", env = LANG_ENV, value = value))
        });
    }
    Ok(Locale::En)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes the function output to stdout.
fn write_stdout(output: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
