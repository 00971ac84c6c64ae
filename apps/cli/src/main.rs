use std::{ffi::OsString, time::Duration};

use anyhow::Result;
use clap::{Parser, error::ErrorKind};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use polycore_core::{
    FailureReport, ResultDocument, YoutubeClient, YoutubeConfig, extract_subtitles,
    render_document,
};

const USAGE: &str = "Usage: extract-subtitles <video_id>";
const USAGE_EXIT_CODE: i32 = 1;

#[derive(Parser, Debug)]
#[command(name = "extract-subtitles", version)]
#[command(about = "Extract YouTube captions as JSON with per-segment difficulty labels")]
struct Cli {
    /// YouTube video id (may start with '-')
    #[arg(allow_hyphen_values = true)]
    video_id: String,

    /// Preferred caption language (e.g., "en", "es"). Falls back to the first available track.
    #[arg(short, long, env = "POLYCORE_LANG", default_value = "en")]
    lang: String,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Hide the progress spinner
    #[arg(long)]
    no_progress: bool,
}

fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args)
}

fn usage_document() -> ResultDocument {
    ResultDocument::Failure(FailureReport::new(USAGE))
}

/// A parse failure that ends the process without running an extraction
struct EarlyExit {
    error: clap::Error,
    /// Printed to stdout; absent for help and version output
    document: Option<ResultDocument>,
    code: i32,
}

fn resolve_cli<I, T>(args: I) -> Result<Cli, EarlyExit>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    parse_args(args).map_err(|error| match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EarlyExit {
            code: error.exit_code(),
            document: None,
            error,
        },
        _ => EarlyExit {
            error,
            document: Some(usage_document()),
            code: USAGE_EXIT_CODE,
        },
    })
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "polycore_core=debug,extract_subtitles=debug,warn"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // stdout is reserved for the JSON document
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = match resolve_cli(std::env::args_os()) {
        Ok(cli) => cli,
        Err(EarlyExit {
            error,
            document: None,
            ..
        }) => error.exit(),
        Err(EarlyExit {
            error,
            document: Some(document),
            code,
        }) => {
            eprintln!("{}", error);
            println!("{}", serde_json::to_string(&document)?);
            std::process::exit(code);
        }
    };

    init_tracing(cli.verbose);
    debug!(video_id = %cli.video_id, lang = %cli.lang, "starting extraction");

    let spinner = (!cli.no_progress)
        .then(|| create_spinner(&format!("Fetching captions for {}...", cli.video_id)));

    let document = match YoutubeClient::new(YoutubeConfig::from_env()) {
        Ok(client) => extract_subtitles(&client, &cli.video_id, &cli.lang).await,
        Err(e) => ResultDocument::Failure(FailureReport::new(e.to_string()).with_details(
            format!("Failed to extract subtitles for video {}", cli.video_id),
        )),
    };

    debug!(success = document.is_success(), "extraction finished");

    if let Some(spinner) = spinner {
        match &document {
            ResultDocument::Success(report) => spinner.finish_with_message(format!(
                "{} {} segments, {}{}",
                style("✓").green().bold(),
                report.transcript.len(),
                style(&report.language_code).yellow(),
                if report.is_generated {
                    style(" (auto-generated)").dim().to_string()
                } else {
                    String::new()
                }
            )),
            ResultDocument::Failure(failure) => spinner.finish_with_message(format!(
                "{} {}",
                style("✗").red().bold(),
                style(&failure.error).dim()
            )),
        }
    }

    println!("{}", render_document(&document)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_video_id_parses() {
        let cli = parse_args(["extract-subtitles", "dQw4w9WgXcQ"]).unwrap();
        assert_eq!(cli.video_id, "dQw4w9WgXcQ");
        assert!(!cli.verbose);
    }

    #[test]
    fn lang_flag_overrides_preferred_language() {
        let cli = parse_args(["extract-subtitles", "--lang", "es", "abc"]).unwrap();
        assert_eq!(cli.lang, "es");
        assert_eq!(cli.video_id, "abc");
    }

    #[test]
    fn video_id_may_start_with_hyphen() {
        let cli = parse_args(["extract-subtitles", "-1ZrsEJsmbk"]).unwrap();
        assert_eq!(cli.video_id, "-1ZrsEJsmbk");
        assert_eq!(cli.lang, "en");

        let cli = parse_args(["extract-subtitles", "-lXyz12345a"]).unwrap();
        assert_eq!(cli.video_id, "-lXyz12345a");
        assert_eq!(cli.lang, "en");
    }

    #[test]
    fn wrong_argument_count_exits_with_usage_document() {
        let usage = serde_json::to_string(&usage_document()).unwrap();
        let cases: [&[&str]; 3] = [
            &["extract-subtitles"],
            &["extract-subtitles", "abc", "def"],
            &["extract-subtitles", "abc", "def", "ghi"],
        ];

        for args in cases {
            let Err(exit) = resolve_cli(args.iter().copied()) else {
                panic!("expected usage exit for {:?}", args);
            };
            assert_eq!(exit.code, 1);
            let document = exit.document.expect("usage document");
            assert!(!document.is_success());
            assert_eq!(serde_json::to_string(&document).unwrap(), usage);
        }
    }

    #[test]
    fn help_exits_without_usage_document() {
        let Err(exit) = resolve_cli(["extract-subtitles", "--help"]) else {
            panic!("expected help exit");
        };
        assert!(exit.document.is_none());
        assert_eq!(exit.code, 0);
        assert_eq!(exit.error.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn single_argument_resolves() {
        let cli = resolve_cli(["extract-subtitles", "dQw4w9WgXcQ"])
            .unwrap_or_else(|_| panic!("expected parsed cli"));
        assert_eq!(cli.video_id, "dQw4w9WgXcQ");
    }

    #[test]
    fn missing_video_id_is_usage_error() {
        let err = parse_args(["extract-subtitles"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn extra_positional_is_usage_error() {
        let err = parse_args(["extract-subtitles", "abc", "def"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn usage_document_is_compact_failure() {
        let json = serde_json::to_string(&usage_document()).unwrap();
        assert_eq!(
            json,
            r#"{"success":false,"error":"Usage: extract-subtitles <video_id>"}"#
        );
        assert_eq!(USAGE_EXIT_CODE, 1);
    }
}
