//! git-commit-message - CLI entry point.

use std::io::Write;
use std::num::NonZeroUsize;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use git_commit_message::git::{
    commit_with_message, discover_repo, has_staged_changes, repo_root, staged_diff,
};
use git_commit_message::llm::{generate, generate_with_info};
use git_commit_message::{CommitMessageResult, GenerationRequest, Provider};

/// Exit code for failures outside generation.
const EXIT_FAILURE: u8 = 1;

/// Exit code when nothing is staged.
const EXIT_NO_STAGED_CHANGES: u8 = 2;

/// Exit code when the LLM call fails.
const EXIT_GENERATION_FAILED: u8 = 3;

/// Generate a commit message from staged changes using OpenAI or Gemini.
#[derive(Parser, Debug)]
#[command(name = "git-commit-message")]
#[command(about = "Generate a commit message from staged changes using OpenAI or Gemini")]
#[command(version)]
struct Cli {
    /// Extra description of the change, given to the model as context
    description: Option<String>,

    /// Commit immediately with the generated message
    #[arg(long)]
    commit: bool,

    /// Open the editor on the message before committing (requires --commit)
    #[arg(long, requires = "commit")]
    edit: bool,

    /// Model name (falls back to OPENAI_MODEL / GEMINI_MODEL, then GIT_COMMIT_MESSAGE_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// LLM provider (GIT_COMMIT_MESSAGE_PROVIDER takes precedence)
    #[arg(long, value_enum)]
    provider: Option<Provider>,

    /// Output language/locale tag, e.g. en-GB or ko-KR
    #[arg(long)]
    language: Option<String>,

    /// Generate a single-line subject without a body
    #[arg(long)]
    one_line: bool,

    /// Maximum subject line length (defaults to 72)
    #[arg(long, value_name = "N")]
    max_length: Option<NonZeroUsize>,

    /// Print the prompt, raw response, and token usage
    #[arg(long)]
    debug: bool,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            eprintln!("Error: Failed to read the current directory: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(cli, &cwd, &mut std::io::stdout()).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Install the stderr log subscriber. stdout is reserved for the message.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("git_commit_message=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Generate (and optionally commit) a message for the repository at `cwd`.
///
/// The message or debug report goes to `out`; the returned value is the
/// process exit code.
async fn run(cli: Cli, cwd: &Path, out: &mut impl Write) -> Result<u8> {
    // Step 1: Locate the repository
    let repo = discover_repo(cwd)
        .context("Not a git repository. Run git-commit-message from within a git repository.")?;
    let root = repo_root(&repo)?;

    // Step 2: Collect the staged diff
    if !has_staged_changes(&repo).context("Failed to inspect staged changes")? {
        eprintln!("No staged changes found. Run 'git add' and try again.");
        return Ok(EXIT_NO_STAGED_CHANGES);
    }
    let diff = staged_diff(&repo).context("Failed to read staged diff")?;

    // Step 3: Generate
    let request = GenerationRequest::new(diff)
        .with_hint(cli.description)
        .with_model(cli.model)
        .with_provider(cli.provider)
        .with_language(cli.language)
        .with_single_line(cli.one_line)
        .with_subject_max(cli.max_length);

    let outcome = if cli.debug {
        generate_with_info(&request)
            .await
            .map(|info| (info.message().to_string(), Some(info)))
    } else {
        generate(&request).await.map(|message| (message, None))
    };

    let (message, info) = match outcome {
        Ok(generated) => generated,
        Err(e) => {
            eprintln!("Failed to generate commit message: {e}");
            return Ok(EXIT_GENERATION_FAILED);
        }
    };

    // Step 4: Print or commit
    if let Some(info) = &info {
        write_debug(out, info)?;
    } else if !cli.commit {
        writeln!(out, "{message}")?;
    }

    if !cli.commit {
        return Ok(0);
    }

    let code = commit_with_message(&root, &message, cli.edit)?;
    Ok(u8::try_from(code).unwrap_or(EXIT_FAILURE))
}

/// Write usage, prompt, response, and the final message.
fn write_debug(out: &mut impl Write, info: &CommitMessageResult) -> std::io::Result<()> {
    writeln!(out, "==== {} Usage ====", info.provider())?;
    writeln!(out, "model: {}", info.model())?;
    writeln!(out, "response_id: {}", info.response_id().unwrap_or("(n/a)"))?;
    if info.total_tokens().is_some() {
        writeln!(
            out,
            "tokens: prompt={} completion={} total={}",
            format_count(info.prompt_tokens()),
            format_count(info.completion_tokens()),
            format_count(info.total_tokens())
        )?;
    } else {
        writeln!(out, "tokens: (provider did not return usage)")?;
    }

    writeln!(out, "\n==== Prompt ====")?;
    writeln!(out, "{}", info.prompt())?;
    writeln!(out, "\n==== Response ====")?;
    writeln!(out, "{}", info.response_text())?;
    writeln!(out, "\n==== Commit Message ====")?;
    writeln!(out, "{}", info.message())
}

fn format_count(count: Option<u64>) -> String {
    count.map_or_else(|| "?".to_string(), |c| c.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use git2::Repository;
    use git_commit_message::llm::TokenUsage;
    use git_commit_message::llm::config::{
        LANGUAGE_ENV_VAR, MODEL_ENV_VAR, PROVIDER_ENV_VAR, TIMEOUT_ENV_VAR,
    };
    use serial_test::serial;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("git-commit-message").chain(args.iter().copied()))
    }

    /// Every variable generation reads, cleared, with `overrides` applied.
    fn clean_env<'a>(overrides: &[(&'a str, &'a str)]) -> Vec<(&'a str, Option<&'a str>)> {
        let mut vars: Vec<(&str, Option<&str>)> = [
            PROVIDER_ENV_VAR,
            MODEL_ENV_VAR,
            LANGUAGE_ENV_VAR,
            TIMEOUT_ENV_VAR,
            "OPENAI_API_KEY",
            "OPENAI_MODEL",
            "OPENAI_BASE_URL",
            "GOOGLE_API_KEY",
            "GEMINI_API_KEY",
            "GEMINI_MODEL",
            "GEMINI_BASE_URL",
        ]
        .into_iter()
        .map(|name| (name, None))
        .collect();

        for &(name, value) in overrides {
            match vars.iter_mut().find(|entry| entry.0 == name) {
                Some(entry) => entry.1 = Some(value),
                None => vars.push((name, Some(value))),
            }
        }
        vars
    }

    /// A repository with commit identity configured and `x` staged.
    fn repo_with_staged_change() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        {
            let mut config = repo.config().unwrap();
            config.set_str("user.name", "Test User").unwrap();
            config.set_str("user.email", "test@test.com").unwrap();
            config.set_bool("commit.gpgsign", false).unwrap();
        }
        std::fs::write(dir.path().join("x"), "foo\n").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("x")).unwrap();
        index.write().unwrap();
        (dir, repo)
    }

    async fn openai_server(body: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/responses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;
        server
    }

    fn reply(text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "resp_cli",
            "output": [{
                "type": "message",
                "role": "assistant",
                "content": [{"type": "output_text", "text": text}]
            }]
        })
    }

    // ============================================
    // Argument parsing
    // ============================================

    #[test]
    fn test_edit_requires_commit() {
        let err = parse(&["--edit"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let cli = parse(&["--commit", "--edit"]).unwrap();
        assert!(cli.commit);
        assert!(cli.edit);
    }

    #[test]
    fn test_max_length_zero_is_rejected() {
        let err = parse(&["--max-length", "0"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);

        let cli = parse(&["--max-length", "50"]).unwrap();
        assert_eq!(cli.max_length, NonZeroUsize::new(50));
    }

    #[test]
    fn test_provider_accepts_only_known_names() {
        let cli = parse(&["--provider", "google"]).unwrap();
        assert_eq!(cli.provider, Some(Provider::Google));

        let err = parse(&["--provider", "gemini"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_description_and_flags() {
        let cli = parse(&["fixes flaky test", "--one-line", "--language", "ko-KR", "-v"]).unwrap();
        assert_eq!(cli.description.as_deref(), Some("fixes flaky test"));
        assert!(cli.one_line);
        assert_eq!(cli.language.as_deref(), Some("ko-KR"));
        assert!(cli.verbose);
        assert!(!cli.commit);
        assert!(!cli.debug);
    }

    // ============================================
    // Debug report
    // ============================================

    #[test]
    fn test_debug_report_without_usage() {
        let info = CommitMessageResult::new(
            Provider::Google,
            "gemini-2.5-flash",
            "# Changes (diff)\n+foo",
            "Add foo constant",
            None,
            None,
        )
        .unwrap();

        let mut out = Vec::new();
        write_debug(&mut out, &info).unwrap();
        let report = String::from_utf8(out).unwrap();

        assert!(report.starts_with("==== google Usage ====\nmodel: gemini-2.5-flash\n"));
        assert!(report.contains("response_id: (n/a)\n"));
        assert!(report.contains("tokens: (provider did not return usage)\n"));
        assert!(report.contains("\n==== Prompt ====\n# Changes (diff)\n+foo\n"));
        assert!(report.ends_with("\n==== Commit Message ====\nAdd foo constant\n"));
    }

    #[test]
    fn test_debug_report_marks_missing_counts() {
        let usage = TokenUsage {
            prompt_tokens: Some(120),
            completion_tokens: None,
            total_tokens: Some(126),
        };
        let info = CommitMessageResult::new(
            Provider::OpenAi,
            "gpt-5-mini",
            "p",
            "Fix typo",
            Some("resp_1".to_string()),
            Some(usage),
        )
        .unwrap();

        let mut out = Vec::new();
        write_debug(&mut out, &info).unwrap();
        let report = String::from_utf8(out).unwrap();

        assert!(report.contains("response_id: resp_1\n"));
        assert!(report.contains("tokens: prompt=120 completion=? total=126\n"));
    }

    // ============================================
    // Exit codes
    // ============================================

    #[tokio::test]
    async fn test_nothing_staged_exits_2() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();

        let mut out = Vec::new();
        let code = run(parse(&[]).unwrap(), dir.path(), &mut out).await.unwrap();

        assert_eq!(code, EXIT_NO_STAGED_CHANGES);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_outside_repository_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        let err = run(parse(&[]).unwrap(), dir.path(), &mut out).await.unwrap_err();
        assert!(err.to_string().contains("Not a git repository"));
    }

    #[tokio::test]
    #[serial]
    async fn test_generation_failure_exits_3() {
        let (dir, _repo) = repo_with_staged_change();

        let mut out = Vec::new();
        let code = temp_env::async_with_vars(
            clean_env(&[]),
            run(parse(&[]).unwrap(), dir.path(), &mut out),
        )
        .await
        .unwrap();

        assert_eq!(code, EXIT_GENERATION_FAILED);
        assert!(out.is_empty());
    }

    #[tokio::test]
    #[serial]
    async fn test_prints_generated_message() {
        let (dir, _repo) = repo_with_staged_change();
        let server = openai_server(reply("Add foo constant")).await;
        let uri = server.uri();

        let mut out = Vec::new();
        let code = temp_env::async_with_vars(
            clean_env(&[("OPENAI_API_KEY", "sk-test"), ("OPENAI_BASE_URL", uri.as_str())]),
            run(parse(&["--one-line"]).unwrap(), dir.path(), &mut out),
        )
        .await
        .unwrap();

        assert_eq!(code, 0);
        assert_eq!(String::from_utf8(out).unwrap(), "Add foo constant\n");
    }

    #[tokio::test]
    #[serial]
    async fn test_debug_flag_prints_report() {
        let (dir, _repo) = repo_with_staged_change();
        let server = openai_server(reply("Add foo constant")).await;
        let uri = server.uri();

        let mut out = Vec::new();
        let code = temp_env::async_with_vars(
            clean_env(&[("OPENAI_API_KEY", "sk-test"), ("OPENAI_BASE_URL", uri.as_str())]),
            run(parse(&["--debug"]).unwrap(), dir.path(), &mut out),
        )
        .await
        .unwrap();

        assert_eq!(code, 0);
        let report = String::from_utf8(out).unwrap();
        assert!(report.starts_with("==== openai Usage ====\nmodel: gpt-5-mini\n"));
        assert!(report.contains("response_id: resp_cli\n"));
        assert!(report.contains("tokens: (provider did not return usage)\n"));
        assert!(report.contains("diff --git a/x b/x"));
    }

    #[tokio::test]
    #[serial]
    async fn test_commit_flag_records_message() {
        let (dir, repo) = repo_with_staged_change();
        let server = openai_server(reply("Add foo constant")).await;
        let uri = server.uri();

        let mut out = Vec::new();
        let code = temp_env::async_with_vars(
            clean_env(&[("OPENAI_API_KEY", "sk-test"), ("OPENAI_BASE_URL", uri.as_str())]),
            run(parse(&["--commit"]).unwrap(), dir.path(), &mut out),
        )
        .await
        .unwrap();

        assert_eq!(code, 0);
        assert!(out.is_empty());
        let head = repo.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.message().unwrap().trim(), "Add foo constant");
    }
}
