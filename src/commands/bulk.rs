/// `bulk` command: validate every address in a file.
use std::io::Write;
use std::path::Path;

use crossterm::style::Color;
use tracing::{debug, info};

use super::Context;
use crate::api::{BatchOptions, ClientError, ValidationClient};
use crate::cli::Console;
use crate::cli::args::BulkArgs;
use crate::cli::output::write_bulk_result;
use crate::types::BulkResponse;
use crate::validation::{CommandError, Outcome, ProcessingMode, parse_addresses};

/// Warning shown when a batch goes async without a webhook.
const NO_WEBHOOK_WARNING: &str = "Large batch detected. Use --webhook for async processing";

/// Run `validkit bulk`.
///
/// Sync batches exit `1` when any address is invalid; async submissions
/// always exit `0` since only the submission is known to have succeeded.
///
/// # Errors
///
/// Returns `CommandError::MissingApiKey`, `ReadInput` or `EmptyInput` for
/// local problems, and `Api`/`Transport`/`WriteOutput` once the request
/// has been issued.
pub async fn run<C, F, O, E>(
    args: &BulkArgs,
    ctx: &Context,
    connect: F,
    console: &mut Console<O, E>,
) -> Result<Outcome, CommandError>
where
    C: ValidationClient,
    F: FnOnce(String) -> Result<C, ClientError>,
    O: Write,
    E: Write,
{
    console.set_quiet(ctx.settings.quiet);
    let api_key = ctx.require_api_key()?;
    let emails = read_addresses(&args.file)?;
    let count = emails.len();

    console.start(&format!("Validating {count} emails..."));

    let mode = ProcessingMode::resolve(args.run_async, count);
    info!(count, mode = ?mode, "processing bulk file");
    if mode.is_async() && args.webhook.is_none() {
        console.warn(NO_WEBHOOK_WARNING);
    }

    match submit(args, ctx, connect(api_key), console, &emails, mode).await {
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            console.fail("Bulk validation failed");
            Err(e)
        }
    }
}

async fn submit<C, O, E>(
    args: &BulkArgs,
    ctx: &Context,
    client: Result<C, ClientError>,
    console: &mut Console<O, E>,
    emails: &[String],
    mode: ProcessingMode,
) -> Result<Outcome, CommandError>
where
    C: ValidationClient,
    O: Write,
    E: Write,
{
    let settings = &ctx.settings;
    let opts = BatchOptions {
        format: settings.response_format(),
        trace_id: args.trace_id.clone(),
        webhook_url: args.webhook.clone(),
        share_signals: args.share_signals,
    };

    let client = client?;
    let result = match mode {
        ProcessingMode::Async => {
            let job = client.verify_batch_async(emails, &opts).await?;
            console.succeed(&format!("Batch job created: {}", job.job_id()));
            BulkResponse::Job(job)
        }
        ProcessingMode::Sync => {
            let batch = client.verify_batch(emails, &opts).await?;
            console.succeed(&format!("Validated {} emails", emails.len()));
            batch
        }
    };

    let palette = console.palette;
    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&result).map_err(std::io::Error::from)?;
        std::fs::write(path, json).map_err(|source| CommandError::WriteOutput {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "results written");
        if !settings.quiet {
            let saved = format!("Results saved to: {}", path.display());
            writeln!(console.out, "{}", palette.paint(&saved, Color::Green))?;
        }
    } else {
        write_bulk_result(&mut console.out, palette, &result, settings.format, settings.quiet)?;
    }

    if mode.is_async() {
        return Ok(Outcome::Submitted);
    }
    Ok(Outcome::from_invalid_count(result.invalid_count()))
}

/// Read and split the input file.
fn read_addresses(path: &Path) -> Result<Vec<String>, CommandError> {
    let content = std::fs::read_to_string(path).map_err(|source| CommandError::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;
    let emails = parse_addresses(&content);
    if emails.is_empty() {
        return Err(CommandError::EmptyInput {
            path: path.to_path_buf(),
        });
    }
    Ok(emails)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{OutputFormat, Palette};
    use crate::commands::Settings;
    use crate::commands::testing::{Call, FakeClient, Reply};
    use crate::credentials::ConfigStore;
    use serde_json::{Value, json};
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
            }
        }

        fn ctx(&self, quiet: bool) -> Context {
            Context {
                settings: Settings {
                    api_key: Some("vk_flag".to_owned()),
                    format: OutputFormat::Table,
                    quiet,
                },
                store: ConfigStore::new(self.dir.path().join("config.json")),
            }
        }

        fn input(&self, content: &str) -> PathBuf {
            let path = self.dir.path().join("emails.txt");
            std::fs::write(&path, content).unwrap();
            path
        }
    }

    fn args(file: PathBuf) -> BulkArgs {
        BulkArgs {
            file,
            output: None,
            run_async: false,
            webhook: None,
            trace_id: None,
            share_signals: false,
        }
    }

    fn console() -> Console<Vec<u8>, Vec<u8>> {
        Console::new(Vec::new(), Vec::new(), Palette::plain())
    }

    fn batch(value: Value) -> Reply {
        Reply::Bulk(serde_json::from_value(value).unwrap())
    }

    #[tokio::test]
    async fn test_mixed_results_exit_one() {
        let fx = Fixture::new();
        let file = fx.input("good@example.com\nbad@example.com\n");
        let client = FakeClient::new(batch(json!({
            "data": {
                "summary": {"total": 2, "valid": 1, "invalid": 1},
                "results": [
                    {"email": "good@example.com", "valid": true, "risk": "low"},
                    {"email": "bad@example.com", "valid": false, "risk": "invalid"}
                ]
            }
        })));
        let mut console = console();

        let outcome = run(&args(file), &fx.ctx(false), |_| Ok(&client), &mut console)
            .await
            .unwrap();

        assert_eq!(outcome.exit_code(), 1);
        let out = String::from_utf8(console.out).unwrap();
        assert!(out.contains("Total: 2"));
        assert!(out.contains("bad@example.com"));
        assert!(String::from_utf8(console.err).unwrap().contains("Validated 2 emails"));
    }

    #[tokio::test]
    async fn test_summary_only_response_exit_one() {
        let fx = Fixture::new();
        let file = fx.input("a@x.com\nb@x.com\n");
        let client = FakeClient::new(batch(json!({
            "data": {"summary": {"total": 2, "valid": 1, "invalid": 1}}
        })));
        let mut console = console();

        let outcome = run(&args(file), &fx.ctx(true), |_| Ok(&client), &mut console)
            .await
            .unwrap();
        assert_eq!(outcome.exit_code(), 1);
        assert!(console.out.is_empty());
        assert!(console.err.is_empty());
    }

    #[tokio::test]
    async fn test_all_valid_exit_zero() {
        let fx = Fixture::new();
        let file = fx.input("a@x.com\n\nb@x.com\n  \n");
        let client = FakeClient::new(batch(json!([{"v": true}, {"v": true}])));
        let mut console = console();
        let mut bulk_args = args(file);
        bulk_args.share_signals = true;
        bulk_args.trace_id = Some("run-9".to_owned());

        let outcome = run(&bulk_args, &fx.ctx(false), |_| Ok(&client), &mut console)
            .await
            .unwrap();

        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(
            client.calls.lock().unwrap()[0],
            Call::Batch {
                count: 2,
                trace_id: Some("run-9".to_owned()),
                share_signals: true,
            }
        );
    }

    #[tokio::test]
    async fn test_large_batch_goes_async_with_warning() {
        let fx = Fixture::new();
        let content: String = (0..1001).map(|i| format!("user{i}@x.com\n")).collect();
        let file = fx.input(&content);
        let client = FakeClient::new(Reply::Job(
            serde_json::from_value(json!({"job_id": "job_42", "status": "queued"})).unwrap(),
        ));
        let mut console = console();

        let outcome = run(&args(file), &fx.ctx(false), |_| Ok(&client), &mut console)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Submitted);
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(
            client.calls.lock().unwrap()[0],
            Call::BatchAsync {
                count: 1001,
                webhook: None
            }
        );
        let err = String::from_utf8(console.err).unwrap();
        assert!(err.contains(NO_WEBHOOK_WARNING));
        assert!(err.contains("Batch job created: job_42"));
        assert!(String::from_utf8(console.out).unwrap().contains("Job ID: job_42"));
    }

    #[tokio::test]
    async fn test_explicit_async_with_webhook_no_warning() {
        let fx = Fixture::new();
        let file = fx.input("a@x.com\n");
        let client = FakeClient::new(Reply::Job(
            serde_json::from_value(json!({"job_id": "job_1", "status": "queued"})).unwrap(),
        ));
        let mut console = console();
        let mut bulk_args = args(file);
        bulk_args.run_async = true;
        bulk_args.webhook = Some("https://hooks.example.com/vk".to_owned());

        run(&bulk_args, &fx.ctx(false), |_| Ok(&client), &mut console)
            .await
            .unwrap();

        assert!(!String::from_utf8(console.err).unwrap().contains(NO_WEBHOOK_WARNING));
        assert_eq!(
            client.calls.lock().unwrap()[0],
            Call::BatchAsync {
                count: 1,
                webhook: Some("https://hooks.example.com/vk".to_owned())
            }
        );
    }

    #[tokio::test]
    async fn test_output_file_gets_raw_json() {
        let fx = Fixture::new();
        let file = fx.input("a@x.com\nb@x.com\n");
        let out_path = fx.dir.path().join("results.json");
        let raw = json!({
            "data": {
                "summary": {"total": 2, "valid": 1, "invalid": 1},
                "from_pool": 3,
                "results": [{"email": "a@x.com", "valid": true}, {"email": "b@x.com"}]
            }
        });
        let client = FakeClient::new(batch(raw.clone()));
        let mut console = console();
        let mut bulk_args = args(file);
        bulk_args.output = Some(out_path.clone());

        let outcome = run(&bulk_args, &fx.ctx(false), |_| Ok(&client), &mut console)
            .await
            .unwrap();

        assert_eq!(outcome.exit_code(), 1);
        let saved: Value =
            serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
        assert_eq!(saved, raw);
        let out = String::from_utf8(console.out).unwrap();
        assert!(out.contains("Results saved to:"));
        assert!(!out.contains("Bulk Validation Summary"));
    }

    #[tokio::test]
    async fn test_missing_file_exits_one() {
        let fx = Fixture::new();
        let mut console = console();
        let err = run(
            &args(fx.dir.path().join("nope.txt")),
            &fx.ctx(false),
            |_| Err::<&FakeClient, _>(ClientError::Parse("must not connect".to_owned())),
            &mut console,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CommandError::ReadInput { .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_blank_file_exits_one() {
        let fx = Fixture::new();
        let file = fx.input("\n   \n");
        let mut console = console();
        let err = run(
            &args(file),
            &fx.ctx(false),
            |_| Err::<&FakeClient, _>(ClientError::Parse("must not connect".to_owned())),
            &mut console,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CommandError::EmptyInput { .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_exits_two() {
        let fx = Fixture::new();
        let file = fx.input("a@x.com\n");
        let client = FakeClient::new(Reply::Fail(ClientError::Parse("eof".to_owned())));
        let mut console = console();

        let err = run(&args(file), &fx.ctx(false), |_| Ok(&client), &mut console)
            .await
            .unwrap_err();

        assert_eq!(err.exit_code(), 2);
        assert!(String::from_utf8(console.err).unwrap().contains("Bulk validation failed"));
    }
}
