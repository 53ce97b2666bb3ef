use std::ffi::OsString;
use std::io::{Read, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use serde_json::Value;

use cma_core::impls::aws::{S3ObjectStore, SfnExecutionHistory, load_sdk_config};
use cma_core::settings::SettingsError;
use cma_core::{AdapterBuilder, AdapterError, AdapterSettings, ErrorKind, MessageAdapter};

mod observability;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Operation {
    #[value(name = "loadRemoteEvent")]
    LoadRemoteEvent,
    #[value(name = "loadNestedEvent")]
    LoadNestedEvent,
    #[value(name = "createNextEvent")]
    CreateNextEvent,
}

/// Reads one JSON object from stdin, writes one JSON object to stdout.
///
/// stdout は結果の JSON 専用なので、help / version フラグは持たない。
#[derive(Debug, Parser)]
#[command(
    name = "cumulus-message-adapter",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Cli {
    operation: Operation,
}

/// stdin の入力: `event` は必須、それ以外は操作によって使う
///
/// `handler_response` はタスクの戻り値そのもの。`null` も有効な戻り値で、
/// 省略した場合も `null` として扱う。
#[derive(Debug, Deserialize)]
struct Invocation {
    event: Value,
    #[serde(default)]
    context: Option<Value>,
    #[serde(default)]
    handler_response: Value,
    #[serde(default)]
    message_config: Option<Value>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let Some(cli) = parse_args(std::env::args_os(), &mut std::io::stderr()) else {
        return ExitCode::FAILURE;
    };
    let _ = dotenvy::dotenv();
    if let Err(e) = observability::init_tracing() {
        eprintln!("Warning: failed to initialize logging: {e}");
    }

    let outcome = invoke(cli.operation).await;
    let succeeded = emit(
        cli.operation,
        outcome,
        &mut std::io::stdout().lock(),
        &mut std::io::stderr().lock(),
    );
    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// 引数エラーは clap の既定（exit 2）ではなく、呼び出し失敗として扱う
fn parse_args<I, T>(args: I, stderr: &mut impl Write) -> Option<Cli>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Some(cli),
        Err(e) => {
            let _ = write!(stderr, "{e}");
            None
        }
    }
}

/// stdin を読み、AWS の collaborator で組み立てた adapter で実行する
async fn invoke(operation: Operation) -> anyhow::Result<Value> {
    let mut raw = String::new();
    std::io::stdin()
        .read_to_string(&mut raw)
        .context("reading stdin")?;

    let adapter = build_adapter(AdapterSettings::from_env()?).await?;
    run(&adapter, operation, &raw).await
}

async fn build_adapter(settings: AdapterSettings) -> anyhow::Result<MessageAdapter> {
    let sdk = load_sdk_config().await;
    let adapter = AdapterBuilder::new()
        .object_store(Arc::new(S3ObjectStore::from_config(&sdk)))
        .execution_history(Arc::new(SfnExecutionHistory::from_config(&sdk)))
        .settings(settings)
        .build()?;
    Ok(adapter)
}

/// 1 回分の入力 JSON を解釈して操作を実行する
async fn run(adapter: &MessageAdapter, operation: Operation, raw: &str) -> anyhow::Result<Value> {
    let input: Invocation = serde_json::from_str(raw)?;

    let result = match operation {
        Operation::LoadRemoteEvent => adapter.load_remote_event(input.event).await?,
        Operation::LoadNestedEvent => adapter
            .load_nested_event(&input.event, input.context.as_ref())
            .await?
            .into_value(),
        Operation::CreateNextEvent => {
            adapter
                .create_next_event(
                    &input.handler_response,
                    &input.event,
                    input.message_config.as_ref(),
                )
                .await?
        }
    };
    Ok(result)
}

/// 結果を書き出し、成功なら `true`
///
/// 空でない結果だけが成功。失敗は stderr に 1 件だけ報告する。
fn emit(
    operation: Operation,
    outcome: anyhow::Result<Value>,
    stdout: &mut impl Write,
    stderr: &mut impl Write,
) -> bool {
    let written = outcome.and_then(|result| -> anyhow::Result<bool> {
        if !is_non_empty(&result) {
            return Ok(false);
        }
        serde_json::to_writer(&mut *stdout, &result)?;
        stdout.flush()?;
        Ok(true)
    });

    match written {
        Ok(true) => true,
        Ok(false) => {
            tracing::warn!(operation = ?operation, "operation produced an empty result");
            false
        }
        Err(e) => {
            let _ = write!(stderr, "{}", report(&e));
            false
        }
    }
}

fn is_non_empty(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(m) => !m.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// stderr に出す診断メッセージ
fn report(error: &anyhow::Error) -> String {
    if let Some(e) = error.downcast_ref::<AdapterError>() {
        return match e.kind() {
            ErrorKind::Resolution => format!("Lookup error: {e}"),
            kind => format!("Unexpected error: {kind}. {e}"),
        };
    }

    let category = if error.is::<serde_json::Error>() {
        "InvalidInput"
    } else if error.is::<SettingsError>() {
        "SettingsError"
    } else if error.is::<std::io::Error>() {
        "IoError"
    } else {
        "Error"
    };
    format!("Unexpected error: {category}. {error:#}")
}
