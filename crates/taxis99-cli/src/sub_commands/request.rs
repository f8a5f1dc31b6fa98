use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;
use taxis99::{CancellationToken, Client};

#[derive(Debug, Args)]
pub struct RequestSubCommand {
    /// HTTP method
    pub method: String,
    /// Path relative to the base URL
    pub path: String,
    /// JSON request body
    #[arg(short, long)]
    pub data: Option<String>,
    /// Do not read the response body
    #[arg(long)]
    pub discard: bool,
}

pub async fn request(client: &Client, sub_command_args: &RequestSubCommand) -> Result<()> {
    let body = sub_command_args
        .data
        .as_deref()
        .map(serde_json::from_str::<Value>)
        .transpose()
        .context("Request body is not valid JSON")?;

    let ctx = CancellationToken::new();
    let cancel = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling request");
            cancel.cancel();
        }
    });

    let method = sub_command_args.method.to_uppercase();

    if sub_command_args.discard {
        client
            .send(&ctx, &method, &sub_command_args.path, body.as_ref())
            .await?;
        return Ok(());
    }

    let mut response = Value::Null;
    client
        .request(
            &ctx,
            &method,
            &sub_command_args.path,
            body.as_ref(),
            Some(&mut response),
        )
        .await?;

    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
