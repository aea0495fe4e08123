//! Synthesize and call a two-argument `add` function through OpenRouter.
//!
//! Requires an `OPENROUTER_API_KEY` environment variable.
//!
//! Run with: cargo run --example synthesize_add

use conjure_client::OpenRouterClient;
use conjure_core::{CallArgs, FunctionContract, SynthesisConfig, Synthesizer, TypeDescriptor};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,conjure_core=debug".into()),
        )
        .init();

    let api_key = std::env::var("OPENROUTER_API_KEY")
        .map_err(|_| anyhow::anyhow!("OPENROUTER_API_KEY is not set"))?;

    let client = OpenRouterClient::new(api_key);
    let config = SynthesisConfig::new().with_cache_enabled(true);
    let synthesizer = Synthesizer::with_config(Arc::new(client), config);

    let contract = FunctionContract::builder("add")
        .parameter("x", TypeDescriptor::Int)
        .parameter("y", TypeDescriptor::Int)
        .returns(TypeDescriptor::Int)
        .docstring("returns the sum of x and y")
        .build()?;

    let add = synthesizer.function("demo::add", contract);

    // First call triggers generation; the second is served from the registry.
    let first = add.call(CallArgs::positional([2i64, 3])).await?;
    println!("add(2, 3) = {}", first);

    let second = add.call(CallArgs::positional([40i64, 2])).await?;
    println!("add(40, 2) = {}", second);

    Ok(())
}
