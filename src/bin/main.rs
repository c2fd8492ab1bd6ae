use finance_assistant::{
    config::AssistantConfig,
    input::{InputChannel, InputEvent},
    ledger::Ledger,
    llm::{build_http_client, OpenAiClient},
    pipeline::{Orchestrator, SystemClock},
    voice,
};
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    let config = match AssistantConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("📌 Set OPENAI_API_KEY in your environment or in a .env file");
            std::process::exit(1);
        }
    };

    // Initialize tracing (stderr, so it never interleaves with the prompts)
    let default_filter = if config.verbose {
        "finance_assistant=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(model = %config.model, base_url = %config.base_url, "Financial assistant starting");

    let http = build_http_client(&config)?;

    // Create components
    let model = Arc::new(OpenAiClient::with_client(http.clone(), &config));
    let speech = voice::probe(&config, &http);

    let orchestrator = Orchestrator::with_model(
        model,
        Ledger::sample(),
        &config.language,
        &config.currency,
        Box::new(SystemClock),
    );

    let mut channel = InputChannel::new(
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        speech,
    );

    info!(voice = channel.voice_enabled(), "✅ Assistant ready");

    loop {
        match channel.next_request().await? {
            InputEvent::Exit => break,
            InputEvent::Request(request) => {
                orchestrator
                    .respond(&request, channel.writer(), config.verbose)
                    .await?;
            }
        }
    }

    Ok(())
}
