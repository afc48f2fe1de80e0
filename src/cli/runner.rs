//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{config_json_schema, TapConfig};
use crate::engine::{Message, SyncConfig, SyncEngine};
use crate::error::Result;
use crate::http::HttpClient;
use crate::state::StateManager;
use crate::streams::{self, Catalog, StreamDefinition};
use chrono::Utc;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{error, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Spec => self.spec(),
            Commands::Check => self.check().await,
            Commands::Discover => self.discover(),
            Commands::Read {
                streams,
                max_records,
            } => self.read(streams.as_deref(), *max_records).await,
        }
    }

    /// Load configuration
    fn load_config(&self) -> Result<TapConfig> {
        TapConfig::load(&self.cli.config_sources())
    }

    /// Load state
    fn load_state(&self) -> Result<StateManager> {
        // Inline state takes precedence
        if let Some(state_json) = &self.cli.state_json {
            StateManager::from_json(state_json)
        } else if let Some(path) = &self.cli.state {
            StateManager::from_file(path)
        } else {
            Ok(StateManager::in_memory())
        }
    }

    /// Authenticated client for the admin API
    fn build_client(config: &TapConfig) -> Result<HttpClient> {
        HttpClient::with_auth(config.http_client_config(), config.auth_config())
    }

    /// Show spec
    fn spec(&self) -> Result<()> {
        self.output_message(&json!({
            "type": "SPEC",
            "spec": {
                "connectionSpecification": config_json_schema()
            }
        }));

        Ok(())
    }

    /// Check connection: obtain a token and read one page of today's events
    async fn check(&self) -> Result<()> {
        let config = self.load_config()?;
        let stream = StreamDefinition::activity_events();

        let notice = Message::info(format!(
            "Checking connection for tenant {}",
            config.tenant_id
        ));
        self.output_message(&notice.to_json());

        let status = match Self::probe(&config, &stream).await {
            Ok(count) => {
                info!(records = count, "Connection check succeeded");
                json!({
                    "status": "SUCCEEDED",
                    "message": "Connection successful"
                })
            }
            Err(e) => {
                error!(error = %e, "Connection check failed");
                json!({
                    "status": "FAILED",
                    "message": format!("Connection failed: {e}")
                })
            }
        };

        self.output_message(&json!({
            "type": "CONNECTION_STATUS",
            "connectionStatus": status
        }));

        Ok(())
    }

    /// Token request plus one page of today's window
    async fn probe(config: &TapConfig, stream: &StreamDefinition) -> Result<usize> {
        let client = Self::build_client(config)?;
        SyncEngine::new(client, StateManager::in_memory())
            .probe(stream)
            .await
    }

    /// Discover streams
    fn discover(&self) -> Result<()> {
        self.output_message(&json!({
            "type": "CATALOG",
            "catalog": Catalog::discover()
        }));

        Ok(())
    }

    /// Read data from the selected streams
    async fn read(&self, streams: Option<&str>, max_records: Option<usize>) -> Result<()> {
        let sync_start = Instant::now();
        let config = self.load_config()?;
        let state = self.load_state()?;

        let names: Vec<String> = streams
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        let selected = streams::select_streams(&names)?;

        let mut sync_config = SyncConfig::new();
        if let Some(max) = max_records {
            sync_config = sync_config.with_max_records(max);
        }

        let client = Self::build_client(&config)?;
        let mut engine = SyncEngine::new(client, state).with_config(sync_config);
        let default_start = config.default_start(Utc::now());

        for stream in &selected {
            info!(stream = %stream.name, default_start = %default_start, "Starting sync");

            let mut emit = |msg: Message| -> Result<()> {
                self.output_message(&msg.to_json());
                Ok(())
            };

            if let Err(e) = engine.sync_stream(stream, default_start, &mut emit).await {
                self.output_message(
                    &Message::error(format!("Error syncing stream {}: {e}", stream.name)).to_json(),
                );
                return Err(e);
            }
        }

        // Always emit final state to stdout so caller can capture it
        self.output_message(&Message::state(engine.state().to_value().await?).to_json());

        let stats = engine.stats();
        info!(
            streams = stats.streams_synced,
            records = stats.records_synced,
            pages = stats.pages_fetched,
            days = stats.days_completed,
            duration_ms = sync_start.elapsed().as_millis() as u64,
            state_file = ?self.cli.state,
            "Sync finished"
        );

        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        println!("{}", render(msg, self.cli.format));
    }
}

/// Render a message for stdout
fn render(msg: &Value, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string(msg).unwrap_or_default(),
        OutputFormat::Pretty => serde_json::to_string_pretty(msg).unwrap_or_default(),
    }
}
