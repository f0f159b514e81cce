//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::client::ParseClient;
use crate::config::ClientConfig;
use crate::error::{Error, Result, ResultExt};
use crate::query::QueryOptions;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

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
        let client = ParseClient::from_config(&self.load_config()?)?;

        match &self.cli.command {
            Commands::Scan {
                class,
                where_clause,
                max,
            } => {
                self.scan(&client, class, where_clause.as_deref(), *max)
                    .await
            }
            Commands::Query {
                class,
                where_clause,
                limit,
                skip,
                order,
                keys,
            } => {
                let mut options = QueryOptions::new();
                if let Some(clause) = where_clause {
                    options = options.where_clause(clause);
                }
                if let Some(limit) = limit {
                    options = options.limit(*limit);
                }
                if let Some(skip) = skip {
                    options = options.skip(*skip);
                }
                if let Some(order) = order {
                    options = options.order(order);
                }
                if let Some(keys) = keys {
                    options = options.keys(keys.split(',').map(str::trim));
                }
                let results: Vec<Value> = client.query_class(class, &options).await?;
                for record in &results {
                    self.output(record);
                }
                Ok(())
            }
            Commands::Get { class, id } => {
                let object: Value = client.get(class, id).await?;
                self.output(&object);
                Ok(())
            }
            Commands::Create { class, json } => {
                let object = parse_json_arg(json)?;
                let created = client.create(class, &object).await?;
                self.output(&created);
                Ok(())
            }
            Commands::Update { class, id, json } => {
                let changes = parse_json_arg(json)?;
                let updated = client.update(class, id, &changes).await?;
                self.output(&updated);
                Ok(())
            }
            Commands::Delete { class, id } => {
                client.delete(class, id).await?;
                info!(class = %class, id = %id, "Deleted");
                Ok(())
            }
            Commands::Count {
                class,
                where_clause,
            } => {
                let count = client
                    .count(class, where_clause.as_deref().unwrap_or_default())
                    .await?;
                self.output(&serde_json::json!({ "count": count }));
                Ok(())
            }
        }
    }

    /// Build the client config from file or environment, then apply flags
    pub fn load_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.cli.config {
            Some(path) => ClientConfig::from_file(path).with_context(|| {
                format!("Failed to load config file '{}'", path.display())
            })?,
            None => ClientConfig::from_env()
                .context("No config file given and environment is incomplete")?,
        };

        if let Some(url) = &self.cli.server_url {
            config.server_url.clone_from(url);
        }
        if let Some(key) = &self.cli.master_key {
            config.master_key = Some(key.clone());
        }
        if let Some(token) = &self.cli.session_token {
            config.session_token = Some(token.clone());
        }

        config.validate()?;
        Ok(config)
    }

    async fn scan(
        &self,
        client: &ParseClient,
        class: &str,
        where_clause: Option<&str>,
        max: Option<u64>,
    ) -> Result<()> {
        let mut cursor = client.cursor(class, where_clause.unwrap_or_default());

        while max.map_or(true, |max| cursor.processed() < max) {
            match cursor.next().await {
                Some(record) => self.output(&record),
                None => break,
            }
        }

        if let Some(err) = cursor.last_error() {
            return Err(Error::Other(format!(
                "Scan of '{class}' stopped after {} records: {err}",
                cursor.processed()
            )));
        }

        info!(class, records = cursor.processed(), "Scan finished");
        Ok(())
    }

    fn output<T: Serialize>(&self, value: &T) {
        let rendered = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value),
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
        };
        println!("{}", rendered.unwrap_or_default());
    }
}

fn parse_json_arg(raw: &str) -> Result<Value> {
    serde_json::from_str(raw).context("Invalid JSON argument")
}
