// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot `fetch` and `logs` commands.

use ampwatch_config::model::AmpwatchConfig;
use ampwatch_core::{AmpwatchError, LogStore, SortOrder};
use ampwatch_gateway::export::entries_to_csv;
use serde_json::Value;

use crate::serve::Pipeline;

/// Runs one cycle and prints the record with its `is_inserted` flag as JSON.
pub async fn run_fetch(config: AmpwatchConfig, cust_id: Option<String>) -> Result<(), AmpwatchError> {
    let pipeline = Pipeline::open(&config).await?;
    let result = pipeline.poller.fetch_on_demand(cust_id.as_deref()).await;
    pipeline.close().await;
    let outcome = result?;

    let mut json = serde_json::to_value(&outcome.record)
        .map_err(|e| AmpwatchError::Internal(format!("cannot render record: {e}")))?;
    if let Value::Object(map) = &mut json {
        map.insert("is_inserted".to_string(), Value::Bool(outcome.is_inserted()));
    }
    println!("{}", pretty(&json)?);
    Ok(())
}

/// Prints up to `limit` stored entries (zero for all), newest first unless `ascending`.
pub async fn run_logs(
    config: AmpwatchConfig,
    limit: usize,
    ascending: bool,
    csv: bool,
) -> Result<(), AmpwatchError> {
    let tz = config.poll.time_zone()?;
    let store = ampwatch_storage::SqliteLogStore::open(&config.storage, tz).await?;
    let order = if ascending {
        SortOrder::Ascending
    } else {
        SortOrder::Descending
    };
    let entries = store.most_recent(limit, order).await;
    store.close().await?;
    let entries = entries?;

    if csv {
        print!("{}", entries_to_csv(&entries)?);
    } else {
        let json = serde_json::to_value(&entries)
            .map_err(|e| AmpwatchError::Internal(format!("cannot render logs: {e}")))?;
        println!("{}", pretty(&json)?);
    }
    Ok(())
}

fn pretty(value: &Value) -> Result<String, AmpwatchError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| AmpwatchError::Internal(format!("cannot render json: {e}")))
}
