//! One full check cycle: retrieve, extract, reconcile, persist, render.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use uuid::Uuid;

use transferwatch_core::{reconcile, render, Observation, Outcome};

use crate::extract;
use crate::store::StateStore;
use crate::AppState;

/// The rendered result of one check, handed to whichever trigger asked for it.
/// The scheduled trigger delivers only when `noteworthy`; `/check` always does.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub text: String,
    pub noteworthy: bool,
}

/// Run one reconciliation cycle.
///
/// The whole read-decide-write sequence holds `check_lock`, so a scheduled run
/// and a manual `/check` can never interleave their baseline writes. A failed
/// baseline write aborts the cycle with an error before any report is
/// produced; retrieval and extraction failures are not errors but outcomes.
pub async fn run_check(state: &Arc<AppState>) -> Result<CheckReport> {
    let _guard = state.check_lock.lock().await;
    let correlation_id = Uuid::new_v4();
    info!(%correlation_id, "Starting transfer check");

    let observation = observe(state).await;
    reconcile_and_persist(&state.store, observation, correlation_id).await
}

/// Reconcile an observation against the stored baseline and persist the
/// rewritten baseline before any report exists, so a failed write can never
/// let a notification go out for transfers the baseline does not yet cover.
async fn reconcile_and_persist(
    store: &StateStore,
    observation: Observation,
    correlation_id: Uuid,
) -> Result<CheckReport> {
    let load_store = store.clone();
    let persisted = tokio::task::spawn_blocking(move || load_store.load())
        .await
        .context("spawn_blocking panicked")?;

    let (outcome, next) = reconcile(observation, &persisted);
    info!(
        %correlation_id,
        outcome = outcome_label(&outcome),
        noteworthy = outcome.is_noteworthy(),
        "Reconciliation complete"
    );

    if let Some(next) = next {
        let save_store = store.clone();
        tokio::task::spawn_blocking(move || save_store.save(&next))
            .await
            .context("spawn_blocking panicked")?
            .context("Failed to persist the new baseline")?;
        info!(%correlation_id, "Baseline persisted");
    }

    Ok(CheckReport {
        text: render(&outcome),
        noteworthy: outcome.is_noteworthy(),
    })
}

async fn observe(state: &Arc<AppState>) -> Observation {
    match state.fix_client.fetch_reveal_page().await {
        Ok(html) => extract::extract_observation(&html),
        Err(e) => {
            warn!("Retrieval failed: {:#}", e);
            Observation::Unavailable
        }
    }
}

fn outcome_label(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::LoginFailed => "login_failed",
        Outcome::ExtractionFailed => "extraction_failed",
        Outcome::GameweekRolledOver { .. } => "gameweek_rolled_over",
        Outcome::NoNewTransfers { .. } => "no_new_transfers",
        Outcome::NewTransfersFound { .. } => "new_transfers_found",
    }
}
