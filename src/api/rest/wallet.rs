use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::wallet::{PartnerWallet, RechargePlan, WalletTransaction};
use crate::state::AppState;
use crate::wallet;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/wallet/plans", get(list_plans))
        .route("/wallet/partner/:id", get(get_wallet))
        .route("/wallet/partner/:id/transactions", get(list_transactions))
        .route("/wallet/recharge", post(recharge))
}

async fn list_plans(State(state): State<Arc<AppState>>) -> Json<Vec<RechargePlan>> {
    Json(state.plans.clone())
}

async fn get_wallet(
    State(state): State<Arc<AppState>>,
    Path(partner_id): Path<Uuid>,
) -> Result<Json<PartnerWallet>, AppError> {
    let wallet = state
        .wallets
        .get(&partner_id)
        .ok_or_else(|| AppError::NotFound(format!("wallet for partner {partner_id} not found")))?;

    Ok(Json(wallet.value().clone()))
}

async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Path(partner_id): Path<Uuid>,
) -> Json<Vec<WalletTransaction>> {
    let mut transactions: Vec<WalletTransaction> = state
        .transactions
        .iter()
        .filter(|entry| entry.value().partner_id == partner_id)
        .map(|entry| entry.value().clone())
        .collect();

    transactions.sort_by_key(|tx| tx.timestamp);
    Json(transactions)
}

#[derive(Deserialize)]
pub struct RechargeRequest {
    pub partner_id: Uuid,
    pub plan_id: u32,
}

async fn recharge(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RechargeRequest>,
) -> Result<Json<PartnerWallet>, AppError> {
    let wallet = wallet::recharge(&state, payload.partner_id, payload.plan_id)?;
    Ok(Json(wallet))
}
