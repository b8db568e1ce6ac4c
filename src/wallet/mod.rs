use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::wallet::{PartnerWallet, RechargePlan, TransactionKind, WalletTransaction};
use crate::state::AppState;

/// A partner may go live iff they hold ride credits or a live validity window.
pub fn can_activate(wallet: &PartnerWallet, now: DateTime<Utc>) -> bool {
    wallet.rides_remaining > 0 || wallet.valid_until.is_some_and(|until| until >= now)
}

/// Applies a recharge plan: ride credits add up, the validity window extends
/// from whichever is later of now and the current expiry.
pub fn apply_credit(wallet: &mut PartnerWallet, plan: &RechargePlan, now: DateTime<Utc>) {
    if let Some(credits) = plan.ride_credits {
        wallet.rides_remaining += credits;
    }

    if let Some(days) = plan.duration_days {
        let base = match wallet.valid_until {
            Some(until) if until > now => until,
            _ => now,
        };
        wallet.valid_until = Some(base + Duration::days(i64::from(days)));
    }

    wallet.balance += plan.amount;
    wallet.updated_at = now;
}

/// Decrements one ride credit iff any remain; never goes negative and never
/// touches the validity window. Returns whether a credit was consumed.
pub fn try_consume(wallet: &mut PartnerWallet, now: DateTime<Utc>) -> bool {
    if wallet.rides_remaining == 0 {
        return false;
    }
    wallet.rides_remaining -= 1;
    wallet.updated_at = now;
    true
}

/// Recharge entry point: credits the wallet and appends the audit record.
pub fn recharge(
    state: &AppState,
    partner_id: Uuid,
    plan_id: u32,
) -> Result<PartnerWallet, AppError> {
    let plan = state
        .plans
        .iter()
        .find(|p| p.id == plan_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("recharge plan {plan_id} not found")))?;

    let now = Utc::now();
    let mut wallet = state
        .wallets
        .get_mut(&partner_id)
        .ok_or_else(|| AppError::NotFound(format!("wallet for partner {partner_id} not found")))?;

    apply_credit(&mut wallet, &plan, now);
    let snapshot = wallet.clone();
    drop(wallet);

    record_transaction(
        state,
        partner_id,
        TransactionKind::Credit,
        plan.amount,
        Some(plan.id),
        None,
        format!("recharge via {}", plan.name),
    );

    state
        .metrics
        .wallet_rides_remaining
        .with_label_values(&[&partner_id.to_string()])
        .set(f64::from(snapshot.rides_remaining));

    info!(
        partner_id = %partner_id,
        plan = %plan.name,
        rides_remaining = snapshot.rides_remaining,
        "wallet recharged"
    );

    Ok(snapshot)
}

/// Consumes one ride credit for a completed booking and records the debit.
/// Missing wallets are reported as errors for the caller to log; the ledger
/// is only written when a credit was actually consumed.
pub fn consume_one_ride(
    state: &AppState,
    partner_id: Uuid,
    booking_id: Uuid,
) -> Result<u32, AppError> {
    let now = Utc::now();
    let mut wallet = state
        .wallets
        .get_mut(&partner_id)
        .ok_or_else(|| AppError::NotFound(format!("wallet for partner {partner_id} not found")))?;

    let consumed = try_consume(&mut wallet, now);
    let remaining = wallet.rides_remaining;
    drop(wallet);

    if consumed {
        record_transaction(
            state,
            partner_id,
            TransactionKind::Debit,
            Decimal::ZERO,
            None,
            Some(booking_id),
            "ride credit consumed on completion".to_string(),
        );

        state
            .metrics
            .wallet_rides_remaining
            .with_label_values(&[&partner_id.to_string()])
            .set(f64::from(remaining));
    }

    Ok(remaining)
}

fn record_transaction(
    state: &AppState,
    partner_id: Uuid,
    kind: TransactionKind,
    amount: Decimal,
    plan_id: Option<u32>,
    booking_id: Option<Uuid>,
    description: String,
) {
    let tx = WalletTransaction {
        id: Uuid::new_v4(),
        partner_id,
        kind,
        amount,
        plan_id,
        booking_id,
        description,
        timestamp: Utc::now(),
    };
    state.transactions.insert(tx.id, tx);
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::{apply_credit, can_activate, try_consume};
    use crate::models::wallet::{PartnerWallet, RechargePlan};

    fn plan(ride_credits: Option<u32>, duration_days: Option<u32>) -> RechargePlan {
        RechargePlan {
            id: 7,
            name: "test".to_string(),
            amount: Decimal::new(29900, 2),
            ride_credits,
            duration_days,
            description: String::new(),
        }
    }

    #[test]
    fn credit_adds_rides_and_sets_validity() {
        let now = Utc::now();
        let mut wallet = PartnerWallet::new(Uuid::new_v4(), now);
        wallet.rides_remaining = 5;

        apply_credit(&mut wallet, &plan(Some(35), Some(30)), now);

        assert_eq!(wallet.rides_remaining, 40);
        assert_eq!(wallet.valid_until, Some(now + Duration::days(30)));
        assert_eq!(wallet.balance, Decimal::new(29900, 2));
    }

    #[test]
    fn credit_extends_unexpired_validity_window() {
        let now = Utc::now();
        let mut wallet = PartnerWallet::new(Uuid::new_v4(), now);
        wallet.valid_until = Some(now + Duration::days(10));

        apply_credit(&mut wallet, &plan(None, Some(30)), now);

        assert_eq!(wallet.valid_until, Some(now + Duration::days(40)));
    }

    #[test]
    fn credit_restarts_expired_validity_window_from_now() {
        let now = Utc::now();
        let mut wallet = PartnerWallet::new(Uuid::new_v4(), now);
        wallet.valid_until = Some(now - Duration::days(5));

        apply_credit(&mut wallet, &plan(None, Some(30)), now);

        assert_eq!(wallet.valid_until, Some(now + Duration::days(30)));
    }

    #[test]
    fn consume_decrements_only_when_positive() {
        let now = Utc::now();
        let mut wallet = PartnerWallet::new(Uuid::new_v4(), now);
        wallet.rides_remaining = 1;
        wallet.valid_until = Some(now + Duration::days(3));

        assert!(try_consume(&mut wallet, now));
        assert_eq!(wallet.rides_remaining, 0);
        // validity window untouched
        assert_eq!(wallet.valid_until, Some(now + Duration::days(3)));

        assert!(!try_consume(&mut wallet, now));
        assert_eq!(wallet.rides_remaining, 0);
    }

    #[test]
    fn activation_requires_credits_or_window() {
        let now = Utc::now();
        let mut wallet = PartnerWallet::new(Uuid::new_v4(), now);
        assert!(!can_activate(&wallet, now));

        wallet.rides_remaining = 1;
        assert!(can_activate(&wallet, now));

        wallet.rides_remaining = 0;
        wallet.valid_until = Some(now + Duration::days(1));
        assert!(can_activate(&wallet, now));

        wallet.valid_until = Some(now - Duration::days(1));
        assert!(!can_activate(&wallet, now));
    }
}
