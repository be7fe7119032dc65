use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::state::AppState;

use super::require_user;

// POST /api/payments/create-order
#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub receipt: Option<String>,
}

#[derive(Serialize)]
pub struct CreateOrderResponse {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub key: String,
}

pub async fn create_order(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, AppError> {
    require_user(&state, &headers)?;

    let amount = body
        .amount
        .ok_or_else(|| AppError::Validation("amount is required".to_string()))?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::Validation(
            "amount must be a positive number".to_string(),
        ));
    }

    let currency = body.currency.unwrap_or_else(|| "INR".to_string());
    let receipt = body
        .receipt
        .unwrap_or_else(|| format!("receipt_{}", Utc::now().timestamp_millis()));

    // Gateways take the amount in minor units (paise for INR).
    let amount_minor = (amount * 100.0).round() as i64;

    let order = state
        .payments
        .create_order(amount_minor, &currency, &receipt)
        .await
        .map_err(|e| AppError::Payment(e.to_string()))?;

    Ok(Json(CreateOrderResponse {
        order_id: order.order_id,
        amount: order.amount_minor,
        currency: order.currency,
        key: state.payments.key_id().to_string(),
    }))
}

// POST /api/payments/verify
#[derive(Deserialize)]
pub struct VerifyPaymentRequest {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

#[derive(Serialize)]
pub struct VerifyPaymentResponse {
    pub message: String,
    pub payment_id: String,
    pub order_id: String,
}

pub async fn verify_payment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<VerifyPaymentRequest>,
) -> Result<Json<VerifyPaymentResponse>, AppError> {
    require_user(&state, &headers)?;

    if body.order_id.is_empty() || body.payment_id.is_empty() || body.signature.is_empty() {
        return Err(AppError::Validation(
            "missing payment verification data".to_string(),
        ));
    }

    if !state
        .payments
        .verify_signature(&body.order_id, &body.payment_id, &body.signature)
    {
        return Err(AppError::Validation(
            "invalid payment signature".to_string(),
        ));
    }

    Ok(Json(VerifyPaymentResponse {
        message: "payment verified".to_string(),
        payment_id: body.payment_id,
        order_id: body.order_id,
    }))
}
