//! API Routes
//!
//! HTTP endpoint definitions. Requests are form-encoded; every response is
//! JSON naming the UI state to show next.

use axum::{
    extract::{rejection::FormRejection, Extension, State},
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{withdrawal, Balance, MenuEntry, OperationContext};
use crate::error::{AppError, Rejection, LOGIN_FORM};
use crate::handlers::{ChangePinCommand, DepositCommand, WithdrawCommand};
use crate::ledger::Receipt;
use crate::session::SessionId;

use super::middleware::expired_session_cookie;
use super::AppState;

const MENU: &str = "/menu";
const DEPOSIT_FORM: &str = "/deposit";
const WITHDRAW_FORM: &str = "/withdraw";
const CHANGE_PIN_FORM: &str = "/change_pin";

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub pin: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("name", &self.name)
            .field("pin", &"****")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    #[serde(default)]
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    #[serde(default)]
    pub option: Option<String>,
    #[serde(default)]
    pub other_amount: Option<String>,
}

#[derive(Deserialize)]
pub struct ChangePinRequest {
    #[serde(default)]
    pub new_pin: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IndexResponse {
    pub authenticated: bool,
    pub next: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub customer_name: String,
    pub next: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    pub next: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MenuResponse {
    pub name: String,
    pub balance: Balance,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub balance: Balance,
}

#[derive(Debug, Serialize)]
pub struct WithdrawOptionsResponse {
    pub options: Vec<MenuEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub amount: i64,
    pub balance: Balance,
    pub message: String,
    pub next: String,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the ATM router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/login", post(login))
        .route("/logout", get(logout).post(logout))
        .route("/menu", get(menu))
        .route("/balance", get(balance))
        .route("/deposit", post(deposit))
        .route("/withdraw", get(withdraw_options).post(withdraw))
        .route("/change_pin", post(change_pin))
        .route("/receipt", get(receipt))
}

// =========================================================================
// Form bodies
// =========================================================================

fn malformed(rejection: FormRejection) -> AppError {
    AppError::BadRequest(rejection.body_text())
}

/// Unwrap the body of a session-bound form. An unreadable body is reported
/// only after the session check, so anonymous clients still get
/// `Unauthenticated`.
async fn session_form<T>(
    state: &AppState,
    session: SessionId,
    form: Result<Form<T>, FormRejection>,
    return_to: &'static str,
) -> Result<T, Rejection> {
    match form {
        Ok(Form(request)) => Ok(request),
        Err(rejection) => {
            state
                .auth()
                .require_session(session)
                .await
                .map_err(|e| e.on(return_to))?;
            Err(malformed(rejection).on(return_to))
        }
    }
}

// =========================================================================
// GET /
// =========================================================================

/// Where a client should go first
async fn index(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Json<IndexResponse> {
    let authenticated = state.sessions.touch(session).await.is_authenticated();
    let next = if authenticated { MENU } else { LOGIN_FORM };

    Json(IndexResponse {
        authenticated,
        next: next.to_string(),
    })
}

// =========================================================================
// POST /login
// =========================================================================

async fn login(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    form: Result<Form<LoginRequest>, FormRejection>,
) -> Result<Json<LoginResponse>, Rejection> {
    let Form(request) = form.map_err(|e| malformed(e).on(LOGIN_FORM))?;

    let identity = state
        .auth()
        .authenticate(session, &request.name, &request.pin)
        .await
        .map_err(|e| e.on(LOGIN_FORM))?;

    Ok(Json(LoginResponse {
        customer_name: identity.customer_name,
        next: MENU.to_string(),
    }))
}

// =========================================================================
// GET|POST /logout
// =========================================================================

async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> impl IntoResponse {
    state.auth().logout(session).await;

    (
        AppendHeaders([(SET_COOKIE, expired_session_cookie())]),
        Json(MessageResponse {
            message: "You have logged out.".to_string(),
            next: LOGIN_FORM.to_string(),
        }),
    )
}

// =========================================================================
// GET /menu
// =========================================================================

async fn menu(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<MenuResponse>, Rejection> {
    let view = state
        .teller()
        .menu(session, &context)
        .await
        .map_err(|e| e.on(MENU))?;

    Ok(Json(MenuResponse {
        name: view.name,
        balance: view.balance,
    }))
}

// =========================================================================
// GET /balance
// =========================================================================

async fn balance(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<BalanceResponse>, Rejection> {
    let balance = state
        .teller()
        .balance(session, &context)
        .await
        .map_err(|e| e.on(MENU))?;

    Ok(Json(BalanceResponse { balance }))
}

// =========================================================================
// POST /deposit
// =========================================================================

async fn deposit(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Extension(context): Extension<OperationContext>,
    form: Result<Form<DepositRequest>, FormRejection>,
) -> Result<Json<TransactionResponse>, Rejection> {
    let request = session_form(&state, session, form, DEPOSIT_FORM).await?;

    let result = state
        .teller()
        .deposit(session, DepositCommand::new(request.amount), &context)
        .await
        .map_err(|e| e.on(DEPOSIT_FORM))?;

    Ok(Json(TransactionResponse {
        amount: result.amount,
        balance: result.balance,
        message: result.message,
        next: MENU.to_string(),
    }))
}

// =========================================================================
// GET|POST /withdraw
// =========================================================================

/// The withdraw menu, for logged-in sessions only
async fn withdraw_options(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Result<Json<WithdrawOptionsResponse>, Rejection> {
    state
        .auth()
        .require_session(session)
        .await
        .map_err(|e| e.on(WITHDRAW_FORM))?;

    Ok(Json(WithdrawOptionsResponse {
        options: withdrawal::menu(),
    }))
}

async fn withdraw(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Extension(context): Extension<OperationContext>,
    form: Result<Form<WithdrawRequest>, FormRejection>,
) -> Result<Json<TransactionResponse>, Rejection> {
    let request = session_form(&state, session, form, WITHDRAW_FORM).await?;

    let command = WithdrawCommand {
        option: request.option,
        other_amount: request.other_amount,
    };

    let result = state
        .teller()
        .withdraw(session, command, &context)
        .await
        .map_err(|e| e.on(WITHDRAW_FORM))?;

    Ok(Json(TransactionResponse {
        amount: result.amount,
        balance: result.balance,
        message: result.message,
        next: MENU.to_string(),
    }))
}

// =========================================================================
// POST /change_pin
// =========================================================================

async fn change_pin(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Extension(context): Extension<OperationContext>,
    form: Result<Form<ChangePinRequest>, FormRejection>,
) -> Result<Json<MessageResponse>, Rejection> {
    let request = session_form(&state, session, form, CHANGE_PIN_FORM).await?;

    state
        .teller()
        .change_pin(session, ChangePinCommand::new(request.new_pin), &context)
        .await
        .map_err(|e| e.on(CHANGE_PIN_FORM))?;

    Ok(Json(MessageResponse {
        message: "PIN changed successfully.".to_string(),
        next: MENU.to_string(),
    }))
}

// =========================================================================
// GET /receipt
// =========================================================================

async fn receipt(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<Receipt>, Rejection> {
    let receipt = state
        .teller()
        .receipt(session, &context)
        .await
        .map_err(|e| e.on(MENU))?;

    Ok(Json(receipt))
}
