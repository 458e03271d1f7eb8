//! API handlers
//!
//! Every handler answers with the [`ApiResponse`](crate::error::ApiResponse)
//! envelope on success and an [`AppError`] on failure.

pub mod auth;
pub mod health;
pub mod menus;
pub mod orders;
pub mod owners;
pub mod shops;

use crate::error::AppError;
use axum::extract::FromRequest;

/// JSON body extractor whose rejection is rendered as the error envelope
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
