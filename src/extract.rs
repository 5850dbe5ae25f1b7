//! Request extractors whose rejections render as `AppError` bodies.
//!
//! Wraps axum's `Json`, `Path` and `Query` so a malformed body, path or
//! query string answers `400 invalid_input` with the usual `{kind, message}`.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);
