use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use dashboard_market_data::{provider::kis::KOSPI_INDEX_CODE, KisQuote};
use serde::Deserialize;

use crate::{
    api::{method_not_allowed, preflight},
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

#[derive(Debug, Deserialize)]
struct KisQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<String>,
}

/// What a query asks for, once validated.
#[derive(Debug, PartialEq, Eq)]
enum KisTarget {
    KospiIndex,
    Stock(String),
}

impl KisQuery {
    fn target(self) -> ApiResult<KisTarget> {
        match (self.kind.as_deref(), self.code) {
            (Some("index"), Some(code)) if code == KOSPI_INDEX_CODE => Ok(KisTarget::KospiIndex),
            (Some("stock"), Some(code)) if !code.is_empty() => Ok(KisTarget::Stock(code)),
            _ => Err(ApiError::InvalidParameters),
        }
    }
}

async fn get_kis_quote(
    State(state): State<Arc<AppState>>,
    Query(query): Query<KisQuery>,
) -> ApiResult<Json<KisQuote>> {
    let target = query.target()?;
    let kis = state.kis.as_ref().ok_or(ApiError::NotConfigured)?;

    let quote = match target {
        KisTarget::KospiIndex => kis.fetch_kospi_index().await?,
        KisTarget::Stock(code) => kis.fetch_stock(&code).await?,
    };
    Ok(Json(quote))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/kis-proxy",
        get(get_kis_quote)
            .options(preflight)
            .fallback(method_not_allowed),
    )
}
