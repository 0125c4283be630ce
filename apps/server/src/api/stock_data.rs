use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use dashboard_market_data::{display_name_for, StockDataResponse};

use crate::{api::method_not_allowed, api::preflight, error::StockDataError, main_lib::AppState};

/// Latest quotes for the followed instruments, named from the catalog.
async fn get_stock_data(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StockDataResponse>, StockDataError> {
    let result = state.chain.fetch_quotes(&state.symbols).await?;

    let data = result
        .quotes
        .into_iter()
        .map(|quote| {
            let name = display_name_for(&quote.symbol).to_string();
            quote.with_name(name)
        })
        .collect();

    Ok(Json(StockDataResponse::ok(data, result.source)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/stock-data",
        get(get_stock_data)
            .options(preflight)
            .fallback(method_not_allowed),
    )
}
