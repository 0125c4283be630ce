use std::time::Duration;

/// Interval between automatic refreshes while a user is signed in.
pub const AUTO_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Budget for one request to the stock data endpoint.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Retries after the first failed attempt of a refresh cycle.
pub const MAX_RETRY_COUNT: u32 = 2;

/// Fixed delay between two attempts of the same cycle.
pub const RETRY_DELAY: Duration = Duration::from_millis(3000);

/// Path of the stock data endpoint, relative to the API base URL.
pub const STOCK_DATA_PATH: &str = "/api/stock-data";
