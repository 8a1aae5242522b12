use const_format::concatcp;

// Root
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

// Paths
pub const COINGECKO_MARKETS_PATH: &str = "/coins/markets?vs_currency=usd&order=market_cap_desc&per_page=250&page=1&sparkline=false&price_change_percentage=24h";
pub const COINGECKO_GLOBAL_PATH: &str = "/global";

// Endpoints
pub const COINGECKO_MARKETS_API: &str = concatcp!(COINGECKO_API_URL, COINGECKO_MARKETS_PATH);
pub const COINGECKO_GLOBAL_API: &str = concatcp!(COINGECKO_API_URL, COINGECKO_GLOBAL_PATH);
