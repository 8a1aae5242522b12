use ratatui::style::palette::tailwind;

pub const PALETTES: [tailwind::Palette; 4] = [
    tailwind::BLUE,
    tailwind::EMERALD,
    tailwind::INDIGO,
    tailwind::RED,
];

pub const INFO_TEXT: [&str; 2] = [
    "(Esc) quit | (↑/↓) move row | (Tab) live/portfolio | (/) search | (e) edit holding",
    "(1) rank | (2) holdings | (3) price | (r) reload | (Shift + →/←) cycle color",
];

pub const ITEM_HEIGHT: usize = 2;
pub const POLL_DURATION_MS: u64 = 50;
pub const NOTICE_DURATION_MS: u64 = 1500;

/// Quiet period before search text reaches the coin list.
pub const SEARCH_DEBOUNCE_MS: u64 = 500;

pub const LOG_FILE: &str = "/tmp/coin_pulse.log";
pub const DEFAULT_PORTFOLIO_FILE: &str = "coin_pulse_portfolio.json";
pub const OFFLINE_ENV: &str = "COIN_PULSE_OFFLINE";
pub const HTTP_USER_AGENT: &str = concat!("coin-pulse/", env!("CARGO_PKG_VERSION"));
