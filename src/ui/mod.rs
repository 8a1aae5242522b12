pub mod app;
pub mod colors;
pub mod feedback;

pub use app::TuiApp;
pub use colors::TableColors;
pub use feedback::UiFeedback;
