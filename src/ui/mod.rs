mod progress;
mod theme;

pub use progress::Progress;
pub use theme::Style;
