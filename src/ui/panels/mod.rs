mod containers;
mod details;
mod logs;
mod menu;
mod stats;

pub use containers::draw_containers;
pub use details::draw_details;
pub use logs::draw_logs;
pub use menu::draw_menu;
pub use stats::draw_stats;
