pub mod file;
pub mod server;

pub use file::{read_stats_file, write_stats_file, write_svg_file};
pub use server::{build_router, serve, start_dashboard_server, DashboardState};
