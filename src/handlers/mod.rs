pub mod config;
pub mod scan;
pub mod tapes;

// Re-export handler functions for use in routing
pub use config::config_get;
pub use scan::scan_post;
pub use tapes::{movie_search, tape_delete, tape_get, tape_list, tape_post, tape_put};
