//! HTTP API handlers for pbt-dash

pub mod admin;
pub mod auth;
pub mod buildinfo;
pub mod health;
pub mod players;
pub mod raw;
pub mod ui;
pub mod upload;
pub mod view;

pub use admin::admin_routes;
pub use auth::{auth_middleware, whoami};
pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use players::{list_player_sessions, list_players};
pub use raw::raw_tables;
pub use ui::{serve_app_js, serve_index};
pub use upload::upload_session;
pub use view::{compare_sessions, view_session};
