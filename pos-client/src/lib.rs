pub mod api;
pub mod app;
pub mod auth_flow;
pub mod config;
pub mod error;
pub mod feeds;
pub mod models;
pub mod poller;
pub mod routes;
pub mod scope;
pub mod session;
pub mod stock_requests;
pub mod token_store;
pub mod views;

pub use app::ClientState;
pub use error::{ClientError, ClientResult};
pub use routes::{Navigation, Navigator, Route, Router};
pub use session::{SessionContext, SessionSnapshot};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore, TOKEN_KEY};
