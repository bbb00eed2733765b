pub mod app;
pub mod batch;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod fan_out;
pub mod message;
pub mod reply_stream;
pub mod results;
pub mod session;
pub mod spaces;
pub mod turn;
