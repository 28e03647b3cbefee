pub mod app;
pub mod category;
pub mod cli;
pub mod config;
pub mod favorites;
pub mod filter;
pub mod logging;
pub mod output;
pub mod pagination;
pub mod query;
pub mod record;
pub mod session;
pub mod source;
pub mod state;

#[cfg(test)]
mod tests;
