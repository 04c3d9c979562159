pub mod config;
pub mod handlers;
pub mod state;
pub mod utils;
pub mod vietqr;

#[cfg(test)]
mod testing;
