pub mod artifact;
pub mod chat;
pub mod commands;
pub mod listing;
pub mod params;
pub mod qr;
