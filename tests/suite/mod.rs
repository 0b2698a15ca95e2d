//! Integration test modules

mod chat;
mod cli;
mod interchange;
mod progression;
mod store;
