pub mod batch;
pub mod collect;
pub mod config;
pub mod coordinates;
pub mod document;
pub mod domain;
pub mod error;
pub mod extract;
pub mod output;
pub mod probe;
pub mod search;
pub mod store;
pub mod table;
