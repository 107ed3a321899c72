#![forbid(unsafe_code)]

pub mod chapters;
pub mod cli;
pub mod download;
pub mod logging;
pub mod page;
pub mod page_store;
pub mod viewer;
