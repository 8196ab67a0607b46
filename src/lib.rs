pub mod adlib;
pub mod api;
pub mod config;
pub mod media;
pub mod normalize;
pub mod observability;
pub mod pipeline;
pub mod storage;
