//! Library crate for photojudge-client: the state core of a photo judging
//! front end, exposing the entity catalog, navigation, judging session,
//! history pane, and the backend adapter they all talk through.

pub mod api;
pub mod config;
pub mod dto;
pub mod error;
pub mod services;
pub mod state;
