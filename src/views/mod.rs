// src/views/mod.rs
//
// Per-feature shaping of raw table rows into what the screens render.
// Every builder is a pure `&[Record] -> view` transformation on top of the
// schema mapper; transport and caching concerns never reach this layer.

pub mod executions;
pub mod performance;
pub mod portfolio;
