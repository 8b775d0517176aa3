// src/models/mod.rs

pub mod post;
pub mod tag;
pub mod user;
