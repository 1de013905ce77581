// src/services/mod.rs

pub mod comment_service;
pub mod pagination;
pub mod tree;

pub use comment_service::{CommentService, DeleteMode};
