//! Domain models for the blog.

pub mod post;

pub use post::{BlogCategory, CreatePostInput, Post, PostFilter, Tag, UpdatePostInput};
