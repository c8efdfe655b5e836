//! Swap the embedded toks on a forum for their source quality originals.
//!
//! A tok is identified by the id in its filename ([`tok_id`]), looked up on a
//! mirror ([`mirror`]) at most once ([`cache`]) and put into the page's video
//! elements by a [`page::Controller`].

pub mod cache;
pub mod config;
pub mod error;
pub mod mirror;
pub mod page;
pub mod tok_id;
