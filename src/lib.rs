//! Writer for lexer tables files: a self-describing header followed by
//! width-compressed, 8-byte aligned table records in network byte order.

pub mod config;
pub mod tables;
