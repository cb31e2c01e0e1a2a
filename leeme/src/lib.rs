//! Leeme: upload an image, get its text back.
//!
//! The HTTP surface lives in [`api`], the image and recognition pipeline in
//! [`ocr`].

pub mod api;
pub mod config;
pub mod error;
pub mod ocr;
