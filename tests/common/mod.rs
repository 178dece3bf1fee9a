#![allow(dead_code)]

pub mod app;
pub mod frames;
pub mod http;
