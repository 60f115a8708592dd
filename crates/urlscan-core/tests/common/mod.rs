#![allow(dead_code)]

pub mod engine_server;
pub mod scripted_engine;
