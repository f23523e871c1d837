mod common;
mod mapper;
mod service;
