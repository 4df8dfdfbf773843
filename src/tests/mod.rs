mod common;

mod request_builder;
