pub mod alphabet;
pub mod api;
pub mod cipher;
pub mod config;
pub mod consts;
pub mod error;
pub mod key;
pub mod optimizer;
pub mod scorer;
// cmd and reports belong to the binary (see main.rs).
