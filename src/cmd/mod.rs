pub mod cipher;
pub mod solve;
