pub mod export;
pub mod play;
pub mod serve;
pub mod validate;
