pub mod encode;
pub mod serve;
pub mod simulate;
