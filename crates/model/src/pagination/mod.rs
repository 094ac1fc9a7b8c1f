pub mod continuation;
pub mod page;
