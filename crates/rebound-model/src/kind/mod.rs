mod category;
pub use category::BackoffCategory;
