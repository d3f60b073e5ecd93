//! Read-side query construction and paged execution.

pub mod sales;
