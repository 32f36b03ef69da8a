pub mod memory;
pub mod pg_product_repository;
pub mod postgres;
