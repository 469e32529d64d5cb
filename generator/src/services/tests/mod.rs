//! Tests for generator services
//!
//! The HTTP oracle runs against a local mock server; the memory store is
//! exercised directly through the `RecipeStore` trait.
