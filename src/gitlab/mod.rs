pub mod cache;
pub mod client;
pub mod loader;
pub mod transport;
pub mod types;

#[cfg(test)]
pub mod test_support;
