pub mod scheduler;
pub mod sync_service;

#[cfg(test)]
mod test_support;
