pub mod store;
pub use store::IntakeStore;
pub mod intake_repo;
pub use intake_repo::IntakeRepository;

#[cfg(test)]
pub mod memory_store;
#[cfg(test)]
pub use memory_store::MemoryIntakeStore;
