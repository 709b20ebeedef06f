// Adapters layer: concrete implementations of the domain ports.

pub mod memory;
pub mod session;

pub use memory::InMemoryGradeRepository;
pub use session::StaticSession;
