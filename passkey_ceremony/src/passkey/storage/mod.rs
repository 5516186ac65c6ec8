mod errors;
mod memory;
mod store_type;

pub use errors::StoreError;
pub use memory::{MemoryPasskeyStore, MemoryUser};
pub use store_type::PasskeyUserStore;
