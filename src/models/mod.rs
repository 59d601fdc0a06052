pub mod address;
pub mod transaction;

pub use address::Address;
pub use transaction::Transaction;
