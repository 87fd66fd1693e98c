mod priority;
mod record;
mod rejection;
mod winners;

pub use priority::PriorityClass;
pub use record::Record;
pub use rejection::Rejection;
pub use winners::WinnersTable;
