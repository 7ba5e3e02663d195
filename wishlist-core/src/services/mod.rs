pub mod dispatcher;
pub mod listing;
pub mod store;
