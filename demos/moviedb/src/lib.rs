//! Movies and their cast kept by reconbit: a movie is saved with its whole cast list, the cast is
//! reconciled in the same transaction and comes back with each person's full name joined in.

pub mod db;
pub mod model;
pub mod routes;

pub use db::MovieDb;
pub use model::*;
