//! # Remote Storage Module
//!
//! Thin wrappers over the hosted table-store's REST interface. Each
//! repository maps one table family onto the storage traits using the
//! store's query conventions: equality and range filters as
//! `column=op.value` query parameters, `order=` for sorting, and
//! `Prefer: return=representation` to get mutated rows back.
//!
//! There is deliberately no retry, caching or client-side transaction
//! here: every call is one independent round trip and the store's row
//! state is the only truth (concurrent writers are last-write-wins).

pub mod catalog_repository;
pub mod checkin_repository;
pub mod connection;
pub mod member_repository;
pub mod transaction_repository;

pub use catalog_repository::CatalogRepository;
pub use checkin_repository::CheckInRepository;
pub use connection::RemoteConnection;
pub use member_repository::MemberRepository;
pub use transaction_repository::TransactionRepository;
