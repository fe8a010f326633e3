// Portfolio documents: CRUD over the store plus asset uploads to object storage.

pub mod handlers;
pub mod uploads;
pub mod validation;
