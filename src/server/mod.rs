pub mod guards;
pub mod listen;
pub mod router;
pub mod routes;
