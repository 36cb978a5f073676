mod server;

pub use server::{build_router, start_server};
