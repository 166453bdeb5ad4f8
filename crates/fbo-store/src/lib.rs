//! SQLite persistence for the FBO network planner.
//!
//! Stores the airport catalogue and the FBO rows analysed by `fbo-core`.

pub mod airports;
pub mod db;
pub mod error;
pub mod fbos;
pub mod network;

pub use airports::{
    get_airport_by_icao, load_all_airports, load_fbo_airports, modify_airport, search_airports,
    set_has_fbo, upsert_airport, AirportEdit,
};
pub use db::{init_database, Database};
pub use error::StoreError;
pub use fbos::{delete_fbo, insert_fbo, load_fbos, load_stored_fbos, update_fbo};
pub use network::{add_fbo, remove_fbo, sync_fbos, SyncSummary};
