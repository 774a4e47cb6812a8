pub mod commit;
pub mod review;
pub mod roster;
pub mod scan;
pub mod server;
pub mod standings;
