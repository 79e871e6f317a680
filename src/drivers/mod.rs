//! Peripheral drivers: pulse input, reprovision button, GPIO init, heartbeat watchdog.

pub mod button;
pub mod coin_acceptor;
pub mod hw_init;
pub mod heartbeat;
