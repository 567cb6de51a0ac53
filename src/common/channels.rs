//! Channel type definitions for inter-task communication

use tokio::sync::mpsc;

/// Buffer size of a session shutdown channel; one pending signal is enough
pub const SHUTDOWN_CHANNEL_SIZE: usize = 1;

/// Create the channel a session worker listens on for stop requests
///
/// Sending `()` or dropping the sender both stop the worker.
pub fn create_shutdown_channel() -> (mpsc::Sender<()>, mpsc::Receiver<()>) {
    mpsc::channel(SHUTDOWN_CHANNEL_SIZE)
}
