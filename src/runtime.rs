use once_cell::sync::OnceCell;
use std::io;
use tokio::runtime::{Builder, Runtime};

static TOKIO_RUNTIME: OnceCell<Runtime> = OnceCell::new();

/// Runtime shared by the window and the CLI for content requests.
pub fn shared() -> io::Result<&'static Runtime> {
    TOKIO_RUNTIME.get_or_try_init(|| {
        Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("tahdiri-fill")
            .enable_all()
            .build()
    })
}
