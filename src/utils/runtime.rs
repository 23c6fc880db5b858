use anyhow::Result;

/// Runtime used by the reminder daemon. A single timer doesn't need more than one thread.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
