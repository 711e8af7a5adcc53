use docvault_core::Config;

// mimalloc keeps fragmentation low with many concurrent multipart buffers,
// particularly on musl-based container images.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    let (state, router) = docvault_api::setup::initialize_app(config.clone()).await?;

    let sweeper = docvault_api::setup::services::start_background_tasks(&config, &state);

    docvault_api::setup::server::start_server(&config, router).await?;

    if let Some(handle) = sweeper {
        handle.abort();
    }

    Ok(())
}
