use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use wishlist_core::{Config, Dispatcher, RecordStore, Service, StdioTransport, TcpTransport};

fn main() -> Result<()> {
    let config = Config::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter()))
        .init();

    let store = RecordStore::new(&config.file);
    if store
        .initialize()
        .with_context(|| format!("failed to initialize {}", config.file.display()))?
    {
        info!("created new wishlist at {}", config.file.display());
    } else {
        info!("using wishlist at {}", config.file.display());
    }

    let dispatcher = Dispatcher::new(store);

    match &config.listen {
        Some(addr) => {
            let transport =
                TcpTransport::bind(addr).with_context(|| format!("failed to bind {addr}"))?;
            info!("serving on tcp://{}", transport.local_addr()?);
            Service::new(transport, dispatcher).run()?;
        }
        None => {
            info!("serving on stdin/stdout");
            Service::new(StdioTransport::stdio(), dispatcher).run()?;
        }
    }

    Ok(())
}
