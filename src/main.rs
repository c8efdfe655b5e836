use source_quality_toks::cache::SourceCache;
use source_quality_toks::config::{Config, CONFIG_FILE};
use source_quality_toks::mirror::TikwmMirror;
use source_quality_toks::tok_id::TokIdWindow;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::get_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Error reading {}: {}", CONFIG_FILE, e);
            std::process::exit(1);
        }
    };
    let mirror = match TikwmMirror::new(&config) {
        Ok(m) => m,
        Err(e) => {
            error!("Error creating mirror client: {}", e);
            std::process::exit(1);
        }
    };

    let filenames: Vec<String> = std::env::args().skip(1).collect();
    if filenames.is_empty() {
        eprintln!("usage: source-quality-toks <filename>...");
        std::process::exit(2);
    }

    let cache = SourceCache::new(mirror);
    let window = TokIdWindow::now();
    let ids: Vec<_> = filenames.iter().map(|f| window.extract(f)).collect();

    // Ask the mirror about everything up front, print in order
    for id in ids.iter().flatten() {
        cache.prefetch(id);
    }
    for (filename, id) in filenames.iter().zip(ids) {
        let url = match id {
            Some(id) => cache.resolve(&id).await,
            None => None,
        };
        match url {
            Some(url) => println!("{}\t{}", filename, url),
            None => println!("{}\t-", filename),
        }
    }
}
