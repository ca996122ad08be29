use clap::Parser;

/// Refresh the local template catalog cache from the remote API.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Print the fetched templates instead of writing the cache.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let client = reqwest::Client::new();

    let previous = catalog::read_cache().map(|t| t.len()).unwrap_or(0);
    println!("Cached templates: {previous}");

    let templates = catalog::fetch_templates(&client)
        .await
        .expect("Failed to fetch templates");

    println!("Fetched templates: {}", templates.len());

    if args.dry_run {
        for template in &templates {
            println!("{} {}", template.id, template.name);
        }
        return;
    }

    catalog::write_cache(&templates).expect("Failed to write catalog cache");

    println!("Cache written to {}", catalog::CACHE_PATH);
}
