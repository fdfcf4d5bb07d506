// hubcache command line.
// Runs one cached query against the GitHub API and prints every state it emits.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use futures::StreamExt;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use hubcache::cache::{self, MemoryStore, RepositoryRecord, UserRecord, paths};
use hubcache::{CacheCoordinator, GitHubClient, ResultState, ResultStream, Settings};

#[derive(Parser, Debug)]
#[command(name = "hubcache")]
#[command(about = "Cache-first GitHub user directory")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List users
    Users,
    /// Search users by login
    Search { query: String },
    /// Show one user's profile
    User { login: String },
    /// List a user's repositories
    Repos { login: String },
    /// Refetch data into the cache without printing it
    Refresh {
        #[command(subcommand)]
        target: RefreshTarget,
    },
    /// Delete cached records older than the given age
    Evict {
        #[arg(long, value_name = "MINUTES")]
        older_than: u64,
    },
    /// Remove the cache file
    Clear,
}

#[derive(Subcommand, Debug)]
enum RefreshTarget {
    Users,
    User { login: String },
    Repos { login: String },
}

fn init_tracing() {
    // RUST_LOG overrides the default filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> hubcache::Result<()> {
    init_tracing();
    let args = Args::parse();

    let settings = Settings::from_env();
    let store_path = paths::store_path(&settings)?;

    if let Command::Clear = args.command {
        cache::store::remove(&store_path)?;
        println!("Removed {}", store_path.display());
        return Ok(());
    }

    info!(path = %store_path.display(), "Opening store");
    let store = Arc::new(MemoryStore::open(&store_path)?);
    let client = Arc::new(GitHubClient::from_settings(&settings)?);
    let coordinator = CacheCoordinator::new(Arc::clone(&client), Arc::clone(&store));

    match args.command {
        Command::Users => print_states(coordinator.get_users(), print_users).await,
        Command::Search { query } => {
            print_states(coordinator.search_users(&query), print_users).await
        }
        Command::User { login } => {
            print_states(coordinator.get_user_details(&login), print_profile).await
        }
        Command::Repos { login } => {
            print_states(coordinator.get_user_repositories(&login), print_repositories).await
        }
        Command::Refresh { target } => match target {
            RefreshTarget::Users => coordinator.refresh_users().await,
            RefreshTarget::User { login } => coordinator.refresh_user_details(&login).await,
            RefreshTarget::Repos { login } => coordinator.refresh_user_repositories(&login).await,
        },
        Command::Evict { older_than } => {
            let max_age = Duration::from_secs(older_than.saturating_mul(60));
            let eviction = cache::evict_older_than(store.as_ref(), max_age).await?;
            println!(
                "Evicted {} users and {} repositories",
                eviction.users, eviction.repositories
            );
        }
        Command::Clear => {}
    }

    let quota = client.rate_limit();
    if quota.limit > 0 {
        info!(
            remaining = quota.remaining,
            limit = quota.limit,
            reset = quota.reset,
            "GitHub rate limit"
        );
    }
    Ok(())
}

async fn print_states<T>(mut states: ResultStream<T>, render: fn(&T)) {
    while let Some(state) = states.next().await {
        match &state {
            ResultState::Loading => println!("Loading..."),
            ResultState::Success(data) => render(data),
            ResultState::Error { message, fallback } => {
                eprintln!("{}", message);
                if let Some(data) = fallback {
                    println!("(cached)");
                    render(data);
                }
            }
        }
    }
}

fn print_users(users: &Vec<UserRecord>) {
    if users.is_empty() {
        println!("No users");
    }
    for user in users {
        println!("{:<24} {}", user.login(), user.user.html_url);
    }
}

fn print_profile(record: &UserRecord) {
    let user = &record.user;
    println!("{} ({})", user.login, user.name.as_deref().unwrap_or("-"));
    for (label, value) in [
        ("company", &user.company),
        ("location", &user.location),
        ("blog", &user.blog),
        ("bio", &user.bio),
    ] {
        if let Some(value) = value {
            println!("  {:<10} {}", label, value);
        }
    }
    if let (Some(followers), Some(repos)) = (user.followers, user.public_repos) {
        println!("  {} followers, {} public repositories", followers, repos);
    }
    println!("  cached {}", record.cached_at.format("%Y-%m-%d %H:%M:%S UTC"));
}

fn print_repositories(repositories: &Vec<RepositoryRecord>) {
    if repositories.is_empty() {
        println!("No repositories");
    }
    for record in repositories {
        let repo = &record.repository;
        println!(
            "{:<32} ★ {:<6} {}",
            repo.name,
            repo.stargazers_count,
            repo.language.as_deref().unwrap_or("")
        );
    }
}
