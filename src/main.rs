use std::sync::Arc;

use anyhow::{bail, Context};

use movie_explorer::details::TrailerLookup;
use movie_explorer::logging::init_logging;
use movie_explorer::media::{truncate_overview, MovieSummary, SearchFilters};
use movie_explorer::tmdb::POSTER_SIZE;
use movie_explorer::video::youtube_embed_url;
use movie_explorer::{
    AppSettings, DiscoverFilters, FileStore, MovieDataStore, Shelf, SortKey, TmdbClient,
};

const OVERVIEW_LENGTH: usize = 120;

enum Command {
    Home,
    Search(String),
    Discover(SortKey),
    Details(Option<u64>),
    Favorites,
    Theme,
}

fn parse_args() -> anyhow::Result<Command> {
    let mut args = std::env::args().skip(1);
    let command = match args.next().as_deref() {
        None | Some("home") => Command::Home,
        Some("search") => Command::Search(args.collect::<Vec<_>>().join(" ")),
        Some("discover") => {
            let sort_key = match args.next() {
                Some(key) => key.parse().map_err(anyhow::Error::msg)?,
                None => SortKey::default(),
            };
            Command::Discover(sort_key)
        }
        Some("details") => Command::Details(args.next().and_then(|id| id.parse().ok())),
        Some("favorites") => Command::Favorites,
        Some("theme") => Command::Theme,
        Some(other) => bail!(
            "unknown command `{}` (expected home, search, discover, details, favorites or theme)",
            other
        ),
    };
    Ok(command)
}

fn print_movie(store: &MovieDataStore, movie: &MovieSummary) {
    let rating = movie
        .vote_average
        .map_or_else(|| String::from("N/A"), |v| format!("{:.1}", v));
    let genres = store.client().cached_genres().cloned().unwrap_or_default();
    println!(
        "  {:>8}  {} ({}) [{}] {}",
        movie.id,
        movie.title,
        movie.release_year().unwrap_or("----"),
        rating,
        genres.names_for(&movie.genre_ids).join(", ")
    );
    if !movie.overview.is_empty() {
        println!("            {}", truncate_overview(&movie.overview, OVERVIEW_LENGTH));
    }
    println!(
        "            {}",
        store.client().image_url(movie.poster_path.as_deref(), POSTER_SIZE)
    );
}

async fn run(store: &MovieDataStore, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Home => {
            store.bootstrap().await;
            let snapshot = store.snapshot();
            if let Some(error) = &snapshot.initial_data_error {
                eprintln!("{}", error);
            }
            for shelf in Shelf::ALL {
                let state = snapshot.shelf(shelf);
                println!("{}", shelf.title());
                match state.error {
                    Some(error) => println!("  {}", error),
                    None => state.movies.iter().for_each(|m| print_movie(store, m)),
                }
            }
        }
        Command::Search(query) => {
            store.client().ensure_loaded().await?;
            store
                .perform_search(&query, 1, &SearchFilters::default(), false)
                .await;
            store.set_last_search(&query);
            let session = store.search_session();
            if let Some(error) = &session.error {
                println!("{}", error);
            }
            for movie in &session.results {
                print_movie(store, movie);
            }
            println!("page {} of {}", session.page, session.total_pages);
        }
        Command::Discover(sort_key) => {
            store.client().ensure_loaded().await?;
            store
                .fetch_or_load_more(sort_key, &DiscoverFilters::default(), true)
                .await;
            let session = store.discovery_session();
            println!("{}", session.sort_key);
            if let Some(error) = &session.error {
                println!("{}", error);
            }
            for movie in &session.results {
                print_movie(store, movie);
            }
        }
        Command::Details(id) => {
            store.load_movie_details(id).await;
            let view = store.details_view();
            if let Some(error) = view.error {
                bail!(error);
            }
            let Some(movie) = view.movie else {
                return Ok(());
            };
            println!("{} ({})", movie.title(), movie.formatted_runtime());
            if let Some(tagline) = movie.tagline.as_deref().filter(|t| !t.is_empty()) {
                println!("  {}", tagline);
            }
            if let Some(director) = movie.director() {
                println!("  Directed by {}", director);
            }
            let cast: Vec<&str> = movie
                .billed_cast(5)
                .into_iter()
                .map(|c| c.name.as_str())
                .collect();
            if !cast.is_empty() {
                println!("  Starring {}", cast.join(", "));
            }
            match store.find_trailer(&movie.summary, movie.embedded_videos()).await {
                TrailerLookup::Found(key) => println!("  Trailer: {}", youtube_embed_url(&key)),
                TrailerLookup::NotAvailable(message) | TrailerLookup::Failed(message) => {
                    println!("  {}", message)
                }
            }
        }
        Command::Favorites => {
            for entry in store.favorites() {
                println!("  {:>8}  {}", entry.id, entry.title);
            }
        }
        Command::Theme => {
            println!("{}", store.toggle_theme_mode());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;
    let command = parse_args()?;

    let settings = match AppSettings::load() {
        Some(settings) if settings.is_valid() => settings,
        _ => {
            let path = AppSettings::config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| String::from("the config file"));
            bail!(
                "no TMDB API key configured; set {} or add \"api_key\" to {}",
                movie_explorer::settings::API_KEY_ENV,
                path
            );
        }
    };

    let data_dir = AppSettings::data_dir().context("could not determine data directory")?;
    let storage = FileStore::open(data_dir.clone())
        .with_context(|| format!("could not open data directory {}", data_dir.display()))?;

    let store = MovieDataStore::new(TmdbClient::from_settings(&settings), Arc::new(storage), false);
    tracing::info!(data_dir = %data_dir.display(), "movie explorer starting");

    run(&store, command).await
}
