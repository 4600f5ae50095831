// Main entry point
use clap::Parser;
use colored::Colorize;
use nadri::application::PlaceRepository;
use nadri::domain::error::NadriError;
use nadri::domain::mode::OperatingMode;
use nadri::domain::model::{AreaQuery, FestivalQuery, LocationQuery, SearchQuery};
use nadri::infrastructure;
use nadri::infrastructure::config::load_config;
use nadri::infrastructure::fallback::MockDataSource;
use nadri::infrastructure::network::TourApiClient;
use nadri::infrastructure::storage::PlaceCache;
use nadri::interfaces::cli::{Cli, Command};
use nadri::presentation::theme::Theme;
use nadri::presentation::view;
use nadri::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup graceful shutdown handler
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    // Spawn signal handler task
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("Failed to listen for shutdown signal: {}", e);
        } else {
            let _ = shutdown_tx.send(());
        }
    });

    let cli = Cli::parse();
    let config = load_config()?;

    // Initialize logging
    if config.logging.enable {
        init_logging(&config.logging)?;
    }

    if cli.generate_config {
        infrastructure::config::generate_config_sample()?;
        return Ok(());
    }

    // Setup database path (from config or default)
    let db_path = infrastructure::config::get_database_path(&config);
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let db_conn = infrastructure::storage::db::init_database(&db_path).await?;
    let state = AppState::new(db_conn, config.clone())?;

    // A missing service key means every remote call would be rejected;
    // start straight in sample-data mode instead of failing per query.
    let service_key = match &config.api.service_key {
        Some(key) if !key.is_empty() => key.clone(),
        _ => {
            state
                .mode
                .enter_mock_mode("no service key configured".to_string());
            String::new()
        }
    };
    let mut client = TourApiClient::new(state.http_client.clone(), service_key);
    if let Some(base_url) = &config.api.base_url {
        client = client.with_base_url(base_url.clone());
    }

    let cache = PlaceCache::new(state.db.clone());
    let repo = PlaceRepository::new(
        cache.clone(),
        client,
        MockDataSource::new(),
        state.mode.clone(),
    );

    // Load theme
    let theme_name = cli.theme.as_deref().unwrap_or(config.theme.as_str());
    let theme = Theme::from_name(theme_name);

    let command = match cli.command {
        Some(command) => command,
        None => {
            eprintln!("{}", "Please provide a command (try --help)".red());
            std::process::exit(1);
        }
    };

    match command {
        Command::Festivals {
            from,
            area,
            sigungu,
            page,
            rows,
        } => {
            let query = FestivalQuery {
                event_start_date: from
                    .unwrap_or_else(|| chrono::Local::now().format("%Y%m%d").to_string()),
                area_code: area.or_else(|| config.defaults.area_code.clone()),
                sigungu_code: sigungu,
                page_no: page,
                num_of_rows: rows.unwrap_or(config.defaults.num_of_rows),
            };
            let result = repo.get_festivals(&query).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!(
                    "{}",
                    view::format_place_list(
                        &result.value,
                        Some(result.origin),
                        &theme,
                        config.enable_emoji
                    )
                );
            }
        }
        Command::Places {
            area,
            sigungu,
            content_type,
            cat1,
            cat2,
            cat3,
            page,
            rows,
        } => {
            let query = AreaQuery {
                area_code: area.or_else(|| config.defaults.area_code.clone()),
                sigungu_code: sigungu,
                content_type_id: content_type,
                cat1,
                cat2,
                cat3,
                page_no: page,
                num_of_rows: rows.unwrap_or(config.defaults.num_of_rows),
                arrange: None,
            };
            let result = repo.get_area_places(&query).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!(
                    "{}",
                    view::format_place_list(
                        &result.value,
                        Some(result.origin),
                        &theme,
                        config.enable_emoji
                    )
                );
            }
        }
        Command::Nearby {
            x,
            y,
            radius,
            content_type,
            rows,
        } => {
            let query = LocationQuery {
                map_x: x,
                map_y: y,
                radius: radius.unwrap_or(config.defaults.radius),
                content_type_id: content_type,
                page_no: 1,
                num_of_rows: rows.unwrap_or(config.defaults.num_of_rows),
            };
            let result = repo.get_nearby_places(&query).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!(
                    "{}",
                    view::format_place_list(
                        &result.value,
                        Some(result.origin),
                        &theme,
                        config.enable_emoji
                    )
                );
            }
        }
        Command::Detail { content_id } => {
            let detail = repo.get_place_detail(&content_id).await?;
            let place = match detail.value {
                Some(place) => place,
                None => {
                    eprintln!("{}", format!("No place found for id {}", content_id).red());
                    std::process::exit(1);
                }
            };
            let info = match place.content_type_id {
                Some(type_id) => repo.get_operating_info(&content_id, type_id).await?.value,
                None => None,
            };
            let images = match repo.get_images(&content_id).await {
                Ok(images) => images.value,
                Err(e) => {
                    tracing::debug!("image lookup failed: {e}");
                    Vec::new()
                }
            };
            if cli.json {
                let payload = serde_json::json!({
                    "place": place,
                    "operating_info": info,
                    "images": images,
                    "origin": detail.origin,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                print!(
                    "{}",
                    view::format_place_detail(
                        &place,
                        info.as_ref(),
                        &images,
                        detail.origin,
                        &theme,
                        config.enable_emoji
                    )
                );
            }
        }
        Command::Search {
            keyword,
            area,
            content_type,
            rows,
        } => {
            let keyword = keyword.join(" ");
            let query = SearchQuery {
                keyword: keyword.clone(),
                area_code: area,
                content_type_id: content_type,
                page_no: 1,
                num_of_rows: rows.unwrap_or(config.defaults.num_of_rows),
            };
            let result = repo.search_places(&query).await?;
            match repo.record_search_keyword(&keyword).await {
                Ok(()) => {}
                Err(NadriError::WriteBlocked(_)) => {}
                Err(e) => tracing::warn!("could not record keyword: {e}"),
            }
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!(
                    "{}",
                    view::format_place_list(
                        &result.value,
                        Some(result.origin),
                        &theme,
                        config.enable_emoji
                    )
                );
            }
        }
        Command::Favorites { watch } => {
            if watch {
                watch_favorites(&repo, &mut shutdown_rx, &theme, &config).await?;
            } else {
                let favorites = repo.get_favorites().await?;
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&favorites)?);
                } else {
                    print!(
                        "{}",
                        view::format_place_list(&favorites, None, &theme, config.enable_emoji)
                    );
                }
            }
        }
        Command::Favorite { content_id } => match repo.toggle_favorite(&content_id).await {
            Ok(true) => println!("{}", (theme.favorite)("added to favorites")),
            Ok(false) => println!("{}", (theme.notice)("removed from favorites")),
            Err(NadriError::WriteBlocked(msg)) => {
                eprintln!("{}", (theme.notice)(&msg));
                std::process::exit(1);
            }
            Err(e) => return Err(e.into()),
        },
        Command::Add {
            title,
            addr,
            x,
            y,
            content_type,
        } => match repo.add_custom_place(&title, addr, x, y, content_type).await {
            Ok(place) => {
                println!(
                    "{} {}",
                    (theme.value)("saved as"),
                    (theme.title)(&place.content_id)
                );
            }
            Err(NadriError::WriteBlocked(msg)) => {
                eprintln!("{}", (theme.notice)(&msg));
                std::process::exit(1);
            }
            Err(e) => return Err(e.into()),
        },
        Command::Keywords { clear, remove } => {
            if clear {
                match repo.clear_search_keywords().await {
                    Ok(()) => println!("{}", (theme.notice)("search history cleared")),
                    Err(NadriError::WriteBlocked(msg)) => eprintln!("{}", (theme.notice)(&msg)),
                    Err(e) => return Err(e.into()),
                }
            } else if let Some(keyword) = remove {
                match repo.remove_search_keyword(&keyword).await {
                    Ok(()) => println!("{}", (theme.notice)("removed")),
                    Err(NadriError::WriteBlocked(msg)) => eprintln!("{}", (theme.notice)(&msg)),
                    Err(e) => return Err(e.into()),
                }
            } else {
                let keywords = repo.recent_keywords(10).await?;
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&keywords)?);
                } else {
                    print!("{}", view::format_keywords(&keywords, &theme));
                }
            }
        }
        Command::Cache { sweep, clear } => {
            if clear {
                cache.clear_all().await?;
                println!("Cache cleared (favorites kept)");
            } else if sweep {
                let removed = cache.clear_expired().await?;
                println!("Removed {} expired entries", removed);
            } else {
                eprintln!("{}", "Use --sweep or --clear".red());
            }
        }
        Command::Status => {
            print_status(&state, &repo).await?;
        }
    }

    if let Some(banner) = view::mode_banner(&repo.current_mode(), &theme, config.enable_emoji) {
        eprintln!("{}", banner);
    }

    Ok(())
}

/// Initialize logging with path and level configuration
fn init_logging(logging: &infrastructure::config::Logging) -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    let level = match logging.level.as_str() {
        "DEBUG" => "debug",
        "INFO" => "info",
        "WARN" => "warn",
        "ERROR" => "error",
        _ => "warn",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if let Some(path) = &logging.path {
        if !path.is_empty() {
            // Log to file
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(file)
                .init();
            return Ok(());
        }
    }

    // Log to stderr (default)
    tracing_subscriber::fmt().with_env_filter(filter).init();

    Ok(())
}

/// Print the favorites list whenever it changes, until interrupted.
async fn watch_favorites(
    repo: &PlaceRepository<TourApiClient>,
    shutdown_rx: &mut tokio::sync::oneshot::Receiver<()>,
    theme: &Theme,
    config: &infrastructure::config::Config,
) -> anyhow::Result<()> {
    let mut rx = repo.watch_favorites().await?;

    let favorites = rx.borrow_and_update().clone();
    print!(
        "{}",
        view::format_place_list(&favorites, None, theme, config.enable_emoji)
    );

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let favorites = rx.borrow_and_update().clone();
                println!("{}", (theme.line)(&"⸺".repeat(40)));
                print!(
                    "{}",
                    view::format_place_list(&favorites, None, theme, config.enable_emoji)
                );
            }
            _ = &mut *shutdown_rx => {
                break;
            }
        }
    }

    Ok(())
}

async fn print_status(
    state: &AppState,
    repo: &PlaceRepository<TourApiClient>,
) -> anyhow::Result<()> {
    println!("{}", "nadri Status".green().bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = state.config.read().await;
    let db_path = infrastructure::config::get_database_path(&config);
    let api_configured = config.api.service_key.is_some();
    drop(config);

    if db_path.exists() {
        let places = table_count(&state.db, "places").await?;
        let favorites = favorites_count(&state.db).await?;
        let keywords = table_count(&state.db, "recent_keywords").await?;
        println!("Database: {} ({} places)", db_path.display(), places);
        println!("Favorites: {}", favorites);
        println!("Recent keywords: {}", keywords);
    } else {
        println!("Database: Not initialized");
    }

    println!(
        "Config: {}",
        infrastructure::config::get_config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "Not found".to_string())
    );

    if api_configured {
        println!("Tour API: Configured");
    } else {
        println!("Tour API: Not configured");
    }

    match repo.current_mode() {
        OperatingMode::Normal => println!("Mode: normal"),
        OperatingMode::Offline => println!("Mode: offline"),
        OperatingMode::MockFallback { reason } => println!("Mode: sample data ({})", reason),
    }

    Ok(())
}

async fn table_count(db: &tokio_rusqlite::Connection, table: &str) -> anyhow::Result<usize> {
    let sql = format!("SELECT COUNT(*) FROM {}", table);
    let count: i64 = db
        .call(move |conn| conn.query_row(&sql, [], |row| row.get(0)))
        .await?;
    Ok(count as usize)
}

async fn favorites_count(db: &tokio_rusqlite::Connection) -> anyhow::Result<usize> {
    let count: i64 = db
        .call(|conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM places WHERE is_favorite = 1",
                [],
                |row| row.get(0),
            )
        })
        .await?;
    Ok(count as usize)
}
