use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "nadri")]
#[command(about = "A command-line companion for Korean day trips.")]
#[command(version)]
pub struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Choose color theme
    #[arg(short = 'T', long, global = true)]
    pub theme: Option<String>,

    /// Generate config sample
    #[arg(long)]
    pub generate_config: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Upcoming festivals and events
    Festivals {
        /// Earliest event date, yyyyMMdd (default: today)
        #[arg(long)]
        from: Option<String>,
        /// Area code (1 Seoul, 6 Busan, 39 Jeju, ...)
        #[arg(long)]
        area: Option<String>,
        #[arg(long)]
        sigungu: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        rows: Option<u32>,
    },
    /// Browse places in an area, page by page
    Places {
        #[arg(long)]
        area: Option<String>,
        #[arg(long)]
        sigungu: Option<String>,
        /// Content type id (12 spot, 14 culture, 32 lodging, 38 shopping, 39 food)
        #[arg(long = "type")]
        content_type: Option<u32>,
        #[arg(long)]
        cat1: Option<String>,
        #[arg(long)]
        cat2: Option<String>,
        /// Repeatable; more than one code is filtered client-side
        #[arg(long)]
        cat3: Vec<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        rows: Option<u32>,
    },
    /// Places around a coordinate
    Nearby {
        /// Longitude
        #[arg(long)]
        x: f64,
        /// Latitude
        #[arg(long)]
        y: f64,
        /// Meters
        #[arg(long)]
        radius: Option<u32>,
        #[arg(long = "type")]
        content_type: Option<u32>,
        #[arg(long)]
        rows: Option<u32>,
    },
    /// Everything about one place
    Detail {
        content_id: String,
    },
    /// Free-text search
    Search {
        #[arg(num_args = 1..)]
        keyword: Vec<String>,
        #[arg(long)]
        area: Option<String>,
        #[arg(long = "type")]
        content_type: Option<u32>,
        #[arg(long)]
        rows: Option<u32>,
    },
    /// List favorites; --watch streams changes until interrupted
    Favorites {
        #[arg(long)]
        watch: bool,
    },
    /// Toggle a favorite
    Favorite {
        content_id: String,
    },
    /// Add a place of your own
    Add {
        title: String,
        #[arg(long)]
        addr: Option<String>,
        #[arg(long)]
        x: Option<f64>,
        #[arg(long)]
        y: Option<f64>,
        #[arg(long = "type")]
        content_type: Option<u32>,
    },
    /// Recent search keywords
    Keywords {
        #[arg(long)]
        clear: bool,
        #[arg(long)]
        remove: Option<String>,
    },
    /// Cache maintenance
    Cache {
        /// Remove entries older than seven days (favorites kept)
        #[arg(long)]
        sweep: bool,
        /// Remove all non-favorite entries
        #[arg(long)]
        clear: bool,
    },
    /// Show database, cache, and mode status
    Status,
}
