use clap::{Args, Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "study-abroad-cli")]
#[command(about = "Command-line client for the study abroad API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3001")]
    url: String,

    /// Admin API key, required by `status`, `cache` and `clear-cache`.
    #[arg(short, long, env = "STUDY_ABROAD_ADMIN_KEY")]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service liveness
    Health,
    /// Show admin status
    Status,
    /// Inspect the visa document cache
    Cache,
    /// Drop every cached visa document
    ClearCache,
    /// Look up visa requirements for a country
    Visa { visa_type: String, country: String },
    /// Search universities
    Search(SearchArgs),
    /// List the best-ranked universities
    Top {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        region: Option<String>,
    },
    /// List university regions
    Regions,
}

#[derive(Args)]
struct SearchArgs {
    #[arg(long)]
    query: Option<String>,
    #[arg(long)]
    country: Option<String>,
    #[arg(long)]
    region: Option<String>,
    #[arg(long)]
    max_rank: Option<u32>,
    #[arg(long)]
    min_score: Option<f64>,
    #[arg(long)]
    max_tuition: Option<f64>,
    #[arg(long)]
    max_application_fee: Option<f64>,
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    limit: Option<u32>,
}

impl SearchArgs {
    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        push(&mut query, "query", &self.query);
        push(&mut query, "country", &self.country);
        push(&mut query, "region", &self.region);
        push(&mut query, "maxRank", &self.max_rank);
        push(&mut query, "minScore", &self.min_score);
        push(&mut query, "maxTuition", &self.max_tuition);
        push(&mut query, "maxApplicationFee", &self.max_application_fee);
        push(&mut query, "page", &self.page);
        push(&mut query, "limit", &self.limit);
        query
    }
}

fn push<T: ToString>(query: &mut Vec<(&'static str, String)>, name: &'static str, value: &Option<T>) {
    if let Some(value) = value {
        query.push((name, value.to_string()));
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", key))?);
    }

    let request = match &cli.command {
        Commands::Health => client.get(format!("{}/health", base)),
        Commands::Status => client.get(format!("{}/admin/status", base)).headers(headers),
        Commands::Cache => client.get(format!("{}/admin/cache", base)).headers(headers),
        Commands::ClearCache => client.delete(format!("{}/admin/cache", base)).headers(headers),
        Commands::Visa { visa_type, country } => {
            client.get(format!("{}/api/visa/{}/{}", base, visa_type, country))
        }
        Commands::Search(args) => client
            .get(format!("{}/api/university/search", base))
            .query(&args.to_query()),
        Commands::Top { limit, country, region } => {
            let mut query = Vec::new();
            push(&mut query, "limit", limit);
            push(&mut query, "country", country);
            push(&mut query, "region", region);
            client.get(format!("{}/api/university/top", base)).query(&query)
        }
        Commands::Regions => client.get(format!("{}/api/university/regions", base)),
    };

    print_response(request.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    let body = serde_json::from_str::<Value>(&text)
        .and_then(|json| serde_json::to_string_pretty(&json))
        .unwrap_or(text);

    if status.is_success() {
        println!("{}", body);
    } else {
        eprintln!("Error: API returned status {}", status);
        eprintln!("{}", body);
    }
    Ok(())
}
