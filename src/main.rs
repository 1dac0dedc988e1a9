//! lookahead - search-as-you-type over a remote item index
//!
//! Usage:
//!   lookahead [query]              - Interactive search, optionally pre-filled
//!   lookahead --item <id>          - Open one item's detail view
//!   lookahead --print <query>      - Print ranked results and exit
//!
//! The backend address comes from `--api-url` or `LOOKAHEAD_API_URL`.

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    lookahead::cli::run_cli().await
}
