use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Run a query and print its rows
    Query {
        #[arg(long, help = "SQL text to run")]
        sql: String,

        #[arg(long, help = "Server URL; falls back to SQLHTTP_DSN")]
        url: Option<String>,

        #[arg(
            long,
            help = "Print rows as pages arrive instead of collecting the whole result first"
        )]
        stream: bool,

        #[arg(long, help = "Print the column names and types before the rows")]
        column_types: bool,

        #[arg(long, help = "Print each row as a JSON array instead of tab separated text")]
        json: bool,
    },
    /// Show the connection settings a URL resolves to
    Inspect {
        #[arg(long, help = "Server URL; falls back to SQLHTTP_DSN")]
        url: Option<String>,
    },
}
