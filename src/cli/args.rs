use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "welfare-finder",
    version,
    about = "browse welfare-service directories from the terminal",
    long_about = "welfare-finder loads a welfare-service directory and lets you narrow it with tri-state category filters, keyword search and a favorites view.\n\nExamples:\n  welfare-finder\n  welfare-finder --file ./services.json\n  welfare-finder --once --include 청년 --exclude 장애인 --search 월세\n  welfare-finder --once --favorites-only --output favorites.json\n\nTip: Use --config to persist settings and keep CLI invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "clr",
        visible_alias = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        short = 'n',
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'u',
        long = "u",
        visible_alias = "url",
        value_name = "URL",
        help_heading = "Input",
        help = "Service list endpoint returning {\"data\": [...]}."
    )]
    pub url: Option<String>,

    #[arg(
        short = 'i',
        long = "if",
        visible_alias = "file",
        value_name = "FILE",
        help_heading = "Input",
        help = "Load the service list from a local JSON file instead of the endpoint."
    )]
    pub file: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.welfare-finder/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Input",
        help = "Write a commented default config file if none exists, then exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'F',
        long = "fav",
        visible_alias = "favorites-path",
        value_name = "FILE",
        help_heading = "Favorites",
        help = "Favorites storage file (defaults to ~/.welfare-finder/favorites.json)."
    )]
    pub favorites_path: Option<String>,

    #[arg(
        long = "np",
        visible_alias = "no-persist",
        help_heading = "Favorites",
        help = "Keep favorites in memory only for this session."
    )]
    pub no_persist: bool,

    #[arg(
        long = "timeout",
        value_name = "SECONDS",
        help_heading = "HTTP",
        help = "Request timeout in seconds."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'r',
        long = "retries",
        value_name = "N",
        help_heading = "HTTP",
        help = "Maximum load attempts (1 = no retry)."
    )]
    pub retries: Option<u32>,

    #[arg(
        long = "rb",
        visible_alias = "retry-backoff",
        value_name = "MS",
        help_heading = "HTTP",
        help = "Initial delay between load attempts in milliseconds; doubles per retry."
    )]
    pub retry_backoff_ms: Option<u64>,

    #[arg(
        short = 'p',
        long = "proxy",
        value_name = "URL",
        help_heading = "HTTP",
        help = "HTTP proxy for the service list request."
    )]
    pub proxy: Option<String>,

    #[arg(
        long = "ipp",
        visible_alias = "items-per-page",
        value_name = "N",
        help_heading = "Paging",
        help = "Services shown per page."
    )]
    pub items_per_page: Option<usize>,

    #[arg(
        long = "gs",
        visible_alias = "group-size",
        value_name = "N",
        help_heading = "Paging",
        help = "Page buttons shown per group."
    )]
    pub group_size: Option<usize>,

    #[arg(
        long = "once",
        help_heading = "One-shot",
        help = "Print a single page and exit instead of starting the interactive browser."
    )]
    pub once: bool,

    #[arg(
        short = 'I',
        long = "include",
        value_name = "LABEL",
        action = ArgAction::Append,
        help_heading = "One-shot",
        help = "Include services with this category (repeatable, any-of)."
    )]
    pub include: Vec<String>,

    #[arg(
        short = 'X',
        long = "exclude",
        value_name = "LABEL",
        action = ArgAction::Append,
        help_heading = "One-shot",
        help = "Exclude services with this category (repeatable)."
    )]
    pub exclude: Vec<String>,

    #[arg(
        short = 's',
        long = "search",
        value_name = "KEYWORD",
        help_heading = "One-shot",
        help = "Keyword matched against name, target, details and notes."
    )]
    pub search: Option<String>,

    #[arg(
        long = "fo",
        visible_alias = "favorites-only",
        help_heading = "One-shot",
        help = "Only show favorited services."
    )]
    pub favorites_only: bool,

    #[arg(
        short = 'P',
        long = "page",
        value_name = "N",
        help_heading = "One-shot",
        help = "Page to print (1-based)."
    )]
    pub page: Option<usize>,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "One-shot",
        help = "Write the page to a file."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'A',
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "One-shot",
        help = "Output format (text or json)."
    )]
    pub output_format: Option<String>,
}
