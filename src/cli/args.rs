use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "rollcall",
    version,
    about = "browse every record of a paginated listing API",
    long_about = "rollcall follows a listing endpoint's `next` links until the last page, keeps every record in memory, and shows a searchable, filterable, sorted page of them.\n\nExamples:\n  rollcall\n  rollcall --search sky --page-size 5\n  rollcall --gender unspecified --format json -o droids.json\n  rollcall --interactive\n\nTip: Use --config to persist settings and keep CLI invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(long = "no-color", help_heading = "Output", help = "Disable colored output.")]
    pub no_color: bool,

    #[arg(
        short = 'f',
        long = "format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format: text, json, or names (inferred from --output when omitted)."
    )]
    pub format: Option<String>,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the rendered page to a file instead of stdout."
    )]
    pub output: Option<String>,

    #[arg(
        long = "genders",
        help_heading = "Output",
        help = "Print the gender values present in the listing and exit."
    )]
    pub genders: bool,

    #[arg(
        short = 'u',
        long = "url",
        value_name = "URL",
        help_heading = "Input",
        help = "Listing endpoint to start from (defaults to https://swapi.dev/api/people/)."
    )]
    pub url: Option<String>,

    #[arg(
        short = 'C',
        long = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.rollcall/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Input",
        help = "Write a default config file if none exists, then exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 's',
        long = "search",
        value_name = "TEXT",
        help_heading = "View",
        help = "Only show records whose name contains TEXT (case-insensitive)."
    )]
    pub search: Option<String>,

    #[arg(
        short = 'g',
        long = "gender",
        value_name = "VALUE",
        help_heading = "View",
        help = "Only show records with this exact gender ('unspecified' matches n/a)."
    )]
    pub gender: Option<String>,

    #[arg(
        short = 'p',
        long = "page",
        value_name = "N",
        help_heading = "View",
        help = "Page to show (clamped to the last page)."
    )]
    pub page: Option<usize>,

    #[arg(
        short = 'n',
        long = "page-size",
        value_name = "N",
        help_heading = "View",
        help = "Records per page."
    )]
    pub page_size: Option<usize>,

    #[arg(
        short = 'i',
        long = "interactive",
        help_heading = "View",
        help = "Start an interactive prompt (load, search, gender, next, prev, page)."
    )]
    pub interactive: bool,

    #[arg(
        short = 'r',
        long = "rate",
        value_name = "RPS",
        help_heading = "HTTP",
        help = "Maximum page requests per second (0 = unpaced)."
    )]
    pub rate: Option<u32>,

    #[arg(
        long = "timeout",
        value_name = "SECS",
        help_heading = "HTTP",
        help = "Per-request timeout in seconds."
    )]
    pub timeout: Option<usize>,

    #[arg(
        long = "max-pages",
        value_name = "N",
        help_heading = "HTTP",
        help = "Abort when the listing has more than N pages."
    )]
    pub max_pages: Option<usize>,

    #[arg(
        short = 'x',
        long = "proxy",
        value_name = "URL",
        help_heading = "HTTP",
        help = "HTTP proxy to route requests through."
    )]
    pub proxy: Option<String>,

    #[arg(
        short = 'H',
        long = "header",
        value_name = "HEADER",
        help_heading = "HTTP",
        help = "Extra request header as 'Key: Value'."
    )]
    pub header: Option<String>,
}
