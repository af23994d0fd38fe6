use clap::Parser;

/// Builds the data tables and chart requests for the cervical cancer dashboard.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The JSON run configuration naming the four data sources and
    /// the dashboard settings. Source paths are resolved relative to this file.
    #[clap(short, long, value_parser)]
    pub config: String,

    /// (file path) A reference dashboard document in JSON format. If provided, cervidash will
    /// check that the assembled output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path or empty) If specified, the assembled dashboard will be written in JSON format
    /// to the given location instead of the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
