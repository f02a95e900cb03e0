use anyhow::{Context, Result};
use clap::{App, Arg, ArgMatches};
use postsplice::build::build_site;
use postsplice::config::Config;
use postsplice::markdown::ConverterKind;
use std::path::{Path, PathBuf};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let matches = App::new("postsplice")
        .version(clap::crate_version!())
        .about("Converts Markdown posts to HTML and updates index.html")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .takes_value(true)
                .help("Project file to load instead of ./postsplice.yaml"),
        )
        .arg(
            Arg::with_name("posts")
                .long("posts")
                .value_name("DIR")
                .takes_value(true)
                .help("Directory containing the Markdown posts"),
        )
        .arg(
            Arg::with_name("index")
                .long("index")
                .value_name("FILE")
                .takes_value(true)
                .help("HTML file whose posts section is rewritten"),
        )
        .arg(
            Arg::with_name("converter")
                .long("converter")
                .takes_value(true)
                .possible_values(&["library", "fallback"])
                .help("Markdown converter to use"),
        )
        .get_matches();

    let config = load_config(&matches)?;
    log::debug!(
        "posts from `{}`, index `{}`, {} converter",
        config.posts_directory.display(),
        config.index_file.display(),
        config.converter.resolve()
    );

    let stdout = std::io::stdout();
    build_site(&config, &mut stdout.lock())?;
    Ok(())
}

fn load_config(matches: &ArgMatches) -> Result<Config> {
    let config = match matches.value_of("config") {
        Some(path) => Config::from_project_file(Path::new(path))?,
        None => Config::from_directory(Path::new(""))?,
    };
    let converter = match matches.value_of("converter") {
        Some(name) => Some(
            name.parse::<ConverterKind>()
                .context("Parsing `--converter`")?,
        ),
        None => None,
    };
    Ok(config.with_overrides(
        matches.value_of("posts").map(PathBuf::from),
        matches.value_of("index").map(PathBuf::from),
        converter,
    ))
}
