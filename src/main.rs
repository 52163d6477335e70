use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

use snapshelf::config::Config;
use snapshelf::db::Storage;
use snapshelf::logging;
use snapshelf::scanner::PhotoImporter;
use snapshelf::{Conditional, PhotoRef, PhotoSearch, Session, TagPredicate, User};

struct Args {
    config_path: Option<PathBuf>,
    command: Vec<String>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        config_path: None,
        command: Vec::new(),
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("snapshelf {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--config" | "-c" if parsed.command.is_empty() => {
                if i + 1 < args.len() {
                    parsed.config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                } else {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
            }
            _ => parsed.command.push(args[i].clone()),
        }
        i += 1;
    }

    parsed
}

fn print_help() {
    println!(
        r#"snapshelf - personal photo library

USAGE:
    snapshelf [OPTIONS] <COMMAND>

COMMANDS:
    users                                   List registered users
    add-user NAME                           Register a user
    remove-user NAME                        Delete a user and their albums
    albums USER                             List a user's albums
    create-album USER NAME                  Create an empty album
    import USER ALBUM DIR                   Add every image under DIR to ALBUM
    search-date USER FROM TO [--save-as NAME]
                                            Photos taken FROM..=TO (YYYY-MM-DD)
    search-tags USER MODE TYPE VALUE [TYPE VALUE] [--save-as NAME]
                                            MODE is NONE, AND or OR

OPTIONS:
    --config, -c PATH   Path to config file
    --version, -V       Show version
    --help, -h          Show this help message

ENVIRONMENT:
    SNAPSHELF_CONFIG    Path to config file (overrides default location)
    SNAPSHELF_LOG       Log level (trace, debug, info, warn, error)

Config file location: $XDG_CONFIG_HOME/snapshelf/config.toml"#
    );
}

fn main() -> Result<()> {
    let args = parse_args();

    // Logging is best effort; the CLI still works without it
    let _ = logging::init(Some(Config::config_dir().join("logs")));

    let config = match args.config_path {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let storage = Storage::open(&config.storage).context("Failed to open library storage")?;
    let mut session = Session::open(storage)?;

    let result = run(&mut session, &config, &args.command);
    if let Err(ref e) = result {
        tracing::warn!(error = %e, "Command failed");
    }
    session.shutdown()?;
    result
}

fn run(session: &mut Session, config: &Config, command: &[String]) -> Result<()> {
    let Some((name, rest)) = command.split_first() else {
        print_help();
        return Ok(());
    };

    match (name.as_str(), rest) {
        ("users", []) => {
            for username in session.library().users() {
                println!("{}", username);
            }
        }
        ("add-user", [username]) => session.create_user(username)?,
        ("remove-user", [username]) => session.delete_user(username)?,
        ("albums", [username]) => {
            let user = session.login(username)?;
            for album in user.albums() {
                println!("{}\n", album);
            }
        }
        ("create-album", [username, album]) => {
            session.login(username)?.create_album(album)?;
        }
        ("import", [username, album, dir]) => {
            let importer = PhotoImporter::new(config.scanner.clone());
            let user = session.login(username)?;
            let index = user
                .album_index(album)
                .with_context(|| format!("No album named '{}'", album))?;
            let summary = user.import_directory(index, Path::new(dir), &importer)?;
            println!(
                "Added {}, skipped {}, failed {}",
                summary.added,
                summary.skipped,
                summary.failed.len()
            );
            for (path, error) in &summary.failed {
                println!("  {}: {}", path.display(), error);
            }
        }
        ("search-date", [username, from, to, options @ ..]) => {
            let from = parse_date(from)?;
            let to = parse_date(to)?;
            let user = session.login(username)?;
            let mut search = PhotoSearch::new();
            search.by_date(user, Some(from), Some(to))?;
            finish_search(user, &search, options)?;
        }
        ("search-tags", [username, mode, criteria @ ..]) => {
            let mode: Conditional = mode.parse()?;
            let (first, second, options) = parse_predicates(mode, criteria)?;
            let user = session.login(username)?;
            let mut search = PhotoSearch::new();
            search.by_tags(user, mode, &first, second.as_ref())?;
            finish_search(user, &search, options)?;
        }
        _ => {
            print_help();
            bail!("Unknown command: {}", command.join(" "));
        }
    }

    Ok(())
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", value))
}

fn parse_predicates(
    mode: Conditional,
    criteria: &[String],
) -> Result<(TagPredicate, Option<TagPredicate>, &[String])> {
    let [type1, value1, rest @ ..] = criteria else {
        bail!("search-tags needs a tag type and value");
    };
    let first = TagPredicate::new(type1.as_str(), value1.as_str());

    if mode == Conditional::None {
        return Ok((first, None, rest));
    }
    let [type2, value2, options @ ..] = rest else {
        bail!("{} needs a second tag type and value", mode);
    };
    Ok((
        first,
        Some(TagPredicate::new(type2.as_str(), value2.as_str())),
        options,
    ))
}

fn finish_search(user: &mut User, search: &PhotoSearch, options: &[String]) -> Result<()> {
    print_photos(search.results());

    match options {
        [] => Ok(()),
        [flag, name] if flag == "--save-as" => {
            let index = search.create_album(user, name)?;
            println!("Created album '{}'", user.album(index)?.name());
            Ok(())
        }
        _ => bail!("Unexpected arguments: {}", options.join(" ")),
    }
}

fn print_photos(photos: &[PhotoRef]) {
    if photos.is_empty() {
        println!("No photos found");
        return;
    }
    for photo in photos {
        let photo = photo.borrow();
        println!(
            "{}  {}  {}",
            photo.captured_at(),
            photo.location().display(),
            photo.caption()
        );
    }
}
