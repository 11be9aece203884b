//! `dial` — phonebook command-line interface.
//!
//! Provides two subcommands for working with declarative phonebook
//! definitions on the command line:
//!
//! - **`show`** — render the chapters and routes a definition describes.
//! - **`call`** — walk a dotted path to a node, then compute the request it
//!   would make (dry run) or execute it against a base URL.
//!
//! Both subcommands read a JSON book definition from a file path or from
//! stdin (`-`).

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use phonebook::{render, BookDef, DataMap, Phonebook, RecordingTransport, Transport};
use phonebook_http::HttpTransport;

/// dial — phonebook CLI
///
/// Inspect phonebook definitions and dial their routes.
#[derive(Parser)]
#[command(name = "dial", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the chapters and routes of a phonebook definition.
    ///
    /// Pass `-` as FILE to read from stdin.
    Show {
        /// Path to a JSON book definition, or `-` for stdin.
        file: PathBuf,
    },

    /// Compute a request from a definition, or execute it with --base.
    ///
    /// PATH walks the chapter tree in dot notation; the final segment is
    /// either a route installed by the definition or one of the builtin
    /// methods get | post | put | destroy (builtins win when both exist).
    ///
    /// Examples:
    ///   dial call book.json users.recent
    ///   dial call book.json users.get --url /search --data '{"q": "ada"}'
    ///   dial call book.json users.posts.pin --base https://api.example.com
    Call {
        /// Path to a JSON book definition, or `-` for stdin.
        file: PathBuf,

        /// Dot-notation path, e.g. `users.posts.recent` or `users.get`.
        path: String,

        /// Extra URL fragment, for builtin method segments.
        #[arg(long, value_name = "FRAGMENT", default_value = "")]
        url: String,

        /// Call-time data overrides, as a JSON object.
        #[arg(long, value_name = "JSON")]
        data: Option<String>,

        /// Call-time option overrides, as a JSON object.
        #[arg(long, value_name = "JSON")]
        options: Option<String>,

        /// Base URL to execute against. Omit to print the computed request
        /// instead of sending it.
        #[arg(long, value_name = "URL")]
        base: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Show { file } => {
            let def = load_def(&file);
            let book = open_book(&def, RecordingTransport::new());
            print!("{}", render::render_book(&book));
        }

        Command::Call {
            file,
            path,
            url,
            data,
            options,
            base,
        } => {
            let def = load_def(&file);
            let data = parse_map(data.as_deref(), "--data");
            let options = parse_map(options.as_deref(), "--options");

            match base {
                // Dry run: the recording transport hands the computed
                // request straight back.
                None => {
                    let book = open_book(&def, RecordingTransport::new());
                    let request = dispatch(&book, &path, &url, data, options);
                    print!("{}", render::render_request(&request));
                }
                Some(base) => {
                    let book = open_book(&def, HttpTransport::new(base));
                    let response = dispatch(&book, &path, &url, data, options)
                        .unwrap_or_else(|e| fatal(&format!("request failed: {}", e)));
                    println!("{}", response.status());
                    match response.text() {
                        Ok(body) if !body.is_empty() => println!("{}", body),
                        Ok(_) => {}
                        Err(e) => fatal(&format!("failed to read response body: {}", e)),
                    }
                }
            }
        }
    }
}

/// Walk `path` down the chapter tree and invoke its final segment.
fn dispatch<T: Transport>(
    book: &Phonebook<T>,
    path: &str,
    url: &str,
    data: DataMap,
    options: DataMap,
) -> T::Handle {
    let segments: Vec<&str> = path.split('.').collect();
    let (last, chapters) = segments
        .split_last()
        .unwrap_or_else(|| fatal("PATH must not be empty"));

    let mut node = book.clone();
    for segment in chapters {
        node = node
            .chapter(segment)
            .unwrap_or_else(|| fatal(&format!("no chapter named {:?}", segment)));
    }

    match *last {
        "get" => node.get(url, data, options),
        "post" => node.post(url, data, options),
        "put" => node.put(url, data, options),
        "destroy" => node.destroy(url, data, options),
        route => node
            .call(route, data, options)
            .unwrap_or_else(|e| fatal(&e.to_string())),
    }
}

/// Read the full contents of a file, or stdin when the path is `"-"`.
fn read_input(path: &PathBuf) -> String {
    if path.to_str() == Some("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .unwrap_or_else(|e| fatal(&format!("failed to read stdin: {}", e)));
        buf
    } else {
        fs::read_to_string(path)
            .unwrap_or_else(|e| fatal(&format!("failed to read {}: {}", path.display(), e)))
    }
}

fn load_def(path: &PathBuf) -> BookDef {
    let json = read_input(path);
    serde_json::from_str(&json)
        .unwrap_or_else(|e| fatal(&format!("failed to parse book definition: {}", e)))
}

fn open_book<T: Transport>(def: &BookDef, transport: T) -> Phonebook<T> {
    def.open_with(transport)
        .unwrap_or_else(|e| fatal(&format!("invalid book definition: {}", e)))
}

/// Parse a `--data` / `--options` argument as a JSON object.
fn parse_map(raw: Option<&str>, flag: &str) -> DataMap {
    let Some(raw) = raw else {
        return DataMap::new();
    };
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(map)) => map,
        Ok(_) => fatal(&format!("{} must be a JSON object", flag)),
        Err(e) => fatal(&format!("failed to parse {}: {}", flag, e)),
    }
}

/// Print an error message to stderr and exit with code 2.
fn fatal(msg: &str) -> ! {
    eprintln!("dial: {}", msg);
    process::exit(2);
}
