//! Resolve schema files and print the token string of every declared layout.
//!
//! Usage:
//!   packlayout [OPTIONS] [FILE ...]
//!   packlayout < schema.pl
//!
//! Prints one line per struct or `let` entry: `Name: token (N bytes)` for
//! resolved layouts, `Name: template <T, Tx>` for templates.
//!
//! Options:
//!   --human, -H  Also print the offset/size table of each resolved layout
//!
//! Set `RUST_LOG=packlayout=debug` to trace specialization.
//! Exit code 1 if any file fails to parse.

use packlayout::dump::{format_layout, summary_line};
use packlayout::{parse, Schema};
use std::io::{self, Read};
use std::path::Path;

#[derive(Clone, Copy)]
enum OutputStyle {
    Compact,
    Human,
}

fn print_schema(schema: &Schema, style: OutputStyle) {
    for (name, ty) in schema.entries() {
        match ty.as_struct() {
            Some(def) => {
                println!("{}", summary_line(name, def));
                if let OutputStyle::Human = style {
                    print!("{}", format_layout(def));
                }
            }
            None => println!("{}: {}", name, ty),
        }
    }
}

fn main() -> anyhow::Result<()> {
    packlayout::init_tracing();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let style = if let Some(pos) = args.iter().position(|a| a == "--human" || a == "-H") {
        args.remove(pos);
        OutputStyle::Human
    } else {
        OutputStyle::Compact
    };

    let mut has_error = false;

    if args.is_empty() {
        let mut src = String::new();
        io::stdin().read_to_string(&mut src)?;
        match parse(&src) {
            Ok(schema) => print_schema(&schema, style),
            Err(e) => {
                eprintln!("<stdin>: {}", e);
                has_error = true;
            }
        }
    } else {
        let multiple = args.len() > 1;
        for path in &args {
            let path = Path::new(path);
            let src = match std::fs::read_to_string(path) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("{}: {}", path.display(), e);
                    has_error = true;
                    continue;
                }
            };
            match parse(&src) {
                Ok(schema) => {
                    if multiple {
                        println!("# {}", path.display());
                    }
                    print_schema(&schema, style);
                }
                Err(e) => {
                    eprintln!("{}: {}", path.display(), e);
                    has_error = true;
                }
            }
        }
    }

    if has_error {
        std::process::exit(1);
    }
    Ok(())
}
